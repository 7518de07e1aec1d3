//! Schema 2 stacks from creation through install, rollback and reinstall.

use crate::common::{ts, ts_plus, TestStack};
use swstack::{Action, FileMetadata, InstallRequest, SchemaId, StackError, StackVersion};

fn action(metadata: &FileMetadata) -> Action {
    metadata.as_schema2().unwrap().action
}

#[test]
fn fresh_stack_install_rollback_reinstall() {
    let t = TestStack::new("packages.xml");
    let mut stack = t.manager.create(&t.file, &SchemaId::v2()).unwrap();

    for (i, hash) in ["a1", "b2", "c3"].iter().enumerate() {
        let installed = stack
            .insert(InstallRequest::with_hash(*hash).timestamp(ts_plus("20181101-090000", i as i64 * 60)))
            .unwrap();
        assert_eq!(installed.version(), StackVersion::Number(i as u32 + 1));
    }

    let rolled = stack.rollback(Some(ts("20181102-000000"))).unwrap();
    assert_eq!(action(&rolled), Action::Rollback);
    assert_eq!(rolled.as_schema2().unwrap().hash, "b2");

    let reinstalled = stack
        .insert(InstallRequest::with_hash("d4").timestamp(ts("20181103-000000")))
        .unwrap();
    assert_eq!(reinstalled.version(), StackVersion::Number(4));

    let stack = t.open();
    let entries = stack.entries().unwrap();
    assert_eq!(entries.len(), 5);
    assert_eq!(entries[0], stack.current().unwrap());

    // Between the rollback and the reinstall, version 2 was live
    let then = stack.file_on(ts("20181102-120000")).unwrap();
    assert_eq!(then.version(), StackVersion::Number(2));
    assert!(then.path().ends_with("bak/packages.xml/packages.xml_2"));
}

#[test]
fn rollback_to_first_then_underflow() {
    let t = TestStack::new("f");
    let mut stack = t.manager.create(&t.file, &SchemaId::v2()).unwrap();
    stack
        .insert(InstallRequest::with_hash("a").timestamp(ts("20181101-090000")))
        .unwrap();
    stack
        .insert(InstallRequest::with_hash("b").timestamp(ts("20181101-100000")))
        .unwrap();

    stack.rollback(None).unwrap();
    let before = t.contents();
    assert!(matches!(
        stack.rollback(None),
        Err(StackError::RollbackUnderflow)
    ));
    assert_eq!(t.contents(), before);
}

#[test]
fn document_is_indented_xml() {
    let t = TestStack::new("f");
    let mut stack = t.manager.create(&t.file, &SchemaId::v2()).unwrap();
    stack
        .insert(InstallRequest::with_hash("a").timestamp(ts("20181101-090000")))
        .unwrap();

    let text = t.contents();
    assert!(text.starts_with(r#"<?xml version="1.0" encoding="UTF-8"?>"#));
    assert!(text.contains(r#"schema="2""#));
    assert!(text.contains(
        r#"   <elt action="install" version="1" datetime="20181101-090000" hash="a"/>"#
    ));
}

#[test]
fn hand_written_document_is_readable() {
    let t = TestStack::new("tool.cfg");
    t.write(
        r#"<stack_history schema="2">
  <!-- edited by hand -->
  <elt action="install" version="2" datetime="20180101-103813" hash="b" revision=""/>
  <elt action="install" version="1" datetime="20171106-104603" hash="a"/>
</stack_history>"#,
    );

    let stack = t.open();
    assert_eq!(stack.current().unwrap().revision(), None);
    assert_eq!(stack.next_version().unwrap(), 3);
}
