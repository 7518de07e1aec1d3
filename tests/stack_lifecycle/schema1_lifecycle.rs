//! Schema 1 stacks from creation through install, rollback and reinstall.

use crate::common::{ts, TestStack};
use std::time::UNIX_EPOCH;
use swstack::{InstallRequest, SchemaId, StackError, StackVersion};

#[test]
fn fresh_stack_install_rollback_reinstall() {
    let t = TestStack::new("packages.xml");
    let mut stack = t.manager.create(&t.file, &SchemaId::v1()).unwrap();

    for at in ["20181101-090000", "20181102-090000", "20181103-090000"] {
        stack.insert(InstallRequest::at(ts(at))).unwrap();
    }
    stack.rollback(None).unwrap();

    let reopened = t.open();
    assert_eq!(
        reopened.current_version().unwrap(),
        StackVersion::timestamp(ts("20181102-090000"))
    );
    // After the current entry, nothing answers a point-in-time query
    assert_eq!(
        reopened.file_on(ts("20181231-000000")).unwrap(),
        reopened.current().unwrap()
    );

    let mut stack = reopened;
    stack
        .insert(InstallRequest::at(ts("20181104-090000")).revision("r77"))
        .unwrap();

    let entries = t.open().entries().unwrap();
    assert_eq!(entries.len(), 4);
    assert_eq!(entries[3].revision(), Some("r77"));
    assert!(entries[3]
        .path()
        .ends_with("bak/packages.xml/packages.xml_20181104-090000_r77"));
}

#[test]
fn hash_is_not_recorded() {
    let t = TestStack::new("f");
    let mut stack = t.manager.create(&t.file, &SchemaId::v1()).unwrap();
    stack
        .insert(InstallRequest::with_hash("deadbeef").timestamp(ts("20181101-090000")))
        .unwrap();
    assert!(!t.contents().contains("deadbeef"));
}

#[test]
fn stale_open_cannot_write() {
    let t = TestStack::new("f");
    t.manager.create(&t.file, &SchemaId::v1()).unwrap();
    let before = t.contents();

    let mut stale = t.manager.resolve_at(&t.file, UNIX_EPOCH).unwrap();
    let err = stale
        .insert(InstallRequest::at(ts("20181101-090000")))
        .unwrap_err();

    assert!(matches!(err, StackError::ConcurrentModification { .. }));
    assert_eq!(t.contents(), before);
}
