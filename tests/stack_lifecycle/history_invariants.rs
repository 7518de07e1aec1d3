//! Invariants over random install/rollback sequences.

use crate::common::{ts_plus, TestStack};
use proptest::prelude::*;
use swstack::{Action, InstallRequest, SchemaId, StackError, StackSchema, StackVersion};

const BASE: &str = "20180101-000000";

#[derive(Debug, Clone)]
enum Op {
    Install,
    Rollback,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![3 => Just(Op::Install), 1 => Just(Op::Rollback)]
}

fn apply(stack: &mut dyn StackSchema, ops: &[Op]) {
    for (i, op) in ops.iter().enumerate() {
        let at = ts_plus(BASE, (i as i64 + 1) * 60);
        let result = match op {
            Op::Install => stack
                .insert(InstallRequest::with_hash(format!("h{}", i)).timestamp(at))
                .map(|_| ()),
            Op::Rollback => stack.rollback(Some(at)).map(|_| ()),
        };
        match result {
            Ok(()) => {}
            Err(StackError::RollbackUnderflow)
            | Err(StackError::NoCurrentVersion)
            | Err(StackError::EmptyStack) => {}
            Err(e) => panic!("unexpected error: {}", e),
        }
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(24))]

    #[test]
    fn schema1_at_most_one_current(ops in prop::collection::vec(op(), 0..12)) {
        let t = TestStack::new("f");
        let mut stack = t.manager.create(&t.file, &SchemaId::v1()).unwrap();
        apply(stack.as_mut(), &ops);

        let stack = t.open();
        let entries = stack.entries().unwrap();
        let installs = ops.iter().filter(|o| matches!(o, Op::Install)).count();
        prop_assert_eq!(entries.len(), installs);

        let flagged = entries
            .iter()
            .filter(|e| e.as_schema1().unwrap().is_current)
            .count();
        prop_assert_eq!(flagged, usize::from(installs > 0));

        // Entries are append-only and time ordered
        for pair in entries.windows(2) {
            prop_assert!(pair[0].timestamp() < pair[1].timestamp());
        }
    }

    #[test]
    fn schema2_head_is_current_and_versions_advance(ops in prop::collection::vec(op(), 0..12)) {
        let t = TestStack::new("f");
        let mut stack = t.manager.create(&t.file, &SchemaId::v2()).unwrap();
        apply(stack.as_mut(), &ops);

        let stack = t.open();
        let entries = stack.entries().unwrap();
        if let Some(head) = entries.first() {
            prop_assert_eq!(&stack.current().unwrap(), head);
        }

        // Newest first, and install versions strictly decrease down the log
        for pair in entries.windows(2) {
            prop_assert!(pair[0].timestamp() >= pair[1].timestamp());
        }
        let installs: Vec<u32> = entries
            .iter()
            .filter_map(|e| e.as_schema2())
            .filter(|m| m.action == Action::Install)
            .map(|m| m.version)
            .collect();
        for pair in installs.windows(2) {
            prop_assert_eq!(pair[0], pair[1] + 1);
        }
        prop_assert_eq!(
            stack.next_version().unwrap(),
            installs.first().map_or(1, |v| v + 1)
        );

        // Every rollback restores an existing install's hash
        for m in entries.iter().filter_map(|e| e.as_schema2()) {
            if m.action == Action::Rollback {
                let target = stack.version(&StackVersion::Number(m.version)).unwrap();
                prop_assert!(target.as_schema2().is_some());
                let restores_install = entries.iter().any(|e| {
                    let e = e.as_schema2().unwrap();
                    e.action == Action::Install && e.version == m.version && e.hash == m.hash
                });
                prop_assert!(restores_install);
            }
        }
    }
}
