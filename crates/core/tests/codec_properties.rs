//! Property tests for the timestamp and version-key codec

use proptest::prelude::*;
use swstack_core::{Timestamp, VersionKey};

fn any_timestamp() -> impl Strategy<Value = Timestamp> {
    (1000i32..=9999, 1u32..=12, 1u32..=28, 0u32..24, 0u32..60, 0u32..60).prop_map(
        |(y, mo, d, h, mi, s)| Timestamp::from_ymd_hms(y, mo, d, h, mi, s).unwrap(),
    )
}

proptest! {
    #[test]
    fn format_then_parse_is_lossless(ts in any_timestamp()) {
        let text = ts.to_string();
        prop_assert_eq!(text.len(), 15);
        prop_assert_eq!(Timestamp::parse(&text).unwrap(), ts);
    }

    #[test]
    fn parse_then_format_is_identity(ts in any_timestamp()) {
        let text = ts.to_string();
        let reparsed = Timestamp::parse(&text).unwrap();
        prop_assert_eq!(reparsed.to_string(), text);
    }

    #[test]
    fn revision_splits_from_the_right(ts in any_timestamp(), rev in "[A-Za-z0-9.-]{1,16}") {
        let text = format!("{}_{}", ts, rev);
        let (parsed, revision) = Timestamp::parse_with_revision(&text).unwrap();
        prop_assert_eq!(parsed, ts);
        prop_assert_eq!(revision, Some(rev.clone()));

        let key = VersionKey::parse(&text).unwrap();
        prop_assert_eq!(key.to_string(), text);
    }
}
