//! Second-precision wall-clock timestamp
//!
//! Stack documents record when each entry was written using the fixed-width
//! wire format `YYYYMMDD-HHMMSS` (local wall-clock time, no zone). Schema 1
//! additionally glues an optional revision token onto the timestamp with a
//! single `_` separator.
//!
//! ## Usage
//!
//! ```
//! use swstack_core::Timestamp;
//!
//! let ts = Timestamp::parse("20180811-221113").unwrap();
//! assert_eq!(ts.to_string(), "20180811-221113");
//!
//! let (ts, revision) = Timestamp::parse_with_revision("20180811-221113_r12345").unwrap();
//! assert_eq!(revision.as_deref(), Some("r12345"));
//! assert_eq!(ts.to_string(), "20180811-221113");
//! ```

use crate::error::{Result, StackError};
use chrono::{Duration, Local, NaiveDate, NaiveDateTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// strftime pattern of the wire format
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d-%H%M%S";

/// Length of a formatted timestamp in bytes
pub const TIMESTAMP_LEN: usize = 15;

/// Separator between a timestamp and a trailing revision token
pub const REVISION_SEPARATOR: char = '_';

/// Position of the date/time dash in the wire format
const DASH_POSITION: usize = 8;

/// Second-precision timestamp
///
/// ## Invariants
///
/// - Sub-second components are always zero, so `parse(format(t)) == t`
/// - Timestamps are totally ordered
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(NaiveDateTime);

impl Timestamp {
    // =========================================================================
    // Constructors
    // =========================================================================

    /// Timestamp for the current local wall-clock second
    pub fn now() -> Self {
        Timestamp::from_datetime(Local::now().naive_local())
    }

    /// Create from a chrono datetime, truncating to whole seconds
    pub fn from_datetime(datetime: NaiveDateTime) -> Self {
        Timestamp(datetime.with_nanosecond(0).unwrap_or(datetime))
    }

    /// Create from calendar fields
    ///
    /// Returns `None` for an invalid date or time.
    pub fn from_ymd_hms(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
    ) -> Option<Self> {
        NaiveDate::from_ymd_opt(year, month, day)?
            .and_hms_opt(hour, minute, second)
            .map(Timestamp)
    }

    // =========================================================================
    // Codec
    // =========================================================================

    /// Parse the fixed-width `YYYYMMDD-HHMMSS` format
    pub fn parse(text: &str) -> Result<Self> {
        let well_shaped = text.len() == TIMESTAMP_LEN
            && text.char_indices().all(|(i, c)| {
                if i == DASH_POSITION {
                    c == '-'
                } else {
                    c.is_ascii_digit()
                }
            });
        if !well_shaped {
            return Err(StackError::format(text, "expected YYYYMMDD-HHMMSS"));
        }

        NaiveDateTime::parse_from_str(text, TIMESTAMP_FORMAT)
            .map(Timestamp)
            .map_err(|e| StackError::format(text, e.to_string()))
    }

    /// Parse `YYYYMMDD-HHMMSS[_REVISION]`
    ///
    /// At most one split is made, from the right. Everything left of the
    /// separator must parse as a timestamp, so a revision containing the
    /// separator is rejected.
    pub fn parse_with_revision(text: &str) -> Result<(Self, Option<String>)> {
        match text.rsplit_once(REVISION_SEPARATOR) {
            Some((_, "")) => Err(StackError::format(text, "empty revision")),
            Some((stamp, revision)) => {
                let timestamp = Timestamp::parse(stamp)
                    .map_err(|_| StackError::format(text, "expected YYYYMMDD-HHMMSS_REVISION"))?;
                Ok((timestamp, Some(revision.to_string())))
            }
            None => Ok((Timestamp::parse(text)?, None)),
        }
    }

    // =========================================================================
    // Accessors and arithmetic
    // =========================================================================

    /// The underlying chrono datetime
    pub fn as_datetime(&self) -> NaiveDateTime {
        self.0
    }

    /// Shift by a signed number of seconds
    ///
    /// Returns `None` when the result is out of range.
    pub fn checked_add_secs(&self, secs: i64) -> Option<Self> {
        self.0.checked_add_signed(Duration::seconds(secs)).map(Timestamp)
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format(TIMESTAMP_FORMAT))
    }
}

impl FromStr for Timestamp {
    type Err = StackError;

    fn from_str(s: &str) -> Result<Self> {
        Timestamp::parse(s)
    }
}

impl From<NaiveDateTime> for Timestamp {
    fn from(datetime: NaiveDateTime) -> Self {
        Timestamp::from_datetime(datetime)
    }
}

impl Serialize for Timestamp {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Timestamp {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Timestamp::parse(&text).map_err(serde::de::Error::custom)
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> Timestamp {
        Timestamp::from_ymd_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse() {
        assert_eq!(
            Timestamp::parse("20180811-221113").unwrap(),
            ts(2018, 8, 11, 22, 11, 13)
        );
    }

    #[test]
    fn test_format() {
        assert_eq!(ts(2018, 8, 11, 22, 11, 13).to_string(), "20180811-221113");
        assert_eq!(ts(2018, 1, 2, 3, 4, 5).to_string(), "20180102-030405");
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in [
            "",
            "2018081-221113",
            "20180811221113",
            "20180811_221113",
            "20180811-2211133",
            "2018081a-221113",
            "20181311-221113",
            "20180811-251113",
            "+2018081-221113",
        ] {
            let err = Timestamp::parse(bad).unwrap_err();
            assert!(matches!(err, StackError::Format { .. }), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_with_revision_no_rev() {
        let (stamp, revision) = Timestamp::parse_with_revision("20180811-221113").unwrap();
        assert_eq!(stamp, ts(2018, 8, 11, 22, 11, 13));
        assert_eq!(revision, None);
    }

    #[test]
    fn test_parse_with_revision_with_rev() {
        let (stamp, revision) = Timestamp::parse_with_revision("20180811-221113_r12345").unwrap();
        assert_eq!(stamp, ts(2018, 8, 11, 22, 11, 13));
        assert_eq!(revision.as_deref(), Some("r12345"));
    }

    #[test]
    fn test_parse_with_revision_single_split() {
        let err = Timestamp::parse_with_revision("20180811-221113_r1_r2").unwrap_err();
        assert!(matches!(err, StackError::Format { .. }));
    }

    #[test]
    fn test_parse_with_revision_empty_revision() {
        assert!(Timestamp::parse_with_revision("20180811-221113_").is_err());
    }

    #[test]
    fn test_from_datetime_truncates_subseconds() {
        let datetime = NaiveDate::from_ymd_opt(2020, 2, 29)
            .unwrap()
            .and_hms_milli_opt(12, 0, 1, 999)
            .unwrap();
        let stamp = Timestamp::from_datetime(datetime);
        assert_eq!(stamp, ts(2020, 2, 29, 12, 0, 1));
        assert_eq!(Timestamp::parse(&stamp.to_string()).unwrap(), stamp);
    }

    #[test]
    fn test_checked_add_secs() {
        let base = ts(2018, 12, 31, 23, 59, 59);
        assert_eq!(base.checked_add_secs(1).unwrap(), ts(2019, 1, 1, 0, 0, 0));
        assert_eq!(base.checked_add_secs(-59).unwrap(), ts(2018, 12, 31, 23, 59, 0));
    }

    #[test]
    fn test_ordering() {
        assert!(ts(2016, 12, 13, 9, 31, 46) < ts(2018, 11, 2, 14, 42, 4));
    }

    #[test]
    fn test_from_str() {
        let stamp: Timestamp = "20181105-103813".parse().unwrap();
        assert_eq!(stamp, ts(2018, 11, 5, 10, 38, 13));
    }
}
