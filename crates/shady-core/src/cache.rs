//! Cache metadata line
//!
//! Every expansion starts with `// Date: <timestamp>`, the source file's
//! modification time when the expansion was produced. A later run compares it
//! with the current modification time to decide whether the shader is cached.

use std::time::SystemTime;

use chrono::{DateTime, SecondsFormat, Utc};

const HEADER_PREFIX: &str = "// Date: ";

/// Source modification time as recorded in an expansion
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CacheStamp(DateTime<Utc>);

impl CacheStamp {
    pub fn new(modified: DateTime<Utc>) -> Self {
        Self(modified)
    }

    pub fn from_system_time(modified: SystemTime) -> Self {
        Self(modified.into())
    }

    pub fn time(&self) -> DateTime<Utc> {
        self.0
    }

    /// The metadata line, without a trailing newline.
    ///
    /// Nanosecond precision keeps the value round-trippable.
    pub fn header(&self) -> String {
        format!("{HEADER_PREFIX}{}", self.0.to_rfc3339_opts(SecondsFormat::Nanos, true))
    }

    /// Parse a metadata line; anything else yields `None`
    pub fn parse_header(line: &str) -> Option<Self> {
        let value = line.trim_end().strip_prefix(HEADER_PREFIX)?;
        DateTime::parse_from_rfc3339(value)
            .ok()
            .map(|time| Self(time.with_timezone(&Utc)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_header_round_trip() {
        let time = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let stamp = CacheStamp::new(time);
        let header = stamp.header();
        assert_eq!(header, "// Date: 2023-11-14T22:13:20.123456789Z");
        assert_eq!(CacheStamp::parse_header(&header), Some(stamp));
    }

    #[test]
    fn test_offset_timestamps_compare_equal() {
        let stamp = CacheStamp::parse_header("// Date: 2024-03-01T12:00:00+02:00").unwrap();
        let utc = CacheStamp::parse_header("// Date: 2024-03-01T10:00:00Z").unwrap();
        assert_eq!(stamp, utc);
    }

    #[test]
    fn test_rejects_other_lines() {
        assert_eq!(CacheStamp::parse_header("#line 1"), None);
        assert_eq!(CacheStamp::parse_header("// Date: yesterday"), None);
    }

    #[test]
    fn test_from_system_time() {
        let stamp = CacheStamp::from_system_time(SystemTime::UNIX_EPOCH);
        assert_eq!(stamp.time(), DateTime::<Utc>::UNIX_EPOCH);
    }
}
