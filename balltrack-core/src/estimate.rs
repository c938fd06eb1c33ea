//! Tab-delimited estimate wire format.
//!
//! The control channel carries one ASCII message per completed
//! detection cycle: three tab-separated integer fields in the order
//! `x`, `y`, `timestamp`, no trailing delimiter.

use serde::{Deserialize, Serialize};

use crate::error::TrackError;
use crate::frame::Point;

/// A position estimate for one frame, as reported by the receiver.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Estimate {
    pub x: i32,
    pub y: i32,
    pub timestamp: i64,
}

impl Estimate {
    pub fn new(x: i32, y: i32, timestamp: i64) -> Self {
        Self { x, y, timestamp }
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Encode as `"{x}\t{y}\t{timestamp}"`.
    pub fn encode(&self) -> String {
        format!("{}\t{}\t{}", self.x, self.y, self.timestamp)
    }

    /// Parse the wire form. Exactly three integer fields are required.
    pub fn parse(text: &str) -> Result<Self, TrackError> {
        let malformed = || TrackError::MalformedEstimate(text.to_string());

        let fields: Vec<&str> = text.split('\t').collect();
        if fields.len() != 3 {
            return Err(malformed());
        }
        let x = fields[0].parse::<i32>().map_err(|_| malformed())?;
        let y = fields[1].parse::<i32>().map_err(|_| malformed())?;
        let timestamp = fields[2].parse::<i64>().map_err(|_| malformed())?;
        Ok(Self { x, y, timestamp })
    }
}

impl std::fmt::Display for Estimate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {}) @ {}", self.x, self.y, self.timestamp)
    }
}

// ── Tests ────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encode_is_tab_delimited() {
        let est = Estimate::new(42, 43, 1000);
        assert_eq!(est.encode(), "42\t43\t1000");
    }

    #[test]
    fn parse_round_trip() {
        let est = Estimate::new(-7, 0, 123456789);
        assert_eq!(Estimate::parse(&est.encode()).unwrap(), est);
    }

    #[test]
    fn parse_spec_message() {
        let est = Estimate::parse("42\t43\t1000").unwrap();
        assert_eq!(est, Estimate::new(42, 43, 1000));
    }

    #[test]
    fn parse_rejects_wrong_field_count() {
        assert!(Estimate::parse("1\t2").is_err());
        assert!(Estimate::parse("1\t2\t3\t4").is_err());
        assert!(Estimate::parse("").is_err());
    }

    #[test]
    fn parse_rejects_non_integer_fields() {
        assert!(Estimate::parse("a\t2\t3").is_err());
        assert!(Estimate::parse("1\t2.5\t3").is_err());
        assert!(Estimate::parse("1\t2\t").is_err());
    }
}
