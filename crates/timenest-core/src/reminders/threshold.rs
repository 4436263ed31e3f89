use std::fmt;

use serde::{Deserialize, Serialize};

/// Points relative to a task's due instant at which a reminder fires.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ThresholdKind {
    #[serde(rename = "due-15")]
    Due15,
    #[serde(rename = "due-5")]
    Due5,
    #[serde(rename = "due-now")]
    DueNow,
}

impl ThresholdKind {
    pub const ALL: [ThresholdKind; 3] = [ThresholdKind::Due15, ThresholdKind::Due5, ThresholdKind::DueNow];

    pub fn as_str(self) -> &'static str {
        match self {
            ThresholdKind::Due15 => "due-15",
            ThresholdKind::Due5 => "due-5",
            ThresholdKind::DueNow => "due-now",
        }
    }

    pub fn minutes_before(self) -> i64 {
        match self {
            ThresholdKind::Due15 => 15,
            ThresholdKind::Due5 => 5,
            ThresholdKind::DueNow => 0,
        }
    }

    pub fn offset_ms(self) -> i64 {
        self.minutes_before() * 60_000
    }

    /// `threshold - poll_ms < diff_ms <= threshold`, where `diff_ms` is
    /// `due - now`. Each window is exactly one poll period wide.
    pub fn in_window(self, diff_ms: i64, poll_ms: i64) -> bool {
        let threshold = self.offset_ms();
        diff_ms <= threshold && diff_ms > threshold - poll_ms
    }
}

impl fmt::Display for ThresholdKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const POLL: i64 = 30_000;

    #[test]
    fn window_bounds() {
        assert!(ThresholdKind::Due15.in_window(900_000, POLL));
        assert!(ThresholdKind::Due15.in_window(870_001, POLL));
        assert!(!ThresholdKind::Due15.in_window(870_000, POLL));
        assert!(!ThresholdKind::Due15.in_window(900_001, POLL));

        assert!(ThresholdKind::DueNow.in_window(0, POLL));
        assert!(ThresholdKind::DueNow.in_window(-29_999, POLL));
        assert!(!ThresholdKind::DueNow.in_window(-30_000, POLL));
        assert!(!ThresholdKind::DueNow.in_window(1, POLL));
    }

    #[test]
    fn serializes_as_tag() {
        assert_eq!(serde_json::to_string(&ThresholdKind::Due5).unwrap(), "\"due-5\"");
        assert_eq!(ThresholdKind::DueNow.to_string(), "due-now");
    }
}
