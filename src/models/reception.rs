use diesel_derive_enum::DbEnum;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Lifecycle of a reception. The only transition is `InProgress` → `Close`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, DbEnum, utoipa::ToSchema)]
#[db_enum(existing_type_path = "crate::schema::sql_types::ReceptionStatus")]
#[serde(rename_all = "snake_case")]
pub enum ReceptionStatus {
    InProgress,
    Close,
}

impl fmt::Display for ReceptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReceptionStatus::InProgress => write!(f, "in_progress"),
            ReceptionStatus::Close => write!(f, "close"),
        }
    }
}

/// A batch of goods accepted at a pickup point.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reception {
    pub id: Uuid,
    pub date_time: Timestamp,
    pub pvz_id: Uuid,
    pub status: ReceptionStatus,
}

impl Reception {
    pub fn is_open(&self) -> bool {
        self.status == ReceptionStatus::InProgress
    }
}

/// Closed time interval `[start, end]` used to filter receptions by product time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateWindow {
    pub start: Timestamp,
    pub end: Timestamp,
}

impl DateWindow {
    /// Builds a window from optional bounds. A missing start is the Unix epoch
    /// and a missing end is the current instant.
    pub fn from_bounds(start: Option<Timestamp>, end: Option<Timestamp>) -> Self {
        Self {
            start: start.unwrap_or(Timestamp::UNIX_EPOCH),
            end: end.unwrap_or_else(Timestamp::now),
        }
    }

    pub fn contains(&self, at: Timestamp) -> bool {
        self.start <= at && at <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::ToSpan;

    #[test]
    fn test_window_is_inclusive() {
        let start: Timestamp = "2025-01-01T00:00:00Z".parse().unwrap();
        let end = start + 1.hour();
        let window = DateWindow { start, end };

        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + 1.second()));
        assert!(!window.contains(start - 1.second()));
    }

    #[test]
    fn test_window_defaults() {
        let window = DateWindow::from_bounds(None, None);
        assert_eq!(window.start, Timestamp::UNIX_EPOCH);
        assert!(window.end <= Timestamp::now());
    }

    #[test]
    fn test_status_serialization() {
        assert_eq!(
            serde_json::to_string(&ReceptionStatus::InProgress).unwrap(),
            "\"in_progress\""
        );
        assert_eq!(serde_json::to_string(&ReceptionStatus::Close).unwrap(), "\"close\"");
    }
}
