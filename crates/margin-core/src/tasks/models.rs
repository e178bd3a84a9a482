//! Task store models

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    Incomplete,
    Completed,
    Canceled,
}

impl TaskStatus {
    pub const fn from_db(value: i64) -> Self {
        match value {
            3 => Self::Completed,
            2 => Self::Canceled,
            _ => Self::Incomplete,
        }
    }

    pub const fn to_db(self) -> i64 {
        match self {
            Self::Incomplete => 0,
            Self::Canceled => 2,
            Self::Completed => 3,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Incomplete => "incomplete",
            Self::Completed => "completed",
            Self::Canceled => "canceled",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    #[serde(rename = "to-do")]
    Todo,
    Project,
    Heading,
}

impl TaskKind {
    pub const fn from_db(value: i64) -> Self {
        match value {
            1 => Self::Project,
            2 => Self::Heading,
            _ => Self::Todo,
        }
    }

    pub const fn to_db(self) -> i64 {
        match self {
            Self::Todo => 0,
            Self::Project => 1,
            Self::Heading => 2,
        }
    }
}

/// Which start list an item lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StartBucket {
    Inbox,
    Anytime,
    Someday,
}

impl StartBucket {
    pub const fn from_db(value: i64) -> Self {
        match value {
            0 => Self::Inbox,
            2 => Self::Someday,
            _ => Self::Anytime,
        }
    }

    pub const fn to_db(self) -> i64 {
        match self {
            Self::Inbox => 0,
            Self::Anytime => 1,
            Self::Someday => 2,
        }
    }
}

/// Lightweight reference to a parent project or area
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRef {
    pub uuid: String,
    pub title: String,
}

/// A to-do, project or heading
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub uuid: String,
    pub title: String,
    pub notes: String,
    #[serde(rename = "type")]
    pub kind: TaskKind,
    pub status: TaskStatus,
    pub start: StartBucket,
    pub start_date: Option<NaiveDate>,
    pub deadline: Option<NaiveDate>,
    pub today_index: Option<i64>,
    pub project: Option<ItemRef>,
    pub area: Option<ItemRef>,
    pub tags: Vec<String>,
}

impl Task {
    /// Minimal incomplete to-do, mostly for tests and builders.
    pub fn new(uuid: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            title: title.into(),
            notes: String::new(),
            kind: TaskKind::Todo,
            status: TaskStatus::Incomplete,
            start: StartBucket::Anytime,
            start_date: None,
            deadline: None,
            today_index: None,
            project: None,
            area: None,
            tags: Vec::new(),
        }
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|name| name.eq_ignore_ascii_case(tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Area {
    pub uuid: String,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagRecord {
    pub uuid: String,
    pub title: String,
    pub shortcut: Option<String>,
}

/// A project together with all of its to-dos
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectOverview {
    #[serde(flatten)]
    pub project: Task,
    pub todos: Vec<Task>,
}

impl ProjectOverview {
    pub fn completed_count(&self) -> usize {
        self.todos
            .iter()
            .filter(|todo| todo.status == TaskStatus::Completed)
            .count()
    }
}

/// Decode a packed date column: `year << 16 | month << 12 | day << 7`.
pub fn decode_packed_date(value: i64) -> Option<NaiveDate> {
    if value <= 0 {
        return None;
    }
    let year = i32::try_from((value >> 16) & 0x7FF).ok()?;
    let month = u32::try_from((value >> 12) & 0xF).ok()?;
    let day = u32::try_from((value >> 7) & 0x1F).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Inverse of [`decode_packed_date`].
pub fn encode_packed_date(date: NaiveDate) -> i64 {
    (i64::from(date.year()) << 16) | (i64::from(date.month()) << 12) | (i64::from(date.day()) << 7)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn packed_dates_round_trip() {
        let date = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let packed = encode_packed_date(date);
        assert_eq!(packed, 132_697_984);
        assert_eq!(decode_packed_date(packed), Some(date));
    }

    #[test]
    fn packed_date_rejects_empty_and_invalid_values() {
        assert_eq!(decode_packed_date(0), None);
        assert_eq!(decode_packed_date(-5), None);
        // month 13
        assert_eq!(decode_packed_date((2024 << 16) | (13 << 12) | (1 << 7)), None);
    }

    #[test]
    fn status_mapping_matches_database_codes() {
        assert_eq!(TaskStatus::from_db(0), TaskStatus::Incomplete);
        assert_eq!(TaskStatus::from_db(2), TaskStatus::Canceled);
        assert_eq!(TaskStatus::from_db(3), TaskStatus::Completed);
        assert_eq!(TaskStatus::Completed.to_db(), 3);
    }

    #[test]
    fn task_serializes_with_lowercase_enums() {
        let task = Task::new("abc", "Write report");
        let json = serde_json::to_value(&task).unwrap();
        assert_eq!(json["status"], "incomplete");
        assert_eq!(json["type"], "to-do");
        assert_eq!(json["start"], "anytime");
    }
}
