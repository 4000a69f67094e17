// Data models for TaskBoard

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// A single to-do item
///
/// Field names on the wire are camelCase (`dueDate`, `createdAt`) so a blob
/// written by the browser board loads unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub priority: Priority,
    #[serde(default, with = "due_date")]
    pub due_date: Option<NaiveDate>,
    #[serde(default)]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Priority::Low => write!(f, "low"),
            Priority::Medium => write!(f, "medium"),
            Priority::High => write!(f, "high"),
        }
    }
}

impl FromStr for Priority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Priority::Low),
            "medium" => Ok(Priority::Medium),
            "high" => Ok(Priority::High),
            other => Err(format!("unknown priority: {} (expected low, medium or high)", other)),
        }
    }
}

/// Input for `TaskStore::add`, as submitted by a form or the CLI
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub priority: Priority,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn priority(mut self, priority: Priority) -> Self {
        self.priority = priority;
        self
    }

    pub fn due(mut self, due_date: NaiveDate) -> Self {
        self.due_date = Some(due_date);
        self
    }
}

/// `dueDate` is written as `""` when absent; `""`, `null` and a missing field all read back as `None`
mod due_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de::Error};

    const FORMAT: &str = "%Y-%m-%d";

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, serializer: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => serializer.serialize_str(&date.format(FORMAT).to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<String> = Option::deserialize(deserializer)?;
        match raw.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(s) => NaiveDate::parse_from_str(s, FORMAT)
                .map(Some)
                .map_err(|e| D::Error::custom(format!("invalid dueDate {:?}: {}", s, e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Task {
        Task {
            id: "0190a1b2-c3d4-7e5f-8a9b-0c1d2e3f4a5b".to_string(),
            title: "Buy milk".to_string(),
            description: String::new(),
            priority: Priority::Low,
            due_date: None,
            completed: false,
            created_at: DateTime::parse_from_rfc3339("2025-01-05T10:00:00Z")
                .unwrap()
                .with_timezone(&Utc),
        }
    }

    #[test]
    fn test_priority_serialization() {
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"high\"");
        assert_eq!(serde_json::to_string(&Priority::Low).unwrap(), "\"low\"");
    }

    #[test]
    fn test_priority_from_str() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!(" medium ".parse::<Priority>().unwrap(), Priority::Medium);
        assert!("urgent".parse::<Priority>().is_err());
    }

    #[test]
    fn test_task_field_names() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("\"dueDate\":\"\""));
        assert!(json.contains("\"createdAt\":"));
        assert!(json.contains("\"completed\":false"));
        assert!(json.contains("\"priority\":\"low\""));
    }

    #[test]
    fn test_due_date_lenient_decoding() {
        let base = r#"{"id":"a","title":"t","priority":"high","createdAt":"2025-01-05T10:00:00Z""#;

        let missing: Task = serde_json::from_str(&format!("{}}}", base)).unwrap();
        assert_eq!(missing.due_date, None);
        assert_eq!(missing.description, "");
        assert!(!missing.completed);

        let null: Task = serde_json::from_str(&format!("{},\"dueDate\":null}}", base)).unwrap();
        assert_eq!(null.due_date, None);

        let set: Task = serde_json::from_str(&format!("{},\"dueDate\":\"2025-03-01\"}}", base)).unwrap();
        assert_eq!(set.due_date, NaiveDate::from_ymd_opt(2025, 3, 1));

        assert!(serde_json::from_str::<Task>(&format!("{},\"dueDate\":\"soon\"}}", base)).is_err());
    }

    #[test]
    fn test_new_task_builder() {
        let input = NewTask::new("Pay bills")
            .description("electricity")
            .priority(Priority::High)
            .due(NaiveDate::from_ymd_opt(2025, 2, 1).unwrap());
        assert_eq!(input.title, "Pay bills");
        assert_eq!(input.description, "electricity");
        assert_eq!(input.priority, Priority::High);
        assert!(input.due_date.is_some());
    }
}
