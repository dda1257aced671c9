use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use super::{stored, validate};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Priority {
    Low,
    #[default]
    Medium,
    High,
}

impl Priority {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Sort rank: high=3, medium=2, low=1.
    pub fn rank(&self) -> u8 {
        match self {
            Self::Low => 1,
            Self::Medium => 2,
            Self::High => 3,
        }
    }
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_keyword())
    }
}

impl Serialize for Priority {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_keyword())
    }
}

// Stored records pass through the same coercion as form input.
impl<'de> Deserialize<'de> for Priority {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.map(|s| validate::priority(&s)).unwrap_or_default())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    #[serde(deserialize_with = "stored::id")]
    pub id: Uuid,
    pub title: String,
    pub subject: String,
    #[serde(
        default,
        deserialize_with = "stored::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    /// Calendar date as entered (`YYYY-MM-DD`). Kept verbatim so a bad value
    /// survives a load/save cycle; see [`Task::due`].
    pub due_date: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub completed: bool,
    #[serde(deserialize_with = "stored::timestamp")]
    pub created_at: NaiveDateTime,
    #[serde(default)]
    pub reminded: bool,
}

impl Task {
    pub(crate) fn new(fields: TaskFields, created_at: NaiveDateTime) -> Self {
        let mut task = Self {
            id: Uuid::new_v4(),
            title: String::new(),
            subject: String::new(),
            description: None,
            due_date: String::new(),
            priority: Priority::Medium,
            completed: false,
            created_at,
            reminded: false,
        };
        task.apply(fields);
        task
    }

    /// Replace every editable field. Identity, status and timestamps stay.
    pub(crate) fn apply(&mut self, fields: TaskFields) {
        self.title = validate::title(fields.title);
        self.subject = fields.subject;
        self.description = validate::optional_text(fields.description);
        self.due_date = fields.due_date.trim().to_string();
        self.priority = validate::priority(&fields.priority);
    }

    /// Parsed due date, `None` when the stored string is not a valid date.
    pub fn due(&self) -> Option<NaiveDate> {
        validate::date(&self.due_date)
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.completed && self.due().is_some_and(|due| due < today)
    }
}

/// Editable task fields as received from a front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskFields {
    pub title: String,
    pub subject: String,
    pub description: Option<String>,
    pub due_date: String,
    /// Raw priority keyword; anything unrecognized is stored as medium.
    pub priority: String,
}

impl TaskFields {
    pub fn new(
        title: impl Into<String>,
        subject: impl Into<String>,
        due_date: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            subject: subject.into(),
            description: None,
            due_date: due_date.into(),
            priority: String::new(),
        }
    }

    pub fn with_priority(mut self, priority: impl Into<String>) -> Self {
        self.priority = priority.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}
