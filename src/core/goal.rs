use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{stored, validate};

/// A numeric study goal, e.g. "solve 40 practice problems".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Goal {
    #[serde(deserialize_with = "stored::id")]
    pub id: Uuid,
    pub title: String,
    #[serde(
        default,
        deserialize_with = "stored::optional_text",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default = "one", deserialize_with = "stored::target")]
    pub target: u32,
    #[serde(default, deserialize_with = "stored::current")]
    pub current: u32,
    #[serde(default, deserialize_with = "stored::optional_date")]
    pub deadline: Option<NaiveDate>,
    #[serde(deserialize_with = "stored::timestamp")]
    pub created_at: NaiveDateTime,
}

fn one() -> u32 {
    1
}

impl Goal {
    pub(crate) fn new(fields: GoalFields, created_at: NaiveDateTime) -> Self {
        let mut goal = Self {
            id: Uuid::new_v4(),
            title: String::new(),
            description: None,
            target: 1,
            current: 0,
            deadline: None,
            created_at,
        };
        goal.apply(fields);
        goal
    }

    pub(crate) fn apply(&mut self, fields: GoalFields) {
        self.title = validate::title(fields.title);
        self.description = validate::optional_text(fields.description);
        self.target = validate::target(fields.target);
        self.current = validate::current(fields.current, self.target);
        self.deadline = fields.deadline;
    }

    pub(crate) fn set_current(&mut self, current: i64) {
        self.current = validate::current(current, self.target);
    }

    // Records loaded from storage may predate the clamping rules.
    pub(crate) fn normalize(&mut self) {
        self.target = self.target.max(1);
        self.current = self.current.min(self.target);
    }

    pub fn progress_percent(&self) -> u32 {
        progress_percent(self.current, self.target)
    }

    pub fn is_complete(&self) -> bool {
        self.current >= self.target
    }
}

/// `round(current / target * 100)`, capped at 100. A zero target reads as 0%.
pub fn progress_percent(current: u32, target: u32) -> u32 {
    if target == 0 {
        return 0;
    }
    let pct = (f64::from(current) / f64::from(target) * 100.0).round();
    (pct as u32).min(100)
}

/// Editable goal fields as received from a front end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GoalFields {
    pub title: String,
    pub description: Option<String>,
    pub target: i64,
    pub current: i64,
    pub deadline: Option<NaiveDate>,
}

impl GoalFields {
    pub fn new(title: impl Into<String>, target: i64) -> Self {
        Self {
            title: title.into(),
            description: None,
            target,
            current: 0,
            deadline: None,
        }
    }

    /// Build fields from free-text form values, coercing as the model requires.
    pub fn from_input(
        title: impl Into<String>,
        target: &str,
        current: &str,
        deadline: &str,
        description: Option<String>,
    ) -> Self {
        let target = validate::target_from_input(target);
        Self {
            title: title.into(),
            description,
            target: i64::from(target),
            current: i64::from(validate::current_from_input(current, target)),
            deadline: validate::date(deadline),
        }
    }

    pub fn with_current(mut self, current: i64) -> Self {
        self.current = current;
        self
    }

    pub fn with_deadline(mut self, deadline: NaiveDate) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn created() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 2, 23)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap()
    }

    #[test]
    fn percent_examples() {
        assert_eq!(progress_percent(5, 20), 25);
        assert_eq!(progress_percent(25, 20), 100);
        assert_eq!(progress_percent(0, 0), 0);
        assert_eq!(progress_percent(1, 3), 33);
        assert_eq!(progress_percent(2, 3), 67);
    }

    #[test]
    fn negative_target_and_excess_current_are_clamped() {
        let goal = Goal::new(GoalFields::new("Flashcards", -5).with_current(10), created());
        assert_eq!(goal.target, 1);
        assert_eq!(goal.current, 1);
        assert!(goal.is_complete());
    }

    #[test]
    fn form_input_is_coerced() {
        let fields = GoalFields::from_input("Practice sets", "ten", "4", "not a date", None);
        assert_eq!(fields.target, 1);
        assert_eq!(fields.current, 1);
        assert_eq!(fields.deadline, None);

        let fields = GoalFields::from_input("Practice sets", "10", "-2", "2026-05-01", None);
        assert_eq!(fields.target, 10);
        assert_eq!(fields.current, 0);
        assert_eq!(fields.deadline, NaiveDate::from_ymd_opt(2026, 5, 1));
    }

    #[test]
    fn stored_counts_and_blank_deadline_are_tolerated() {
        let json = r#"{
            "id": "550e8400-e29b-41d4-a716-446655440000",
            "title": "Problem sets",
            "target": "12",
            "current": -3,
            "deadline": "",
            "createdAt": "2026-02-23T08:30:00"
        }"#;
        let goal: Goal = serde_json::from_str(json).unwrap();
        assert_eq!((goal.current, goal.target), (0, 12));
        assert_eq!(goal.deadline, None);
        assert_eq!(goal.created_at, created());
    }

    #[test]
    fn blank_title_becomes_untitled() {
        let goal = Goal::new(GoalFields::new("  ", 4), created());
        assert_eq!(goal.title, validate::UNTITLED);
    }

    #[test]
    fn normalize_repairs_stored_records() {
        let mut goal = Goal::new(GoalFields::new("Essays", 4), created());
        goal.target = 0;
        goal.current = 7;
        goal.normalize();
        assert_eq!((goal.current, goal.target), (1, 1));
    }
}
