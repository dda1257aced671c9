use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::task::{Task, TaskFields};
use super::timeline::{self, DateGroup};
use crate::error::StoreError;

/// Sentinel subject filter value that disables filtering.
pub const ALL_SUBJECTS: &str = "all";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SubjectFilter {
    #[default]
    All,
    Only(String),
}

impl SubjectFilter {
    pub fn from_keyword(s: &str) -> Self {
        if s == ALL_SUBJECTS {
            Self::All
        } else {
            Self::Only(s.to_string())
        }
    }

    pub fn matches(&self, task: &Task) -> bool {
        match self {
            Self::All => true,
            Self::Only(subject) => task.subject == *subject,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    #[default]
    Date,
    Priority,
    Subject,
}

impl SortKey {
    pub fn as_keyword(&self) -> &'static str {
        match self {
            Self::Date => "date",
            Self::Priority => "priority",
            Self::Subject => "subject",
        }
    }

    pub fn from_keyword(s: &str) -> Option<Self> {
        match s {
            "date" => Some(Self::Date),
            "priority" => Some(Self::Priority),
            "subject" => Some(Self::Subject),
            _ => None,
        }
    }
}

/// The task collection, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct TaskStore {
    tasks: Vec<Task>,
}

impl TaskStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt previously stored tasks. Later duplicates of an id are dropped.
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(tasks.len());
        for task in tasks {
            if seen.insert(task.id) {
                kept.push(task);
            } else {
                log::warn!("Dropping stored task with duplicate id {}", task.id);
            }
        }
        Self { tasks: kept }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        &mut self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Task, StoreError> {
        self.tasks
            .iter_mut()
            .find(|t| t.id == id)
            .ok_or(StoreError::TaskNotFound(id))
    }

    pub fn add(&mut self, fields: TaskFields, now: NaiveDateTime) -> &Task {
        let task = Task::new(fields, now);
        log::debug!("Adding task {} ({})", task.id, task.subject);
        self.tasks.push(task);
        &self.tasks[self.tasks.len() - 1]
    }

    /// Replace the editable fields of an existing task.
    pub fn update(&mut self, id: Uuid, fields: TaskFields) -> Result<&Task, StoreError> {
        let task = self.get_mut(id)?;
        task.apply(fields);
        Ok(task)
    }

    /// Returns whether a task was removed. A missing id is not an error.
    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|t| t.id != id);
        self.tasks.len() != before
    }

    /// Flip the completed flag and return its new value.
    pub fn toggle_complete(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let task = self.get_mut(id)?;
        task.completed = !task.completed;
        Ok(task.completed)
    }

    pub fn list_filtered(&self, filter: &SubjectFilter, sort: SortKey) -> Vec<&Task> {
        let mut tasks: Vec<&Task> = self.tasks.iter().filter(|t| filter.matches(t)).collect();
        match sort {
            SortKey::Date => sort_by_due(&mut tasks),
            SortKey::Priority => tasks.sort_by_key(|t| std::cmp::Reverse(t.priority.rank())),
            SortKey::Subject => tasks.sort_by(|a, b| compare_subjects(&a.subject, &b.subject)),
        }
        tasks
    }

    /// Incomplete tasks grouped by due date, earliest first.
    pub fn upcoming_grouped(&self) -> Vec<DateGroup<'_>> {
        timeline::upcoming(&self.tasks)
    }

    pub fn distinct_subjects(&self) -> Vec<&str> {
        self.tasks
            .iter()
            .map(|t| t.subject.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

/// Stable sort by due date. Unparsable dates go last, in insertion order.
pub(crate) fn sort_by_due(tasks: &mut [&Task]) {
    tasks.sort_by_key(|t| {
        let due = t.due();
        (due.is_none(), due)
    });
}

// Approximates a locale collation: letters compare case-insensitively first.
fn compare_subjects(a: &str, b: &str) -> Ordering {
    a.to_lowercase()
        .cmp(&b.to_lowercase())
        .then_with(|| a.cmp(b))
}
