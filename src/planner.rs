//! The planner context: both stores, their persistence, and the clock.
//!
//! Every mutating call writes the touched collection back in full. Writes are
//! best-effort: a storage failure leaves the in-memory change in place, is
//! logged, and stays visible through [`Planner::last_storage_error`] until the
//! next successful write. A collection whose stored copy could be neither
//! read nor backed up at load time is never written, so a session started
//! on unreadable data cannot destroy it.

use serde::de::DeserializeOwned;
use uuid::Uuid;

use crate::core::clock::{Clock, SystemClock};
use crate::core::goal::{Goal, GoalFields};
use crate::core::goal_store::GoalStore;
use crate::core::task::{Task, TaskFields};
use crate::core::task_store::{SortKey, SubjectFilter, TaskStore};
use crate::core::timeline::DateGroup;
use crate::error::{StorageError, StoreError};
use crate::storage::{self, GOALS_KEY, KeyValueStore, TASKS_KEY};

pub struct Planner {
    tasks: TaskStore,
    goals: GoalStore,
    storage: Box<dyn KeyValueStore>,
    clock: Box<dyn Clock>,
    last_storage_error: Option<StorageError>,
    protected: Vec<&'static str>,
}

impl Planner {
    /// Load both collections from `storage`, using the local wall clock.
    pub fn load(storage: Box<dyn KeyValueStore>) -> Self {
        Self::with_clock(storage, Box::new(SystemClock))
    }

    pub fn with_clock(mut storage: Box<dyn KeyValueStore>, clock: Box<dyn Clock>) -> Self {
        let mut protected = Vec::new();
        let tasks = TaskStore::from_tasks(load_or_protect(
            storage.as_mut(),
            TASKS_KEY,
            &mut protected,
        ));
        let goals = GoalStore::from_goals(load_or_protect(
            storage.as_mut(),
            GOALS_KEY,
            &mut protected,
        ));
        log::info!("Loaded {} tasks and {} goals", tasks.len(), goals.len());
        Self {
            tasks,
            goals,
            storage,
            clock,
            last_storage_error: None,
            protected,
        }
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    pub fn last_storage_error(&self) -> Option<&StorageError> {
        self.last_storage_error.as_ref()
    }

    // --- Tasks ---

    pub fn tasks(&self) -> &[Task] {
        self.tasks.tasks()
    }

    pub fn get_task(&self, id: Uuid) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn add_task(&mut self, fields: TaskFields) -> Task {
        let now = self.clock.now();
        let task = self.tasks.add(fields, now).clone();
        self.save_tasks();
        task
    }

    pub fn update_task(&mut self, id: Uuid, fields: TaskFields) -> Result<Task, StoreError> {
        let task = self.tasks.update(id, fields)?.clone();
        self.save_tasks();
        Ok(task)
    }

    pub fn delete_task(&mut self, id: Uuid) -> bool {
        let removed = self.tasks.delete(id);
        self.save_tasks();
        removed
    }

    pub fn toggle_complete(&mut self, id: Uuid) -> Result<bool, StoreError> {
        let completed = self.tasks.toggle_complete(id)?;
        self.save_tasks();
        Ok(completed)
    }

    pub fn list_filtered(&self, filter: &SubjectFilter, sort: SortKey) -> Vec<&Task> {
        self.tasks.list_filtered(filter, sort)
    }

    pub fn upcoming_grouped(&self) -> Vec<DateGroup<'_>> {
        self.tasks.upcoming_grouped()
    }

    pub fn distinct_subjects(&self) -> Vec<&str> {
        self.tasks.distinct_subjects()
    }

    pub(crate) fn tasks_mut(&mut self) -> &mut [Task] {
        self.tasks.tasks_mut()
    }

    // --- Goals ---

    pub fn goals(&self) -> &[Goal] {
        self.goals.goals()
    }

    pub fn get_goal(&self, id: Uuid) -> Option<&Goal> {
        self.goals.get(id)
    }

    pub fn add_goal(&mut self, fields: GoalFields) -> Goal {
        let now = self.clock.now();
        let goal = self.goals.add(fields, now).clone();
        self.save_goals();
        goal
    }

    pub fn update_goal(&mut self, id: Uuid, fields: GoalFields) -> Result<Goal, StoreError> {
        let goal = self.goals.update(id, fields)?.clone();
        self.save_goals();
        Ok(goal)
    }

    pub fn delete_goal(&mut self, id: Uuid) -> bool {
        let removed = self.goals.delete(id);
        self.save_goals();
        removed
    }

    pub fn set_progress(&mut self, id: Uuid, current: i64) -> Result<Goal, StoreError> {
        let goal = self.goals.set_progress(id, current)?.clone();
        self.save_goals();
        Ok(goal)
    }

    // --- Persistence ---

    pub(crate) fn save_tasks(&mut self) {
        let result = if self.protected.contains(&TASKS_KEY) {
            Err(StorageError::Protected {
                key: TASKS_KEY.to_string(),
            })
        } else {
            storage::save(self.storage.as_mut(), TASKS_KEY, self.tasks.tasks())
        };
        self.record(TASKS_KEY, result);
    }

    fn save_goals(&mut self) {
        let result = if self.protected.contains(&GOALS_KEY) {
            Err(StorageError::Protected {
                key: GOALS_KEY.to_string(),
            })
        } else {
            storage::save(self.storage.as_mut(), GOALS_KEY, self.goals.goals())
        };
        self.record(GOALS_KEY, result);
    }

    fn record(&mut self, key: &str, result: Result<(), StorageError>) {
        match result {
            Ok(()) => self.last_storage_error = None,
            Err(e) => {
                log::error!("Failed to save {}: {}", key, e);
                self.last_storage_error = Some(e);
            }
        }
    }
}

fn load_or_protect<T: DeserializeOwned>(
    storage: &mut dyn KeyValueStore,
    key: &'static str,
    protected: &mut Vec<&'static str>,
) -> Vec<T> {
    storage::load(storage, key).unwrap_or_else(|e| {
        log::error!("Failed to load {}, leaving it untouched: {}", key, e);
        protected.push(key);
        Vec::new()
    })
}
