use std::collections::HashSet;

use chrono::NaiveDateTime;
use uuid::Uuid;

use super::goal::{Goal, GoalFields};
use crate::error::StoreError;

/// The goal collection, kept in insertion order.
///
/// Every write path clamps `current` into `[0, target]` with `target >= 1`.
#[derive(Debug, Clone, Default)]
pub struct GoalStore {
    goals: Vec<Goal>,
}

impl GoalStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adopt previously stored goals, repairing out-of-range progress.
    pub fn from_goals(goals: Vec<Goal>) -> Self {
        let mut seen = HashSet::new();
        let mut kept = Vec::with_capacity(goals.len());
        for mut goal in goals {
            if !seen.insert(goal.id) {
                log::warn!("Dropping stored goal with duplicate id {}", goal.id);
                continue;
            }
            goal.normalize();
            kept.push(goal);
        }
        Self { goals: kept }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn len(&self) -> usize {
        self.goals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.goals.is_empty()
    }

    pub fn get(&self, id: Uuid) -> Option<&Goal> {
        self.goals.iter().find(|g| g.id == id)
    }

    fn get_mut(&mut self, id: Uuid) -> Result<&mut Goal, StoreError> {
        self.goals
            .iter_mut()
            .find(|g| g.id == id)
            .ok_or(StoreError::GoalNotFound(id))
    }

    pub fn add(&mut self, fields: GoalFields, now: NaiveDateTime) -> &Goal {
        let goal = Goal::new(fields, now);
        log::debug!("Adding goal {} ({}/{})", goal.id, goal.current, goal.target);
        self.goals.push(goal);
        &self.goals[self.goals.len() - 1]
    }

    pub fn update(&mut self, id: Uuid, fields: GoalFields) -> Result<&Goal, StoreError> {
        let goal = self.get_mut(id)?;
        goal.apply(fields);
        Ok(goal)
    }

    pub fn delete(&mut self, id: Uuid) -> bool {
        let before = self.goals.len();
        self.goals.retain(|g| g.id != id);
        self.goals.len() != before
    }

    pub fn set_progress(&mut self, id: Uuid, current: i64) -> Result<&Goal, StoreError> {
        let goal = self.get_mut(id)?;
        goal.set_current(current);
        Ok(goal)
    }
}
