use super::task::Task;
use super::task_store::sort_by_due;

/// Incomplete tasks sharing one due date.
#[derive(Debug, Clone, PartialEq)]
pub struct DateGroup<'a> {
    pub due_date: &'a str,
    pub tasks: Vec<&'a Task>,
}

/// Build the upcoming-deadline timeline.
///
/// Completed tasks are skipped. Groups follow due-date order with tasks that
/// have unparsable dates at the end; within a group tasks keep insertion order.
pub fn upcoming(tasks: &[Task]) -> Vec<DateGroup<'_>> {
    let mut pending: Vec<&Task> = tasks.iter().filter(|t| !t.completed).collect();
    sort_by_due(&mut pending);

    let mut groups: Vec<DateGroup<'_>> = Vec::new();
    for task in pending {
        match groups.iter_mut().find(|g| g.due_date == task.due_date) {
            Some(group) => group.tasks.push(task),
            None => groups.push(DateGroup {
                due_date: &task.due_date,
                tasks: vec![task],
            }),
        }
    }
    groups
}

pub fn total_count(groups: &[DateGroup<'_>]) -> usize {
    groups.iter().map(|g| g.tasks.len()).sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::task::TaskFields;
    use crate::core::task_store::TaskStore;
    use chrono::NaiveDate;

    fn store() -> TaskStore {
        let now = NaiveDate::from_ymd_opt(2026, 2, 23)
            .unwrap()
            .and_hms_opt(9, 0, 0)
            .unwrap();
        let mut store = TaskStore::new();
        for (title, due) in [
            ("quiz", "2026-03-02"),
            ("essay", "2026-03-01"),
            ("lab", "2026-03-02"),
            ("reading", "2026-03-01"),
            ("done already", "2026-02-28"),
            ("mystery", "tbd"),
        ] {
            store.add(TaskFields::new(title, "Bio", due), now);
        }
        let done = store.tasks()[4].id;
        store.toggle_complete(done).unwrap();
        store
    }

    #[test]
    fn groups_by_date_in_order() {
        let store = store();
        let groups = store.upcoming_grouped();
        let keys: Vec<&str> = groups.iter().map(|g| g.due_date).collect();
        assert_eq!(keys, vec!["2026-03-01", "2026-03-02", "tbd"]);

        let first: Vec<&str> = groups[0].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(first, vec!["essay", "reading"]);
        let second: Vec<&str> = groups[1].tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(second, vec!["quiz", "lab"]);
    }

    #[test]
    fn excludes_completed_and_never_yields_empty_groups() {
        let store = store();
        let groups = store.upcoming_grouped();
        assert!(groups.iter().all(|g| !g.tasks.is_empty()));
        assert!(groups.iter().flat_map(|g| &g.tasks).all(|t| !t.completed));
        assert_eq!(total_count(&groups), 5);
    }

    #[test]
    fn empty_when_everything_is_done() {
        let mut store = store();
        let ids: Vec<_> = store
            .tasks()
            .iter()
            .filter(|t| !t.completed)
            .map(|t| t.id)
            .collect();
        for id in ids {
            store.toggle_complete(id).unwrap();
        }
        assert!(store.upcoming_grouped().is_empty());
    }
}
