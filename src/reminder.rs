//! Due-soon reminders.
//!
//! A task is due soon when it is incomplete and the end of its due date lies
//! within `[now, end of tomorrow]`. Each task is reminded at most once: the
//! `reminded` flag latches and is never cleared, not even by a due-date edit.

use std::future::Future;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use tokio::time::MissedTickBehavior;

use crate::core::task::Task;
use crate::notify::{Notifier, Permission};
use crate::planner::Planner;

pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(60);
pub const REMINDER_TITLE: &str = "Study Reminder";

fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_milli_opt(23, 59, 59, 999)
        .unwrap_or_else(|| date.and_time(NaiveTime::MIN))
}

/// Upper bound of the reminder window: tomorrow at 23:59:59.999.
pub fn end_of_tomorrow(now: NaiveDateTime) -> NaiveDateTime {
    let today = now.date();
    end_of_day(today.succ_opt().unwrap_or(today))
}

pub fn is_due_soon(task: &Task, now: NaiveDateTime) -> bool {
    if task.completed {
        return false;
    }
    match task.due() {
        Some(due) => {
            let due = end_of_day(due);
            due >= now && due <= end_of_tomorrow(now)
        }
        None => false,
    }
}

pub fn reminder_body(task: &Task) -> String {
    format!("{} is due soon! Subject: {}", task.title, task.subject)
}

/// Periodic reminder sweep over a [`Planner`].
pub struct ReminderScheduler<N: Notifier> {
    notifier: N,
    period: Duration,
    sweeps: u64,
}

impl<N: Notifier> ReminderScheduler<N> {
    pub fn new(notifier: N) -> Self {
        Self::with_period(notifier, DEFAULT_INTERVAL)
    }

    pub fn with_period(notifier: N, period: Duration) -> Self {
        Self {
            notifier,
            period: period.max(Duration::from_secs(1)),
            sweeps: 0,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn notifier(&self) -> &N {
        &self.notifier
    }

    pub fn sweeps(&self) -> u64 {
        self.sweeps
    }

    /// Ask for notification permission up front if nobody has yet.
    pub fn prepare(&mut self) {
        if self.notifier.permission() == Permission::Default {
            let permission = self.notifier.request_permission();
            log::info!("Notification permission: {:?}", permission);
        }
    }

    /// Flag every due-soon task that has not been reminded and notify once
    /// for each. Returns how many tasks were newly reminded.
    pub fn sweep(&mut self, planner: &mut Planner) -> usize {
        self.sweeps += 1;
        let now = planner.clock().now();

        let mut pending = Vec::new();
        for task in planner.tasks_mut() {
            if !task.reminded && is_due_soon(task, now) {
                task.reminded = true;
                pending.push(reminder_body(task));
            }
        }

        if pending.is_empty() {
            return 0;
        }
        planner.save_tasks();
        log::info!("Reminding about {} task(s)", pending.len());
        for body in &pending {
            self.deliver(body);
        }
        pending.len()
    }

    fn deliver(&mut self, body: &str) {
        let permission = match self.notifier.permission() {
            Permission::Default => self.notifier.request_permission(),
            other => other,
        };
        match permission {
            Permission::Granted => self.notifier.notify(REMINDER_TITLE, body),
            Permission::Denied | Permission::Default => {
                log::debug!("Notifications not permitted; skipping reminder");
            }
        }
    }

    /// Sweep now and then once per period until `shutdown` resolves.
    pub async fn run<F>(&mut self, planner: &mut Planner, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.prepare();
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        log::info!("Reminder scheduler started, every {:?}", self.period);
        loop {
            tokio::select! {
                _ = &mut shutdown => break,
                _ = ticker.tick() => {
                    self.sweep(planner);
                }
            }
        }
        log::info!("Reminder scheduler stopped after {} sweeps", self.sweeps);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::clock::ManualClock;
    use crate::core::task::TaskFields;
    use crate::notify::RecordingNotifier;
    use crate::storage::{MemoryStore, TASKS_KEY};
    use std::rc::Rc;

    fn at(y: i32, m: u32, d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, 0, 0)
            .unwrap()
    }

    fn setup(now: NaiveDateTime) -> (Planner, Rc<ManualClock>, MemoryStore) {
        let store = MemoryStore::new();
        let clock = Rc::new(ManualClock::new(now));
        let planner = Planner::with_clock(Box::new(store.clone()), Box::new(clock.clone()));
        (planner, clock, store)
    }

    #[test]
    fn window_covers_today_and_tomorrow() {
        let now = at(2026, 3, 10, 15);
        let task = |due: &str| {
            let (mut planner, _, _) = setup(now);
            planner.add_task(TaskFields::new("t", "s", due))
        };
        assert!(is_due_soon(&task("2026-03-10"), now));
        assert!(is_due_soon(&task("2026-03-11"), now));
        assert!(!is_due_soon(&task("2026-03-12"), now));
        assert!(!is_due_soon(&task("2026-03-09"), now));
        assert!(!is_due_soon(&task("whenever"), now));
        assert_eq!(
            end_of_tomorrow(now),
            NaiveDate::from_ymd_opt(2026, 3, 11)
                .unwrap()
                .and_hms_milli_opt(23, 59, 59, 999)
                .unwrap()
        );
    }

    #[test]
    fn two_sweeps_notify_once() {
        let (mut planner, _, store) = setup(at(2026, 3, 10, 9));
        let task = planner.add_task(TaskFields::new("Read Ch.3", "Bio", "2026-03-11"));
        let mut scheduler = ReminderScheduler::new(RecordingNotifier::granted());

        assert_eq!(scheduler.sweep(&mut planner), 1);
        assert_eq!(scheduler.sweep(&mut planner), 0);

        let sent = &scheduler.notifier().sent;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].0, REMINDER_TITLE);
        assert_eq!(sent[0].1, "Read Ch.3 is due soon! Subject: Bio");
        assert!(planner.get_task(task.id).unwrap().reminded);

        let stored = store.raw(TASKS_KEY).unwrap();
        assert!(stored.contains("\"reminded\": true"));
    }

    #[test]
    fn completed_tasks_are_skipped() {
        let (mut planner, _, _) = setup(at(2026, 3, 10, 9));
        let task = planner.add_task(TaskFields::new("Quiz", "Math", "2026-03-10"));
        planner.toggle_complete(task.id).unwrap();
        let mut scheduler = ReminderScheduler::new(RecordingNotifier::granted());
        assert_eq!(scheduler.sweep(&mut planner), 0);
        assert!(!planner.get_task(task.id).unwrap().reminded);
    }

    #[test]
    fn task_enters_window_as_time_passes() {
        let (mut planner, clock, _) = setup(at(2026, 3, 10, 9));
        planner.add_task(TaskFields::new("Essay", "History", "2026-03-13"));
        let mut scheduler = ReminderScheduler::new(RecordingNotifier::granted());

        assert_eq!(scheduler.sweep(&mut planner), 0);
        clock.advance(chrono::Duration::days(2));
        assert_eq!(scheduler.sweep(&mut planner), 1);
        clock.advance(chrono::Duration::days(1));
        assert_eq!(scheduler.sweep(&mut planner), 0);
        assert_eq!(scheduler.notifier().sent.len(), 1);
    }

    #[test]
    fn editing_due_date_keeps_the_latch() {
        let (mut planner, clock, _) = setup(at(2026, 3, 10, 9));
        let task = planner.add_task(TaskFields::new("Essay", "History", "2026-03-11"));
        let mut scheduler = ReminderScheduler::new(RecordingNotifier::granted());
        assert_eq!(scheduler.sweep(&mut planner), 1);

        planner
            .update_task(task.id, TaskFields::new("Essay", "History", "2026-03-20"))
            .unwrap();
        clock.set(at(2026, 3, 19, 9));
        assert_eq!(scheduler.sweep(&mut planner), 0);
        assert!(planner.get_task(task.id).unwrap().reminded);
    }

    #[test]
    fn undetermined_permission_is_requested_first() {
        let (mut planner, _, _) = setup(at(2026, 3, 10, 9));
        planner.add_task(TaskFields::new("Lab", "Chem", "2026-03-10"));
        let mut scheduler = ReminderScheduler::new(RecordingNotifier {
            grant_on_request: true,
            ..RecordingNotifier::default()
        });
        assert_eq!(scheduler.sweep(&mut planner), 1);
        assert_eq!(scheduler.notifier().requests, 1);
        assert_eq!(scheduler.notifier().sent.len(), 1);
    }

    #[test]
    fn denied_permission_skips_but_still_latches() {
        let (mut planner, _, _) = setup(at(2026, 3, 10, 9));
        let task = planner.add_task(TaskFields::new("Lab", "Chem", "2026-03-10"));
        let mut scheduler = ReminderScheduler::new(RecordingNotifier {
            permission: Permission::Denied,
            ..RecordingNotifier::default()
        });
        assert_eq!(scheduler.sweep(&mut planner), 1);
        assert_eq!(scheduler.notifier().requests, 0);
        assert!(scheduler.notifier().sent.is_empty());
        assert!(planner.get_task(task.id).unwrap().reminded);
    }

    #[test]
    fn prepare_requests_only_when_undetermined() {
        let mut scheduler = ReminderScheduler::new(RecordingNotifier::granted());
        scheduler.prepare();
        assert_eq!(scheduler.notifier().requests, 0);

        let mut scheduler = ReminderScheduler::new(RecordingNotifier::default());
        scheduler.prepare();
        assert_eq!(scheduler.notifier().requests, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn run_sweeps_at_startup_and_every_period() {
        let (mut planner, _, _) = setup(at(2026, 3, 10, 9));
        planner.add_task(TaskFields::new("Read Ch.3", "Bio", "2026-03-11"));
        let mut scheduler = ReminderScheduler::new(RecordingNotifier::granted());

        scheduler
            .run(&mut planner, tokio::time::sleep(Duration::from_secs(150)))
            .await;

        assert_eq!(scheduler.sweeps(), 3);
        assert_eq!(scheduler.notifier().sent.len(), 1);
    }
}
