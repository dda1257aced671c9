mod commands;

use studyplan::Planner;
use studyplan::config::StudyConfig;
use studyplan::notify::{DesktopNotifier, LogNotifier, Notifier};
use studyplan::reminder::ReminderScheduler;
use studyplan::storage::JsonFileStore;

use commands::Command;

// Journal logging (`journalctl --user -t studyplan -f`).
// Wrapper filters: studyplan at info/debug (per config), everything else at warn.
fn init_logging(debug: bool) {
    use log::Log;

    struct FilteredJournal {
        inner: systemd_journal_logger::JournalLog,
    }

    impl Log for FilteredJournal {
        fn enabled(&self, metadata: &log::Metadata) -> bool {
            if metadata.target().starts_with("studyplan") {
                let max = if studyplan::debug_logging() {
                    log::LevelFilter::Debug
                } else {
                    log::LevelFilter::Info
                };
                metadata.level() <= max
            } else {
                metadata.level() <= log::LevelFilter::Warn
            }
        }
        fn log(&self, record: &log::Record) {
            if self.enabled(record.metadata()) {
                self.inner.log(record);
            }
        }
        fn flush(&self) {
            self.inner.flush();
        }
    }

    studyplan::set_debug_logging(debug);

    let journal = match systemd_journal_logger::JournalLog::new() {
        Ok(journal) => journal.with_syslog_identifier("studyplan".to_string()),
        Err(e) => {
            eprintln!("warning: journal logging unavailable: {e}");
            return;
        }
    };
    if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
        // Global max must be Debug so debug logs can pass through when toggled
        log::set_max_level(log::LevelFilter::Debug);
    }
}

async fn watch<N: Notifier>(notifier: N, planner: &mut Planner, config: &StudyConfig) {
    let mut scheduler = ReminderScheduler::with_period(notifier, config.reminder_interval());
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };
    println!("Watching for due tasks every {:?}; Ctrl-C to stop.", scheduler.period());
    scheduler.run(planner, shutdown).await;
}

fn remind_once<N: Notifier>(notifier: N, planner: &mut Planner) {
    let mut scheduler = ReminderScheduler::new(notifier);
    scheduler.prepare();
    let reminded = scheduler.sweep(planner);
    println!("{reminded} task(s) reminded");
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = StudyConfig::default_path();
    let config = StudyConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("warning: {e}; using defaults");
        StudyConfig::default()
    });

    init_logging(config.debug_logging);

    let args: Vec<String> = std::env::args().skip(1).collect();
    let command = commands::parse(&args)?;

    if let Err(e) = config.ensure_dirs() {
        log::error!("Failed to create data directory: {}", e);
    }
    let mut planner = Planner::load(Box::new(JsonFileStore::new(&config.data_directory)));

    match command {
        Command::Watch if config.desktop_notifications => {
            watch(DesktopNotifier::new(), &mut planner, &config).await;
        }
        Command::Watch => watch(LogNotifier, &mut planner, &config).await,
        Command::Remind if config.desktop_notifications => {
            remind_once(DesktopNotifier::new(), &mut planner);
        }
        Command::Remind => remind_once(LogNotifier, &mut planner),
        other => commands::execute(other, &mut planner)?,
    }

    Ok(())
}
