use flowstate::config::FlowstateConfig;
use flowstate::core::reminder::ReminderScanner;
use flowstate::store::op::Op;
use flowstate::sync::cache::SnapshotCache;
use flowstate::sync::remote::TableClient;
use flowstate::sync::session::{self, SessionGate};
use flowstate::sync::Bridge;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = FlowstateConfig::load();

    let args: Vec<String> = std::env::args().collect();
    let watch = args.iter().any(|a| a == "--watch");
    let debug = args.iter().any(|a| a == "--debug");
    flowstate::set_debug_logging(debug || config.debug_logging);

    // Set up logging to the systemd user journal (`journalctl --user -t flowstate -f`).
    // Wrapper filters: flowstate crate at info/debug (per config), everything else at warn.
    {
        struct FilteredJournal {
            inner: systemd_journal_logger::JournalLog,
        }

        impl log::Log for FilteredJournal {
            fn enabled(&self, metadata: &log::Metadata) -> bool {
                let target = metadata.target();
                if target.starts_with("flowstate") {
                    let max = if flowstate::debug_logging() {
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

        match systemd_journal_logger::JournalLog::new() {
            Ok(journal) => {
                let journal = journal.with_syslog_identifier("flowstate".to_string());
                if log::set_boxed_logger(Box::new(FilteredJournal { inner: journal })).is_ok() {
                    // Global max must be Debug so flowstate debug logs can pass through when toggled
                    log::set_max_level(log::LevelFilter::Debug);
                }
            }
            Err(e) => eprintln!("Journal logging unavailable: {}", e),
        }
    }

    config.ensure_dirs()?;

    let gate = SessionGate::new(config.remote().is_some(), config.session_path());
    gate.resolve().await;

    let remote = match (config.remote(), gate.session()) {
        (Some(remote_config), Some(current)) => match session::load_access_token().await {
            Ok(Some(token)) => {
                match TableClient::new(&remote_config.url, &remote_config.api_key, &token) {
                    Ok(client) => Some((client, current.user_id)),
                    Err(e) => {
                        log::warn!("Remote client unavailable, staying local: {}", e);
                        None
                    }
                }
            }
            Ok(None) => {
                log::info!("No access token in the keyring, staying local");
                None
            }
            Err(e) => {
                log::warn!("Keyring unavailable ({}), staying local", e);
                None
            }
        },
        _ => None,
    };

    let mut bridge = Bridge::new(SnapshotCache::new(config.cache_path()));
    bridge.start(remote).await;

    println!("=== Flowstate ===\n");
    match gate.session() {
        Some(current) => println!("Signed in as {}", current.email),
        None => println!("Local-only (not signed in)"),
    }
    let snapshot = bridge.snapshot();
    println!(
        "State: {} tasks, {} events, {} projects, {} habits, {} goals, {} notes, {} channels, {} reviews",
        snapshot.tasks.len(),
        snapshot.events.len(),
        snapshot.projects.len(),
        snapshot.habits.len(),
        snapshot.goals.len(),
        snapshot.notes.len(),
        snapshot.channels.len(),
        snapshot.weekly_reviews.len(),
    );
    println!("Cache: {}", config.cache_path().display());

    if !watch {
        return Ok(());
    }

    println!("\nWatching for due reminders (Ctrl-C to stop)...");
    let mut scanner = ReminderScanner::new();
    let mut ticker = tokio::time::interval(std::time::Duration::from_secs(60));
    loop {
        ticker.tick().await;
        let now = chrono::Local::now().naive_local();
        let state = bridge.snapshot();
        let alerts = scanner.scan(&state.reminders, &state.tasks, &state.goals, now);

        let fired: Vec<Uuid> = alerts.iter().filter_map(|a| a.reminder_id).collect();
        for alert in &alerts {
            println!("[{}] {}: {}", now.format("%H:%M"), alert.title, alert.message);
        }
        // A reminder surfaced on the terminal counts as seen.
        for id in fired {
            bridge.dispatch(Op::DismissReminder(id));
        }
    }
}
