//! CLI binary for `tasklist`.
//!
//! This binary is a thin wrapper that parses the user name, configures
//! logging, and hands the terminal to the interactive session.

use std::io;
use std::process::ExitCode;

use clap::Parser;
use tasklist::app::TodoApp;
use tasklist::tasks::SqliteTaskStore;

/// Database file, created next to wherever the program is run.
const DB_NAME: &str = "tasklist.db";

/// Single-user to-do list manager.
#[derive(Parser, Debug)]
#[command(name = "tasklist")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Name of the user whose task list to open.
    user: String,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let store = SqliteTaskStore::open_or_create(DB_NAME);
    if store.is_degraded() {
        log::warn!("Task store opened in degraded mode; operations may fail.");
    }

    let mut app = TodoApp::new(&cli.user, store);
    let stdin = io::stdin();
    let stdout = io::stdout();
    if let Err(e) = app.run(&mut stdin.lock(), &mut stdout.lock()) {
        eprintln!("Error: {e}");
        return ExitCode::from(1);
    }

    log::info!("Closed task app.");
    ExitCode::SUCCESS
}

/// Configure the process-wide logger: debug level, `[LEVEL] timestamp message`.
fn init_logging() {
    use std::io::Write;

    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Debug)
        .format(|buf, record| {
            writeln!(
                buf,
                "[{}] {} {}",
                record.level(),
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                record.args()
            )
        })
        .init();
}
