//! `TaskDesk`: terminal front-end over the session and task holders.
//!
//! Runs against the in-process identity provider and document store, so an
//! account only lives as long as the process. Configuration via CLI flags,
//! environment variables, or config file (`~/.config/taskdesk/config.toml`).
//!
//! ```bash
//! cargo run --bin taskdesk
//!
//! # Mark an account as administrator and print JSON envelopes
//! cargo run --bin taskdesk -- --admin-email ana@example.com --json
//! ```

use std::io;
use std::path::Path;
use std::sync::Arc;

use clap::Parser;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing_appender::non_blocking::WorkerGuard;

use taskdesk::config::{CliArgs, ClientConfig};
use taskdesk::notify::{Notice, Notifier};
use taskdesk::provider::memory::{MemoryDocumentStore, MemoryIdentity};
use taskdesk::router::Router;
use taskdesk::session::{RoleResolver, SessionHolder};
use taskdesk::shell::{Flow, Shell, ShellOptions};
use taskdesk::tasks::TaskHolder;

#[tokio::main]
async fn main() -> io::Result<()> {
    let cli = CliArgs::parse();

    // CLI args > config file > defaults.
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file so they never interleave with the prompt.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(admins = config.admin_emails.len(), "taskdesk starting");

    let result = run(&config).await;

    tracing::info!("taskdesk exiting");
    result
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdesk.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

/// Builds the providers and holders, then reads commands until EOF or `quit`.
async fn run(config: &ClientConfig) -> io::Result<()> {
    let identity = Arc::new(MemoryIdentity::new());
    if let Some(email) = &config.federated_email {
        identity.set_federated_account(email, config.federated_name.as_deref());
    }
    let store = Arc::new(MemoryDocumentStore::new());

    let (notifier, mut notices) = Notifier::channel(config.notice_buffer);
    let session = SessionHolder::new(
        Arc::clone(&identity),
        RoleResolver::new(&config.admin_emails),
    );
    let tasks = Arc::new(TaskHolder::new(store, session.view(), notifier.clone()));
    let router = Router::new(Arc::clone(&identity));

    let options = ShellOptions {
        default_query: config.default_query,
        timestamp_format: config.timestamp_format.clone(),
        json: config.json_output,
    };
    let mut shell = Shell::new(session, tasks, router, notifier, options);

    let mut stdout = tokio::io::stdout();
    write_lines(&mut stdout, &["TaskDesk (escribe 'help')".to_string()]).await?;
    let lines = shell.start().await;
    write_lines(&mut stdout, &lines).await?;
    drain_notices(&mut stdout, &mut notices).await?;

    let mut input = BufReader::new(tokio::io::stdin()).lines();
    loop {
        stdout.write_all(b"> ").await?;
        stdout.flush().await?;
        let Some(line) = input.next_line().await? else {
            break;
        };
        let (flow, lines) = shell.run_line(&line).await;
        write_lines(&mut stdout, &lines).await?;
        drain_notices(&mut stdout, &mut notices).await?;
        if flow == Flow::Quit {
            break;
        }
    }
    Ok(())
}

async fn write_lines(stdout: &mut tokio::io::Stdout, lines: &[String]) -> io::Result<()> {
    for line in lines {
        stdout.write_all(line.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
    }
    stdout.flush().await
}

/// Prints every notice queued so far without waiting for more.
async fn drain_notices(
    stdout: &mut tokio::io::Stdout,
    notices: &mut mpsc::Receiver<Notice>,
) -> io::Result<()> {
    while let Ok(notice) = notices.try_recv() {
        stdout.write_all(format!("  {notice}\n").as_bytes()).await?;
    }
    stdout.flush().await
}
