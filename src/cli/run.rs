//! Run command: the greeter task in a console session on this terminal

use std::collections::VecDeque;
use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use console_session::config::Config;
use console_session::demo::Greeter;
use console_session::session::ConsoleSession;
use console_session::task::Task;

/// Options for the run command
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Progress updates before each greeting
    pub steps: u32,
    /// Delay between progress updates
    pub tick: Duration,
    /// Write the final transcript as JSON here
    pub dump: Option<PathBuf>,
}

/// Run the greeter until it finishes, with stdin as the input line.
///
/// Output is written as it arrives, unmodified, so carriage-return progress
/// updates redraw in place. Typed lines are already echoed by the terminal;
/// they are held back until the task enables input.
pub async fn run_command(config: &Config, options: RunOptions) -> Result<()> {
    let task = Task::with_finished_text(
        Greeter::new(options.steps, options.tick),
        config.console.finished_text.clone(),
    );
    let mut session = ConsoleSession::new(task, &config.console);
    let mut input_enabled = session.task().input_enabled();
    let mut state = session.task().watch_state();

    session.attach();
    session.resume();
    info!(steps = options.steps, tick_ms = options.tick.as_millis() as u64, "session started");

    let mut line_rx = spawn_stdin_reader();
    let mut stdin_open = true;
    let mut input_closed = false;
    let mut queued: VecDeque<String> = VecDeque::new();
    let mut stdout = std::io::stdout();

    loop {
        if session.task().is_input_enabled() {
            if let Some(mut line) = queued.pop_front() {
                session.submit_input(&mut line);
            }
        }
        if !stdin_open && queued.is_empty() && !input_closed {
            session.close_input();
            input_closed = true;
        }
        if session.task().state().is_terminal() && session.pending_output() == 0 {
            break;
        }

        tokio::select! {
            record = session.deliver_next() => {
                let Some(record) = record else {
                    warn!("console output subscription lost");
                    break;
                };
                stdout.write_all(record.text().as_bytes())?;
                stdout.flush()?;
            }
            line = line_rx.recv(), if stdin_open => {
                match line {
                    Some(line) => queued.push_back(line),
                    None => {
                        debug!("stdin reached end of input");
                        stdin_open = false;
                    }
                }
            }
            changed = input_enabled.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            changed = state.changed() => {
                if changed.is_err() {
                    break;
                }
            }
        }
    }

    writeln!(stdout)?;
    session.task().join();
    info!(
        transcript_len = session.transcript().len(),
        dropped = session.transcript().dropped(),
        "session finished"
    );

    if let Some(path) = options.dump {
        let json = serde_json::to_string_pretty(&session.snapshot())
            .context("Failed to serialize transcript")?;
        std::fs::write(&path, json)
            .with_context(|| format!("Failed to write transcript: {}", path.display()))?;
        info!(path = %path.display(), "transcript written");
    }

    Ok(())
}

/// Forward stdin lines from a blocking reader thread. The channel closes at
/// end of input.
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        for line in stdin.lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "failed to read stdin");
                    break;
                }
            }
        }
    });
    rx
}
