//! Background console tasks.
//!
//! A [`Task`] runs a user-supplied [`TaskBody`] to completion on a dedicated
//! worker thread. The body talks to the console only through its [`TaskIo`]
//! handle: output goes into the task's [`OutputChannel`], and the
//! `input_enabled` signal tells the host whether to offer the input line.
//!
//! # Lifecycle
//!
//! ```text
//! New --start()--> Running --(body returns, errors or panics)--> Terminated
//! ```
//!
//! Whatever way the body ends, the worker posts the meta-tagged finished
//! record, disables input, and only then publishes `Terminated`. Body
//! failures are logged and swallowed; a body that wants the user to see a
//! diagnostic writes it with [`TaskIo::output_error`] before failing.

mod io;
mod lines;

pub use io::TaskIo;
pub use lines::LineQueue;

use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};

use anyhow::Result;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::channel::OutputChannel;
use crate::domain::TaskState;

/// Default text of the record posted when a task terminates
pub const DEFAULT_FINISHED_TEXT: &str = "[Finished]";

/// The program a console task executes.
///
/// `run` executes on the worker thread and may block for as long as it likes.
/// `on_input` and `on_input_closed` are called from the viewer thread, so a
/// body that consumes input typically forwards lines to `run` through a
/// [`LineQueue`].
pub trait TaskBody: Send + Sync + 'static {
    /// Execute the task. Returning (with `Ok` or `Err`) terminates it.
    fn run(&self, io: &TaskIo) -> Result<()>;

    /// A line of input was submitted. `text` includes the trailing `\n`.
    fn on_input(&self, _io: &TaskIo, _text: &str) {}

    /// The host has no more input to give (e.g. stdin reached EOF).
    fn on_input_closed(&self, _io: &TaskIo) {}
}

/// Why a task body ended without returning `Ok`. Never surfaced to the
/// viewer; only logged.
#[derive(Debug, thiserror::Error)]
pub enum WorkerFault {
    #[error("task body failed: {0:#}")]
    Failed(anyhow::Error),

    #[error("task body panicked: {0}")]
    Panicked(String),

    #[error("failed to spawn worker thread: {0}")]
    SpawnFailed(#[source] std::io::Error),
}

impl WorkerFault {
    fn from_panic(payload: Box<dyn std::any::Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "non-string panic payload".to_string()
        };
        WorkerFault::Panicked(message)
    }
}

/// A session-scoped background unit of work.
pub struct Task {
    body: Arc<dyn TaskBody>,
    io: TaskIo,
    state: Arc<watch::Sender<TaskState>>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl Task {
    /// Create a task in the `New` state.
    pub fn new(body: impl TaskBody) -> Self {
        Self::with_finished_text(body, DEFAULT_FINISHED_TEXT)
    }

    /// Create a task whose termination record uses `finished_text`.
    pub fn with_finished_text(body: impl TaskBody, finished_text: impl Into<String>) -> Self {
        let (state, _) = watch::channel(TaskState::New);
        Self {
            body: Arc::new(body),
            io: TaskIo::new(OutputChannel::new(), finished_text.into()),
            state: Arc::new(state),
            worker: Mutex::new(None),
        }
    }

    /// Start the worker thread. Only a `New` task starts; on any other state
    /// this is a no-op.
    ///
    /// The state is `Running` by the time this returns, even if the body has
    /// not begun executing yet.
    pub fn start(&self) {
        let claimed = self.state.send_if_modified(|state| {
            if *state == TaskState::New {
                *state = TaskState::Running;
                true
            } else {
                false
            }
        });
        if !claimed {
            debug!(task_state = %self.state(), "start ignored, task already started");
            return;
        }

        info!("starting console task");

        let body = self.body.clone();
        let io = self.io.clone();
        let state = self.state.clone();
        let spawned = thread::Builder::new()
            .name("console-task".to_string())
            .spawn(move || {
                let outcome = panic::catch_unwind(AssertUnwindSafe(|| body.run(&io)));
                let fault = match outcome {
                    Ok(Ok(())) => None,
                    Ok(Err(e)) => Some(WorkerFault::Failed(e)),
                    Err(payload) => Some(WorkerFault::from_panic(payload)),
                };
                finish(&io, &state, fault);
            });

        match spawned {
            Ok(handle) => {
                *self.worker.lock().unwrap_or_else(PoisonError::into_inner) = Some(handle);
            }
            Err(e) => finish(&self.io, &self.state, Some(WorkerFault::SpawnFailed(e))),
        }
    }

    pub fn state(&self) -> TaskState {
        *self.state.borrow()
    }

    /// Subscribe to lifecycle changes
    pub fn watch_state(&self) -> watch::Receiver<TaskState> {
        self.state.subscribe()
    }

    /// Current value of the input-enabled signal
    pub fn is_input_enabled(&self) -> bool {
        self.io.is_input_enabled()
    }

    /// Subscribe to the input-enabled signal
    pub fn input_enabled(&self) -> watch::Receiver<bool> {
        self.io.watch_input_enabled()
    }

    /// The output channel the worker posts into
    pub fn output(&self) -> &OutputChannel {
        self.io.channel()
    }

    /// The body's I/O handle
    pub fn io(&self) -> &TaskIo {
        &self.io
    }

    /// Forward a submitted line to the body.
    pub fn on_input(&self, text: &str) {
        self.body.on_input(&self.io, text);
    }

    /// Tell the body no more input will arrive.
    pub fn close_input(&self) {
        self.body.on_input_closed(&self.io);
    }

    /// Block until the worker thread has exited. Returns immediately for a
    /// task that was never started or has already been joined.
    pub fn join(&self) {
        let handle = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(handle) = handle {
            // Body panics are caught inside the thread
            let _ = handle.join();
        }
    }
}

/// The task lives only as long as its owner. Dropping it signals end of input
/// so a body blocked on a [`LineQueue`] returns and the worker exits; the
/// worker is not joined.
impl Drop for Task {
    fn drop(&mut self) {
        if self.state() == TaskState::Running {
            debug!("task dropped while running, closing input");
        }
        self.body.on_input_closed(&self.io);
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("state", &self.state())
            .field("input_enabled", &self.is_input_enabled())
            .field("output", self.io.channel())
            .finish()
    }
}

/// Completion side effects, in order: finished record, input off, state.
fn finish(io: &TaskIo, state: &watch::Sender<TaskState>, fault: Option<WorkerFault>) {
    match &fault {
        None => debug!("console task body returned"),
        Some(fault) => warn!(error = %fault, "console task ended abnormally"),
    }

    io.post_finished();
    io.set_input_enabled(false);
    state.send_replace(TaskState::Terminated);

    info!(task_state = %TaskState::Terminated, "console task finished");
}
