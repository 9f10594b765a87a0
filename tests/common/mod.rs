//! Shared task bodies and helpers for console-session integration tests

#![allow(dead_code)]

use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{bail, Result};
use console_session::config::ConsoleSettings;
use console_session::layout::MonospaceLayout;
use console_session::session::ConsoleSession;
use console_session::task::{LineQueue, Task, TaskBody, TaskIo};

pub const LINE_HEIGHT: i32 = 10;

/// Writes `count` numbered lines, optionally pausing between them
pub struct Counter {
    pub count: usize,
    pub pause: Duration,
}

impl Counter {
    pub fn new(count: usize) -> Self {
        Self {
            count,
            pause: Duration::ZERO,
        }
    }
}

impl TaskBody for Counter {
    fn run(&self, io: &TaskIo) -> Result<()> {
        for i in 0..self.count {
            io.output(format!("line{:04}\n", i));
            if !self.pause.is_zero() {
                std::thread::sleep(self.pause);
            }
        }
        Ok(())
    }
}

/// Writes a partial line, then fails
pub struct Failing;

impl TaskBody for Failing {
    fn run(&self, io: &TaskIo) -> Result<()> {
        io.output("working");
        io.output_error("\nconnection refused\n");
        bail!("connection refused")
    }
}

/// Echoes every line it is given until input is closed
#[derive(Default)]
pub struct Echo {
    pub lines: LineQueue,
    pub seen: Arc<Mutex<Vec<String>>>,
}

impl TaskBody for Echo {
    fn run(&self, io: &TaskIo) -> Result<()> {
        loop {
            io.set_input_enabled(true);
            let Some(line) = self.lines.recv() else {
                return Ok(());
            };
            io.set_input_enabled(false);
            self.seen.lock().unwrap().push(line.clone());
            io.output(format!("> {}", line));
        }
    }

    fn on_input(&self, _io: &TaskIo, text: &str) {
        self.lines.push(text);
    }

    fn on_input_closed(&self, _io: &TaskIo) {
        self.lines.close();
    }
}

pub fn settings(scrollback_len: usize) -> ConsoleSettings {
    ConsoleSettings {
        scrollback_len,
        ..ConsoleSettings::default()
    }
}

pub fn session(body: impl TaskBody, scrollback_len: usize) -> ConsoleSession {
    ConsoleSession::new(Task::new(body), &settings(scrollback_len))
}

/// Lay out the session's current transcript
pub fn layout(session: &ConsoleSession, columns: usize) -> MonospaceLayout {
    MonospaceLayout::new(session.transcript().text(), columns, LINE_HEIGHT)
}

/// Pump until the task has terminated and everything has been delivered
pub fn pump_to_end(session: &mut ConsoleSession) {
    loop {
        let terminated = session.task().state().is_terminal();
        session.pump();
        if terminated && session.pending_output() == 0 {
            break;
        }
        std::thread::sleep(Duration::from_millis(1));
    }
}
