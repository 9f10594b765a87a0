//! A small interactive program to drive the console with.
//!
//! Asks for a name, shows a carriage-return progress counter while it
//! "thinks", greets, and repeats until it gets an empty line or end of input.

use std::time::Duration;

use anyhow::Result;

use crate::task::{LineQueue, TaskBody, TaskIo};

pub struct Greeter {
    lines: LineQueue,
    steps: u32,
    tick: Duration,
}

impl Greeter {
    /// `steps` progress updates, `tick` apart, before each greeting
    pub fn new(steps: u32, tick: Duration) -> Self {
        Self {
            lines: LineQueue::new(),
            steps,
            tick,
        }
    }
}

impl TaskBody for Greeter {
    fn run(&self, io: &TaskIo) -> Result<()> {
        io.output("Enter your name, or an empty line to exit.\n");
        loop {
            io.set_input_enabled(true);
            let Some(line) = self.lines.recv() else {
                break;
            };
            io.set_input_enabled(false);

            for i in 0..self.steps {
                std::thread::sleep(self.tick);
                io.output(format!("sleep {}\r", i));
            }

            let name = line.trim_end_matches(['\r', '\n']);
            if name.is_empty() {
                break;
            }
            io.output(format!("Hello {}!\n", name));
        }
        Ok(())
    }

    fn on_input(&self, _io: &TaskIo, text: &str) {
        self.lines.push(text);
    }

    fn on_input_closed(&self, _io: &TaskIo) {
        self.lines.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConsoleSettings;
    use crate::domain::TaskState;
    use crate::session::ConsoleSession;
    use crate::task::Task;

    #[test]
    fn test_greets_until_empty_line() {
        let task = Task::new(Greeter::new(2, Duration::ZERO));
        task.start();
        task.on_input("Ada\n");
        task.on_input("\n");
        task.join();

        let texts: Vec<String> = task
            .output()
            .subscribe()
            .drain()
            .unwrap()
            .into_iter()
            .map(|r| r.text().to_string())
            .collect();
        assert_eq!(
            texts,
            vec![
                "Enter your name, or an empty line to exit.\n",
                "sleep 0\r",
                "sleep 1\r",
                "Hello Ada!\n",
                "sleep 0\r",
                "sleep 1\r",
                "[Finished]",
            ]
        );
    }

    #[test]
    fn test_end_of_input_finishes() {
        let task = Task::new(Greeter::new(0, Duration::ZERO));
        task.start();
        task.close_input();
        task.join();
        assert!(task.state().is_terminal());
        assert!(!task.is_input_enabled());
    }

    #[test]
    fn test_dropping_session_ends_waiting_greeter() {
        let mut session = ConsoleSession::new(
            Task::new(Greeter::new(0, Duration::ZERO)),
            &ConsoleSettings::default(),
        );
        let mut state = session.task().watch_state();
        let mut input = session.task().input_enabled();
        session.attach();
        session.resume();

        // Wait until the greeter is parked on its first line
        while !*input.borrow_and_update() {
            std::thread::sleep(Duration::from_millis(1));
        }
        drop(session);

        let deadline = std::time::Instant::now() + Duration::from_secs(5);
        while *state.borrow_and_update() != TaskState::Terminated {
            assert!(
                std::time::Instant::now() < deadline,
                "greeter outlived its session"
            );
            std::thread::sleep(Duration::from_millis(1));
        }
        assert!(!*input.borrow_and_update());
    }
}
