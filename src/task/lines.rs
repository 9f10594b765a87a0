use std::sync::Mutex;

use tokio::sync::mpsc;

/// Line-by-line input for task bodies.
///
/// The viewer side calls [`push`](Self::push) from `TaskBody::on_input`; the
/// worker blocks in [`recv`](Self::recv) until a line arrives. Closing the
/// queue makes `recv` return `None` once the buffered lines are consumed.
pub struct LineQueue {
    tx: Mutex<Option<mpsc::UnboundedSender<String>>>,
    rx: Mutex<mpsc::UnboundedReceiver<String>>,
}

impl LineQueue {
    pub fn new() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            tx: Mutex::new(Some(tx)),
            rx: Mutex::new(rx),
        }
    }

    /// Queue a submitted line. Returns `false` if the queue is closed.
    pub fn push(&self, line: impl Into<String>) -> bool {
        match self.tx.lock() {
            Ok(tx) => tx.as_ref().is_some_and(|tx| tx.send(line.into()).is_ok()),
            Err(_) => false,
        }
    }

    /// Signal end of input.
    pub fn close(&self) {
        if let Ok(mut tx) = self.tx.lock() {
            tx.take();
        }
    }

    /// Block until the next line arrives; `None` after close.
    ///
    /// Must be called from a plain thread (the task worker), not from inside
    /// an async runtime.
    pub fn recv(&self) -> Option<String> {
        let mut rx = self.rx.lock().ok()?;
        rx.blocking_recv()
    }
}

impl Default for LineQueue {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_lines_arrive_in_order_then_eof() {
        let queue = Arc::new(LineQueue::new());
        assert!(queue.push("one\n"));
        assert!(queue.push("two\n"));
        queue.close();
        assert!(!queue.push("late\n"));

        let reader = {
            let queue = queue.clone();
            std::thread::spawn(move || {
                let mut lines = Vec::new();
                while let Some(line) = queue.recv() {
                    lines.push(line);
                }
                lines
            })
        };
        assert_eq!(reader.join().unwrap(), vec!["one\n", "two\n"]);
    }

    #[test]
    fn test_recv_blocks_until_push() {
        let queue = Arc::new(LineQueue::new());
        let reader = {
            let queue = queue.clone();
            std::thread::spawn(move || queue.recv())
        };
        std::thread::sleep(std::time::Duration::from_millis(20));
        queue.push("hello\n");
        assert_eq!(reader.join().unwrap().as_deref(), Some("hello\n"));
    }
}
