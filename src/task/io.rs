use std::sync::Arc;

use tokio::sync::watch;
use tracing::debug;

use crate::channel::OutputChannel;
use crate::domain::{OutputRecord, Tag};

/// Handle through which a task body writes output and toggles input.
///
/// Cheap to clone; bodies may hand clones to helper threads.
#[derive(Clone)]
pub struct TaskIo {
    channel: OutputChannel,
    input_enabled: Arc<watch::Sender<bool>>,
    finished_text: Arc<str>,
}

impl TaskIo {
    pub(super) fn new(channel: OutputChannel, finished_text: String) -> Self {
        let (input_enabled, _) = watch::channel(false);
        Self {
            channel,
            input_enabled: Arc::new(input_enabled),
            finished_text: finished_text.into(),
        }
    }

    /// Write plain text. Empty text is ignored.
    pub fn output(&self, text: impl Into<String>) {
        self.output_record(OutputRecord::new(text));
    }

    /// Write text tagged as an error.
    pub fn output_error(&self, text: impl Into<String>) {
        self.output_record(OutputRecord::new(text).with_tag(Tag::Error));
    }

    /// Write a prebuilt record. Empty records are ignored.
    pub fn output_record(&self, record: OutputRecord) {
        if record.is_empty() {
            return;
        }
        self.channel.post(record);
    }

    /// Flip the input-enabled signal. Observers only wake on a real change.
    pub fn set_input_enabled(&self, enabled: bool) {
        let changed = self.input_enabled.send_if_modified(|current| {
            let changed = *current != enabled;
            *current = enabled;
            changed
        });
        if changed {
            debug!(enabled, "input enabled changed");
        }
    }

    pub fn is_input_enabled(&self) -> bool {
        *self.input_enabled.borrow()
    }

    pub(super) fn watch_input_enabled(&self) -> watch::Receiver<bool> {
        self.input_enabled.subscribe()
    }

    pub(super) fn post_finished(&self) {
        self.output_record(OutputRecord::meta(self.finished_text.as_ref()));
    }

    pub(super) fn channel(&self) -> &OutputChannel {
        &self.channel
    }
}

impl std::fmt::Debug for TaskIo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskIo")
            .field("input_enabled", &self.is_input_enabled())
            .finish()
    }
}
