//! The console session: transcript, scroll anchor and task, as one unit that
//! outlives any single viewer.
//!
//! Everything here runs on the viewer thread. The worker only reaches the
//! session through the task's output channel; the viewer pumps deliveries
//! into [`ConsoleSession::append`] on its own turn.
//!
//! A viewer drives the session like this:
//!
//! ```text
//! attach()                 on create / reattach after reconfiguration
//! resume()                 when visible (starts a New task)
//! pump() / deliver_next()  whenever the waker fires
//! handle_layout_changed()  on every layout pass -> scroll target
//! save_scroll()            on every user scroll
//! pause() / detach()       when hidden / destroyed
//! ```

mod anchor;
mod input;
mod transcript;

pub use anchor::{restore, save, ViewportState};
pub use input::InputWidget;
pub use transcript::{TaggedSpan, Transcript};

use serde::Serialize;
use tracing::{debug, info};

use crate::channel::{Subscription, Waker};
use crate::config::{ConsoleSettings, ScrollOnOutput};
use crate::domain::{OutputRecord, ScrollAnchor, ScrollRequest, TaskState};
use crate::task::Task;

/// Serializable copy of a session's state, for dumps and diagnostics.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptSnapshot {
    pub text: String,
    pub spans: Vec<TaggedSpan>,
    pub pending_newline: bool,
    pub dropped: usize,
    pub anchor: ScrollAnchor,
    pub task_state: TaskState,
}

/// State of one console instance.
pub struct ConsoleSession {
    task: Task,
    transcript: Transcript,
    anchor: ScrollAnchor,
    scroll_request: Option<ScrollRequest>,
    /// Last viewport size seen by `handle_layout_changed`
    viewport_size: Option<(i32, i32)>,
    subscription: Option<Subscription>,
    scroll_on_output: ScrollOnOutput,
    echo_input: bool,
}

impl ConsoleSession {
    pub fn new(task: Task, settings: &ConsoleSettings) -> Self {
        Self {
            task,
            transcript: Transcript::new(settings.scrollback_len),
            anchor: ScrollAnchor::Bottom,
            scroll_request: None,
            viewport_size: None,
            subscription: None,
            scroll_on_output: settings.scroll_on_output,
            echo_input: settings.echo_input,
        }
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn transcript(&self) -> &Transcript {
        &self.transcript
    }

    pub fn anchor(&self) -> ScrollAnchor {
        self.anchor
    }

    pub fn scroll_request(&self) -> Option<ScrollRequest> {
        self.scroll_request
    }

    /// Attach a viewer that polls with [`pump`](Self::pump) or awaits
    /// [`deliver_next`](Self::deliver_next). Replaces any previous viewer's
    /// subscription; output buffered while detached is delivered to this one.
    pub fn attach(&mut self) {
        self.subscription = Some(self.task.output().subscribe());
    }

    /// Attach a viewer that is woken through `waker` when output is ready.
    pub fn attach_with_waker(&mut self, waker: Waker) {
        self.subscription = Some(self.task.output().subscribe_with_waker(waker));
    }

    /// Drop the viewer's subscription. Output keeps buffering in the channel.
    pub fn detach(&mut self) {
        self.subscription = None;
    }

    pub fn is_attached(&self) -> bool {
        self.subscription
            .as_ref()
            .is_some_and(|sub| !sub.is_superseded())
    }

    /// Records waiting to be delivered to this session
    pub fn pending_output(&self) -> usize {
        self.subscription.as_ref().map_or(0, Subscription::pending)
    }

    /// The session became visible: start the task if it has never run.
    pub fn resume(&mut self) {
        if self.task.state() == TaskState::New {
            self.task.start();
        }
    }

    /// The session is being hidden: remember where the viewer was.
    pub fn pause(&mut self, view: &ViewportState<'_>) {
        self.save_scroll(view);
    }

    /// Append every record delivered so far. Returns how many were appended.
    pub fn pump(&mut self) -> usize {
        let Some(sub) = self.subscription.as_ref() else {
            return 0;
        };

        let records = match sub.drain() {
            Ok(records) => records,
            Err(e) => {
                debug!(error = %e, "dropping stale subscription");
                self.subscription = None;
                return 0;
            }
        };

        for record in &records {
            self.append(record);
        }
        records.len()
    }

    /// Wait for the next delivery, append it, and return it.
    ///
    /// Returns `None` when detached or when another viewer has taken over.
    pub async fn deliver_next(&mut self) -> Option<OutputRecord> {
        let record = self.subscription.as_ref()?.next().await?;
        self.append(&record);
        Some(record)
    }

    /// Add a record to the transcript and decide whether to follow it.
    pub fn append(&mut self, record: &OutputRecord) {
        let dropped = self.transcript.append(record);
        if dropped > 0 {
            self.anchor = self.anchor.shifted(dropped);
            debug!(dropped, anchor = ?self.anchor, "scrollback trimmed");
        }

        let follow = match self.scroll_on_output {
            ScrollOnOutput::Always => true,
            ScrollOnOutput::AtBottom => self.anchor.is_bottom(),
        };
        if follow {
            self.request_scroll(ScrollRequest::Bottom);
        }
    }

    /// Submit the widget's line to the task.
    ///
    /// The widget is cleared before the line is echoed, and the task sees the
    /// text with a trailing `\n`. Returns `false` (leaving the widget
    /// untouched) while input is disabled.
    pub fn submit_input(&mut self, widget: &mut impl InputWidget) -> bool {
        if !self.task.is_input_enabled() {
            debug!("input submitted while disabled, ignoring");
            return false;
        }

        let text = format!("{}\n", widget.text());
        widget.clear();

        if self.echo_input {
            self.append(&OutputRecord::echo(text.as_str()));
        }
        self.request_scroll(ScrollRequest::Bottom);
        self.task.on_input(&text);
        true
    }

    /// No more input will be submitted (e.g. the host's input reached EOF).
    pub fn close_input(&mut self) {
        info!("console input closed");
        self.task.close_input();
    }

    /// Ask for a jump on the next layout pass. A pending `Top` is never
    /// overridden.
    pub fn request_scroll(&mut self, request: ScrollRequest) {
        if self.scroll_request != Some(ScrollRequest::Top) {
            self.scroll_request = Some(request);
        }
    }

    pub fn scroll_to_top(&mut self) {
        self.request_scroll(ScrollRequest::Top);
    }

    pub fn scroll_to_bottom(&mut self) {
        self.request_scroll(ScrollRequest::Bottom);
    }

    /// Record the viewer's current position as the anchor.
    pub fn save_scroll(&mut self, view: &ViewportState<'_>) {
        if let Some(anchor) = save(view) {
            self.anchor = anchor;
        }
    }

    /// Scroll offset that puts the anchored text back where it was.
    ///
    /// The anchor itself is left alone, so repeated re-layouts don't drift it.
    pub fn restore_scroll(&self, view: &ViewportState<'_>) -> Option<i32> {
        restore(&self.anchor, view)
    }

    /// React to a layout pass. Returns the offset to scroll to, if any.
    ///
    /// A size change (including the first layout) restores the anchor;
    /// otherwise a pending scroll request is resolved and consumed.
    pub fn handle_layout_changed(&mut self, view: &ViewportState<'_>) -> Option<i32> {
        let size = view.size();
        if self.viewport_size != Some(size) {
            debug!(
                from = ?self.viewport_size,
                to = ?size,
                anchor = ?self.anchor,
                "viewport resized"
            );
            self.viewport_size = Some(size);
            return self.restore_scroll(view);
        }

        let request = self.scroll_request.take()?;
        let target = match request {
            ScrollRequest::Top => 0,
            ScrollRequest::Bottom => view.max_scroll(),
        };
        self.save_scroll(&view.scrolled_to(target));
        Some(target)
    }

    /// Copy out the session state
    pub fn snapshot(&self) -> TranscriptSnapshot {
        TranscriptSnapshot {
            text: self.transcript.text().to_string(),
            spans: self.transcript.spans().cloned().collect(),
            pending_newline: self.transcript.pending_newline(),
            dropped: self.transcript.dropped(),
            anchor: self.anchor,
            task_state: self.task.state(),
        }
    }
}

impl std::fmt::Debug for ConsoleSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsoleSession")
            .field("task", &self.task)
            .field("transcript_len", &self.transcript.len())
            .field("anchor", &self.anchor)
            .field("scroll_request", &self.scroll_request)
            .field("viewport_size", &self.viewport_size)
            .finish()
    }
}
