use std::collections::VecDeque;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::domain::{OutputRecord, Tag};

/// A run of transcript characters carrying the tags of the record it came from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaggedSpan {
    /// Character range in the current transcript
    pub range: Range<usize>,
    pub tags: Vec<Tag>,
}

/// Bounded, append-only console text.
///
/// All offsets are character offsets. A record ending in `\n` has its line
/// break withheld until the next append, so the text never ends on an empty
/// line while the task waits. Once the text exceeds `max_len` characters the
/// oldest characters are dropped from the head.
#[derive(Debug, Clone)]
pub struct Transcript {
    text: String,
    /// Length of `text` in characters
    len: usize,
    spans: VecDeque<TaggedSpan>,
    max_len: usize,
    pending_newline: bool,
    /// Characters dropped from the head over the transcript's lifetime
    dropped: usize,
}

impl Transcript {
    pub fn new(max_len: usize) -> Self {
        Self {
            text: String::new(),
            len: 0,
            spans: VecDeque::new(),
            max_len: max_len.max(1),
            pending_newline: false,
            dropped: 0,
        }
    }

    /// Append a record. Returns how many characters were dropped from the head.
    pub fn append(&mut self, record: &OutputRecord) -> usize {
        if record.is_empty() {
            return 0;
        }

        if self.pending_newline {
            self.push("\n", &[]);
            self.pending_newline = false;
        }

        let text = record.text();
        let body = match text.strip_suffix('\n') {
            Some(body) => {
                self.pending_newline = true;
                body
            }
            None => text,
        };
        self.push(body, record.tags());

        self.trim()
    }

    fn push(&mut self, text: &str, tags: &[Tag]) {
        if text.is_empty() {
            return;
        }
        let start = self.len;
        self.text.push_str(text);
        self.len += text.chars().count();
        if !tags.is_empty() {
            self.spans.push_back(TaggedSpan {
                range: start..self.len,
                tags: tags.to_vec(),
            });
        }
    }

    fn trim(&mut self) -> usize {
        if self.len <= self.max_len {
            return 0;
        }

        let excess = self.len - self.max_len;
        let cut = self
            .text
            .char_indices()
            .nth(excess)
            .map(|(i, _)| i)
            .unwrap_or(self.text.len());
        self.text.drain(..cut);
        self.len -= excess;
        self.dropped += excess;

        while self.spans.front().is_some_and(|span| span.range.end <= excess) {
            self.spans.pop_front();
        }
        for span in self.spans.iter_mut() {
            span.range = span.range.start.saturating_sub(excess)..span.range.end - excess;
        }

        excess
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Length in characters
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn max_len(&self) -> usize {
        self.max_len
    }

    /// Whether the last appended record's line break is still withheld
    pub fn pending_newline(&self) -> bool {
        self.pending_newline
    }

    /// Tagged runs, in transcript order
    pub fn spans(&self) -> impl Iterator<Item = &TaggedSpan> {
        self.spans.iter()
    }

    /// Total characters dropped from the head so far
    pub fn dropped(&self) -> usize {
        self.dropped
    }
}
