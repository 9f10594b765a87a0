use serde::{Deserialize, Serialize};

/// A presentation tag attached to a whole output record.
///
/// Tags are opaque to the session runtime: they are carried alongside the text
/// so the renderer can style the span, but nothing in the core interprets them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tag {
    /// Echoed user input
    Bold,
    /// Diagnostics written by the task body
    Error,
    /// Messages from the runtime itself (e.g. the terminal "[Finished]" line)
    Meta,
    /// Any other renderer-defined tag (e.g. "color:accent")
    Custom(String),
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::Bold => write!(f, "bold"),
            Tag::Error => write!(f, "color:error"),
            Tag::Meta => write!(f, "color:meta"),
            Tag::Custom(name) => write!(f, "{}", name),
        }
    }
}

/// One unit of console output produced by a task.
///
/// Records are never mutated once created; the channel and the transcript
/// only move or clone them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRecord {
    /// The text payload
    text: String,

    /// Tags applied to the whole payload
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    tags: Vec<Tag>,
}

impl OutputRecord {
    /// Create an untagged record
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tags: Vec::new(),
        }
    }

    /// Create a record tagged as a diagnostic
    pub fn error(text: impl Into<String>) -> Self {
        Self::new(text).with_tag(Tag::Error)
    }

    /// Create a record tagged as runtime metadata
    pub fn meta(text: impl Into<String>) -> Self {
        Self::new(text).with_tag(Tag::Meta)
    }

    /// Create a record tagged as echoed input
    pub fn echo(text: impl Into<String>) -> Self {
        Self::new(text).with_tag(Tag::Bold)
    }

    /// Add a tag to the record
    pub fn with_tag(mut self, tag: Tag) -> Self {
        if !self.tags.contains(&tag) {
            self.tags.push(tag);
        }
        self
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn tags(&self) -> &[Tag] {
        &self.tags
    }

    pub fn has_tag(&self, tag: &Tag) -> bool {
        self.tags.contains(tag)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Length of the payload in characters (transcript offsets are char-based)
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl From<&str> for OutputRecord {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for OutputRecord {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_tag_deduplicates() {
        let record = OutputRecord::error("boom").with_tag(Tag::Error).with_tag(Tag::Bold);
        assert_eq!(record.tags(), &[Tag::Error, Tag::Bold]);
    }

    #[test]
    fn test_char_len_counts_chars_not_bytes() {
        let record = OutputRecord::new("héllo\n");
        assert_eq!(record.char_len(), 6);
        assert!(record.text().len() > 6);
    }

    #[test]
    fn test_tag_display() {
        assert_eq!(Tag::Meta.to_string(), "color:meta");
        assert_eq!(Tag::Custom("color:accent".into()).to_string(), "color:accent");
    }

    #[test]
    fn test_serializes_without_empty_tags() {
        let json = serde_json::to_string(&OutputRecord::new("a")).unwrap();
        assert_eq!(json, r#"{"text":"a"}"#);
        let json = serde_json::to_string(&OutputRecord::meta("b")).unwrap();
        assert_eq!(json, r#"{"text":"b","tags":["meta"]}"#);
    }
}
