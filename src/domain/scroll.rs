use serde::{Deserialize, Serialize};

/// Scroll position expressed in transcript terms rather than pixels.
///
/// Character offsets survive re-layout (a width change re-wraps lines but
/// never moves characters), so the anchor stays valid across resizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ScrollAnchor {
    /// The viewport was scrolled to the end of the transcript. New output
    /// keeps it pinned there.
    #[default]
    Bottom,
    /// First visible line starts at `char_offset`; the viewport top sits
    /// `pixel_adjust` pixels below that line's top.
    At { char_offset: usize, pixel_adjust: i32 },
}

impl ScrollAnchor {
    pub fn at(char_offset: usize, pixel_adjust: i32) -> Self {
        ScrollAnchor::At {
            char_offset,
            pixel_adjust,
        }
    }

    pub fn is_bottom(&self) -> bool {
        matches!(self, ScrollAnchor::Bottom)
    }

    /// Character offset of the anchor; the bottom sentinel resolves to the
    /// transcript length.
    pub fn char_offset(&self, transcript_len: usize) -> usize {
        match self {
            ScrollAnchor::Bottom => transcript_len,
            ScrollAnchor::At { char_offset, .. } => *char_offset,
        }
    }

    /// Shift the anchor after `dropped` characters were removed from the head
    /// of the transcript. Offsets that pointed into the dropped range clamp to
    /// the new start.
    pub fn shifted(self, dropped: usize) -> Self {
        match self {
            ScrollAnchor::Bottom => ScrollAnchor::Bottom,
            ScrollAnchor::At {
                char_offset,
                pixel_adjust,
            } => {
                if char_offset < dropped {
                    ScrollAnchor::at(0, 0)
                } else {
                    ScrollAnchor::at(char_offset - dropped, pixel_adjust)
                }
            }
        }
    }
}

/// A pending request to jump to one end of the transcript, resolved on the
/// next layout pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScrollRequest {
    Top,
    Bottom,
}
