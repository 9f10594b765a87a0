//! The renderer's text layout, as seen by the scroll anchor.
//!
//! The session never measures text itself. It asks a [`TextLayout`] supplied
//! by whatever renders the transcript to translate between character offsets
//! and vertical pixel positions. [`MonospaceLayout`] is a fixed-cell
//! implementation for hosts without a renderer of their own, and for tests.

mod monospace;

pub use monospace::MonospaceLayout;

/// Offset/pixel queries over the current layout of the transcript.
///
/// Lines are visual lines (after wrapping), numbered from 0. Offsets are
/// character offsets into the transcript text.
pub trait TextLayout {
    /// Line containing the character at `offset`. Offsets past the end map
    /// to the last line.
    fn line_for_offset(&self, offset: usize) -> usize;

    /// Line covering vertical position `y`. Positions outside the content
    /// clamp to the first or last line.
    fn line_for_vertical(&self, y: i32) -> usize;

    /// Top edge of `line`, in pixels from the top of the content.
    fn line_top(&self, line: usize) -> i32;

    /// Offset of the first character on `line`.
    fn line_start(&self, line: usize) -> usize;

    /// Total height of the laid-out content in pixels.
    fn height(&self) -> i32;
}

impl<T: TextLayout + ?Sized> TextLayout for &T {
    fn line_for_offset(&self, offset: usize) -> usize {
        (**self).line_for_offset(offset)
    }

    fn line_for_vertical(&self, y: i32) -> usize {
        (**self).line_for_vertical(y)
    }

    fn line_top(&self, line: usize) -> i32 {
        (**self).line_top(line)
    }

    fn line_start(&self, line: usize) -> usize {
        (**self).line_start(line)
    }

    fn height(&self) -> i32 {
        (**self).height()
    }
}
