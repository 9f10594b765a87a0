//! Saving and restoring the scroll position across re-layout.
//!
//! Saving goes pixel → line → offset; restoring goes offset → line → pixel.
//! Because character offsets are stable when the viewport is re-wrapped, an
//! anchor saved at one width restores to the same text at any other width.

use crate::domain::ScrollAnchor;
use crate::layout::TextLayout;

/// What the viewer reports about its scroll view.
///
/// `height` is the visible height of the scroll area (padding excluded);
/// `layout` is `None` until the renderer has laid the transcript out.
#[derive(Clone, Copy)]
pub struct ViewportState<'a> {
    pub width: i32,
    pub height: i32,
    pub scroll_y: i32,
    pub layout: Option<&'a dyn TextLayout>,
}

impl<'a> ViewportState<'a> {
    pub fn new(width: i32, height: i32, scroll_y: i32) -> Self {
        Self {
            width,
            height,
            scroll_y,
            layout: None,
        }
    }

    pub fn with_layout(mut self, layout: &'a dyn TextLayout) -> Self {
        self.layout = Some(layout);
        self
    }

    /// The same viewport scrolled to `scroll_y`
    pub fn scrolled_to(mut self, scroll_y: i32) -> Self {
        self.scroll_y = scroll_y;
        self
    }

    pub fn size(&self) -> (i32, i32) {
        (self.width, self.height)
    }

    pub fn content_height(&self) -> i32 {
        self.layout.map_or(0, |layout| layout.height())
    }

    /// Largest meaningful scroll offset
    pub fn max_scroll(&self) -> i32 {
        (self.content_height() - self.height).max(0)
    }

    pub fn is_at_bottom(&self) -> bool {
        self.scroll_y >= self.max_scroll()
    }
}

impl std::fmt::Debug for ViewportState<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ViewportState")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("scroll_y", &self.scroll_y)
            .field("content_height", &self.content_height())
            .finish()
    }
}

/// Compute the anchor for the viewport's current position.
///
/// Returns `None` when there is no layout to query yet.
pub fn save(view: &ViewportState<'_>) -> Option<ScrollAnchor> {
    let layout = view.layout?;
    if view.is_at_bottom() {
        return Some(ScrollAnchor::Bottom);
    }

    let line = layout.line_for_vertical(view.scroll_y);
    Some(ScrollAnchor::at(
        layout.line_start(line),
        view.scroll_y - layout.line_top(line),
    ))
}

/// Compute the scroll offset that shows `anchor` in this viewport.
///
/// The result is clamped to `[0, max_scroll]`. Returns `None` when there is
/// no layout yet.
pub fn restore(anchor: &ScrollAnchor, view: &ViewportState<'_>) -> Option<i32> {
    let layout = view.layout?;
    match *anchor {
        ScrollAnchor::Bottom => Some(view.max_scroll()),
        ScrollAnchor::At {
            char_offset,
            pixel_adjust,
        } => {
            let line = layout.line_for_offset(char_offset);
            Some((layout.line_top(line) + pixel_adjust).clamp(0, view.max_scroll()))
        }
    }
}
