/// The host's line-input widget, as far as the session needs it.
pub trait InputWidget {
    /// Current contents, without a line break
    fn text(&self) -> String;

    /// Empty the widget after submission
    fn clear(&mut self);
}

impl InputWidget for String {
    fn text(&self) -> String {
        self.trim_end_matches(['\r', '\n']).to_string()
    }

    fn clear(&mut self) {
        String::clear(self);
    }
}
