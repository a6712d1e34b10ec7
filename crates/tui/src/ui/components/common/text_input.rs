//! Reusable UTF-8 safe text input state with cursor management.
//!
//! Login, search and every form field edit through this buffer, so cursor
//! movement behaves the same everywhere.

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TextInputState {
    /// The underlying text buffer
    input: String,
    /// Cursor byte index into `input` (always on a UTF-8 boundary)
    cursor: usize,
}

impl TextInputState {
    pub fn new() -> Self {
        Self::default()
    }

    // ----- Getters -----
    pub fn input(&self) -> &str {
        &self.input
    }
    pub fn cursor(&self) -> usize {
        self.cursor
    }
    pub fn is_empty(&self) -> bool {
        self.input.trim().is_empty()
    }

    /// Display width of the text before the cursor, for placing the terminal cursor.
    pub fn cursor_columns(&self) -> u16 {
        let width = unicode_width::UnicodeWidthStr::width(&self.input[..self.cursor]);
        u16::try_from(width).unwrap_or(u16::MAX)
    }

    // ----- Setters -----

    /// Replace the buffer and park the cursor at the end.
    pub fn set_input<S: Into<String>>(&mut self, s: S) {
        self.input = s.into();
        self.cursor = self.input.len();
    }

    pub fn clear(&mut self) {
        self.input.clear();
        self.cursor = 0;
    }

    // ----- Editing primitives (UTF-8 safe) -----

    /// Move cursor one Unicode scalar to the left.
    pub fn move_left(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev_len = self.input[..self.cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        self.cursor = self.cursor.saturating_sub(prev_len);
    }

    /// Move cursor one Unicode scalar to the right.
    pub fn move_right(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            self.cursor += next.len_utf8();
        }
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.input.len();
    }

    /// Insert a char at the cursor.
    pub fn insert_char(&mut self, c: char) {
        self.input.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Backspace the char immediately before the cursor.
    pub fn backspace(&mut self) {
        if self.cursor == 0 {
            return;
        }
        let prev = self.input[..self.cursor].chars().last().map(|c| c.len_utf8()).unwrap_or(1);
        let start = self.cursor - prev;
        self.input.drain(start..self.cursor);
        self.cursor = start;
    }

    /// Delete the char under the cursor.
    pub fn delete(&mut self) {
        if let Some(next) = self.input[self.cursor..].chars().next() {
            let end = self.cursor + next.len_utf8();
            self.input.drain(self.cursor..end);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn editing_respects_multibyte_boundaries() {
        let mut state = TextInputState::new();
        for c in "Köln".chars() {
            state.insert_char(c);
        }
        assert_eq!(state.input(), "Köln");
        assert_eq!(state.cursor(), "Köln".len());

        state.move_left();
        state.move_left();
        state.move_left();
        state.backspace();
        assert_eq!(state.input(), "öln");
        assert_eq!(state.cursor(), 0);

        state.delete();
        assert_eq!(state.input(), "ln");
        state.move_end();
        state.insert_char('!');
        assert_eq!(state.input(), "ln!");
        assert_eq!(state.cursor_columns(), 3);
    }

    #[test]
    fn set_input_parks_cursor_at_end() {
        let mut state = TextInputState::new();
        state.set_input("gw-01");
        assert_eq!(state.cursor(), 5);
        state.move_home();
        state.move_right();
        assert_eq!(state.cursor(), 1);
        state.clear();
        assert!(state.is_empty());
    }
}
