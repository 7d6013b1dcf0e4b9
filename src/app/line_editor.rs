use std::cmp::min;

/// Single-line input buffer behind the terminal prompt.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct LineEditor {
    pub text: String,
    pub cursor_col: usize,
}

impl LineEditor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_text(text: &str) -> Self {
        let text = flatten_line_breaks(text);
        let cursor_col = text.chars().count();
        Self { text, cursor_col }
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn clear(&mut self) {
        self.text.clear();
        self.cursor_col = 0;
    }

    pub fn insert_char(&mut self, ch: char) {
        let mut buffer = [0u8; 4];
        self.insert_str(ch.encode_utf8(&mut buffer));
    }

    pub fn insert_str(&mut self, text: &str) {
        let flattened = flatten_line_breaks(text);
        if flattened.is_empty() {
            return;
        }

        self.clamp_cursor();
        let byte_index = char_to_byte_index(&self.text, self.cursor_col);
        self.text.insert_str(byte_index, &flattened);
        self.cursor_col += flattened.chars().count();
    }

    pub fn backspace(&mut self) {
        self.clamp_cursor();
        if self.cursor_col == 0 {
            return;
        }

        self.cursor_col -= 1;
        let byte_index = char_to_byte_index(&self.text, self.cursor_col);
        self.text.remove(byte_index);
    }

    pub fn delete_forward(&mut self) {
        self.clamp_cursor();
        if self.cursor_col >= self.text.chars().count() {
            return;
        }

        let byte_index = char_to_byte_index(&self.text, self.cursor_col);
        self.text.remove(byte_index);
    }

    pub fn move_left(&mut self) {
        self.clamp_cursor();
        self.cursor_col = self.cursor_col.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        self.clamp_cursor();
        self.cursor_col = (self.cursor_col + 1).min(self.text.chars().count());
    }

    pub fn move_home(&mut self) {
        self.cursor_col = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor_col = self.text.chars().count();
    }

    fn clamp_cursor(&mut self) {
        let len = self.text.chars().count();
        self.cursor_col = min(self.cursor_col, len);
    }
}

// Pasted text may carry newlines; the prompt only ever holds one line.
fn flatten_line_breaks(text: &str) -> String {
    text.chars()
        .filter(|ch| *ch != '\r')
        .map(|ch| match ch {
            '\n' | '\t' => ' ',
            other => other,
        })
        .collect()
}

fn char_to_byte_index(text: &str, char_index: usize) -> usize {
    match text.char_indices().nth(char_index) {
        Some((idx, _)) => idx,
        None => text.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edits_at_cursor_with_multibyte_chars() {
        let mut editor = LineEditor::new();
        editor.insert_str("Zoe");
        editor.move_left();
        editor.backspace();
        editor.insert_char('ö');
        assert_eq!(editor.text, "Zöe");
        assert_eq!(editor.cursor_col, 2);

        editor.delete_forward();
        assert_eq!(editor.text, "Zö");
        editor.move_home();
        editor.delete_forward();
        assert_eq!(editor.text, "ö");
    }

    #[test]
    fn paste_flattens_newlines_but_keeps_spacing() {
        let mut editor = LineEditor::new();
        editor.insert_str("Hello,\r\nI would  like\ta quote.");
        assert_eq!(editor.text, "Hello, I would  like a quote.");
    }

    #[test]
    fn clear_resets_text_and_cursor() {
        let mut editor = LineEditor::from_text("help");
        assert_eq!(editor.cursor_col, 4);
        editor.clear();
        assert!(editor.is_empty());
        assert_eq!(editor.cursor_col, 0);
    }
}
