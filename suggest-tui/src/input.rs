use unicode_segmentation::UnicodeSegmentation;

/// Single-line text input with a byte cursor that always sits on a grapheme
/// boundary.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputField {
    text: String,
    cursor: usize,
}

impl InputField {
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Replace the contents and park the cursor at the end.
    pub fn set_text(&mut self, text: &str) {
        text.clone_into(&mut self.text);
        self.cursor = self.text.len();
    }

    fn boundaries(&self) -> Vec<usize> {
        let mut boundaries: Vec<usize> = self.text.grapheme_indices(true).map(|(i, _)| i).collect();
        boundaries.push(self.text.len());
        boundaries
    }

    fn cursor_index(&self, boundaries: &[usize]) -> usize {
        match boundaries.binary_search(&self.cursor) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    pub fn insert(&mut self, c: char) {
        self.text.insert(self.cursor, c);
        self.cursor += c.len_utf8();
    }

    /// Returns whether anything was removed.
    pub fn backspace(&mut self) -> bool {
        let boundaries = self.boundaries();
        let idx = self.cursor_index(&boundaries);
        if idx == 0 {
            return false;
        }
        let start = boundaries[idx - 1];
        self.text.replace_range(start..boundaries[idx], "");
        self.cursor = start;
        true
    }

    pub fn delete(&mut self) -> bool {
        let boundaries = self.boundaries();
        let idx = self.cursor_index(&boundaries);
        let Some(&end) = boundaries.get(idx + 1) else {
            return false;
        };
        self.text.replace_range(boundaries[idx]..end, "");
        true
    }

    /// Remove the word before the cursor along with trailing whitespace.
    pub fn delete_word(&mut self) -> bool {
        let start = self.prev_word_start();
        if start == self.cursor {
            return false;
        }
        self.text.replace_range(start..self.cursor, "");
        self.cursor = start;
        true
    }

    pub fn clear(&mut self) -> bool {
        if self.text.is_empty() {
            return false;
        }
        self.text.clear();
        self.cursor = 0;
        true
    }

    pub fn left(&mut self) {
        let boundaries = self.boundaries();
        let idx = self.cursor_index(&boundaries);
        if idx > 0 {
            self.cursor = boundaries[idx - 1];
        }
    }

    pub fn right(&mut self) {
        let boundaries = self.boundaries();
        let idx = self.cursor_index(&boundaries);
        if let Some(&next) = boundaries.get(idx + 1) {
            self.cursor = next;
        }
    }

    pub fn home(&mut self) {
        self.cursor = 0;
    }

    pub fn end(&mut self) {
        self.cursor = self.text.len();
    }

    fn prev_word_start(&self) -> usize {
        let before: Vec<(usize, &str)> = self.text[..self.cursor].grapheme_indices(true).collect();
        let is_space = |g: &str| g.chars().all(char::is_whitespace);
        let mut idx = before.len();
        while idx > 0 && is_space(before[idx - 1].1) {
            idx -= 1;
        }
        while idx > 0 && !is_space(before[idx - 1].1) {
            idx -= 1;
        }
        before.get(idx).map_or(self.cursor, |(start, _)| *start)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(text: &str) -> InputField {
        let mut field = InputField::default();
        field.set_text(text);
        field
    }

    #[test]
    fn insert_and_backspace_at_end() {
        let mut input = InputField::default();
        for c in "lin".chars() {
            input.insert(c);
        }
        assert_eq!(input.text(), "lin");
        assert!(input.backspace());
        assert_eq!(input.text(), "li");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn backspace_removes_whole_grapheme() {
        let mut input = field("ae\u{0301}");
        assert!(input.backspace());
        assert_eq!(input.text(), "a");
        assert!(input.backspace());
        assert!(!input.backspace());
    }

    #[test]
    fn insert_in_the_middle() {
        let mut input = field("Lncoln");
        input.home();
        input.right();
        input.insert('i');
        assert_eq!(input.text(), "Lincoln");
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn delete_forward() {
        let mut input = field("👩‍💻x");
        input.home();
        assert!(input.delete());
        assert_eq!(input.text(), "x");
        input.end();
        assert!(!input.delete());
    }

    #[test]
    fn left_right_step_over_graphemes() {
        let mut input = field("a👩‍💻b");
        input.left();
        assert_eq!(input.cursor(), "a👩‍💻".len());
        input.left();
        assert_eq!(input.cursor(), 1);
        input.left();
        input.left();
        assert_eq!(input.cursor(), 0);
        input.right();
        input.right();
        assert_eq!(input.cursor(), "a👩‍💻".len());
    }

    #[test]
    fn delete_word_eats_trailing_space() {
        let mut input = field("abraham lincoln  ");
        assert!(input.delete_word());
        assert_eq!(input.text(), "abraham ");
        assert!(input.delete_word());
        assert_eq!(input.text(), "");
        assert!(!input.delete_word());
    }

    #[test]
    fn clear_empties_the_field() {
        let mut input = field("grant");
        assert!(input.clear());
        assert_eq!(input.text(), "");
        assert_eq!(input.cursor(), 0);
        assert!(!input.clear());
    }
}
