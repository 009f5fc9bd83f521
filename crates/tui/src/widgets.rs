use std::time::{Duration, Instant};

/// Delay between revealed characters of the hero headline.
pub const TYPING_INTERVAL: Duration = Duration::from_millis(100);

/// Single-line editable text field.
#[derive(Debug, Clone, Default)]
pub struct TextInput {
    input: String,
    /// Cursor position in characters, not bytes.
    cursor: usize,
    max_len: usize,
}

impl TextInput {
    pub fn new(max_len: usize) -> Self {
        Self {
            input: String::new(),
            cursor: 0,
            max_len,
        }
    }

    pub fn value(&self) -> &str {
        &self.input
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_blank(&self) -> bool {
        self.input.trim().is_empty()
    }

    pub fn move_cursor(&mut self, delta: isize) {
        let len = self.char_len() as isize;
        self.cursor = (self.cursor as isize + delta).clamp(0, len) as usize;
    }

    pub fn move_home(&mut self) {
        self.cursor = 0;
    }

    pub fn move_end(&mut self) {
        self.cursor = self.char_len();
    }

    pub fn insert(&mut self, ch: char) {
        if ch.is_control() || self.char_len() >= self.max_len {
            return;
        }
        let at = self.byte_index(self.cursor);
        self.input.insert(at, ch);
        self.cursor += 1;
    }

    pub fn backspace(&mut self) {
        if self.cursor > 0 {
            self.cursor -= 1;
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    pub fn delete(&mut self) {
        if self.cursor < self.char_len() {
            let at = self.byte_index(self.cursor);
            self.input.remove(at);
        }
    }

    /// Return the current text and reset the field.
    pub fn take(&mut self) -> String {
        self.cursor = 0;
        std::mem::take(&mut self.input)
    }

    pub fn clear(&mut self) {
        self.take();
    }

    fn char_len(&self) -> usize {
        self.input.chars().count()
    }

    fn byte_index(&self, chars: usize) -> usize {
        self.input
            .char_indices()
            .nth(chars)
            .map(|(idx, _)| idx)
            .unwrap_or(self.input.len())
    }
}

/// Headline that reveals itself one character per [`TYPING_INTERVAL`].
#[derive(Debug, Clone)]
pub struct TypingText {
    text: &'static str,
    started: Instant,
}

impl TypingText {
    pub fn new(text: &'static str) -> Self {
        Self {
            text,
            started: Instant::now(),
        }
    }

    /// Start revealing from the first character again.
    pub fn restart(&mut self) {
        self.started = Instant::now();
    }

    /// Portion of the text visible at `now`.
    pub fn visible_at(&self, now: Instant) -> &'static str {
        let elapsed = now.saturating_duration_since(self.started);
        let shown = (elapsed.as_millis() / TYPING_INTERVAL.as_millis()) as usize;
        match self.text.char_indices().nth(shown) {
            Some((idx, _)) => &self.text[..idx],
            None => self.text,
        }
    }

    pub fn is_complete_at(&self, now: Instant) -> bool {
        self.visible_at(now).len() == self.text.len()
    }
}

/// Greedy word wrap to `width` columns; words longer than a line are split.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();
    for paragraph in text.split('\n') {
        let mut line = String::new();
        let mut line_len = 0;
        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(word.drain(..width).collect());
            }
            if word.is_empty() {
                continue;
            }
            let needed = if line_len == 0 { word.len() } else { line_len + 1 + word.len() };
            if needed > width {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(word.iter());
            line_len += word.len();
        }
        lines.push(line);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn typing_and_editing() {
        let mut input = TextInput::new(16);
        for ch in "Rudlph".chars() {
            input.insert(ch);
        }
        input.move_cursor(-3);
        input.insert('o');
        assert_eq!(input.value(), "Rudolph");
        assert_eq!(input.cursor(), 4);

        input.move_home();
        input.delete();
        input.insert('r');
        assert_eq!(input.value(), "rudolph");

        input.move_end();
        input.backspace();
        assert_eq!(input.value(), "rudolp");
    }

    #[test]
    fn respects_max_len_and_control_chars() {
        let mut input = TextInput::new(3);
        for ch in "abcd".chars() {
            input.insert(ch);
        }
        input.insert('\n');
        assert_eq!(input.value(), "abc");
    }

    #[test]
    fn handles_multibyte_characters() {
        let mut input = TextInput::new(10);
        for ch in "ñé❄".chars() {
            input.insert(ch);
        }
        input.move_cursor(-1);
        input.backspace();
        assert_eq!(input.value(), "ñ❄");
        input.move_cursor(10);
        assert_eq!(input.cursor(), 2);
    }

    #[test]
    fn take_resets_field() {
        let mut input = TextInput::new(10);
        input.insert('x');
        assert_eq!(input.take(), "x");
        assert!(input.is_blank());
        assert_eq!(input.cursor(), 0);
    }

    #[test]
    fn wraps_on_word_boundaries() {
        assert_eq!(
            wrap_text("Ho ho ho gamer, gg", 8),
            vec!["Ho ho ho", "gamer,", "gg"]
        );
        assert_eq!(wrap_text("supercalifragilistic", 8), vec!["supercal", "ifragili", "stic"]);
        assert_eq!(wrap_text("a\n\nb", 5), vec!["a", "", "b"]);
        assert_eq!(wrap_text("", 5), vec![""]);
    }

    #[test]
    fn typing_text_reveals_over_time() {
        let text = TypingText::new("LEVEL UP");
        let start = text.started;
        assert_eq!(text.visible_at(start), "");
        assert_eq!(text.visible_at(start + Duration::from_millis(250)), "LE");
        assert!(!text.is_complete_at(start + Duration::from_millis(700)));
        assert_eq!(text.visible_at(start + Duration::from_secs(5)), "LEVEL UP");
        assert!(text.is_complete_at(start + Duration::from_secs(5)));
    }
}
