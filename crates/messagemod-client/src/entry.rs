use messagemod_protocol::MAX_TEXT_UNITS;

/// The message entry field.
///
/// Input is capped at [`MAX_TEXT_UNITS`] characters as it is typed, so
/// the field can never hold more than the server will keep. Submitting
/// trims surrounding whitespace and yields nothing when the remainder
/// is empty.
#[derive(Debug, Default)]
pub struct EntryForm {
    text: String,
}

impl EntryForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a character, rejecting input once the field is full.
    /// Returns whether the character was accepted.
    pub fn push(&mut self, ch: char) -> bool {
        if self.text.chars().count() >= MAX_TEXT_UNITS {
            return false;
        }
        self.text.push(ch);
        true
    }

    /// Replaces the field content, keeping at most the first
    /// [`MAX_TEXT_UNITS`] characters.
    pub fn set_text(&mut self, text: &str) {
        self.text = text.chars().take(MAX_TEXT_UNITS).collect();
    }

    /// Removes the last character, if any.
    pub fn backspace(&mut self) {
        self.text.pop();
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Clears the field without submitting.
    pub fn cancel(&mut self) {
        self.text.clear();
    }

    /// Takes the trimmed content and clears the field. Returns `None`
    /// when nothing but whitespace was entered, in which case there is
    /// nothing to send.
    pub fn submit(&mut self) -> Option<String> {
        let text = std::mem::take(&mut self.text);
        let trimmed = text.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_submit_trims_whitespace() {
        let mut form = EntryForm::new();
        form.set_text("  hello world  ");
        assert_eq!(form.submit(), Some("hello world".to_string()));
        assert_eq!(form.text(), "");
    }

    #[test]
    fn test_empty_submit_yields_nothing() {
        let mut form = EntryForm::new();
        assert_eq!(form.submit(), None);
        form.set_text("   \t  ");
        assert_eq!(form.submit(), None);
    }

    #[test]
    fn test_push_rejects_past_the_cap() {
        let mut form = EntryForm::new();
        for _ in 0..MAX_TEXT_UNITS {
            assert!(form.push('x'));
        }
        assert!(!form.push('y'));
        assert_eq!(form.text().chars().count(), MAX_TEXT_UNITS);
    }

    #[test]
    fn test_set_text_truncates_by_characters() {
        let mut form = EntryForm::new();
        form.set_text(&"\u{2603}".repeat(300));
        assert_eq!(form.text().chars().count(), MAX_TEXT_UNITS);
    }

    #[test]
    fn test_backspace_and_cancel() {
        let mut form = EntryForm::new();
        form.set_text("hi");
        form.backspace();
        assert_eq!(form.text(), "h");
        form.cancel();
        assert_eq!(form.text(), "");
    }
}
