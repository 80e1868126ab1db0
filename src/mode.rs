//! Interaction modes and the rename draft.

use crate::error::ViewerError;
use crate::files::ImageEntry;

/// Exclusive interaction mode. Fullscreen is tracked separately by the
/// viewer since it can be on in either mode.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Mode {
    #[default]
    Browse,
    Renaming(RenameDraft),
}

impl Mode {
    pub fn is_renaming(&self) -> bool {
        matches!(self, Mode::Renaming(_))
    }

    pub fn draft(&self) -> Option<&RenameDraft> {
        match self {
            Mode::Renaming(draft) => Some(draft),
            Mode::Browse => None,
        }
    }

    pub fn draft_mut(&mut self) -> Option<&mut RenameDraft> {
        match self {
            Mode::Renaming(draft) => Some(draft),
            Mode::Browse => None,
        }
    }
}

/// Editing operations on the rename buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextEdit {
    Insert(char),
    Backspace,
    Delete,
    Left,
    Right,
    Home,
    End,
}

/// The file being renamed and the stem typed so far.
#[derive(Debug, Clone, PartialEq)]
pub struct RenameDraft {
    target: ImageEntry,
    buffer: String,
    /// Byte offset of the caret; always on a char boundary.
    caret: usize,
    error: Option<String>,
    needs_ack: bool,
}

impl RenameDraft {
    pub fn new(target: ImageEntry, stem: impl Into<String>) -> Self {
        let buffer = stem.into();
        let caret = buffer.len();
        Self {
            target,
            buffer,
            caret,
            error: None,
            needs_ack: false,
        }
    }

    /// Like [`RenameDraft::new`] with the caret at byte offset `caret`
    /// (end of text if that is not a char boundary).
    pub fn with_caret(target: ImageEntry, stem: impl Into<String>, caret: usize) -> Self {
        let mut draft = Self::new(target, stem);
        if draft.buffer.is_char_boundary(caret) {
            draft.caret = caret;
        }
        draft
    }

    pub fn target(&self) -> &ImageEntry {
        &self.target
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn caret(&self) -> usize {
        self.caret
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// A conflict has been reported and not yet acknowledged.
    pub fn needs_ack(&self) -> bool {
        self.needs_ack
    }

    /// Record a failed commit. The text is left as typed.
    pub fn fail(&mut self, err: &ViewerError) {
        self.error = Some(err.to_string());
        self.needs_ack = err.needs_acknowledgment();
    }

    pub fn acknowledge(&mut self) {
        self.error = None;
        self.needs_ack = false;
    }

    pub fn edit(&mut self, edit: TextEdit) {
        if self.needs_ack {
            self.acknowledge();
        }
        match edit {
            TextEdit::Insert(c) => {
                if !c.is_control() {
                    self.buffer.insert(self.caret, c);
                    self.caret += c.len_utf8();
                }
            }
            TextEdit::Backspace => {
                if let Some(c) = self.buffer[..self.caret].chars().next_back() {
                    self.caret -= c.len_utf8();
                    self.buffer.remove(self.caret);
                }
            }
            TextEdit::Delete => {
                if self.caret < self.buffer.len() {
                    self.buffer.remove(self.caret);
                }
            }
            TextEdit::Left => {
                if let Some(c) = self.buffer[..self.caret].chars().next_back() {
                    self.caret -= c.len_utf8();
                }
            }
            TextEdit::Right => {
                if let Some(c) = self.buffer[self.caret..].chars().next() {
                    self.caret += c.len_utf8();
                }
            }
            TextEdit::Home => self.caret = 0,
            TextEdit::End => self.caret = self.buffer.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn draft(stem: &str) -> RenameDraft {
        RenameDraft::new(ImageEntry::new(PathBuf::from("/p/IMG_1.jpg")), stem)
    }

    #[test]
    fn test_new_draft_caret_at_end() {
        let d = draft("IMG_1");
        assert_eq!(d.buffer(), "IMG_1");
        assert_eq!(d.caret(), 5);
        assert!(d.error().is_none());
    }

    #[test]
    fn test_with_caret_inserts_after_prefix() {
        let target = ImageEntry::new(PathBuf::from("/p/IMG_1.jpg"));
        let mut d = RenameDraft::with_caret(target.clone(), "2024-05-01_IMG_1", 11);
        assert_eq!(d.caret(), 11);
        d.edit(TextEdit::Insert('x'));
        assert_eq!(d.buffer(), "2024-05-01_xIMG_1");

        let d = RenameDraft::with_caret(target.clone(), "é", 1);
        assert_eq!(d.caret(), 2);
        let d = RenameDraft::with_caret(target, "ab", 9);
        assert_eq!(d.caret(), 2);
    }

    #[test]
    fn test_insert_and_backspace_at_caret() {
        let mut d = draft("ac");
        d.edit(TextEdit::Left);
        d.edit(TextEdit::Insert('b'));
        assert_eq!(d.buffer(), "abc");
        assert_eq!(d.caret(), 2);

        d.edit(TextEdit::Backspace);
        d.edit(TextEdit::Backspace);
        d.edit(TextEdit::Backspace);
        assert_eq!(d.buffer(), "c");
        assert_eq!(d.caret(), 0);
    }

    #[test]
    fn test_multibyte_editing() {
        let mut d = draft("");
        d.edit(TextEdit::Insert('é'));
        d.edit(TextEdit::Insert('t'));
        d.edit(TextEdit::Insert('é'));
        d.edit(TextEdit::Home);
        d.edit(TextEdit::Delete);
        assert_eq!(d.buffer(), "té");
        d.edit(TextEdit::End);
        d.edit(TextEdit::Backspace);
        assert_eq!(d.buffer(), "t");
        d.edit(TextEdit::Right);
        assert_eq!(d.caret(), 1);
    }

    #[test]
    fn test_control_chars_are_ignored() {
        let mut d = draft("x");
        d.edit(TextEdit::Insert('\r'));
        d.edit(TextEdit::Insert('\u{1b}'));
        assert_eq!(d.buffer(), "x");
    }

    #[test]
    fn test_conflict_needs_ack_and_edit_acknowledges() {
        let mut d = draft("b");
        d.fail(&ViewerError::Conflict(PathBuf::from("/p/b.jpg")));
        assert!(d.needs_ack());
        assert_eq!(d.error(), Some("/p/b.jpg already exists"));

        d.edit(TextEdit::Insert('2'));
        assert!(!d.needs_ack());
        assert!(d.error().is_none());
        assert_eq!(d.buffer(), "b2");
    }

    #[test]
    fn test_empty_name_does_not_need_ack() {
        let mut d = draft("");
        d.fail(&ViewerError::EmptyName);
        assert!(!d.needs_ack());
        assert_eq!(d.error(), Some("name cannot be empty"));
    }

    #[test]
    fn test_mode_accessors() {
        let mut mode = Mode::default();
        assert!(!mode.is_renaming());
        assert!(mode.draft().is_none());

        mode = Mode::Renaming(draft("x"));
        assert!(mode.is_renaming());
        mode.draft_mut().unwrap().edit(TextEdit::Insert('y'));
        assert_eq!(mode.draft().unwrap().buffer(), "xy");
    }
}
