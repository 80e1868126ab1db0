//! Input identities and the intents they map to.
//!
//! The window layer translates toolkit events into [`Input`]; [`resolve`]
//! turns an input into either an [`Intent`] or a rename text edit. Whether
//! an intent may run in the current mode is decided by
//! [`Intent::allowed_in`], which the viewer checks before every dispatch.

use crate::mode::{Mode, TextEdit};

pub const HELP_KEYS: &str = "\
Key Bindings:
  Left / Backspace  : Previous image
  Right / Space     : Next image
  + / = / Wheel up  : Zoom in
  - / Wheel down    : Zoom out
  0                 : Fit to window
  1                 : Zoom 100%
  r / R             : Rotate 90 CW / CCW
  n / F2            : Rename
  N                 : Rename with capture date
  f / F11           : Toggle fullscreen
  o / O             : Open file or folder
  Delete            : Move to trash
  Enter             : Confirm rename
  Esc               : Cancel rename / leave fullscreen
";

/// A key as seen by the viewer, independent of the windowing toolkit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Space,
    Backspace,
    Delete,
    Enter,
    Escape,
    Home,
    End,
    F2,
    F11,
    Char(char),
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Input {
    Key(Key),
    /// Vertical wheel movement; positive is away from the user.
    Wheel(f32),
}

/// Which multiplier a zoom command uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoomStep {
    Key,
    Wheel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Prev,
    Next,
    ZoomIn(ZoomStep),
    ZoomOut(ZoomStep),
    Fit,
    Zoom100,
    RotateCW,
    RotateCCW,
    StartRename,
    StartRenameWithDate,
    ToggleFullscreen,
    Open,
    Delete,
    CommitRename,
    CancelOrExitFullscreen,
}

impl Intent {
    /// Browse-only intents are dropped while renaming; commit needs a
    /// draft; escape is always accepted.
    pub fn allowed_in(self, mode: &Mode) -> bool {
        match self {
            Intent::CancelOrExitFullscreen => true,
            Intent::CommitRename => mode.is_renaming(),
            _ => !mode.is_renaming(),
        }
    }
}

/// Outcome of looking up an input.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    Intent(Intent),
    Edit(TextEdit),
    Ignore,
}

/// Fixed key map, used in every mode.
pub fn intent_for(input: Input) -> Option<Intent> {
    let intent = match input {
        Input::Wheel(y) if y > 0.0 => Intent::ZoomIn(ZoomStep::Wheel),
        Input::Wheel(y) if y < 0.0 => Intent::ZoomOut(ZoomStep::Wheel),
        Input::Wheel(_) => return None,
        Input::Key(key) => match key {
            Key::Left | Key::Backspace => Intent::Prev,
            Key::Right | Key::Space => Intent::Next,
            Key::Char('+') | Key::Char('=') => Intent::ZoomIn(ZoomStep::Key),
            Key::Char('-') => Intent::ZoomOut(ZoomStep::Key),
            Key::Char('0') => Intent::Fit,
            Key::Char('1') => Intent::Zoom100,
            Key::Char('r') => Intent::RotateCW,
            Key::Char('R') => Intent::RotateCCW,
            Key::Char('n') | Key::F2 => Intent::StartRename,
            Key::Char('N') => Intent::StartRenameWithDate,
            Key::Char('f') | Key::F11 => Intent::ToggleFullscreen,
            Key::Char('o') | Key::Char('O') => Intent::Open,
            Key::Delete => Intent::Delete,
            Key::Enter => Intent::CommitRename,
            Key::Escape => Intent::CancelOrExitFullscreen,
            _ => return None,
        },
    };
    Some(intent)
}

/// Keys that belong to the text field while a rename is open.
fn text_edit_for(key: Key) -> Option<TextEdit> {
    let edit = match key {
        Key::Char(c) => TextEdit::Insert(c),
        Key::Space => TextEdit::Insert(' '),
        Key::Backspace => TextEdit::Backspace,
        Key::Delete => TextEdit::Delete,
        Key::Left => TextEdit::Left,
        Key::Right => TextEdit::Right,
        Key::Home => TextEdit::Home,
        Key::End => TextEdit::End,
        _ => return None,
    };
    Some(edit)
}

pub fn resolve(input: Input, mode: &Mode) -> Command {
    if mode.is_renaming() {
        if let Input::Key(key) = input {
            if let Some(edit) = text_edit_for(key) {
                return Command::Edit(edit);
            }
        }
    }
    intent_for(input).map_or(Command::Ignore, Command::Intent)
}
