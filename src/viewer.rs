//! The viewer core: owns the file set, view transform, mode and the decoded
//! image, and routes intents to them.
//!
//! Everything runs on the caller's thread. The window layer feeds
//! [`Input`]s in and applies the returned [`Effect`].

use std::path::Path;

use crate::error::ViewerError;
use crate::files::{self, DeleteMode, FileSet};
use crate::input::{self, Command, Input, Intent, ZoomStep};
use crate::loader::{self, DecodedImage};
use crate::mode::{Mode, RenameDraft};
use crate::view::{self, RenderPlan, ViewState};

pub const APP_NAME: &str = "MiniView";
pub const NO_IMAGE_STATUS: &str = "Open (O) file or folder...";

/// What the window layer has to do after an input was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    None,
    Redraw,
    /// Switch the window to (true) or out of (false) fullscreen
    Fullscreen(bool),
    /// Ask the user for a file or folder, then call [`Viewer::open_path`]
    OpenDialog,
}

pub struct Viewer {
    files: FileSet,
    view: ViewState,
    mode: Mode,
    fullscreen: bool,
    image: Option<DecodedImage>,
    status: String,
    delete_mode: DeleteMode,
}

impl Viewer {
    pub fn new(delete_mode: DeleteMode) -> Self {
        Self {
            files: FileSet::default(),
            view: ViewState::default(),
            mode: Mode::Browse,
            fullscreen: false,
            image: None,
            status: NO_IMAGE_STATUS.to_string(),
            delete_mode,
        }
    }

    pub fn files(&self) -> &FileSet {
        &self.files
    }

    pub fn view(&self) -> &ViewState {
        &self.view
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Used at startup; does not go through the dispatcher.
    pub fn set_fullscreen(&mut self, on: bool) {
        self.fullscreen = on;
    }

    pub fn image(&self) -> Option<&DecodedImage> {
        self.image.as_ref()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn title(&self) -> String {
        match self.files.current() {
            Some(entry) => format!("{} - {}", entry.file_name(), APP_NAME),
            None => APP_NAME.to_string(),
        }
    }

    pub fn render_plan(&self, view_w: u32, view_h: u32) -> Option<RenderPlan> {
        let img = self.image.as_ref()?;
        self.view.render_plan(img.width(), img.height(), view_w, view_h)
    }

    // ------------------------------------------------------------------
    // Dispatch
    // ------------------------------------------------------------------

    pub fn handle_input(&mut self, input: Input) -> Effect {
        match input::resolve(input, &self.mode) {
            Command::Intent(intent) => self.dispatch(intent),
            Command::Edit(edit) => match self.mode.draft_mut() {
                Some(draft) => {
                    draft.edit(edit);
                    Effect::Redraw
                }
                None => Effect::None,
            },
            Command::Ignore => Effect::None,
        }
    }

    /// Run `intent` if the current mode allows it; otherwise drop it.
    pub fn dispatch(&mut self, intent: Intent) -> Effect {
        if !intent.allowed_in(&self.mode) {
            log::trace!("dropping {:?}, not valid in this mode", intent);
            return Effect::None;
        }
        match intent {
            Intent::Prev => self.navigate(-1),
            Intent::Next => self.navigate(1),
            Intent::ZoomIn(ZoomStep::Key) => self.zoom_by(view::KEY_ZOOM_IN),
            Intent::ZoomIn(ZoomStep::Wheel) => self.zoom_by(view::WHEEL_ZOOM_IN),
            Intent::ZoomOut(ZoomStep::Key) => self.zoom_by(view::KEY_ZOOM_OUT),
            Intent::ZoomOut(ZoomStep::Wheel) => self.zoom_by(view::WHEEL_ZOOM_OUT),
            Intent::Fit => {
                self.view.fit();
                Effect::Redraw
            }
            Intent::Zoom100 => self.set_zoom(1.0),
            Intent::RotateCW => self.rotate(90),
            Intent::RotateCCW => self.rotate(-90),
            Intent::StartRename => self.start_rename(false),
            Intent::StartRenameWithDate => self.start_rename(true),
            Intent::ToggleFullscreen => {
                self.fullscreen = !self.fullscreen;
                Effect::Fullscreen(self.fullscreen)
            }
            Intent::Open => Effect::OpenDialog,
            Intent::Delete => self.delete_current(),
            Intent::CommitRename => self.commit_rename(),
            Intent::CancelOrExitFullscreen => self.cancel_or_exit_fullscreen(),
        }
    }

    // ------------------------------------------------------------------
    // Files
    // ------------------------------------------------------------------

    /// Replace the file set with the directory of `path` (or `path` itself
    /// if it is a directory). On failure the current set is kept.
    pub fn open_path(&mut self, path: &Path) -> Effect {
        if self.mode.is_renaming() {
            return Effect::None;
        }
        match FileSet::open_path(path) {
            Ok(files) => {
                self.files = files;
                if self.files.is_empty() {
                    self.image = None;
                    self.view.reset_for_new_image();
                    self.status = "No images found in that location.".to_string();
                } else {
                    self.load_current();
                }
            }
            Err(e) => {
                log::warn!("{}", e);
                self.status = format!("Open failed: {}", e);
            }
        }
        Effect::Redraw
    }

    fn navigate(&mut self, delta: isize) -> Effect {
        match self.files.advance(delta) {
            Ok(idx) => {
                log::debug!("[nav] -> {}", idx);
                self.load_current();
            }
            Err(e) => {
                log::debug!("[nav] {}", e);
                self.status = "No images loaded.".to_string();
            }
        }
        Effect::Redraw
    }

    /// Decode the entry under the cursor and reset the view for it.
    fn load_current(&mut self) {
        self.view.reset_for_new_image();
        let Some(entry) = self.files.current() else {
            self.image = None;
            return;
        };
        match loader::decode_image(entry.path()) {
            Ok(img) => {
                self.image = Some(img);
                self.status = self.position_status();
            }
            Err(e) => {
                log::warn!("{}", e);
                let reason = match &e {
                    ViewerError::Decode { reason, .. } => reason.clone(),
                    other => other.to_string(),
                };
                self.status = format!("Failed to open: {} ({})", entry.file_name(), reason);
                self.image = None;
            }
        }
    }

    fn position_status(&self) -> String {
        let Some(entry) = self.files.current() else {
            return "No images loaded.".to_string();
        };
        let mut status = format!(
            "{}  [{}/{}]",
            entry.file_name(),
            self.files.cursor() + 1,
            self.files.len()
        );
        if let Some(img) = &self.image {
            status.push_str(&format!("  {}x{}", img.width(), img.height()));
        }
        status
    }

    fn delete_current(&mut self) -> Effect {
        let Some(entry) = self.files.current().cloned() else {
            self.status = "No image to delete.".to_string();
            return Effect::Redraw;
        };
        if let Err(e) = files::delete_file(entry.path(), self.delete_mode) {
            log::warn!("{}", e);
            self.status = e.to_string();
            return Effect::Redraw;
        }
        if self.files.remove_current().is_err() {
            return Effect::Redraw;
        }
        if self.files.is_empty() {
            self.image = None;
            self.view.reset_for_new_image();
            self.status = "No images left.".to_string();
        } else {
            self.load_current();
            self.status = format!("Deleted {}  |  {}", entry.file_name(), self.status);
        }
        Effect::Redraw
    }

    // ------------------------------------------------------------------
    // View
    // ------------------------------------------------------------------

    fn zoom_by(&mut self, factor: f32) -> Effect {
        if self.image.is_none() {
            return Effect::None;
        }
        self.view.zoom_by(factor);
        Effect::Redraw
    }

    fn set_zoom(&mut self, zoom: f32) -> Effect {
        if self.image.is_none() {
            return Effect::None;
        }
        self.view.set_zoom(zoom);
        Effect::Redraw
    }

    fn rotate(&mut self, degrees: i32) -> Effect {
        let Some(img) = self.image.as_mut() else {
            return Effect::None;
        };
        img.rotate(degrees);
        self.view.rotate(degrees);
        self.status = self.position_status();
        Effect::Redraw
    }

    // ------------------------------------------------------------------
    // Rename
    // ------------------------------------------------------------------

    /// Open a rename draft for the current entry. Entries that failed to
    /// decode can still be renamed.
    fn start_rename(&mut self, with_date: bool) -> Effect {
        let Some(entry) = self.files.current().cloned() else {
            return Effect::None;
        };

        let stem = entry.stem();
        let draft = if with_date {
            let date = loader::capture_date(entry.path());
            if date.is_none() {
                log::debug!("no capture date for {:?}", entry.path());
            }
            let (text, caret) = loader::dated_stem(&stem, date.as_ref());
            RenameDraft::with_caret(entry, text, caret)
        } else {
            RenameDraft::new(entry, stem)
        };

        self.status = "Rename: Enter to confirm, Esc to cancel".to_string();
        self.mode = Mode::Renaming(draft);
        Effect::Redraw
    }

    fn commit_rename(&mut self) -> Effect {
        let Some(draft) = self.mode.draft_mut() else {
            return Effect::None;
        };
        if draft.needs_ack() {
            draft.acknowledge();
            return Effect::Redraw;
        }
        let stem = draft.buffer().to_string();

        match self.files.rename_current(&stem) {
            Ok(entry) => {
                let name = entry.file_name();
                self.mode = Mode::Browse;
                self.status = format!("Renamed to {}  |  {}", name, self.position_status());
            }
            Err(ViewerError::NoOpRename) => {
                self.mode = Mode::Browse;
                self.status = self.position_status();
            }
            Err(e) => {
                log::warn!("rename failed: {}", e);
                if let Some(draft) = self.mode.draft_mut() {
                    draft.fail(&e);
                }
                self.status = format!("Rename failed: {}", e);
            }
        }
        Effect::Redraw
    }

    fn cancel_or_exit_fullscreen(&mut self) -> Effect {
        if self.mode.is_renaming() {
            self.mode = Mode::Browse;
            self.status = self.position_status();
            return Effect::Redraw;
        }
        if self.fullscreen {
            self.fullscreen = false;
            return Effect::Fullscreen(false);
        }
        Effect::None
    }
}
