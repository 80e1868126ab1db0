//! Core of a small image viewer: the sibling file list, the view transform
//! and the browse/rename state machine. Window and toolkit glue live in the
//! binary.

pub mod error;
pub mod files;
pub mod input;
pub mod loader;
pub mod mode;
pub mod view;
pub mod viewer;

pub use error::{Result, ViewerError};
pub use viewer::{Effect, Viewer};
