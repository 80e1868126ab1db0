//! Error type shared by the file set, loader and viewer.
//!
//! Nothing here is fatal: the viewer turns every variant into status text.

use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum ViewerError {
    /// Open target is missing or cannot be read
    #[error("cannot open {}: {source}", .path.display())]
    NotFound {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Navigation or an edit was attempted with no images loaded
    #[error("no images loaded")]
    EmptySet,

    #[error("name cannot be empty")]
    EmptyName,

    /// Stem would move the file out of its directory
    #[error("invalid name: {0}")]
    InvalidName(String),

    #[error("name is unchanged")]
    NoOpRename,

    #[error("{} already exists", .0.display())]
    Conflict(PathBuf),

    #[error("cannot decode {}: {reason}", .path.display())]
    Decode { path: PathBuf, reason: String },

    #[error("cannot delete {}: {reason}", .path.display())]
    Delete { path: PathBuf, reason: String },

    #[error("cannot rename {} to {}: {source}", .from.display(), .to.display())]
    RenameIo {
        from: PathBuf,
        to: PathBuf,
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, ViewerError>;

impl ViewerError {
    pub fn decode(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Decode {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    pub fn delete(path: impl Into<PathBuf>, reason: impl ToString) -> Self {
        Self::Delete {
            path: path.into(),
            reason: reason.to_string(),
        }
    }

    /// Whether a rename draft has to be acknowledged before the next commit.
    pub fn needs_acknowledgment(&self) -> bool {
        matches!(self, Self::Conflict(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ViewerError::Conflict(PathBuf::from("/photos/a.jpg"));
        assert_eq!(err.to_string(), "/photos/a.jpg already exists");

        let err = ViewerError::decode("/photos/b.png", "bad header");
        assert_eq!(err.to_string(), "cannot decode /photos/b.png: bad header");

        assert_eq!(ViewerError::EmptyName.to_string(), "name cannot be empty");
    }

    #[test]
    fn test_only_conflict_needs_acknowledgment() {
        assert!(ViewerError::Conflict(PathBuf::from("x.png")).needs_acknowledgment());
        assert!(!ViewerError::EmptyName.needs_acknowledgment());
        assert!(!ViewerError::NoOpRename.needs_acknowledgment());
    }

    #[test]
    fn test_io_source_is_kept() {
        use std::error::Error;
        let err = ViewerError::NotFound {
            path: PathBuf::from("/nope"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("cannot open /nope"));
    }
}
