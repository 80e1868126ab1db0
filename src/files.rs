use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::error::{Result, ViewerError};

/// Extensions listed when a directory is scanned. Compared lower-cased.
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "heic", "heif", "jpg", "jpeg", "png", "webp", "bmp", "tiff",
];

fn lower_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

pub fn is_image_file(path: &Path) -> bool {
    IMAGE_EXTENSIONS.contains(&lower_extension(path).as_str())
}

fn absolute(path: &Path) -> Result<PathBuf> {
    std::path::absolute(path).map_err(|source| ViewerError::NotFound {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Image entry
// ---------------------------------------------------------------------------

/// One image file on disk. Ordered by path.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ImageEntry {
    path: PathBuf,
    extension: String,
}

impl ImageEntry {
    pub fn new(path: PathBuf) -> Self {
        let extension = lower_extension(&path);
        Self { path, extension }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Lower-cased extension without the dot; empty if the file has none.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    pub fn stem(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Extension as written on disk (case preserved), used when renaming.
    fn raw_extension(&self) -> Option<String> {
        self.path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
    }
}

// ---------------------------------------------------------------------------
// File set
// ---------------------------------------------------------------------------

/// Sorted, de-duplicated images of one directory plus the current position.
///
/// An empty set is valid and means "no images". The set is rebuilt on every
/// open; afterwards it only changes through [`FileSet::remove_current`] and
/// [`FileSet::rename_current`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileSet {
    entries: Vec<ImageEntry>,
    cursor: usize,
}

impl FileSet {
    /// Scan the immediate children of `dir`. Cursor starts at 0.
    pub fn open_directory(dir: &Path) -> Result<Self> {
        let dir = absolute(dir)?;
        let read = fs::read_dir(&dir).map_err(|source| ViewerError::NotFound {
            path: dir.clone(),
            source,
        })?;

        let mut entries: Vec<ImageEntry> = read
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.is_file() && is_image_file(p))
            .map(ImageEntry::new)
            .collect();
        entries.sort();
        entries.dedup();

        log::info!("Scanned {:?}: {} images", dir, entries.len());
        Ok(Self {
            entries,
            cursor: 0,
        })
    }

    /// Scan the siblings of `path` and point the cursor at it.
    ///
    /// A file with an unrecognized extension is still shown when chosen
    /// explicitly: it is inserted into the set at its sorted position.
    pub fn open_file(path: &Path) -> Result<Self> {
        let path = absolute(path)?;
        if !path.is_file() {
            return Err(ViewerError::NotFound {
                source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                path,
            });
        }
        let parent = path.parent().unwrap_or(Path::new("/"));
        let mut set = Self::open_directory(parent)?;
        set.cursor = match set.position(&path) {
            Some(i) => i,
            None => {
                log::debug!("{:?} is not a listed image type, adding it anyway", path);
                set.insert(ImageEntry::new(path))
            }
        };
        Ok(set)
    }

    /// Open a directory or a single file, whichever `path` is.
    pub fn open_path(path: &Path) -> Result<Self> {
        if path.is_dir() {
            Self::open_directory(path)
        } else {
            Self::open_file(path)
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn current(&self) -> Option<&ImageEntry> {
        self.entries.get(self.cursor)
    }

    pub fn position(&self, path: &Path) -> Option<usize> {
        self.entries
            .binary_search_by(|e| e.path.as_path().cmp(path))
            .ok()
    }

    /// Insert keeping the set sorted and unique; returns the entry's index.
    fn insert(&mut self, entry: ImageEntry) -> usize {
        match self.entries.binary_search(&entry) {
            Ok(i) => i,
            Err(i) => {
                self.entries.insert(i, entry);
                i
            }
        }
    }

    /// Move the cursor by `delta`, wrapping in both directions.
    pub fn advance(&mut self, delta: isize) -> Result<usize> {
        if self.entries.is_empty() {
            return Err(ViewerError::EmptySet);
        }
        let len = self.entries.len() as isize;
        self.cursor = (self.cursor as isize + delta).rem_euclid(len) as usize;
        Ok(self.cursor)
    }

    /// Drop the current entry from the set (the file itself is untouched).
    pub fn remove_current(&mut self) -> Result<ImageEntry> {
        if self.entries.is_empty() {
            return Err(ViewerError::EmptySet);
        }
        let removed = self.entries.remove(self.cursor);
        if self.cursor >= self.entries.len() {
            self.cursor = self.entries.len().saturating_sub(1);
        }
        Ok(removed)
    }

    /// Rename the current file on disk to `new_stem` + its old extension.
    ///
    /// Never overwrites: an existing target is a [`ViewerError::Conflict`]
    /// and nothing is touched. On any error the set is unchanged.
    pub fn rename_current(&mut self, new_stem: &str) -> Result<&ImageEntry> {
        let current = self.current().ok_or(ViewerError::EmptySet)?.clone();

        let stem = new_stem.trim();
        if stem.is_empty() {
            return Err(ViewerError::EmptyName);
        }
        if stem == "." || stem == ".." || stem.contains(['/', '\\']) {
            return Err(ViewerError::InvalidName(stem.to_string()));
        }

        let file_name = match current.raw_extension() {
            Some(ext) => format!("{}.{}", stem, ext),
            None => stem.to_string(),
        };
        let new_path = current.path.with_file_name(file_name);
        if new_path == current.path {
            return Err(ViewerError::NoOpRename);
        }
        if fs::symlink_metadata(&new_path).is_ok() {
            return Err(ViewerError::Conflict(new_path));
        }

        fs::rename(&current.path, &new_path).map_err(|source| ViewerError::RenameIo {
            from: current.path.clone(),
            to: new_path.clone(),
            source,
        })?;
        log::info!("Renamed {:?} -> {:?}", current.path, new_path);

        self.entries.remove(self.cursor);
        self.cursor = self.insert(ImageEntry::new(new_path));
        Ok(&self.entries[self.cursor])
    }
}

// ---------------------------------------------------------------------------
// Deletion
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DeleteMode {
    /// Move to the desktop trash / recycle bin
    #[default]
    Trash,
    /// Remove the file for good
    Permanent,
}

pub fn delete_file(path: &Path, mode: DeleteMode) -> Result<()> {
    match mode {
        DeleteMode::Trash => {
            trash::delete(path).map_err(|e| ViewerError::delete(path, e))?;
            log::info!("Moved to trash: {:?}", path);
        }
        DeleteMode::Permanent => {
            fs::remove_file(path).map_err(|e| ViewerError::delete(path, e))?;
            log::info!("Deleted: {:?}", path);
        }
    }
    Ok(())
}
