//! Storage operations
//!
//! File and directory lifecycle beneath the configured data root. Every
//! operation re-validates its caller-supplied path string before touching
//! disk: each call independently accepts attacker-controlled input, and a
//! value validated before an earlier `change_dir` proves nothing now.

use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use crate::error::FileError;
use crate::storage::results::{FileContent, FileMetadata};
use crate::storage::validation::{is_pathname_valid, normalize_relative};

/// Sandboxed file store.
///
/// Owns the working-subdirectory pointer, which is process-wide mutable
/// state: it is held behind a mutex locked around every resolve-then-act
/// sequence so no operation runs against a half-changed pointer. The pointer
/// itself has last-writer-wins semantics under concurrent `change_dir`.
pub struct FileStore {
    data_root: PathBuf,
    /// Relative to `data_root`; empty means the root itself.
    working_dir: Mutex<PathBuf>,
}

impl FileStore {
    /// Open a store rooted at `data_root`, creating the directory if missing.
    pub fn new(data_root: impl Into<PathBuf>) -> Result<Self, FileError> {
        let data_root = data_root.into();
        fs::create_dir_all(&data_root)?;
        info!("File store rooted at {}", data_root.display());
        Ok(Self {
            data_root,
            working_dir: Mutex::new(PathBuf::new()),
        })
    }

    pub fn data_root(&self) -> &Path {
        &self.data_root
    }

    fn working_dir_lock(&self) -> MutexGuard<'_, PathBuf> {
        self.working_dir.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Validate and normalize a caller-supplied path string.
    fn checked_relative(path: &str) -> Result<PathBuf, FileError> {
        if !is_pathname_valid(path) {
            return Err(FileError::InvalidPath(path.to_string()));
        }
        normalize_relative(path).ok_or_else(|| FileError::InvalidPath(path.to_string()))
    }

    /// Render a root-relative path in the wire notation (`"."`, `"./sub/dir"`).
    fn display_relative(relative: &Path) -> String {
        if relative.as_os_str().is_empty() {
            ".".to_string()
        } else {
            format!("./{}", relative.display())
        }
    }

    fn metadata_for(
        relative: &Path,
        real: &Path,
        with_modify_date: bool,
    ) -> Result<FileMetadata, FileError> {
        let attributes = fs::metadata(real)?;
        let modified = attributes.modified()?;
        // Not every filesystem records a birth time.
        let created = attributes.created().unwrap_or(modified);
        Ok(FileMetadata {
            name: Self::display_relative(relative),
            create_date: created,
            modify_date: with_modify_date.then_some(modified),
            size: attributes.len(),
        })
    }

    /// Return the working subdirectory, relative to the data root.
    pub fn current_dir(&self) -> String {
        let working_dir = self.working_dir_lock();
        let path = Self::display_relative(&working_dir);
        debug!("Current directory is {}", path);
        path
    }

    /// Move the working pointer into `path`, resolved against the data root.
    ///
    /// With `autocreate`, missing directories are created first; without it,
    /// an absent target is `NotFound`. A target that exists as a
    /// non-directory file is `InvalidPath`.
    pub fn change_dir(&self, path: &str, autocreate: bool) -> Result<String, FileError> {
        debug!("Changing directory to {:?} (autocreate: {})", path, autocreate);

        let relative = Self::checked_relative(path)?;
        let mut working_dir = self.working_dir_lock();
        let real = self.data_root.join(&relative);

        if real.is_dir() {
            // Already in place, just move the pointer.
        } else if real.exists() {
            return Err(FileError::InvalidPath(path.to_string()));
        } else if autocreate {
            fs::create_dir_all(&real)?;
        } else {
            return Err(FileError::NotFound(path.to_string()));
        }

        *working_dir = relative;
        let new_path = Self::display_relative(&working_dir);
        info!("Working directory is now {}", new_path);
        Ok(new_path)
    }

    /// Delete the directory at `path`, resolved against the data root.
    ///
    /// If the directory is (or contains) the current working subdirectory,
    /// the pointer is relocated to the deleted directory's parent first so
    /// no later operation runs from a deleted location.
    pub fn delete_dir(&self, path: &str, recursive: bool) -> Result<(), FileError> {
        debug!("Removing directory {:?} (recursive: {})", path, recursive);

        let relative = Self::checked_relative(path)?;
        if relative.as_os_str().is_empty() {
            // The data root itself is not deletable through this API.
            return Err(FileError::InvalidPath(path.to_string()));
        }

        let mut working_dir = self.working_dir_lock();
        let real = self.data_root.join(&relative);

        if !real.is_dir() {
            return Err(FileError::NotFound(path.to_string()));
        }
        let occupied = fs::read_dir(&real)?.next().is_some();
        if occupied && !recursive {
            return Err(FileError::NotEmpty(path.to_string()));
        }

        if working_dir.starts_with(&relative) {
            *working_dir = relative.parent().map(Path::to_path_buf).unwrap_or_default();
            debug!(
                "Working directory relocated to {}",
                Self::display_relative(&working_dir)
            );
        }

        if recursive {
            fs::remove_dir_all(&real)?;
        } else {
            fs::remove_dir(&real)?;
        }
        info!("Removed directory {}", Self::display_relative(&relative));
        Ok(())
    }

    /// Metadata for every regular file directly inside the working
    /// subdirectory. Non-recursive; subdirectories are excluded; order is
    /// whatever the filesystem yields.
    pub fn list_files(&self) -> Result<Vec<FileMetadata>, FileError> {
        let working_dir = self.working_dir_lock();
        let real_dir = self.data_root.join(&*working_dir);

        let mut result = Vec::new();
        for entry in fs::read_dir(&real_dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let relative = working_dir.join(entry.file_name());
            result.push(Self::metadata_for(&relative, &entry.path(), true)?);
        }

        debug!(
            "{} files found in {}",
            result.len(),
            Self::display_relative(&working_dir)
        );
        Ok(result)
    }

    /// Read `filename` from the working subdirectory: metadata plus content.
    pub fn read_file(&self, filename: &str) -> Result<FileContent, FileError> {
        debug!("Reading file {:?}", filename);

        let name = Self::checked_relative(filename)?;
        let working_dir = self.working_dir_lock();
        let relative = working_dir.join(&name);
        let real = self.data_root.join(&relative);

        if !real.is_file() {
            return Err(FileError::NotFound(filename.to_string()));
        }

        let content = fs::read(&real)?;
        let metadata = Self::metadata_for(&relative, &real, true)?;
        debug!("{} bytes read from {}", content.len(), metadata.name);
        Ok(FileContent { metadata, content })
    }

    /// Write `content` to `filename` in the working subdirectory,
    /// overwriting any existing file.
    pub fn create_file(&self, filename: &str, content: &[u8]) -> Result<FileMetadata, FileError> {
        debug!("Creating file {:?}", filename);

        let name = Self::checked_relative(filename)?;
        let working_dir = self.working_dir_lock();
        let relative = working_dir.join(&name);
        let real = self.data_root.join(&relative);

        fs::write(&real, content)?;

        let metadata = Self::metadata_for(&relative, &real, false)?;
        info!("{} bytes written to {}", content.len(), metadata.name);
        Ok(metadata)
    }

    /// Delete `filename` from the working subdirectory.
    pub fn delete_file(&self, filename: &str) -> Result<(), FileError> {
        debug!("Deleting file {:?}", filename);

        let name = Self::checked_relative(filename)?;
        let working_dir = self.working_dir_lock();
        let relative = working_dir.join(&name);
        let real = self.data_root.join(&relative);

        if !real.is_file() {
            return Err(FileError::NotFound(filename.to_string()));
        }

        fs::remove_file(&real)?;
        info!("Deleted file {}", Self::display_relative(&relative));
        Ok(())
    }
}
