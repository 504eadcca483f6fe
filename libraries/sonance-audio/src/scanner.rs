//! Input discovery for batch runs

use crate::error::{AudioError, Result};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Extensions a batch picks up (compared case-insensitively)
pub const SUPPORTED_EXTENSIONS: &[&str] = &["wav", "mp3", "ogg", "flac"];

/// Lists the audio files a batch should process
///
/// Looks only at the directory itself unless [`FileScanner::recursive`] or
/// [`FileScanner::max_depth`] says otherwise. Anything without a supported
/// extension is ignored. The returned list is sorted, so two runs over the
/// same directory process files in the same order.
#[derive(Debug, Clone)]
pub struct FileScanner {
    depth: Option<usize>,
}

impl Default for FileScanner {
    fn default() -> Self {
        Self {
            depth: Some(1),
        }
    }
}

impl FileScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Descend at most `depth` levels (1 = the directory's own entries)
    pub fn max_depth(mut self, depth: usize) -> Self {
        self.depth = Some(depth);
        self
    }

    /// Descend into every subdirectory
    pub fn recursive(mut self) -> Self {
        self.depth = None;
        self
    }

    /// Supported files under `dir`, sorted by path
    ///
    /// # Errors
    /// `FileNotFound` if `dir` does not exist, `InvalidPath` if it is not a directory.
    pub fn scan_directory(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        if !dir.is_dir() {
            return Err(if dir.exists() {
                AudioError::InvalidPath(format!("{} is not a directory", dir.display()))
            } else {
                AudioError::FileNotFound(dir.display().to_string())
            });
        }

        let walker = WalkDir::new(dir)
            .min_depth(1)
            .max_depth(self.depth.unwrap_or(usize::MAX));

        let mut files: Vec<PathBuf> = walker
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!("Unreadable entry under {}: {}", dir.display(), e);
                    None
                }
            })
            .filter(|entry| entry.path().is_file() && is_audio_file(entry.path()))
            .map(walkdir::DirEntry::into_path)
            .collect();

        files.sort();
        tracing::debug!("Found {} audio file(s) in {}", files.len(), dir.display());
        Ok(files)
    }
}

/// True when the extension is one a batch processes
pub fn is_audio_file(path: &Path) -> bool {
    get_audio_extension(path).is_some()
}

/// Lowercased extension of `path` if it is supported
pub fn get_audio_extension(path: &Path) -> Option<String> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}
