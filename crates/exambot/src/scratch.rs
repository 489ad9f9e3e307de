//! Transient storage for downloaded photos.

use std::fs;
use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;

/// A downloaded image buffered on disk between download and recognition.
///
/// The file is removed when the handle is dropped, on success and on error.
pub struct ScratchImage {
    file: NamedTempFile,
}

impl ScratchImage {
    /// Creates an empty scratch file named after the Telegram file id.
    ///
    /// # Errors
    /// Fails if the scratch directory cannot be created or written.
    pub fn create(dir: &Path, file_id: &str) -> Result<Self> {
        fs::create_dir_all(dir)?;
        let file = tempfile::Builder::new()
            .prefix(&format!("{}-", sanitize(file_id)))
            .suffix(".jpg")
            .tempfile_in(dir)?;
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    /// # Errors
    /// Fails if the file cannot be read back.
    pub fn read(&self) -> Result<Vec<u8>> {
        Ok(fs::read(self.path())?)
    }
}

/// Keeps file ids from escaping the scratch directory.
fn sanitize(file_id: &str) -> String {
    let cleaned: String = file_id
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
        .take(64)
        .collect();
    if cleaned.is_empty() {
        "photo".to_string()
    } else {
        cleaned
    }
}
