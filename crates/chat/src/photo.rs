//! Ear photos picked by the user, and scoped preview files.
//!
//! An `ImagePreview` is a file on disk that a viewer can open. It exists for
//! exactly as long as the handle: dropping the handle (because the photo was
//! replaced, the filters were reset or the session ended) removes the file.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use alma_models::ImageUpload;
use tempfile::NamedTempFile;
use thiserror::Error;
use tracing::debug;

#[derive(Error, Debug)]
pub enum PhotoError {
    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error("{0} is empty")]
    Empty(String),

    #[error("{0} is not an image")]
    NotAnImage(String),

    #[error("Failed to write preview: {0}")]
    Preview(#[from] io::Error),
}

/// A photo of the user's ear, ready to attach to a request
#[derive(Debug, Clone, PartialEq)]
pub struct EarPhoto {
    upload: ImageUpload,
    extension: String,
}

impl EarPhoto {
    /// Read a photo from disk.
    ///
    /// The type is sniffed from the file content; only images are accepted.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, PhotoError> {
        let path = path.as_ref();
        let bytes = fs::read(path).map_err(|source| PhotoError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| "ear-photo".to_string());
        Self::from_bytes(file_name, bytes)
    }

    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> Result<Self, PhotoError> {
        let file_name = file_name.into();
        if bytes.is_empty() {
            return Err(PhotoError::Empty(file_name));
        }

        let kind = infer::get(&bytes)
            .filter(|kind| kind.mime_type().starts_with("image/"))
            .ok_or_else(|| PhotoError::NotAnImage(file_name.clone()))?;

        debug!(
            "Loaded ear photo {} ({}, {} bytes)",
            file_name,
            kind.mime_type(),
            bytes.len()
        );
        Ok(Self {
            extension: kind.extension().to_string(),
            upload: ImageUpload::new(file_name, kind.mime_type(), bytes),
        })
    }

    pub fn file_name(&self) -> &str {
        &self.upload.file_name
    }

    pub fn mime_type(&self) -> &str {
        &self.upload.mime_type
    }

    pub fn upload(&self) -> &ImageUpload {
        &self.upload
    }

    /// Write the photo to a preview file
    pub fn preview(&self) -> Result<ImagePreview, PhotoError> {
        Ok(ImagePreview::create(&self.upload.bytes, &self.extension)?)
    }
}

/// Scoped handle to a displayable image file; removed on drop
#[derive(Debug)]
pub struct ImagePreview {
    file: NamedTempFile,
}

impl ImagePreview {
    pub fn create(bytes: &[u8], extension: &str) -> io::Result<Self> {
        let mut file = tempfile::Builder::new()
            .prefix("alma-preview-")
            .suffix(&format!(".{}", extension))
            .tempfile()?;
        file.write_all(bytes)?;
        file.flush()?;
        debug!("Created preview {}", file.path().display());
        Ok(Self { file })
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    pub fn to_path_buf(&self) -> PathBuf {
        self.file.path().to_path_buf()
    }
}

impl Drop for ImagePreview {
    fn drop(&mut self) {
        // NamedTempFile deletes the file once this returns.
        debug!("Releasing preview {}", self.file.path().display());
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    /// Smallest byte sequence `infer` recognises as a PNG
    pub(crate) fn png_bytes() -> Vec<u8> {
        vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0x0D]
    }

    #[test]
    fn test_png_is_accepted() {
        let photo = EarPhoto::from_bytes("ear.png", png_bytes()).unwrap();
        assert_eq!(photo.mime_type(), "image/png");
        assert_eq!(photo.file_name(), "ear.png");
    }

    #[test]
    fn test_text_is_rejected() {
        let result = EarPhoto::from_bytes("notes.txt", b"just some text".to_vec());
        assert!(matches!(result, Err(PhotoError::NotAnImage(_))));
    }

    #[test]
    fn test_empty_file_is_rejected() {
        assert!(matches!(
            EarPhoto::from_bytes("ear.png", Vec::new()),
            Err(PhotoError::Empty(_))
        ));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("left-ear.png");
        fs::write(&path, png_bytes()).unwrap();

        let photo = EarPhoto::load(&path).unwrap();
        assert_eq!(photo.file_name(), "left-ear.png");
        assert_eq!(photo.upload().bytes, png_bytes());
    }

    #[test]
    fn test_missing_file_is_a_read_error() {
        let result = EarPhoto::load("/definitely/not/here.png");
        assert!(matches!(result, Err(PhotoError::Read { .. })));
    }

    #[test]
    fn test_preview_is_removed_on_drop() {
        let photo = EarPhoto::from_bytes("ear.png", png_bytes()).unwrap();
        let preview = photo.preview().unwrap();
        let path = preview.to_path_buf();

        assert!(path.exists());
        assert_eq!(path.extension().and_then(|e| e.to_str()), Some("png"));
        assert_eq!(fs::read(&path).unwrap(), png_bytes());

        drop(preview);
        assert!(!path.exists());
    }
}
