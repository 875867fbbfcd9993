// src/models/upload.rs

/// Largest picture accepted for profile, cover and album covers
pub const MAX_IMAGE_BYTES: usize = 2 * 1024 * 1024;

/// An uploaded file part, fully buffered
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Upload {
    /// Client-supplied file name, only used for its extension
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn new(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            bytes,
        }
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn exceeds_image_limit(&self) -> bool {
        self.size() > MAX_IMAGE_BYTES
    }

    /// Lower-cased extension, if the file name has a plausible one
    pub fn extension(&self) -> Option<String> {
        let (_, ext) = self.filename.rsplit_once('.')?;
        if ext.is_empty() || ext.len() > 5 || !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
