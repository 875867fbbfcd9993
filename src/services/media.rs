// src/services/media.rs
// DOCUMENTATION: Persistence of uploaded pictures
// PURPOSE: Write accepted uploads under MEDIA_ROOT and hand back relative paths

use std::path::PathBuf;

use tokio::fs;
use uuid::Uuid;

use crate::errors::TravelogError;
use crate::models::Upload;

/// Directory an upload is filed under
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    ProfilePictures,
    CoverPictures,
    AlbumCovers,
    LogPictures,
}

impl MediaCategory {
    fn dir(self) -> &'static str {
        match self {
            MediaCategory::ProfilePictures => "profile_pictures",
            MediaCategory::CoverPictures => "cover_pictures",
            MediaCategory::AlbumCovers => "album_covers",
            MediaCategory::LogPictures => "log_pictures",
        }
    }
}

pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Store an upload, returning its path relative to the media root
    /// DOCUMENTATION: The client file name only contributes its extension
    pub async fn save(
        &self,
        category: MediaCategory,
        upload: &Upload,
    ) -> Result<String, TravelogError> {
        let name = match upload.extension() {
            Some(ext) => format!("{}.{}", Uuid::new_v4().simple(), ext),
            None => Uuid::new_v4().simple().to_string(),
        };
        let relative = format!("{}/{}", category.dir(), name);

        let dir = self.root.join(category.dir());
        fs::create_dir_all(&dir).await.map_err(|e| {
            log::error!("Failed to create media directory {}: {}", dir.display(), e);
            TravelogError::MediaError(e.to_string())
        })?;

        fs::write(self.root.join(&relative), &upload.bytes)
            .await
            .map_err(|e| {
                log::error!("Failed to write {}: {}", relative, e);
                TravelogError::MediaError(e.to_string())
            })?;

        log::debug!("Stored {} ({} bytes)", relative, upload.size());
        Ok(relative)
    }

    /// Store an optional upload
    pub async fn save_opt(
        &self,
        category: MediaCategory,
        upload: Option<&Upload>,
    ) -> Result<Option<String>, TravelogError> {
        match upload {
            Some(upload) => self.save(category, upload).await.map(Some),
            None => Ok(None),
        }
    }

    /// Store several uploads; on failure the ones already written are removed
    pub async fn save_all(
        &self,
        category: MediaCategory,
        uploads: &[Upload],
    ) -> Result<Vec<String>, TravelogError> {
        let mut saved = Vec::with_capacity(uploads.len());
        for upload in uploads {
            match self.save(category, upload).await {
                Ok(path) => saved.push(path),
                Err(e) => {
                    self.remove_all(&saved).await;
                    return Err(e);
                }
            }
        }
        Ok(saved)
    }

    pub async fn remove_all(&self, paths: &[String]) {
        for path in paths {
            self.remove(path).await;
        }
    }

    /// Remove a stored file; failures are logged, not returned
    pub async fn remove(&self, relative: &str) {
        if relative.split('/').any(|part| part == "..") {
            log::warn!("Refusing to remove media path {}", relative);
            return;
        }

        if let Err(e) = fs::remove_file(self.root.join(relative)).await {
            log::warn!("Failed to remove media file {}: {}", relative, e);
        }
    }

    pub fn path_of(&self, relative: &str) -> PathBuf {
        self.root.join(relative)
    }
}
