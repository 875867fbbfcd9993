// src/services/album_service.rs
// DOCUMENTATION: Album create / update / delete and the album page
// PURPOSE: Every mutation is scoped to the signed-in owner

use serde::Serialize;

use crate::db::{TravelogStore, ALBUM_NAME_TAKEN};
use crate::errors::{TravelogError, ValidationError};
use crate::models::*;
use crate::services::account_service::profile_of;
use crate::services::media::{MediaCategory, MediaStore};
use crate::services::session_store::Session;
use crate::services::validation::validate_album;

/// Context of `mytravelog/album.html`
#[derive(Debug, Serialize)]
pub struct AlbumPage {
    pub requested_album: Album,
    pub requested_user_albums: Vec<Album>,
    pub requested_user: UserResponse,
    pub requested_user_profile: UserProfile,
    pub requested_album_logs: Vec<LogDetail>,
    pub can_edit_profile: bool,
    pub can_follow: bool,
}

pub struct AlbumService;

impl AlbumService {
    /// Create an album for the signed-in user
    pub async fn create<S: TravelogStore>(
        store: &S,
        media: &MediaStore,
        session: &Session,
        form: AlbumForm,
    ) -> Result<Album, TravelogError> {
        let profile = caller_profile(store, session).await?;
        let draft = validate_album(form)?;
        ensure_name_free(store, profile.id, &draft.name, None).await?;

        let cover_picture = media
            .save_opt(MediaCategory::AlbumCovers, draft.cover_picture.as_ref())
            .await?;
        let record = AlbumRecord {
            name: draft.name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            cover_picture: cover_picture.clone(),
        };

        match store.insert_album(profile.id, record).await {
            Ok(album) => {
                log::info!("Album {} created by profile {}", album.id, profile.id);
                Ok(album)
            }
            Err(e) => {
                if let Some(path) = cover_picture {
                    media.remove(&path).await;
                }
                Err(e)
            }
        }
    }

    /// Update one of the signed-in user's albums
    /// DOCUMENTATION: The cover picture is replaced only when a new one is uploaded
    pub async fn update<S: TravelogStore>(
        store: &S,
        media: &MediaStore,
        session: &Session,
        album_id: i64,
        form: AlbumForm,
    ) -> Result<Album, TravelogError> {
        let profile = caller_profile(store, session).await?;
        let existing = owned_album(store, profile.id, album_id).await?;
        let draft = validate_album(form)?;
        ensure_name_free(store, profile.id, &draft.name, Some(album_id)).await?;

        let cover_picture = media
            .save_opt(MediaCategory::AlbumCovers, draft.cover_picture.as_ref())
            .await?;
        let record = AlbumRecord {
            name: draft.name,
            start_date: draft.start_date,
            end_date: draft.end_date,
            cover_picture: cover_picture.clone(),
        };

        match store.update_album(album_id, record).await {
            Ok(album) => {
                if let (Some(_), Some(old)) = (&cover_picture, &existing.cover_picture) {
                    media.remove(old).await;
                }
                log::info!("Album {} updated", album.id);
                Ok(album)
            }
            Err(e) => {
                if let Some(path) = cover_picture {
                    media.remove(&path).await;
                }
                Err(e)
            }
        }
    }

    /// Delete one of the signed-in user's albums, with its cover file
    pub async fn delete<S: TravelogStore>(
        store: &S,
        media: &MediaStore,
        session: &Session,
        album_id: i64,
    ) -> Result<(), TravelogError> {
        let profile = caller_profile(store, session).await?;
        let album = owned_album(store, profile.id, album_id).await?;

        store.delete_album(album.id).await?;
        if let Some(path) = &album.cover_picture {
            media.remove(path).await;
        }

        log::info!("Album {} deleted by profile {}", album.id, profile.id);
        Ok(())
    }

    pub async fn album_page<S: TravelogStore>(
        store: &S,
        session: &Session,
        album_id: i64,
    ) -> Result<AlbumPage, TravelogError> {
        let album = store
            .find_album(album_id)
            .await?
            .ok_or_else(|| TravelogError::NotFound(format!("album {}", album_id)))?;
        let profile = store
            .find_profile(album.user_profile_id)
            .await?
            .ok_or_else(|| TravelogError::NotFound(format!("profile {}", album.user_profile_id)))?;
        let user = store
            .find_user(profile.user_id)
            .await?
            .ok_or_else(|| TravelogError::NotFound(format!("user {}", profile.user_id)))?;
        let albums = store.albums_for_profile(profile.id).await?;
        let logs = store.logs_for_album(album.id).await?;

        Ok(AlbumPage {
            requested_album: album,
            requested_user_albums: albums,
            requested_album_logs: logs,
            can_edit_profile: session.user_id() == Some(user.id),
            can_follow: session.can_follow(user.id),
            requested_user: user.to_response(),
            requested_user_profile: profile,
        })
    }

    /// Albums of the signed-in user; empty when anonymous
    pub async fn albums_of<S: TravelogStore>(
        store: &S,
        session: &Session,
    ) -> Result<Vec<Album>, TravelogError> {
        if !session.is_authenticated() {
            return Ok(Vec::new());
        }
        let profile = caller_profile(store, session).await?;
        store.albums_for_profile(profile.id).await
    }
}

pub(crate) async fn caller_profile<S: TravelogStore>(
    store: &S,
    session: &Session,
) -> Result<UserProfile, TravelogError> {
    let user_id = session.user_id().ok_or(TravelogError::NotAuthenticated)?;
    let user = store
        .find_user(user_id)
        .await?
        .ok_or(TravelogError::NotAuthenticated)?;
    profile_of(store, &user).await
}

/// A missing album and someone else's album look the same to the caller
pub(crate) async fn owned_album<S: TravelogStore>(
    store: &S,
    profile_id: i64,
    album_id: i64,
) -> Result<Album, TravelogError> {
    match store.find_album(album_id).await? {
        Some(album) if album.user_profile_id == profile_id => Ok(album),
        Some(_) => {
            log::warn!("Profile {} tried to modify album {}", profile_id, album_id);
            Err(TravelogError::NotFound(format!("album {}", album_id)))
        }
        None => Err(TravelogError::NotFound(format!("album {}", album_id))),
    }
}

async fn ensure_name_free<S: TravelogStore>(
    store: &S,
    profile_id: i64,
    name: &str,
    excluding: Option<i64>,
) -> Result<(), TravelogError> {
    if store.album_name_taken(profile_id, name, excluding).await? {
        return Err(ValidationError::UniquenessViolation(ALBUM_NAME_TAKEN).into());
    }
    Ok(())
}
