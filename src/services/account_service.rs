// src/services/account_service.rs
// DOCUMENTATION: Sign-up, sign-in, sign-out and the user page
// PURPOSE: Account workflows over an explicit Session value

use serde::Serialize;

use crate::db::{TravelogStore, USERNAME_TAKEN};
use crate::errors::{TravelogError, ValidationError};
use crate::models::*;
use crate::services::media::{MediaCategory, MediaStore};
use crate::services::passwords::{hash_password, verify_password};
use crate::services::session_store::{Session, SessionStore};
use crate::services::validation::validate_sign_up;
use crate::urls;

/// Where an account workflow sends the browser next
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthOutcome {
    /// Plain redirect, session unchanged
    Redirect { to: String },
    /// A session was started; the token goes into the cookie
    Established { token: String, to: String },
    /// The session was ended; the cookie is removed
    Cleared { to: String },
}

/// Context of `mytravelog/user.html`
#[derive(Debug, Serialize)]
pub struct UserPage {
    pub requested_user: UserResponse,
    pub requested_user_profile: UserProfile,
    pub requested_user_albums: Vec<Album>,
    pub requested_user_logs: Vec<LogDetail>,
    pub can_edit_profile: bool,
    pub can_follow: bool,
}

pub struct AccountService;

impl AccountService {
    /// Register a new user and sign them in
    pub async fn sign_up<S: TravelogStore>(
        store: &S,
        sessions: &SessionStore,
        media: &MediaStore,
        session: &Session,
        form: SignUpForm,
    ) -> Result<AuthOutcome, TravelogError> {
        if let Some(username) = session.username() {
            return Ok(AuthOutcome::Redirect {
                to: urls::user_page(username),
            });
        }

        let draft = validate_sign_up(form).map_err(|e| {
            log::debug!("Sign-up rejected: {}", e);
            e
        })?;

        if store.find_user_by_username(&draft.username).await?.is_some() {
            log::debug!("Sign-up rejected: username {} taken", draft.username);
            return Err(ValidationError::UniquenessViolation(USERNAME_TAKEN).into());
        }

        let password_hash = hash_password(&draft.password)?;

        let profile_picture = media
            .save_opt(MediaCategory::ProfilePictures, draft.profile_picture.as_ref())
            .await?;
        let cover_picture = match media
            .save_opt(MediaCategory::CoverPictures, draft.cover_picture.as_ref())
            .await
        {
            Ok(path) => path,
            Err(e) => {
                discard(media, &[&profile_picture]).await;
                return Err(e);
            }
        };

        let new_user = NewUser {
            username: draft.username,
            password_hash,
            first_name: draft.first_name,
            last_name: draft.last_name,
            email: draft.email,
            profile_picture: profile_picture.clone(),
            cover_picture: cover_picture.clone(),
        };

        let (user, _) = match store.create_user_with_profile(new_user).await {
            Ok(created) => created,
            Err(e) => {
                discard(media, &[&profile_picture, &cover_picture]).await;
                return Err(e);
            }
        };

        log::info!("User signed up: {}", user.username);

        let token = sessions.create(&user).await;
        Ok(AuthOutcome::Established {
            token,
            to: urls::user_page(&user.username),
        })
    }

    /// Check credentials and start a session
    pub async fn sign_in<S: TravelogStore>(
        store: &S,
        sessions: &SessionStore,
        session: &Session,
        form: SignInForm,
    ) -> Result<AuthOutcome, TravelogError> {
        if let Some(username) = session.username() {
            return Ok(AuthOutcome::Redirect {
                to: urls::user_page(username),
            });
        }

        let (Some(username), Some(password)) = (form.username, form.password) else {
            return Err(TravelogError::InvalidCredentials);
        };

        let user = match store.find_user_by_username(&username).await? {
            Some(user) if verify_password(&password, &user.password_hash) => user,
            _ => {
                log::debug!("Failed sign-in for {}", username);
                return Err(TravelogError::InvalidCredentials);
            }
        };

        log::info!("User signed in: {}", user.username);

        let token = sessions.create(&user).await;
        Ok(AuthOutcome::Established {
            token,
            to: urls::user_page(&user.username),
        })
    }

    /// End the session behind `token`, if any
    pub async fn sign_out(sessions: &SessionStore, token: Option<&str>) -> AuthOutcome {
        if let Some(token) = token {
            sessions.destroy(token).await;
        }

        AuthOutcome::Cleared {
            to: urls::SIGN_IN.to_string(),
        }
    }

    /// Redirect for the sign-up / sign-in pages when already signed in
    pub fn redirect_if_signed_in(session: &Session) -> Option<AuthOutcome> {
        session.username().map(|username| AuthOutcome::Redirect {
            to: urls::user_page(username),
        })
    }

    pub async fn user_page<S: TravelogStore>(
        store: &S,
        session: &Session,
        username: &str,
    ) -> Result<UserPage, TravelogError> {
        let user = store
            .find_user_by_username(username)
            .await?
            .ok_or_else(|| TravelogError::NotFound(format!("user {}", username)))?;
        let profile = profile_of(store, &user).await?;
        let albums = store.albums_for_profile(profile.id).await?;
        let logs = store.logs_for_profile(profile.id).await?;

        Ok(UserPage {
            can_edit_profile: session.user_id() == Some(user.id),
            can_follow: session.can_follow(user.id),
            requested_user_logs: logs,
            requested_user: user.to_response(),
            requested_user_profile: profile,
            requested_user_albums: albums,
        })
    }
}

/// Profile of a user known to exist
pub(crate) async fn profile_of<S: TravelogStore>(
    store: &S,
    user: &User,
) -> Result<UserProfile, TravelogError> {
    store.find_profile_by_user(user.id).await?.ok_or_else(|| {
        log::error!("User {} has no profile", user.id);
        TravelogError::NotFound(format!("profile of user {}", user.id))
    })
}

async fn discard(media: &MediaStore, paths: &[&Option<String>]) {
    for path in paths.iter().filter_map(|p| p.as_deref()) {
        media.remove(path).await;
    }
}
