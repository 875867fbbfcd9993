// src/handlers/forms.rs
// DOCUMENTATION: Collect submitted form fields from either encoding
// PURPOSE: urlencoded and multipart bodies become one FormFields value;
// empty strings and empty file parts read as absent

use std::collections::HashMap;

use actix_multipart::Multipart;
use actix_web::{web, Either};
use futures::StreamExt;

use crate::errors::TravelogError;
use crate::models::*;

/// Largest request body accepted by form routes
pub const MAX_FORM_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Body of a form submission
pub type FormPayload = Either<web::Form<HashMap<String, String>>, Multipart>;

#[derive(Debug, Default)]
pub struct FormFields {
    text: HashMap<String, String>,
    files: HashMap<String, Upload>,
}

impl FormFields {
    pub async fn collect(payload: FormPayload) -> Result<Self, TravelogError> {
        match payload {
            Either::Left(form) => Ok(Self {
                text: form.into_inner(),
                files: HashMap::new(),
            }),
            Either::Right(multipart) => Self::from_multipart(multipart).await,
        }
    }

    async fn from_multipart(mut multipart: Multipart) -> Result<Self, TravelogError> {
        let mut fields = Self::default();

        while let Some(item) = multipart.next().await {
            let mut field = item.map_err(|e| TravelogError::InvalidInput(e.to_string()))?;

            let disposition = field.content_disposition();
            let Some(name) = disposition.get_name().map(str::to_string) else {
                continue;
            };
            let filename = disposition.get_filename().map(str::to_string);

            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk.map_err(|e| TravelogError::InvalidInput(e.to_string()))?;
                bytes.extend_from_slice(&chunk);
            }

            match filename {
                // A file input left blank still sends a part, with no file name
                Some(filename) if filename.is_empty() => {}
                Some(filename) => {
                    fields.files.insert(name, Upload::new(filename, bytes));
                }
                None => {
                    fields
                        .text
                        .insert(name, String::from_utf8_lossy(&bytes).into_owned());
                }
            }
        }

        Ok(fields)
    }

    /// Text value of `key`; empty strings count as absent
    pub fn text(&self, key: &str) -> Option<String> {
        self.text.get(key).filter(|v| !v.is_empty()).cloned()
    }

    pub fn take_file(&mut self, key: &str) -> Option<Upload> {
        self.files.remove(key)
    }

    pub fn into_sign_up(mut self) -> SignUpForm {
        SignUpForm {
            first_name: self.text("first_name"),
            last_name: self.text("last_name"),
            email: self.text("email"),
            username: self.text("username"),
            password: self.text("password"),
            profile_picture: self.take_file("profile_picture"),
            cover_picture: self.take_file("cover_picture"),
        }
    }

    pub fn into_sign_in(self) -> SignInForm {
        SignInForm {
            username: self.text("username"),
            password: self.text("password"),
        }
    }

    /// Every file whose field starts with `prefix`, in numeric suffix order
    /// (`log_picture_1`, `log_picture_2`, ... `log_picture_10`)
    pub fn take_numbered_files(&mut self, prefix: &str) -> Vec<Upload> {
        let mut keys: Vec<(u32, String)> = self
            .files
            .keys()
            .filter_map(|key| {
                let suffix = key.strip_prefix(prefix)?;
                let index = suffix.trim_start_matches('_').parse().ok()?;
                Some((index, key.clone()))
            })
            .collect();
        keys.sort();

        keys.into_iter()
            .filter_map(|(_, key)| self.files.remove(&key))
            .collect()
    }

    pub fn into_log(mut self) -> LogForm {
        LogForm {
            location: self.text("location"),
            description: self.text("description"),
            album: self.text("album"),
            pictures: self.take_numbered_files("log_picture"),
        }
    }

    pub fn into_album(mut self) -> AlbumForm {
        AlbumForm {
            name: self.text("name"),
            start_date: self.text("start_date"),
            end_date: self.text("end_date"),
            cover_picture: self.take_file("cover_picture"),
        }
    }
}
