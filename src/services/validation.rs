// src/services/validation.rs
// DOCUMENTATION: Form validation rules for sign-up, albums and travel logs
// PURPOSE: Ordered (predicate, error) tables; the first violated rule wins

use crate::errors::ValidationError;
use crate::models::*;

const IMAGE_TOO_LARGE: &str = "Max image size allowed is 2 mb";

/// One entry of a rule table
pub struct Rule<F> {
    pub violated: fn(&F) -> bool,
    pub error: ValidationError,
}

impl<F> Rule<F> {
    fn new(violated: fn(&F) -> bool, error: ValidationError) -> Self {
        Self { violated, error }
    }
}

/// Return the error of the first rule the form violates
pub fn first_violation<F>(rules: &[Rule<F>], form: &F) -> Option<ValidationError> {
    rules
        .iter()
        .find(|rule| (rule.violated)(form))
        .map(|rule| rule.error.clone())
}

type SignUpRule = Rule<SignUpForm>;
type AlbumRule = Rule<AlbumForm>;
type LogRule = Rule<LogForm>;

fn too_large(upload: &Option<Upload>) -> bool {
    upload.as_ref().is_some_and(Upload::exceeds_image_limit)
}

/// Format rules for sign-up, in priority order
/// DOCUMENTATION: Username availability is not here; it needs the store
/// and is checked by the account workflow after these pass
pub fn sign_up_rules() -> Vec<Rule<SignUpForm>> {
    use ValidationError::*;

    vec![
        SignUpRule::new(|f| f.first_name.is_none(), MissingField("First name is required")),
        SignUpRule::new(|f| f.last_name.is_none(), MissingField("Last name is required")),
        SignUpRule::new(|f| f.email.is_none(), MissingField("Email is required")),
        SignUpRule::new(
            |f| f.email.as_deref().is_some_and(|e| !e.contains('@')),
            FormatViolation("Email is missing the '@' symbol"),
        ),
        SignUpRule::new(|f| f.username.is_none(), MissingField("Username is required")),
        SignUpRule::new(
            |f| f.username.as_deref().is_some_and(|u| u.chars().count() < 6),
            FormatViolation("Username must be at least 6 characters long"),
        ),
        SignUpRule::new(
            |f| f.username.as_deref().is_some_and(|u| u.contains(' ')),
            FormatViolation("Username cannot contain spaces"),
        ),
        SignUpRule::new(|f| f.password.is_none(), MissingField("Password is required")),
        SignUpRule::new(
            |f| f.password.as_deref().is_some_and(|p| p.chars().count() < 6),
            FormatViolation("Password must be at least 6 characters long"),
        ),
        SignUpRule::new(|f| too_large(&f.profile_picture), FormatViolation(IMAGE_TOO_LARGE)),
        SignUpRule::new(|f| too_large(&f.cover_picture), FormatViolation(IMAGE_TOO_LARGE)),
    ]
}

fn start_date(f: &AlbumForm) -> Option<chrono::NaiveDate> {
    f.start_date.as_deref().and_then(parse_form_date)
}

fn end_date(f: &AlbumForm) -> Option<chrono::NaiveDate> {
    f.end_date.as_deref().and_then(parse_form_date)
}

/// Format rules for album create / update, in priority order
pub fn album_rules() -> Vec<Rule<AlbumForm>> {
    use ValidationError::*;

    vec![
        AlbumRule::new(|f| f.name.is_none(), MissingField("Album name is required")),
        AlbumRule::new(
            |f| f.name.as_deref() == Some("None"),
            FormatViolation("Album name cannot be 'None'"),
        ),
        AlbumRule::new(|f| f.start_date.is_none(), MissingField("Start date is required")),
        AlbumRule::new(|f| f.end_date.is_none(), MissingField("End date is required")),
        AlbumRule::new(
            |f| start_date(f).is_none(),
            FormatViolation("Start date must be a valid date (YYYY-MM-DD)"),
        ),
        AlbumRule::new(
            |f| end_date(f).is_none(),
            FormatViolation("End date must be a valid date (YYYY-MM-DD)"),
        ),
        AlbumRule::new(
            |f| matches!((start_date(f), end_date(f)), (Some(s), Some(e)) if e <= s),
            OrderViolation("End date must come after Start date"),
        ),
        AlbumRule::new(|f| too_large(&f.cover_picture), FormatViolation(IMAGE_TOO_LARGE)),
    ]
}

/// Format rules for a new travel log, in priority order
/// DOCUMENTATION: Whether the location is a known city and the album
/// belongs to the author needs the store; the log workflow checks both
pub fn log_rules() -> Vec<Rule<LogForm>> {
    use ValidationError::*;

    vec![
        LogRule::new(|f| f.location.is_none(), MissingField("Location is required")),
        LogRule::new(
            |f| f.location.as_deref().is_some_and(|l| split_location(l).is_none()),
            FormatViolation("Location must look like 'City, Country'"),
        ),
        LogRule::new(|f| f.description.is_none(), MissingField("Description is required")),
        LogRule::new(
            |f| {
                f.description
                    .as_deref()
                    .is_some_and(|d| d.chars().count() > MAX_LOG_DESCRIPTION)
            },
            FormatViolation("Description cannot be longer than 1000 characters"),
        ),
        LogRule::new(
            |f| parse_album_choice(f.album.as_deref()).is_err(),
            FormatViolation("Selected album is not valid"),
        ),
        LogRule::new(
            |f| f.pictures.len() > MAX_LOG_PICTURES,
            FormatViolation("A log can have at most 10 pictures"),
        ),
        LogRule::new(
            |f| f.pictures.iter().any(Upload::exceeds_image_limit),
            FormatViolation(IMAGE_TOO_LARGE),
        ),
    ]
}

/// Validate a sign-up form into a draft ready for persistence
pub fn validate_sign_up(form: SignUpForm) -> Result<SignUpDraft, ValidationError> {
    if let Some(error) = first_violation(&sign_up_rules(), &form) {
        return Err(error);
    }

    Ok(SignUpDraft {
        first_name: form.first_name.unwrap_or_default(),
        last_name: form.last_name.unwrap_or_default(),
        email: form.email.unwrap_or_default(),
        username: form.username.unwrap_or_default(),
        password: form.password.unwrap_or_default(),
        profile_picture: form.profile_picture,
        cover_picture: form.cover_picture,
    })
}

/// Validate an album form into a draft ready for persistence
pub fn validate_album(form: AlbumForm) -> Result<AlbumDraft, ValidationError> {
    if let Some(error) = first_violation(&album_rules(), &form) {
        return Err(error);
    }

    // Both dates parsed, or a rule above would have fired
    match (start_date(&form), end_date(&form)) {
        (Some(start_date), Some(end_date)) => Ok(AlbumDraft {
            name: form.name.unwrap_or_default(),
            start_date,
            end_date,
            cover_picture: form.cover_picture,
        }),
        _ => Err(ValidationError::FormatViolation(
            "Start date must be a valid date (YYYY-MM-DD)",
        )),
    }
}

/// Validate a log form into a draft ready for the city lookup
pub fn validate_log(form: LogForm) -> Result<LogDraft, ValidationError> {
    if let Some(error) = first_violation(&log_rules(), &form) {
        return Err(error);
    }

    let location = form.location.unwrap_or_default();
    let (city_name, country_name) = split_location(&location)
        .ok_or(ValidationError::FormatViolation("Location must look like 'City, Country'"))?;
    let album_id = parse_album_choice(form.album.as_deref())
        .map_err(|_| ValidationError::FormatViolation("Selected album is not valid"))?;

    Ok(LogDraft {
        city_name: city_name.to_string(),
        country_name: country_name.to_string(),
        description: form.description.unwrap_or_default(),
        album_id,
        pictures: form.pictures,
    })
}
