// src/urls.rs
// DOCUMENTATION: Paths the application redirects to

pub const SIGN_IN: &str = "/mytravelog/sign_in/";

pub fn user_page(username: &str) -> String {
    format!("/mytravelog/user/{}/", username)
}
