// src/services/mod.rs
// DOCUMENTATION: Services module organization
// PURPOSE: Re-export service components

pub mod account_service;
pub mod album_service;
pub mod city_service;
pub mod log_service;
pub mod media;
pub mod passwords;
pub mod ranking;
pub mod session_store;
pub mod validation;

pub use account_service::*;
pub use album_service::*;
pub use city_service::*;
pub use log_service::*;
pub use media::*;
pub use ranking::*;
pub use session_store::*;
