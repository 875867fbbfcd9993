// src/models/mod.rs
// DOCUMENTATION: Models module organization
// PURPOSE: Re-export model components

pub mod album;
pub mod city;
pub mod travel_log;
pub mod upload;
pub mod user;

pub use album::*;
pub use city::*;
pub use travel_log::*;
pub use upload::*;
pub use user::*;
