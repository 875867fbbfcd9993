// src/db/mod.rs
// DOCUMENTATION: Database module organization
// PURPOSE: Re-export the storage seam and its two backends

pub mod memory;
pub mod repository;
pub mod store;

pub use memory::*;
pub use repository::*;
pub use store::*;
