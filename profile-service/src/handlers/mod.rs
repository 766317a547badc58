//! HTTP handlers for profile-service.

pub mod health;
pub mod profile;

pub use health::{health_check, metrics};
pub use profile::{get_profile, not_found, NOT_FOUND_MESSAGE};
