//! profile-service: `GET /me` returns the owner's profile, the current UTC
//! time and a cat fact fetched from a third-party API.
pub mod config;
pub mod handlers;
pub mod models;
pub mod services;
pub mod startup;

pub use startup::{build_router, AppState, Application};
