pub mod profile;

pub use profile::{format_timestamp, ProfileResponse, UserProfile};
