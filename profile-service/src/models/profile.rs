use crate::config::ProfileConfig;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Body of `GET /me`.
///
/// Serialized in declaration order: `status`, `user`, `timestamp`, `fact`.
/// Consumers compare the raw body, so do not reorder these fields.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileResponse {
    pub status: &'static str,
    pub user: UserProfile,
    pub timestamp: String,
    pub fact: String,
}

/// `email`, `name`, `stack`, in that order. Unset values serialize as `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UserProfile {
    pub email: Option<String>,
    pub name: Option<String>,
    pub stack: Option<String>,
}

impl From<&ProfileConfig> for UserProfile {
    fn from(profile: &ProfileConfig) -> Self {
        Self {
            email: profile.email.clone(),
            name: profile.name.clone(),
            stack: profile.stack.clone(),
        }
    }
}

impl ProfileResponse {
    pub fn success(profile: &ProfileConfig, fact: String, now: DateTime<Utc>) -> Self {
        Self {
            status: "success",
            user: profile.into(),
            timestamp: format_timestamp(now),
            fact,
        }
    }
}

/// ISO-8601 UTC with microseconds and a literal `Z`,
/// e.g. `2026-10-19T08:15:30.123456Z`.
pub fn format_timestamp(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Micros, true)
}
