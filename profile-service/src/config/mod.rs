use service_core::config as core_config;
use service_core::error::AppError;
use std::env;
use std::time::Duration;

pub const PROFILE_EMAIL: &str = "PROFILE_EMAIL";
pub const PROFILE_NAME: &str = "PROFILE_NAME";
pub const PROFILE_STACK: &str = "PROFILE_STACK";
pub const CAT_FACT_API_URL: &str = "CAT_FACT_API_URL";
pub const API_TIMEOUT: &str = "API_TIMEOUT";

/// Upstream timeout used when `API_TIMEOUT` is unset.
pub const DEFAULT_TIMEOUT_SECS: f64 = 5.0;

#[derive(Debug, Clone)]
pub struct ProfileServiceConfig {
    pub common: core_config::Config,
    pub profile: ProfileConfig,
    pub fact_source: FactSourceConfig,
}

/// The service owner's details. Unset values are reported as `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileConfig {
    pub email: Option<String>,
    pub name: Option<String>,
    pub stack: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FactSourceConfig {
    /// `None` disables the upstream call entirely.
    pub url: Option<String>,
    pub timeout: Duration,
}

impl Default for FactSourceConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout: Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ProfileServiceConfig {
    pub fn load() -> Result<Self, AppError> {
        let common_config = core_config::Config::load()?;
        Self::from_lookup(common_config, |key| env::var(key).ok())
    }

    /// Build from any flat key/value source.
    pub fn from_lookup<F>(common: core_config::Config, lookup: F) -> Result<Self, AppError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(ProfileServiceConfig {
            common,
            profile: ProfileConfig {
                email: lookup(PROFILE_EMAIL),
                name: lookup(PROFILE_NAME),
                stack: lookup(PROFILE_STACK),
            },
            fact_source: FactSourceConfig {
                url: lookup(CAT_FACT_API_URL).filter(|url| !url.trim().is_empty()),
                timeout: parse_timeout(lookup(API_TIMEOUT).as_deref())?,
            },
        })
    }
}

fn parse_timeout(raw: Option<&str>) -> Result<Duration, AppError> {
    let Some(raw) = raw else {
        return Ok(Duration::from_secs_f64(DEFAULT_TIMEOUT_SECS));
    };

    let secs: f64 = raw.trim().parse().map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!(
            "{} must be a number of seconds, got {:?}: {}",
            API_TIMEOUT,
            raw,
            e
        ))
    })?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(AppError::ConfigError(anyhow::anyhow!(
            "{} must be greater than zero, got {}",
            API_TIMEOUT,
            secs
        )));
    }

    Duration::try_from_secs_f64(secs).map_err(|e| {
        AppError::ConfigError(anyhow::anyhow!("{} is out of range: {}", API_TIMEOUT, e))
    })
}
