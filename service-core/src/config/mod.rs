use crate::error::AppError;
use config::{Config as Cfg, Environment, File};
use serde::Deserialize;

/// Listener settings shared by every service binary.
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Port for `/health` and `/metrics`. Disabled when unset.
    #[serde(default)]
    pub ops_port: Option<u16>,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            ops_port: None,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, AppError> {
        dotenvy::dotenv().ok();

        // Hosting platforms hand the listener port over as a bare PORT.
        Self::build(std::env::var("PORT").ok())
    }

    /// Layer the `configuration` file, `APP__*` variables and a platform
    /// `PORT` (blank values ignored), in increasing precedence.
    pub fn build(platform_port: Option<String>) -> Result<Self, AppError> {
        let platform_port = platform_port.filter(|p| !p.trim().is_empty());

        let config = Cfg::builder()
            .add_source(File::with_name("configuration").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            .set_override_option("port", platform_port)?
            .build()?;

        Ok(config.try_deserialize()?)
    }
}
