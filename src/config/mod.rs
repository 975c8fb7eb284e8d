use std::env;
use anyhow::{Result, Context};
use tracing::{info, warn};

pub const DEFAULT_MAX_UPLOAD_SIZE_MB: usize = 25;
pub const DEFAULT_MAX_CONCURRENT_REQUESTS: usize = 16;

#[derive(Debug, Clone)]
pub struct Config {
    pub server_host: String,
    pub server_port: u16,
    pub max_upload_size_mb: usize,
    pub max_concurrent_requests: usize,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        info!("Loading configuration from environment variables");

        let config = Config {
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| {
                info!("SERVER_HOST not set, using default: 0.0.0.0");
                "0.0.0.0".to_string()
            }),
            server_port: Self::parse_env_var("SERVER_PORT", 8080)
                .context("Failed to parse SERVER_PORT")?,
            max_upload_size_mb: Self::parse_env_var("MAX_UPLOAD_SIZE_MB", DEFAULT_MAX_UPLOAD_SIZE_MB)
                .context("Failed to parse MAX_UPLOAD_SIZE_MB")?,
            max_concurrent_requests: Self::parse_env_var(
                "MAX_CONCURRENT_REQUESTS",
                DEFAULT_MAX_CONCURRENT_REQUESTS,
            )
            .context("Failed to parse MAX_CONCURRENT_REQUESTS")?,
        };

        config.validate()?;

        info!("Configuration loaded successfully: {:?}", config);
        Ok(config)
    }

    /// Listening port; `PORT` (set by most hosting platforms) wins over `SERVER_PORT`.
    pub fn listen_port(&self) -> u16 {
        env::var("PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(self.server_port)
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_size_mb * 1024 * 1024
    }

    fn parse_env_var<T>(var_name: &str, default: T) -> Result<T>
    where
        T: std::str::FromStr + Copy + std::fmt::Debug,
        T::Err: std::fmt::Display,
    {
        match env::var(var_name) {
            Ok(val) => match val.parse() {
                Ok(parsed) => Ok(parsed),
                Err(e) => {
                    warn!("Failed to parse {}: {} (using default: {:?})", var_name, e, default);
                    Ok(default)
                }
            },
            Err(_) => {
                info!("{} not set, using default: {:?}", var_name, default);
                Ok(default)
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.server_port == 0 {
            return Err(anyhow::anyhow!("SERVER_PORT must be greater than 0"));
        }
        if self.max_upload_size_mb == 0 {
            return Err(anyhow::anyhow!("MAX_UPLOAD_SIZE_MB must be greater than 0"));
        }
        if self.max_concurrent_requests == 0 {
            return Err(anyhow::anyhow!("MAX_CONCURRENT_REQUESTS must be greater than 0"));
        }
        Ok(())
    }
}
