use std::net::{Ipv4Addr, SocketAddr};

use thiserror::Error;

pub const DEFAULT_PORT: u16 = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{var} is not in the correct format: {value}")]
    Malformed { var: &'static str, value: String },
}

/// Service configuration read from the environment (and `.env`).
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub host: Option<Ipv4Addr>,
    pub port: Option<u16>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Builds the configuration from any variable source. Empty values count
    /// as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let host: Option<Ipv4Addr> = get("HOST")
            .map(|v| {
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::Malformed { var: "HOST", value: v.clone() })
            })
            .transpose()?;
        let port: Option<u16> = get("PORT")
            .map(|v| {
                v.trim()
                    .parse()
                    .map_err(|_| ConfigError::Malformed { var: "PORT", value: v.clone() })
            })
            .transpose()?;

        Ok(Config {
            database_url: get("DATABASE_URL"),
            database_name: get("DATABASE_NAME"),
            host,
            port,
        })
    }

    /// Connection target and database name, when both are set.
    pub fn database(&self) -> Option<(&str, &str)> {
        Some((self.database_url.as_deref()?, self.database_name.as_deref()?))
    }

    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from((
            self.host.unwrap_or(Ipv4Addr::UNSPECIFIED),
            self.port.unwrap_or(DEFAULT_PORT),
        ))
    }
}
