use config::{Config, ConfigError, Environment, File as ConfigFile};
use once_cell::sync::OnceCell;
use serde::Deserialize;
use std::error::Error;
use std::path::Path;
use std::time::Duration;

use crate::address::Network;
use crate::constants::{
    DEFAULT_CHRONIK_URL, DEFAULT_GEOIP_URL, DEFAULT_HTTP_TIMEOUT_SECS, DEFAULT_LISTEN,
    DEFAULT_RANK_URL, DEFAULT_RPC_HOST, DEFAULT_RPC_PORT,
};

static GLOBAL_SETTINGS: OnceCell<Settings> = OnceCell::new();

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerSettings {
    pub listen: String,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            listen: DEFAULT_LISTEN.to_string(),
        }
    }
}

/// Base URL of a REST upstream
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ServiceSettings {
    pub url: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct GeoIpSettings {
    pub url: String,
    /// 0 keeps every entry for the life of the process; anything else bounds
    /// the cache with LRU eviction
    pub capacity: usize,
}

impl Default for GeoIpSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_GEOIP_URL.to_string(),
            capacity: 0,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct RpcSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub password: String,
}

impl Default for RpcSettings {
    fn default() -> Self {
        Self {
            host: DEFAULT_RPC_HOST.to_string(),
            port: DEFAULT_RPC_PORT,
            user: String::new(),
            password: String::new(),
        }
    }
}

impl RpcSettings {
    pub fn url(&self) -> String {
        format!("http://{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_HTTP_TIMEOUT_SECS,
        }
    }
}

impl HttpSettings {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    pub server: ServerSettings,
    pub chronik: ServiceSettings,
    pub rank: ServiceSettings,
    pub geoip: GeoIpSettings,
    pub rpc: RpcSettings,
    pub http: HttpSettings,
    pub network: Network,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            server: ServerSettings::default(),
            chronik: ServiceSettings {
                url: DEFAULT_CHRONIK_URL.to_string(),
            },
            rank: ServiceSettings {
                url: DEFAULT_RANK_URL.to_string(),
            },
            geoip: GeoIpSettings::default(),
            rpc: RpcSettings::default(),
            http: HttpSettings::default(),
            network: Network::default(),
        }
    }
}

impl Settings {
    /// Layer defaults, the TOML file and `LOTUSIA_*` environment variables.
    ///
    /// An explicit `path` must exist; without one `config.toml` is read if
    /// present.
    pub fn load(path: Option<&Path>) -> Result<Settings, ConfigError> {
        let file = match path {
            Some(path) => ConfigFile::from(path).required(true),
            None => ConfigFile::with_name("config.toml").required(false),
        };

        Config::builder()
            .add_source(file)
            .add_source(
                Environment::with_prefix("LOTUSIA")
                    .prefix_separator("_")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()
    }
}

pub fn init_global_settings(settings: Settings) -> Result<&'static Settings, Box<dyn Error>> {
    GLOBAL_SETTINGS
        .set(settings)
        .map_err(|_| "Settings already initialized")?;
    GLOBAL_SETTINGS
        .get()
        .ok_or_else(|| "Settings not initialized".into())
}

pub fn global_settings() -> Option<&'static Settings> {
    GLOBAL_SETTINGS.get()
}
