use std::{
    net::SocketAddr,
    path::{Path, PathBuf},
};

use clap::Parser;
use config::{builder::DefaultState, ConfigBuilder, ConfigError, File};
use serde::{Deserialize, Serialize};

const DEFAULT_ADDR: &str = "127.0.0.1:8000";
const DEFAULT_PHOTO_BUCKET: &str = "items";
const DEFAULT_SEARCH_LIMIT: u64 = 100;
const DEFAULT_CANDIDATE_LIMIT: u64 = 200;
const DEFAULT_LOG_LEVEL: &str = "info";

#[derive(Parser, Debug)]
#[command(version)]
pub struct Args {
    /// Path to the local configuration TOML file.
    #[arg(short, value_name = "CONFIG_PATH")]
    pub config: PathBuf,

    /// Path to the certificate file. Serves over TLS together with `--key`.
    #[arg(long, value_name = "CERT_PATH", requires = "key")]
    pub cert: Option<PathBuf>,

    /// Path to the key file.
    #[arg(long, value_name = "KEY_PATH", requires = "cert")]
    pub key: Option<PathBuf>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Web {
    #[serde(deserialize_with = "deserialize_socket_addr")]
    pub address: SocketAddr,
}

/// Where the hosted data service lives.
#[derive(Debug, Serialize, Deserialize)]
pub struct Backend {
    pub url: String,
    pub api_key: String,
    pub photo_bucket: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Search {
    pub limit: usize,
    pub candidate_limit: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Log {
    pub level: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Settings {
    pub web: Web,
    pub backend: Backend,
    pub search: Search,
    pub log: Log,
}

impl Settings {
    /// Load settings from the given TOML file. Everything except the backend
    /// URL and key has a default.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let builder = ConfigBuilder::<DefaultState>::default()
            .set_default("web.address", DEFAULT_ADDR)?
            .set_default("backend.photo_bucket", DEFAULT_PHOTO_BUCKET)?
            .set_default("search.limit", DEFAULT_SEARCH_LIMIT)?
            .set_default("search.candidate_limit", DEFAULT_CANDIDATE_LIMIT)?
            .set_default("log.level", DEFAULT_LOG_LEVEL)?;

        let cfg = builder.add_source(File::from(path)).build()?;

        cfg.try_deserialize()
    }
}

fn deserialize_socket_addr<'de, D>(deserializer: D) -> Result<SocketAddr, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s = String::deserialize(deserializer)?;
    s.parse().map_err(serde::de::Error::custom)
}
