use anyhow::{Context, Result, anyhow};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::env;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::cluster::ClusterSnapshot;
use crate::core::{GalleryId, ServerAddress};

pub const DEFAULT_GALLERY_PORT: u16 = 8080;
pub const DEFAULT_ART_PORT: u16 = 8081;
pub const DEFAULT_FORWARD_TIMEOUT_MS: u64 = 5000;

/// JSON server directory, e.g.
/// `{ "servers": { "1": "http://gallery-1:8080" }, "leader_id": 1 }`.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryFile {
    pub servers: BTreeMap<GalleryId, ServerAddress>,
    #[serde(default)]
    pub leader_id: Option<GalleryId>,
}

impl DirectoryFile {
    pub fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read directory file {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("failed to parse directory file {}", path.display()))
    }
}

/// Parses `1=http://gallery-1:8080,2=http://gallery-2:8080`.
pub fn parse_servers(raw: &str) -> Result<BTreeMap<GalleryId, ServerAddress>> {
    let mut servers = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|entry| !entry.is_empty()) {
        let (id, address) = entry
            .split_once('=')
            .ok_or_else(|| anyhow!("server entry '{}' must look like <id>=<url>", entry))?;
        let id = id
            .trim()
            .parse::<GalleryId>()
            .with_context(|| format!("server id in '{}' must be an integer", entry))?;
        let address = ServerAddress::parse(address)?;
        if servers.insert(id, address).is_some() {
            return Err(anyhow!("server id {} is listed twice", id));
        }
    }
    Ok(servers)
}

fn parse_var<T>(source: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match source(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}

#[derive(Debug, Clone)]
pub struct GalleryConfig {
    pub host: String,
    pub port: u16,
    pub server_id: GalleryId,
    pub leader_id: GalleryId,
    pub servers: BTreeMap<GalleryId, ServerAddress>,
    pub gallery_name: String,
    pub forward_timeout: Duration,
}

impl GalleryConfig {
    pub fn from_env(directory_override: Option<&Path>) -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok(), directory_override)
    }

    /// Builds the configuration from a key lookup.
    ///
    /// The directory comes from `directory_override`, then
    /// `GALLERY_DIRECTORY_FILE`, then `GALLERY_SERVERS`. The leader comes from
    /// `GALLERY_LEADER_ID`, then the directory file, then the lowest server id.
    pub fn from_source(
        source: impl Fn(&str) -> Option<String>,
        directory_override: Option<&Path>,
    ) -> Result<Self> {
        let host = source("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&source, "APP_PORT", DEFAULT_GALLERY_PORT)?;

        let server_id = source("GALLERY_SERVER_ID")
            .context("GALLERY_SERVER_ID must be set")?
            .trim()
            .parse::<GalleryId>()
            .context("GALLERY_SERVER_ID must be an integer")?;

        let directory_path = directory_override
            .map(Path::to_path_buf)
            .or_else(|| source("GALLERY_DIRECTORY_FILE").map(PathBuf::from));
        let (servers, file_leader) = match directory_path {
            Some(path) => {
                let file = DirectoryFile::load(&path)?;
                (file.servers, file.leader_id)
            }
            None => {
                let raw = source("GALLERY_SERVERS")
                    .context("either GALLERY_SERVERS or GALLERY_DIRECTORY_FILE must be set")?;
                (parse_servers(&raw)?, None)
            }
        };

        let leader_id = match source("GALLERY_LEADER_ID") {
            Some(raw) => raw
                .trim()
                .parse::<GalleryId>()
                .context("GALLERY_LEADER_ID must be an integer")?,
            None => file_leader
                .or_else(|| servers.keys().next().copied())
                .context("server directory must not be empty")?,
        };

        let gallery_name =
            source("GALLERY_NAME").unwrap_or_else(|| format!("gallery-{}", server_id));

        let forward_timeout = Duration::from_millis(parse_var(
            &source,
            "FORWARD_TIMEOUT_MS",
            DEFAULT_FORWARD_TIMEOUT_MS,
        )?);

        let config = Self {
            host,
            port,
            server_id,
            leader_id,
            servers,
            gallery_name,
            forward_timeout,
        };
        config.cluster_snapshot()?;
        Ok(config)
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn cluster_snapshot(&self) -> crate::core::Result<ClusterSnapshot> {
        ClusterSnapshot::new(self.server_id, self.leader_id, self.servers.clone())
    }
}

#[derive(Debug, Clone)]
pub struct ArtConfig {
    pub host: String,
    pub port: u16,
}

impl ArtConfig {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_source(|key| env::var(key).ok())
    }

    pub fn from_source(source: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let host = source("APP_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_var(&source, "APP_PORT", DEFAULT_ART_PORT)?;
        Ok(Self { host, port })
    }

    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
