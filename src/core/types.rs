use std::fmt;

use axum::http::StatusCode;
use reqwest::Url;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use super::error::CatalogError;

/// Identifier shared by a gallery and the server hosting it.
pub type GalleryId = i64;

/// Base address of a gallery server, e.g. `http://10.0.0.2:8080`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerAddress(Url);

impl ServerAddress {
    pub fn parse(raw: &str) -> crate::core::Result<Self> {
        let url = Url::parse(raw.trim())
            .map_err(|err| CatalogError::InvalidUri(format!("{raw}: {err}")))?;
        if !matches!(url.scheme(), "http" | "https") || url.host_str().is_none() {
            return Err(CatalogError::InvalidUri(format!(
                "{raw}: server address must be an http(s) URL with a host"
            )));
        }
        Ok(Self(url))
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    /// Appends a request path to the base address.
    ///
    /// Any path prefix configured on the base address is kept, so
    /// `http://host/api` + `/galleries/2` gives `http://host/api/galleries/2`.
    pub fn with_path(&self, path: &str) -> crate::core::Result<Url> {
        let base = self.0.as_str().trim_end_matches('/');
        let joined = if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        };
        Url::parse(&joined).map_err(|err| CatalogError::InvalidUri(format!("{joined}: {err}")))
    }
}

impl fmt::Display for ServerAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.0.as_str().trim_end_matches('/'))
    }
}

impl Serialize for ServerAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ServerAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Self::parse(&raw).map_err(serde::de::Error::custom)
    }
}

/// Result of running one gallery operation against local state.
///
/// The batch router only consumes `entity`; `status` is kept for callers that
/// answer a single-target request with the same handler.
#[derive(Debug, Clone, PartialEq)]
pub struct LocalOutcome {
    pub status: StatusCode,
    pub entity: Value,
}

impl LocalOutcome {
    pub fn new(status: StatusCode, entity: impl Serialize) -> crate::core::Result<Self> {
        let entity = serde_json::to_value(entity)
            .map_err(|err| CatalogError::Internal(err.to_string()))?;
        Ok(Self { status, entity })
    }

    pub fn ok(entity: impl Serialize) -> crate::core::Result<Self> {
        Self::new(StatusCode::OK, entity)
    }

    pub fn created(entity: impl Serialize) -> crate::core::Result<Self> {
        Self::new(StatusCode::CREATED, entity)
    }
}
