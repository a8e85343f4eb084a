use crate::core::{CatalogError, GalleryId, LocalOutcome, Result, ServerAddress};
use crate::web::WebError;
use async_trait::async_trait;
use axum::Json;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Router;
use reqwest::Url;
use serde::{Serialize, Serializer};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::future::Future;
use std::sync::{Arc, RwLock};
use std::time::Duration;
use tower::ServiceExt;
use tracing::{debug, info};

// Gallery cluster routing is split by responsibility for easier navigation.
include!("cluster/directory.rs");
include!("cluster/forwarder.rs");
include!("cluster/in_process_forwarder.rs");
include!("cluster/router.rs");
