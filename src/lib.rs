// ============================================================================
// Gallery Catalog Library
// ============================================================================

pub mod art;
pub mod cluster;
pub mod config;
pub mod core;
pub mod gallery;
pub mod web;

// Re-export main types for convenience
pub use cluster::{
    BatchEntry, BatchRequest, BatchRouter, BatchWriteTarget, ClusterSnapshot, ClusterState,
    ForwardBody, ForwardError, ForwardRequest, HttpPeerForwarder, InProcessForwarder,
    PeerForwarder, RedirectFailure, RouteResponse, rewrite_batch_path,
};
pub use crate::core::{CatalogError, GalleryId, LocalOutcome, Result, ServerAddress};
