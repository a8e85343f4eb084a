use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use gallery_catalog::{
    BatchRouter, ClusterState, HttpPeerForwarder,
    art::{self, ArtState, InMemoryArtRepository},
    config::{ArtConfig, GalleryConfig},
    gallery::{self, GalleryRepository, GalleryState, InMemoryGalleryRepository},
};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "gallery-catalog", about = "Gallery and art catalog services")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one gallery server of the cluster
    Gallery {
        /// Overrides APP_PORT
        #[arg(long)]
        port: Option<u16>,
        /// JSON server directory, overrides GALLERY_DIRECTORY_FILE and GALLERY_SERVERS
        #[arg(long)]
        directory: Option<PathBuf>,
    },
    /// Run the art service
    Art {
        /// Overrides APP_PORT
        #[arg(long)]
        port: Option<u16>,
    },
}

impl Command {
    /// Default `RUST_LOG` directives for the selected service.
    fn default_log_filter(&self) -> &'static str {
        match self {
            Command::Gallery { .. } => {
                "gallery_catalog=info,gallery_catalog::cluster=debug,gallery_catalog::gallery=debug,tower_http=info"
            }
            Command::Art { .. } => "gallery_catalog=info,gallery_catalog::art=debug,tower_http=info",
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.command.default_log_filter());

    match cli.command {
        Command::Gallery { port, directory } => run_gallery(port, directory).await,
        Command::Art { port } => run_art(port).await,
    }
}

async fn run_gallery(port: Option<u16>, directory: Option<PathBuf>) -> Result<()> {
    let mut config = GalleryConfig::from_env(directory.as_deref())
        .context("failed to load gallery configuration")?;
    if let Some(port) = port {
        config.port = port;
    }

    let snapshot = config.cluster_snapshot()?;
    info!(
        server_id = snapshot.local_id(),
        leader_id = snapshot.leader_id(),
        servers = snapshot.servers().len(),
        "gallery server directory loaded"
    );

    let repository: Arc<dyn GalleryRepository> = Arc::new(InMemoryGalleryRepository::new());
    gallery::ensure_local_gallery(repository.as_ref(), config.server_id, &config.gallery_name)
        .await
        .context("failed to initialize local gallery")?;

    let forwarder = HttpPeerForwarder::new(config.forward_timeout)
        .context("failed to build peer HTTP client")?;
    let state = GalleryState::new(
        Arc::new(ClusterState::new(snapshot)),
        BatchRouter::new(Arc::new(forwarder)),
        repository,
    );

    serve(gallery::build_router(state), &config.address(), "gallery server").await
}

async fn run_art(port: Option<u16>) -> Result<()> {
    let mut config = ArtConfig::from_env().context("failed to load art configuration")?;
    if let Some(port) = port {
        config.port = port;
    }

    let state = ArtState::new(Arc::new(InMemoryArtRepository::new()));
    serve(art::build_router(state), &config.address(), "art service").await
}

async fn serve(app: axum::Router, addr: &str, service: &str) -> Result<()> {
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;

    info!(address = %addr, "{service} started");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

fn init_tracing(default_filter: &str) {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)))
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "unable to install Ctrl+C signal handler");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};

        match signal(SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                error!(error = %err, "unable to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    let signal = tokio::select! {
        _ = ctrl_c => "ctrl-c",
        _ = terminate => "sigterm",
    };
    info!(signal, "shutdown requested, draining connections");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn each_service_gets_its_own_log_filter() {
        let gallery = Cli::try_parse_from(["gallery-catalog", "gallery", "--port", "9000"]).unwrap();
        let art = Cli::try_parse_from(["gallery-catalog", "art"]).unwrap();

        let gallery_filter = gallery.command.default_log_filter();
        let art_filter = art.command.default_log_filter();

        assert!(gallery_filter.contains("gallery_catalog::cluster=debug"));
        assert!(art_filter.contains("gallery_catalog::art=debug"));
        assert!(!art_filter.contains("cluster"));
        assert!(EnvFilter::try_new(gallery_filter).is_ok());
        assert!(EnvFilter::try_new(art_filter).is_ok());
    }
}
