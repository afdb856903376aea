mod clients;
mod config;
mod derive;
mod error;
mod helpers;
mod models;
mod query;
mod routes;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use clients::context::ContextSlot;
use clients::kubeconfig::{Kubeconfig, KubeconfigConnector};
use error::DashboardError;
use query::Dashboard;

#[derive(Clone)]
pub struct AppState {
    pub dashboard: Dashboard,
}

/// Config path from `<path>` or `--config <path>`, and whether it was given.
fn config_path() -> (PathBuf, bool) {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let explicit = match args.first().map(String::as_str) {
        Some("-config") | Some("--config") => args.get(1).cloned(),
        Some(path) => Some(path.to_string()),
        None => None,
    };
    match explicit {
        Some(path) => (PathBuf::from(path), true),
        None => (PathBuf::from(config::DEFAULT_CONFIG_PATH), false),
    }
}

fn build_state(cfg: &config::Config) -> Result<AppState, DashboardError> {
    let kubeconfig_path = cfg.kubeconfig_path()?;
    let kubeconfig = Kubeconfig::load(&kubeconfig_path)?;
    let base_dir = kubeconfig_path
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    let connector = KubeconfigConnector::new(
        kubeconfig,
        base_dir,
        cfg.request_timeout(),
        cfg.page_size,
    );
    let slot = ContextSlot::new(Arc::new(connector), cfg.context.clone())?;

    info!(
        kubeconfig = %kubeconfig_path.display(),
        contexts = slot.available().len(),
        "kubeconfig loaded"
    );

    Ok(AppState {
        dashboard: Dashboard::new(Arc::new(slot)),
    })
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("kubeglance=info")),
        )
        .init();

    let (config_path, explicit) = config_path();
    let cfg = config::Config::load_or_default(&config_path, explicit).unwrap_or_else(|e| {
        eprintln!("error loading config: {}", e);
        std::process::exit(1);
    });

    let state = build_state(&cfg).unwrap_or_else(|e| {
        eprintln!("error connecting to cluster: {}", e);
        std::process::exit(1);
    });

    let router = routes::build_router(state);

    let listen_addr = cfg.listen_addr();
    let listener = TcpListener::bind(&listen_addr).await.unwrap_or_else(|e| {
        eprintln!("failed to bind {}: {}", listen_addr, e);
        std::process::exit(1);
    });

    info!("kubeglance listening on {}", listen_addr);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .unwrap_or_else(|e| {
            eprintln!("server error: {}", e);
            std::process::exit(1);
        });
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!(error = %e, "failed to listen for ctrl+c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("shutting down");
}
