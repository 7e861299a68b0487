use std::{env, net::SocketAddr, sync::Arc};

use axum::Router;
use common::utils::logging::init_logging_default;
use dotenvy::dotenv;
use service::{storage, MemoryStore, SaveService, StorageMode};
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes::{self, ServerState};

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

/// Load bind address and data directory from configs or env vars, with
/// sensible fallbacks.
fn load_settings() -> anyhow::Result<(SocketAddr, String)> {
    let (host, port, data_dir) = match configs::AppConfig::load_and_validate() {
        Ok(cfg) => (cfg.server.host, cfg.server.port, cfg.storage.data_dir),
        Err(_) => {
            let host = env::var("SERVER_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
            let port = env::var("SERVER_PORT")
                .ok()
                .and_then(|p| p.parse::<u16>().ok())
                .unwrap_or(3000);
            let data_dir = env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string());
            (host, port, data_dir)
        }
    };
    Ok((format!("{}:{}", host, port).parse()?, data_dir))
}

/// Public entry: build the app and run the HTTP server.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    init_logging_default();

    common::env::check_frontend_dir("frontend").await;

    let (addr, data_dir) = load_settings()?;
    let save = Arc::new(SaveService::new(data_dir.as_str(), MemoryStore::new()));

    // Initial probe for the startup banner only; every save re-probes.
    match storage::probe(save.data_dir()).await {
        StorageMode::Durable => info!(%data_dir, "write permission confirmed in data directory"),
        StorageMode::Volatile => {
            info!(%data_dir, "data directory unusable, starting with in-memory storage")
        }
    }

    let state = ServerState { save };
    let app: Router = routes::build_router(state, build_cors());

    info!(%addr, "starting save server");
    info!("JSON save endpoint: http://{}/save-json", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
