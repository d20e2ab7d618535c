use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use common::utils::logging::init_logging_from_env;
use configs::AppConfig;
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::shutdown;
use crate::state::ServerState;
use service::runtime;

/// Initialize logging via shared common utils
fn init_logging() {
    init_logging_from_env();
}

fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

fn bind_addr(cfg: &AppConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", cfg.server.host, cfg.server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("server address: {e}")))
}

/// Public entry: build the app and serve until `shutdown` resolves, then
/// finish in-flight requests and return.
pub async fn run<F>(signal: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    dotenv().ok();
    init_logging();

    let cfg = AppConfig::load_or_env().map_err(|e| StartupError::InvalidConfig(e.to_string()))?;

    runtime::ensure_upload_dir(cfg.uploads.product_dir())
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    // DB connection + schema
    let db = models::db::connect_with_config(&cfg.database).await?;
    migration::Migrator::up(&db, None).await?;
    info!("migrations applied");

    let state = ServerState::with_database(db, &cfg);

    // Build router
    let app: Router = routes::build_router(state, build_cors(), &cfg.uploads);

    // Bind and serve
    let addr = bind_addr(&cfg)?;
    info!(%addr, uploads = %cfg.uploads.product_dir().display(), "starting catalog server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    serve(listener, app, signal).await?;
    info!("catalog server stopped");
    Ok(())
}

/// Serve `app` on `listener` until `signal` resolves, draining open requests.
pub async fn serve<F>(listener: tokio::net::TcpListener, app: Router, signal: F) -> std::io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown::logged(signal))
        .await
}
