//! `server` binary: owns the Tokio runtime and process-level concerns, then
//! hands over to [`server::run`] until a shutdown signal arrives.

use std::process::ExitCode;

use tokio::runtime::{Builder, Runtime};
use tracing::{error, info, warn};
use uuid::Uuid;

/// Fallback when there is no usable config: `TOKIO_WORKER_THREADS`, else Tokio's default.
fn worker_threads() -> Option<usize> {
    match configs::AppConfig::load_or_env() {
        Ok(cfg) => cfg.server.worker_threads,
        Err(e) => {
            warn!(error = %e, "config unavailable; sizing runtime from TOKIO_WORKER_THREADS");
            std::env::var("TOKIO_WORKER_THREADS").ok().and_then(|v| v.parse().ok())
        }
    }
}

fn build_runtime(workers: Option<usize>) -> std::io::Result<Runtime> {
    let mut builder = Builder::new_multi_thread();
    builder.enable_all().thread_name("catalog-worker");
    if let Some(n) = workers.filter(|n| *n > 0) {
        builder.worker_threads(n);
    }
    builder.build()
}

fn install_panic_hook(instance: Uuid) {
    std::panic::set_hook(Box::new(move |panic| {
        let location = panic.location().map(|l| format!("{}:{}", l.file(), l.line()));
        error!(%instance, location = location.as_deref().unwrap_or("unknown"), message = %panic, "panic");
    }));
}

fn main() -> ExitCode {
    // .env first so RUST_LOG and LOG_FORMAT apply
    dotenvy::dotenv().ok();
    common::utils::logging::init_logging_from_env();

    let instance = Uuid::new_v4();
    install_panic_hook(instance);

    let workers = worker_threads();
    let rt = match build_runtime(workers) {
        Ok(rt) => rt,
        Err(e) => {
            error!(error = %e, "failed to build tokio runtime");
            return ExitCode::FAILURE;
        }
    };

    info!(
        %instance,
        pid = std::process::id(),
        version = env!("CARGO_PKG_VERSION"),
        workers = workers.unwrap_or_default(),
        "catalog starting"
    );

    match rt.block_on(server::run(server::shutdown::shutdown_signal())) {
        Ok(()) => {
            info!(%instance, "catalog exited cleanly");
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!(%instance, error = %e, "catalog failed");
            ExitCode::FAILURE
        }
    }
}
