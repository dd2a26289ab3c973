use std::net::SocketAddr;
use std::process::ExitCode;

use dotenvy::dotenv;
use tokio::net::TcpListener;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

use school_activities::services::seed_service;
use school_activities::{database, web, AppError, Config};

#[tokio::main]
async fn main() -> ExitCode {
    dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("server stopped: {}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), AppError> {
    let config = Config::from_env()?;
    info!(
        build_id = env!("ACTIVITIES_BUILD_ID"),
        database_url = %config.database_url,
        "starting activities server"
    );

    // 1. Open the store and seed it on first run
    let pool = database::open(&config.database_url, config.db_max_connections).await?;
    let seed = config.load_seed()?;
    seed_service::seed_if_empty(&pool, &seed).await?;

    // 2. Routes
    let app = web::app(pool.clone(), &config.static_dir);

    // 3. Bind, falling back to the next port when the configured one is taken
    let addr = config.bind_addr()?;
    let listener = bind_with_fallback(addr).await?;
    let bound_addr = listener.local_addr()?;
    info!("listening on http://{}", bound_addr);

    let served = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await;

    info!("closing activity store");
    pool.close().await;
    served.map_err(AppError::from)
}

async fn bind_with_fallback(addr: SocketAddr) -> Result<TcpListener, AppError> {
    match TcpListener::bind(addr).await {
        Ok(l) => Ok(l),
        Err(e) => {
            let fallback = fallback_addr(addr)?;
            warn!("could not bind {}: {}. trying fallback {}", addr, e, fallback);
            Ok(TcpListener::bind(fallback).await?)
        }
    }
}

fn fallback_addr(addr: SocketAddr) -> Result<SocketAddr, AppError> {
    let port = addr.port().checked_add(1).ok_or_else(|| AppError::Config {
        key: "PORT".to_string(),
        reason: format!("no fallback port above {}", addr.port()),
    })?;
    Ok(SocketAddr::new(addr.ip(), port))
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("failed to listen for ctrl-c: {}", e);
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                error!("failed to listen for SIGTERM: {}", e);
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
    info!("shutdown signal received");
}
