use std::net::SocketAddr;

use anyhow::Context;
use chrono::Utc;
use tracing::{info, warn};

use inkpress_api::{app::build_app, config::AppConfig};
use inkpress_store::{Database, seed_posts};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let config = AppConfig::from_env().context("invalid configuration")?;
    inkpress_observability::init(&config.log_level);

    if config.jwt_secret_defaulted {
        warn!("JWT_SECRET not set; using insecure dev default");
    }

    info!(environment = config.environment.as_str(), "starting");
    let db = Database::new(config.database_url.clone());
    db.acquire().await.context("failed to connect to database")?;

    if config.seed_sample_posts {
        let posts = db.posts().await.context("failed to open posts")?;
        seed_posts(&posts, Utc::now())
            .await
            .context("failed to seed sample posts")?;
    }

    let app = build_app(&config, db)?;

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", config.port))
        .await
        .with_context(|| format!("failed to bind 0.0.0.0:{}", config.port))?;
    info!(addr = %listener.local_addr()?, "listening");

    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("server error")?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c().await.ok();
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to install SIGTERM handler");
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
