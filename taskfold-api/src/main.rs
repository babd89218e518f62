//! # TaskFold API Server
//!
//! Multi-user task manager: personal tasks, shared folders with
//! owner/editor/viewer roles, recurring tasks and filtered search.
//!
//! ## Usage
//!
//! ```bash
//! DATABASE_URL=postgresql://localhost/taskfold JWT_SECRET=... cargo run -p taskfold-api
//! ```

use anyhow::Context;
use std::sync::Arc;
use taskfold_api::{
    app::{build_router, AppState},
    config::Config,
};
use taskfold_shared::{
    db::{migrations, pool},
    store::PgStore,
};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "taskfold_api=debug,taskfold_shared=info,tower_http=debug".into());

    let json = std::env::var("LOG_FORMAT")
        .map(|format| format.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    if json {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer())
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }

    tracing::info!("Shutdown signal received, draining connections...");
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // .env is read before the subscriber so RUST_LOG and LOG_FORMAT apply
    dotenvy::dotenv().ok();
    init_tracing();

    tracing::info!(
        "TaskFold API Server v{} starting...",
        env!("CARGO_PKG_VERSION")
    );

    let config = Config::from_env().context("Failed to load configuration")?;

    let db = pool::create_pool((&config.database).into())
        .await
        .context("Failed to connect to database")?;

    if config.run_migrations {
        migrations::run_migrations(&db)
            .await
            .context("Failed to run migrations")?;
    }

    let bind_address = config.bind_address();
    let state = AppState::new(Arc::new(PgStore::new(db.clone())), config);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_address)
        .await
        .with_context(|| format!("Failed to bind {}", bind_address))?;

    tracing::info!("Server listening on http://{}", bind_address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    pool::close_pool(db).await;
    tracing::info!("Server stopped");

    Ok(())
}
