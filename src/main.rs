use std::sync::Arc;

use student_recs::{
    auth::TokenAuthority,
    config::Config,
    db::{create_pool, Catalog, PgConnectionSource, QueryExecutor},
    inference::SvdModel,
    routes::{create_router, AppState},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "student_recs=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;

    let pool = create_pool(&config.database_url, config.database_max_connections)?;
    let executor = QueryExecutor::new(
        Arc::new(PgConnectionSource::new(pool)),
        config.retry_policy(),
    );

    // Loaded once; shared read-only by every request
    let model = SvdModel::load(&config.model_path)?;

    let state = Arc::new(AppState::new(
        Catalog::new(executor),
        Arc::new(model),
        TokenAuthority::new(&config.jwt_secret, config.token_ttl_secs),
    ));

    let app = create_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address).await?;
    tracing::info!(address = %address, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }
}
