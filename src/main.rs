use todo_api::{
    config::AppConfig,
    domain::repository::TodoRepository,
    http::routing::{self, cors::OriginPolicy},
    http::routes::todos,
    infrastructure::{memory_repo::InMemoryTodoRepository, sqlite_repo::SqliteTodoRepository},
};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env()?;
    if config.uses_memory_store() {
        tracing::warn!("using in-memory store; todos are lost on exit");
        serve(InMemoryTodoRepository::new(), config).await
    } else {
        let repo = SqliteTodoRepository::connect(&config.database_url).await?;
        serve(repo, config).await
    }
}

async fn serve<R: TodoRepository + Clone>(repo: R, config: AppConfig) -> anyhow::Result<()> {
    repo.init().await?;
    let policy = OriginPolicy::new(config.allowed_origin);
    tracing::info!(store = %config.database_url, allowed_origin = ?policy.allowed(), "store ready");
    let router = routing::app(todos::router(todos::AppState { repo }), policy);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or, on unix, SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => tracing::info!("received ctrl-c, shutting down"),
        _ = terminate => tracing::info!("received SIGTERM, shutting down"),
    }
}
