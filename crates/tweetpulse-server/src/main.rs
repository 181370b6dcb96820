mod api;
mod middleware;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;
use tweetpulse_sentiment::{Classifier, SearchClient};

use crate::api::{build_app, AppState, SearchDefaults};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let config = tweetpulse_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let search = SearchClient::from_app_config(&config)?;
    let classifier = Classifier::from_app_config(&config)?;

    tracing::info!(
        env = %config.env,
        classifier = %classifier.kind(),
        page_size = config.search_page_size,
        page_count = config.search_page_count,
        "tweetpulse server starting"
    );

    let app = build_app(AppState {
        search: Arc::new(search),
        classifier: Arc::new(classifier),
        defaults: Arc::new(SearchDefaults::from_app_config(&config)),
    });

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to listen for ctrl-c");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
