use std::sync::Arc;

use clap::Parser;
use taskflow::config::{AppConfig, CliArgs};
use taskflow::service::TaskService;
use taskflow::store::TaskStore;

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();
    let config = AppConfig::from_cli(&cli);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let bind_addr = match config.bind_addr().await {
        Ok(addr) => addr,
        Err(e) => {
            tracing::error!(error = %e, "invalid listen address");
            std::process::exit(1);
        }
    };

    let store = TaskStore::new(&config.data_file).with_read_policy(config.read_policy);
    store.initialize().await;
    let service = TaskService::new(Arc::new(store));

    let app = taskflow::app(service, &config);

    let listener = match tokio::net::TcpListener::bind(bind_addr).await {
        Ok(l) => l,
        Err(e) => {
            tracing::error!(addr = %bind_addr, error = %e, "bind failed");
            std::process::exit(1);
        }
    };

    tracing::info!(
        api = %format!("http://{}/api/tasks", bind_addr),
        data_file = %config.data_file.display(),
        "server running"
    );
    if let Some(dir) = &config.static_dir {
        tracing::info!(dir = %dir.display(), "serving static files");
    }

    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        tracing::error!(error = %e, "server error");
        std::process::exit(1);
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
