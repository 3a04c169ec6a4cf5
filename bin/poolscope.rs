use std::sync::Arc;

use anyhow::Context;
use jemallocator::Jemalloc;
use log::{error, info, LevelFilter};
use simple_logger::SimpleLogger;
use tokio_util::sync::CancellationToken;

#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

use poolscope::{api, Database, PoolIngestor, Settings};

#[tokio::main()]
async fn main() -> anyhow::Result<()> {
    SimpleLogger::new()
        .with_level(LevelFilter::Info)
        .init()
        .unwrap();

    // Load configuration
    let settings = Arc::new(
        Settings::new()
            .context("Failed to load config.yaml. Please ensure it exists and is valid")?,
    );

    let cancellation_token = CancellationToken::new();

    let db = Arc::new(
        Database::new(settings.clone())
            .await
            .context("Failed to initialize database connection")?,
    );

    // Connecting to the node or parsing the watch set failing here is fatal
    let ingestor = PoolIngestor::new(&settings.node, db.clone())
        .await
        .context("Failed to initialize pool ingestor")?;

    let ingestor_token = cancellation_token.child_token();
    let mut ingestor_handle = tokio::spawn(async move { ingestor.run(ingestor_token).await });

    info!("Pool ingestor started");

    // Query API shares only the database with the ingestor
    let state = Arc::new(api::AppState::new(db.clone()));
    let listener = tokio::net::TcpListener::bind(format!(
        "{}:{}",
        settings.api.listen, settings.api.port
    ))
    .await
    .context("Failed to bind API listener")?;

    let server_token = cancellation_token.child_token();
    let server_handle = tokio::spawn(async move {
        let app = api::build_router(state);
        if let Err(e) = axum::serve(listener, app)
            .with_graceful_shutdown(async move { server_token.cancelled().await })
            .await
        {
            error!("API server failed: {:#}", e);
        }
    });

    info!(
        "Query API listening on {}:{}",
        settings.api.listen, settings.api.port
    );

    #[cfg(unix)]
    let mut sigterm_stream = {
        use tokio::signal::unix::{signal, SignalKind};
        signal(SignalKind::terminate()).context("Failed to install SIGTERM handler")?
    };

    info!("poolscope running. Press Ctrl+C to stop.");

    // A subscription-level failure in the ingestor is fatal to the process;
    // a shutdown signal stops everything gracefully.
    let mut ingestor_failure: Option<anyhow::Error> = None;

    #[cfg(unix)]
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
        },
        _ = sigterm_stream.recv() => {
            info!("Received SIGTERM, exiting gracefully...");
        },
        res = &mut ingestor_handle => {
            match res {
                Ok(Ok(())) => info!("Pool ingestor stopped"),
                Ok(Err(e)) => {
                    error!("Pool ingestor failed: {:#}", e);
                    ingestor_failure = Some(e);
                },
                Err(e) => ingestor_failure = Some(anyhow::anyhow!("Ingestor task panicked: {}", e)),
            }
        },
    };

    #[cfg(not(unix))]
    tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            info!("Received shutdown signal (Ctrl+C), exiting gracefully...");
        },
        res = &mut ingestor_handle => {
            match res {
                Ok(Ok(())) => info!("Pool ingestor stopped"),
                Ok(Err(e)) => {
                    error!("Pool ingestor failed: {:#}", e);
                    ingestor_failure = Some(e);
                },
                Err(e) => ingestor_failure = Some(anyhow::anyhow!("Ingestor task panicked: {}", e)),
            }
        },
    };

    // Cancel all running tasks
    info!("Finishing all tasks...");

    cancellation_token.cancel();

    if !ingestor_handle.is_finished() {
        let _ = (&mut ingestor_handle).await;
    }
    let _ = server_handle.await;

    info!("All tasks stopped");

    match ingestor_failure {
        Some(e) => Err(e.context("Ingestion terminated")),
        None => Ok(()),
    }
}
