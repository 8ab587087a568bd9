use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use photobooth_api::config::{ServerConfig, StorageConfig};
use photobooth_api::router::build_app_router;
use photobooth_api::state::AppState;
use photobooth_cloud::S3BlobStore;
use photobooth_notify::{DisabledTransport, MailTransport, PhotoMailer, SmtpConfig, SmtpTransport};
use photobooth_pipeline::{BorderFloodSegmenter, RemoteSegmenter, Segmenter};
use photobooth_store::{AssetStore, BlobStore, DocumentStore, LocalBlobStore};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    let json_logs = std::env::var("LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));
    let (plain_layer, json_layer) = if json_logs {
        (None, Some(tracing_subscriber::fmt::layer().json()))
    } else {
        (Some(tracing_subscriber::fmt::layer()), None)
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "photobooth_api=debug,tower_http=debug".into()),
        )
        .with(plain_layer)
        .with(json_layer)
        .init();

    // --- Configuration ---
    let config = ServerConfig::from_env();
    tracing::info!(
        host = %config.host,
        port = %config.port,
        storage = config.storage.backend_name(),
        policy = %config.composite_policy,
        "Loaded server configuration",
    );

    // --- Asset store ---
    let store: Arc<dyn AssetStore> = match &config.storage {
        StorageConfig::Local { data_dir } => {
            let blobs = LocalBlobStore::new(
                data_dir.as_str(),
                format!("{}/assets", config.public_base_url),
            );
            open_store(blobs).await
        }
        StorageConfig::S3(s3) => open_store(S3BlobStore::connect(s3.clone()).await).await,
    };

    match store.health_check().await {
        Ok(()) => tracing::info!(backend = store.backend_name(), "Asset store ready"),
        Err(e) => tracing::warn!(error = %e, "Asset store health check failed, continuing"),
    }

    // --- Mail ---
    let transport: Arc<dyn MailTransport> = match SmtpConfig::from_env() {
        Some(smtp) => {
            tracing::info!(host = %smtp.host, port = smtp.port, "SMTP transport configured");
            Arc::new(SmtpTransport::new(smtp).expect("Invalid SMTP configuration"))
        }
        None => {
            tracing::warn!("SMTP_HOST not set, email delivery is disabled");
            Arc::new(DisabledTransport)
        }
    };
    let mailer = Arc::new(PhotoMailer::new(Arc::clone(&store), transport));

    // --- Segmenter ---
    let segmenter: Arc<dyn Segmenter> = match &config.segmentation_url {
        Some(url) => {
            tracing::info!(%url, "Using remote segmentation service");
            Arc::new(
                RemoteSegmenter::new(url.as_str(), Duration::from_secs(config.request_timeout_secs))
                    .expect("Failed to build segmentation client"),
            )
        }
        None => Arc::new(BorderFloodSegmenter::default()),
    };

    // --- App state ---
    let state = AppState {
        store,
        config: Arc::new(config.clone()),
        mailer,
        segmenter,
    };

    // --- Router ---
    let app = build_app_router(state, &config);

    // --- Start server ---
    let addr = SocketAddr::new(
        config.host.parse().expect("Invalid HOST address"),
        config.port,
    );
    tracing::info!(%addr, "Starting server");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");

    tracing::info!("Graceful shutdown complete");
}

/// Wrap a blob store in the document layer and reconcile frame records
/// with the images actually present.
async fn open_store<B: BlobStore>(blobs: B) -> Arc<dyn AssetStore> {
    let store = DocumentStore::new(blobs);
    match store.sync_frames().await {
        Ok(report) if report.is_noop() => {}
        Ok(report) => tracing::info!(
            adopted = report.adopted.len(),
            dropped = report.dropped.len(),
            "Frame records synchronised with storage",
        ),
        Err(e) => tracing::warn!(error = %e, "Frame sync failed"),
    }
    Arc::new(store)
}

/// Wait for a termination signal to initiate graceful shutdown.
///
/// Handles both SIGINT (Ctrl-C) and SIGTERM (on Unix).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl-C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received SIGINT (Ctrl-C), starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, starting graceful shutdown");
        }
    }
}
