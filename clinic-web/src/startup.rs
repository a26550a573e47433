use crate::AppState;
use crate::config::{Settings, StorageBackend};
use crate::error::AppError;
use crate::handlers::{auth, health, images, metrics, pages, reorder};
use crate::middleware::metrics::metrics_middleware;
use crate::middleware::security_headers::security_headers_middleware;
use crate::middleware::session_gate::session_gate;
use crate::services::auth_client::AuthClient;
use crate::services::database::Database;
use crate::services::storage::{BucketStorage, LocalStorage, ObjectStore};
use axum::{
    Router,
    middleware::{from_fn, from_fn_with_state},
    routing::{get, post, put},
};
use std::future::IntoFuture;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

fn static_dir() -> PathBuf {
    let base_path = std::env::current_dir().expect("Failed to determine the current directory");

    if base_path.ends_with("clinic-web") {
        base_path.join("static")
    } else {
        base_path.join("clinic-web").join("static")
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(pages::index))
        .route("/health", get(health::health_check))
        .route("/metrics", get(metrics::metrics))
        .route("/services", get(pages::services_page))
        .route("/prices", get(pages::prices_page))
        .route("/contact", get(pages::contact_page))
        .route("/login", get(auth::login_page))
        .route("/dashboard", get(pages::dashboard))
        .route("/auth/login", post(auth::login_handler))
        .route("/auth/logout", post(auth::logout_handler))
        .route("/auth/callback", get(auth::auth_callback))
        .route(
            "/api/price-categories/reorder",
            put(reorder::reorder_price_categories),
        )
        .route(
            "/api/service-categories/reorder",
            put(reorder::reorder_service_categories),
        )
        .route("/api/services/reorder", put(reorder::reorder_services))
        .route(
            "/api/images",
            post(images::upload_image)
                .get(images::list_images)
                .delete(images::delete_image),
        )
        .nest_service("/static", ServeDir::new(static_dir()))
        .fallback(pages::not_found)
        .layer(from_fn_with_state(state.clone(), session_gate))
        .layer(from_fn(security_headers_middleware))
        .layer(from_fn(metrics_middleware))
        .layer(
            TraceLayer::new_for_http().make_span_with(|request: &axum::http::Request<_>| {
                tracing::info_span!(
                    "http_request",
                    method = %request.method(),
                    uri = %request.uri(),
                    version = ?request.version(),
                )
            }),
        )
        .with_state(state)
}

pub struct Application {
    port: u16,
    server: Box<dyn std::future::Future<Output = std::io::Result<()>> + Send + Unpin>,
}

impl Application {
    pub async fn build(settings: Settings) -> Result<Self, AppError> {
        let database = Database::connect(&settings.database).await.map_err(|e| {
            tracing::error!("Failed to connect to PostgreSQL: {}", e);
            e
        })?;

        if settings.database.run_migrations {
            database.run_migrations().await?;
        }

        let sessions = Arc::new(AuthClient::new(settings.auth.clone()));

        let images: Arc<dyn ObjectStore> = match settings.storage.backend {
            StorageBackend::Local => Arc::new(
                LocalStorage::new(
                    &settings.storage.local_path,
                    settings.storage.public_base_url.clone(),
                )
                .await
                .map_err(|e| {
                    tracing::error!(
                        "Failed to initialize local storage at {}: {}",
                        settings.storage.local_path,
                        e
                    );
                    e
                })?,
            ),
            StorageBackend::Bucket => {
                let bucket_url = settings.storage.bucket_url.clone().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("storage.bucket_url is required"))
                })?;
                let bucket = settings.storage.bucket.clone().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("storage.bucket is required"))
                })?;
                let api_key = settings.storage.api_key.clone().ok_or_else(|| {
                    AppError::ConfigError(anyhow::anyhow!("storage.api_key is required"))
                })?;
                Arc::new(BucketStorage::new(bucket_url, bucket, api_key))
            }
        };

        let state = AppState::new(settings.clone(), sessions, Arc::new(database), images);

        let app = build_router(state);

        let address = format!("{}:{}", settings.server.host, settings.server.port);
        let listener = TcpListener::bind(&address).await.map_err(|e| {
            tracing::error!("Failed to bind TCP listener to {}: {}", address, e);
            AppError::from(e)
        })?;
        let port = listener.local_addr()?.port();

        tracing::info!("Listening on {}", port);

        let server = axum::serve(listener, app);

        Ok(Self {
            port,
            server: Box::new(server.into_future()),
        })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> std::io::Result<()> {
        self.server.await
    }
}
