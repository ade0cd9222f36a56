//! API Server Entry Point
//!
//! Application entry point and server initialization.
//! Uses `anyhow` for startup errors, but application-level
//! errors should use `kernel::error::AppError`.

mod config;

use axum::{
    Router, http,
    http::{Method, header},
};
use catalog::domain::repository::{CartRepository, ProductRepository};
use catalog::{
    CatalogConfig, FileCartRepository, FileProductRepository, PgCatalogRepository,
    ProductBroadcaster, catalog_router,
};
use config::{ServerConfig, StorageBackend};
use realtime::{ChatLog, RealtimeConfig, RealtimeHub, realtime_router};
use sqlx::postgres::PgPoolOptions;
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{AllowHeaders, AllowMethods, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// Re-export unified error types for use in handlers
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "api=info,catalog=info,realtime=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ServerConfig::from_env()?;

    let app = match &config.storage {
        StorageBackend::File { data_dir } => {
            tokio::fs::create_dir_all(data_dir).await?;
            tracing::info!(data_dir = %data_dir.display(), "Using flat-file storage");

            let products = Arc::new(FileProductRepository::in_dir(data_dir));
            let carts = Arc::new(FileCartRepository::in_dir(data_dir));
            build_app(products, carts, &config.public_dir)
        }
        StorageBackend::Postgres {
            database_url,
            max_connections,
        } => {
            let pool = PgPoolOptions::new()
                .max_connections(*max_connections)
                .connect(database_url)
                .await?;

            tracing::info!("Connected to database");

            // Run migrations
            sqlx::migrate!("../../../database/migrations")
                .run(&pool)
                .await?;

            tracing::info!("Migrations completed");

            let repo = Arc::new(PgCatalogRepository::new(pool));
            build_app(repo.clone(), repo, &config.public_dir)
        }
    };

    let app = app.layer(TraceLayer::new_for_http());
    let app = match cors_layer(&config.cors_origins) {
        Some(cors) => app.layer(cors),
        None => app,
    };

    // Start server
    tracing::info!("Listening on {}", config.addr);

    let listener = TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Catalog API and pages, the socket endpoint and static assets.
///
/// Both routers share one hub so product writes over HTTP reach sockets.
fn build_app<P, C>(products: Arc<P>, carts: Arc<C>, public_dir: &Path) -> Router
where
    P: ProductRepository + Send + Sync + 'static,
    C: CartRepository + Send + Sync + 'static,
{
    let realtime_config = RealtimeConfig::default();
    let hub = Arc::new(RealtimeHub::new(realtime_config.channel_capacity));
    let chat = Arc::new(ChatLog::new());
    let broadcaster: Arc<dyn ProductBroadcaster> = hub.clone();

    Router::new()
        .merge(catalog_router(
            products.clone(),
            carts.clone(),
            CatalogConfig::default(),
            broadcaster,
        ))
        .merge(realtime_router(products, carts, hub, chat, realtime_config))
        .nest_service("/static", ServeDir::new(public_dir))
        .fallback(catalog::not_found)
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }

    let allowed_origins: Vec<http::HeaderValue> = origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    Some(
        CorsLayer::new()
            .allow_origin(allowed_origins)
            .allow_methods(AllowMethods::list([
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::OPTIONS,
            ]))
            .allow_headers(AllowHeaders::list([header::CONTENT_TYPE, header::ACCEPT])),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir) -> Router {
        let products = Arc::new(FileProductRepository::in_dir(dir.path()));
        let carts = Arc::new(FileCartRepository::in_dir(dir.path()));
        build_app(products, carts, dir.path())
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_serves_static_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("hello.txt"), "hola").unwrap();

        let (status, body) = get(app(&dir), "/static/hello.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "hola");
    }

    #[tokio::test]
    async fn test_unknown_path_renders_error_page() {
        let dir = TempDir::new().unwrap();

        let (status, body) = get(app(&dir), "/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("404"));
    }

    #[tokio::test]
    async fn test_ws_requires_upgrade() {
        let dir = TempDir::new().unwrap();

        let (status, _) = get(app(&dir), "/ws").await;
        assert!(status.is_client_error());
    }

    #[test]
    fn test_cors_disabled_without_origins() {
        assert!(cors_layer(&[]).is_none());
        assert!(cors_layer(&["http://localhost:3000".to_string()]).is_some());
    }
}
