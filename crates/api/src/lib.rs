//! Sensor API Server
//!
//! REST API over the `sensors` table, plus a simulated temperature reading.

use axum::{
    routing::{get, patch},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::EnvFilter;

mod error;
mod routes;
mod session;
mod settings;

pub use error::{ApiError, ErrorBody};
pub use routes::temperature::{simulate_temperature, MAX_TEMPERATURE, MIN_TEMPERATURE};
pub use session::DbSession;
pub use settings::{LoggingConfig, ServerConfig, Settings, DEFAULT_CONFIG_FILE};

use storage::Database;

/// Application state shared across handlers
pub struct AppState {
    /// Pool that hands out one session per request
    pub database: Database,
}

impl AppState {
    /// Create new application state
    pub fn new(database: Database) -> Self {
        Self { database }
    }
}

/// Health response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Create the application router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route(
            "/api/v1/sensors",
            get(routes::sensors::list_sensors).post(routes::sensors::create_sensor),
        )
        .route(
            "/api/v1/sensors/:id",
            get(routes::sensors::get_sensor)
                .put(routes::sensors::replace_sensor)
                .delete(routes::sensors::delete_sensor),
        )
        .route("/api/v1/sensors/:id/value", patch(routes::sensors::update_sensor_value))
        .route("/api/v1/temperature", get(routes::temperature::read_temperature))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check handler
async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
    })
}

/// Initialize logging
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&config.level)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true);

    if config.json {
        builder.json().try_init()
    } else {
        builder.try_init()
    }
}

/// Run the server until Ctrl-C or SIGTERM
pub async fn run_server(settings: Settings) -> anyhow::Result<()> {
    let database = Database::connect(&settings.database).await?;
    database.init_schema().await?;

    let state = Arc::new(AppState::new(database.clone()));
    let app = create_router(state);

    let listener = TcpListener::bind(&settings.server.bind_addr).await?;
    info!("Starting API server on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    database.close().await;
    info!("API server stopped");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!("Failed to listen for SIGTERM: {}", err);
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

    info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    async fn app() -> Router {
        let database = Database::in_memory().await.unwrap();
        database.init_schema().await.unwrap();
        create_router(Arc::new(AppState::new(database)))
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .await
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let health: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(health, serde_json::json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_unknown_sensor_is_404() {
        let response = app()
            .await
            .oneshot(Request::get("/api/v1/sensors/99").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let error: ErrorBody = serde_json::from_slice(&body).unwrap();
        assert_eq!(error.detail, "Sensor not found");
    }

    #[tokio::test]
    async fn test_create_requires_location() {
        let request = Request::post("/api/v1/sensors")
            .header("content-type", "application/json")
            .body(Body::from(r#"{"name":"T1","type":"thermometer"}"#))
            .unwrap();

        let response = app().await.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_temperature_requires_location() {
        let response = app()
            .await
            .oneshot(Request::get("/api/v1/temperature").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_non_integer_ids_are_422() {
        let response = app()
            .await
            .oneshot(Request::get("/api/v1/sensors/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let response = app()
            .await
            .oneshot(
                Request::get("/api/v1/temperature?location=Lab1&sensorID=abc")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}
