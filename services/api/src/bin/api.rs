//! services/api/src/bin/api.rs

use api_lib::{
    adapters::OpenAiContentAdapter,
    config::Config,
    error::ApiError,
    web::{create_router, rest::ApiDoc, state::AppState},
};
use async_openai::{config::OpenAIConfig, Client};
use axum::http::{header::{ACCEPT, CONTENT_TYPE}, HeaderValue, Method};
use axum::Router;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting server...");

    // --- 2. Initialize the Generative Service Adapter ---
    let openai_config = OpenAIConfig::new().with_api_key(config.openai_api_key.as_str());
    let openai_client = Client::with_config(openai_config);
    let content_adapter = Arc::new(OpenAiContentAdapter::new(
        openai_client,
        config.content_model.clone(),
    ));
    info!("Using content model '{}'", config.content_model);

    // --- 3. Build the Shared AppState ---
    let app_state = Arc::new(AppState::new(config.clone(), content_adapter));

    // --- 4. Create the Web Router ---
    let origin = config.cors_origin.parse::<HeaderValue>().map_err(|e| {
        ApiError::Internal(format!("Invalid CORS_ORIGIN '{}': {}", config.cors_origin, e))
    })?;
    let cors = CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([CONTENT_TYPE, ACCEPT]);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(create_router(app_state).layer(cors))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
