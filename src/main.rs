mod config;
mod db;
mod docs;
mod handlers;
mod models;
mod ot;
mod routes;
mod ws;

use std::panic;
use std::sync::Arc;

use axum::http::HeaderValue;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use config::Config;
use db::{DocStore, DocumentGateway};
use docs::ApiDoc;
use routes::create_api_routes;
use ws::hub::{Hub, HubHandle, HubStats};

/// Shared state for the HTTP and WebSocket surfaces.
pub struct AppState {
    pub store: Arc<DocStore>,
    pub hub: HubHandle,
    pub stats: Arc<HubStats>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Set panic hook for better error messages
    panic::set_hook(Box::new(|info| {
        eprintln!("PANIC: {info}");
    }));

    // Initialize tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            // Default to info level, but allow debug for our app
            "cowrite_doc=debug,tower_http=debug,axum::rejection=trace,info".into()
        }))
        .init();

    info!("Starting server...");

    // Load configuration
    let config = Config::load().unwrap_or_else(|e| {
        error!("Failed to load configuration: {}", e);
        warn!("Using default configuration");
        Config::default()
    });

    // Connect to the document store
    let Some(database_url) = config.database_url.as_deref() else {
        error!("DATABASE_URL is not configured; the server cannot run without its document store");
        std::process::exit(1);
    };
    let store = match DocStore::connect(database_url).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!("Failed to connect to database: {}", e);
            std::process::exit(1);
        }
    };
    if let Err(e) = store.init_schema().await {
        error!("Failed to initialize database schema: {}", e);
        std::process::exit(1);
    }

    // Start the collaboration hub
    let stats = Arc::new(HubStats::default());
    let gateway: Arc<dyn DocumentGateway> = store.clone();
    let (hub, hub_handle) = Hub::new(gateway, stats.clone());
    tokio::spawn(hub.run());

    let app_state = Arc::new(AppState {
        store,
        hub: hub_handle,
        stats,
    });

    // Combine all routes
    let app_routes = Router::new()
        .route("/health", get(handlers::health_check))
        .route("/ws", get(ws::handler::websocket_handler))
        // Mount API routes
        .nest("/api", create_api_routes())
        .with_state(app_state)
        // Mount Swagger UI
        .merge(SwaggerUi::new("/swagger").url("/api-docs/openapi.json", ApiDoc::openapi()))
        // Add tracing layer
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(&config));

    // Start the HTTP server
    let listener = tokio::net::TcpListener::bind(config.server_address())
        .await
        .unwrap_or_else(|_| panic!("Failed to bind to {}", config.server_address()));

    info!("Server running on http://{}", config.server_address());
    info!("WebSocket available at ws://{}/ws", config.server_address());
    info!(
        "Swagger UI available at http://{}/swagger",
        config.server_address()
    );

    axum::serve(listener, app_routes)
        .await
        .expect("Server failed to start");
}

fn cors_layer(config: &Config) -> CorsLayer {
    match config.cors_origins.as_deref() {
        Some(origins) => {
            let origins: Vec<HeaderValue> = origins
                .split(',')
                .filter_map(|origin| origin.trim().parse().ok())
                .collect();
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods(Any)
                .allow_headers(Any)
        }
        None => {
            if config.is_production() {
                warn!("CORS_ORIGINS not set; allowing any origin");
            }
            CorsLayer::permissive()
        }
    }
}
