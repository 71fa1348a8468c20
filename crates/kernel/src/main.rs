//! Wordepress kernel server.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::http::{HeaderValue, Method, header};
use tower_http::cors::CorsLayer;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};
use wordepress_kernel::build_router;
use wordepress_kernel::config::Config;
use wordepress_kernel::state::AppState;
use wordepress_sdk::Plugin;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting wordepress kernel");

    let config = Config::from_env().context("failed to load configuration")?;
    info!(port = config.port, site_url = %config.site_url, "Configuration loaded");

    if config.api_password.is_empty() {
        warn!("API_PASSWORD is empty; authenticated endpoints will answer 401");
    }

    let plugins: Vec<Arc<dyn Plugin>> = vec![Arc::new(docs_api::DocsApiPlugin)];
    let cors = build_cors_layer(&config);
    let port = config.port;

    let state = AppState::bootstrap(config, plugins)
        .context("failed to initialize application state")?;

    info!(
        plugins = state.plugin_runtime().plugin_count(),
        post_types = state.post_types().len(),
        "Plugins and post types loaded"
    );

    let app = build_router(state).layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("failed to bind to address")?;

    info!(%addr, "Server listening");

    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

fn build_cors_layer(config: &Config) -> CorsLayer {
    let methods = [
        Method::GET,
        Method::HEAD,
        Method::POST,
        Method::PUT,
        Method::PATCH,
        Method::DELETE,
        Method::OPTIONS,
    ];

    if config.cors_allowed_origins.len() == 1 && config.cors_allowed_origins[0] == "*" {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods(methods)
            .allow_headers(tower_http::cors::Any)
            .expose_headers([
                header::HeaderName::from_static("x-wp-total"),
                header::HeaderName::from_static("x-wp-totalpages"),
            ])
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_allowed_origins
            .iter()
            .filter_map(|o| match o.parse::<HeaderValue>() {
                Ok(v) => Some(v),
                Err(_) => {
                    warn!(origin = %o, "ignoring unparseable CORS origin");
                    None
                }
            })
            .collect();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers([
                header::AUTHORIZATION,
                header::CONTENT_TYPE,
                header::CONTENT_DISPOSITION,
            ])
            .allow_credentials(true)
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
