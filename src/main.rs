use catalog_admin::{
    AppState, MenuDescriptor, RestCatalogClient, RestIdentityProvider,
    catalog::CatalogState,
    config::{AppConfig, Env},
    create_router,
    identity::IdentityState,
    routes,
};
use std::{sync::Arc, time::Duration};
use tokio::net::TcpListener;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// main
///
/// Initializes configuration, logging, the navigation menu and the upstream clients,
/// then serves the dashboard.
#[tokio::main]
async fn main() {
    // 1. Configuration (fail-fast on missing production secrets).
    dotenv::dotenv().ok();
    let config = AppConfig::load().expect("FATAL: invalid configuration");

    // 2. Logging. RUST_LOG wins over the development defaults.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "catalog_admin=debug,tower_http=info,axum=trace".into());

    // 3. Pretty output locally, JSON for log aggregation in production.
    match config.env {
        Env::Local => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        Env::Production => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
    }

    tracing::info!("Application starting in {:?} mode", config.env);
    if config.header_bypass {
        tracing::warn!("AUTH_HEADER_BYPASS is on: x-user-name/x-user-role headers are trusted");
    }

    // 4. Navigation menu. Unknown icons or roles abort startup; links that disagree
    // with the route tree are reported but do not.
    let menu = MenuDescriptor::load(config.menu_config_path.as_deref())
        .expect("FATAL: invalid menu configuration");
    for violation in routes::consistency_violations(&menu) {
        tracing::warn!(%violation, "menu does not match the route tree");
    }

    // 5. Upstream catalog REST API.
    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()
        .expect("FATAL: failed to build HTTP client");
    let catalog = RestCatalogClient::new(http.clone(), &config.catalog_api_url)
        .expect("FATAL: invalid CATALOG_API_URL");
    let catalog = Arc::new(catalog) as CatalogState;
    let identity = Arc::new(RestIdentityProvider::new(http, &config.catalog_api_url)) as IdentityState;
    tracing::info!(api = %config.catalog_api_url, "catalog API configured");

    let bind_addr = config.bind_addr.clone();

    // 6. Unified state and router.
    let app_state = AppState {
        catalog,
        identity,
        menu: Arc::new(menu),
        config,
    };
    let app = create_router(app_state);

    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("FATAL: failed to bind the HTTP listener");

    tracing::info!("Listening on {bind_addr}");
    tracing::info!("API Documentation (Swagger UI) available at /swagger-ui");

    axum::serve(listener, app)
        .await
        .expect("FATAL: HTTP server error");
}
