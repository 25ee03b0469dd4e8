use axum::{
    extract::FromRef,
    http::HeaderName,
    Router,
    middleware,
};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use tower::ServiceBuilder;
use tower_http::{
    cors::{Any, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::{DefaultOnResponse, TraceLayer},
};
use tracing::{Level, Span};

// --- Module Structure ---

pub mod catalog;
pub mod config;
pub mod error;
pub mod guard;
pub mod handlers;
pub mod icons;
pub mod identity;
pub mod menu;
pub mod models;
pub mod session;
pub mod views;

// Routing segregation (Public, Authenticated, Restricted, API) around one route tree.
pub mod routes;
use routes::{api, authenticated, public, restricted};

// --- Public Re-exports ---

pub use catalog::{CatalogState, InMemoryCatalog, RestCatalogClient};
pub use config::AppConfig;
pub use identity::{IdentityState, RestIdentityProvider, StaticIdentityProvider};
pub use menu::{MenuDescriptor, MenuState};

use guard::{GuardContext, RouteGuard};

/// ApiDoc
///
/// OpenAPI description of the JSON API, served at `/api-docs/openapi.json` and browsable
/// through the Swagger UI.
#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::api_login, handlers::api_logout, handlers::get_me, handlers::get_menu,
        handlers::list_records, handlers::get_record, handlers::create_record,
        handlers::update_record, handlers::delete_record
    ),
    components(
        schemas(
            models::Role, models::User, models::LoginRequest, models::LoginResponse,
            menu::MenuEntry, menu::SubmenuItem, icons::IconId, catalog::CatalogResource,
        )
    ),
    tags(
        (name = "catalog-admin", description = "Role-gated catalog dashboard API")
    )
)]
struct ApiDoc;

/// AppState
///
/// The single, immutable container of everything a request may need. Cloning it is
/// cheap: every service sits behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Catalog collaborator: the generic CRUD interface over the REST API.
    pub catalog: CatalogState,
    /// Verifies login credentials.
    pub identity: IdentityState,
    /// The validated navigation menu.
    pub menu: MenuState,
    /// The loaded, immutable environment configuration.
    pub config: AppConfig,
}

// --- Axum FromRef Extractor Implementations ---

impl FromRef<AppState> for CatalogState {
    fn from_ref(app_state: &AppState) -> CatalogState {
        app_state.catalog.clone()
    }
}

impl FromRef<AppState> for IdentityState {
    fn from_ref(app_state: &AppState) -> IdentityState {
        app_state.identity.clone()
    }
}

impl FromRef<AppState> for MenuState {
    fn from_ref(app_state: &AppState) -> MenuState {
        app_state.menu.clone()
    }
}

impl FromRef<AppState> for AppConfig {
    fn from_ref(app_state: &AppState) -> AppConfig {
        app_state.config.clone()
    }
}

/// create_router
///
/// Assembles the route tree, the guards and the global middleware.
///
/// Layer order, outermost first: CORS, request id / tracing, session resolution, then
/// per tier the authenticated-only guard and (restricted views only) the role guard.
/// Unmatched paths fall back to a redirect to `/login`.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    let x_request_id = HeaderName::from_static("x-request-id");

    // Protected layout: every shell view sits behind the authenticated-only guard.
    let shell_guard = GuardContext::new(RouteGuard::authenticated(), state.menu.clone());
    let shell = Router::new()
        .merge(authenticated::authenticated_routes())
        .merge(restricted::restricted_routes(&state.menu))
        .route_layer(middleware::from_fn_with_state(shell_guard, guard::enforce));

    let base_router = Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .merge(public::public_routes())
        .nest("/api", api::api_routes())
        .merge(shell)
        .fallback(handlers::fallback)
        .layer(middleware::from_fn_with_state(
            state.config.clone(),
            session::resolve_session,
        ))
        .with_state(state);

    base_router
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(x_request_id.clone(), MakeRequestUuid))
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(trace_span_logger)
                        .on_response(
                            DefaultOnResponse::new()
                                .level(Level::INFO)
                                .latency_unit(tower_http::LatencyUnit::Millis),
                        ),
                )
                .layer(PropagateRequestIdLayer::new(x_request_id)),
        )
        .layer(cors)
}

/// trace_span_logger
///
/// Opens the per-request span, tagged with the `x-request-id` so every log line of one
/// request can be correlated.
fn trace_span_logger(request: &axum::http::Request<axum::body::Body>) -> Span {
    let request_id = request
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .unwrap_or("unknown");

    tracing::info_span!(
        "http_request",
        method = ?request.method(),
        uri = ?request.uri(),
        req_id = %request_id,
    )
}
