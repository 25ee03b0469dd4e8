use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// API Router Module
///
/// JSON endpoints for scripted clients and SPA frontends. They are not wrapped in the
/// redirecting guards: each handler checks the session itself and answers 401/403.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        // POST /api/session logs in, DELETE /api/session logs out.
        .route(
            "/session",
            axum::routing::post(handlers::api_login).delete(handlers::api_logout),
        )
        // GET /api/me
        .route("/me", get(handlers::get_me))
        // GET /api/menu returns only the entries the caller's role may see.
        .route("/menu", get(handlers::get_menu))
        // Catalog CRUD proxy, guarded per resource exactly like its list view.
        .route(
            "/catalog/{resource}",
            get(handlers::list_records).post(handlers::create_record),
        )
        .route(
            "/catalog/{resource}/{id}",
            get(handlers::get_record)
                .put(handlers::update_record)
                .delete(handlers::delete_record),
        )
}
