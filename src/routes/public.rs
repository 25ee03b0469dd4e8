use crate::{AppState, handlers};
use axum::{
    Router,
    routing::get,
};

/// Public Router Module
///
/// Endpoints reachable without a session. `/login` is the only public *view*; the
/// rest are the session lifecycle and monitoring.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        // GET /health
        .route("/health", get(|| async { "ok" }))
        // GET /login renders the form, POST /login starts a session.
        .route(
            "/login",
            get(handlers::login_page).post(handlers::login_submit),
        )
        // GET /logout drops the session cookie and returns to the login form.
        .route("/logout", get(handlers::logout))
}
