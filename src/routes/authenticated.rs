use crate::{AppState, routes};
use axum::Router;

/// Authenticated Router Module
///
/// The shell views any logged-in role may open. The authenticated-only guard is not
/// attached here: `create_router` layers it over this router and `restricted_routes`
/// together, so every shell view sits behind it.
pub fn authenticated_routes() -> Router<AppState> {
    routes::ROUTE_TREE
        .iter()
        .filter(|route| route.required_role.is_none())
        .fold(Router::new(), |router, route| {
            router.route(route.path, routes::view_route(*route))
        })
}
