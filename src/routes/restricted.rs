use crate::{
    AppState,
    guard::{self, GuardContext},
    menu::MenuState,
    routes,
};
use axum::{Router, middleware};

/// Restricted Router Module
///
/// Shell views that additionally require one exact role (`/`, `/dashboard` and
/// `/listusuarios` for admin, `/listvendedores` for vendedor). Each route gets its own
/// guard layer; the shared authenticated-only layer is applied on top by
/// `create_router`, so an anonymous caller is sent to login before the role is checked.
pub fn restricted_routes(menu: &MenuState) -> Router<AppState> {
    routes::ROUTE_TREE
        .iter()
        .filter(|route| route.required_role.is_some())
        .fold(Router::new(), |router, route| {
            let context = GuardContext::new(route.guard(), menu.clone());
            router.route(
                route.path,
                routes::view_route(*route)
                    .route_layer(middleware::from_fn_with_state(context, guard::enforce)),
            )
        })
}
