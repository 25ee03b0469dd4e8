/// Router Module Index
///
/// The route tree is declared once, in `ROUTE_TREE`. Both the axum router and the pure
/// `resolve` function are derived from it, so what the server does and what the tests
/// assert cannot drift apart.
///
/// Access tiers:
/// - `public`: login, logout, health. No guard.
/// - `authenticated`: shell views any logged-in role may open.
/// - `restricted`: shell views with an extra single-role guard.
/// - `api`: JSON endpoints that answer 401/403 instead of redirecting.
use axum::{
    extract::{Query, State},
    routing::{MethodRouter, get},
};
use thiserror::Error;

use crate::{
    AppState,
    catalog::CatalogResource,
    guard::{GuardOutcome, RouteGuard},
    handlers::{self, ListFilter},
    menu::MenuDescriptor,
    models::{Role, User},
    session::Session,
};

pub mod api;
pub mod authenticated;
pub mod public;
pub mod restricted;

/// The only view reachable without a session.
pub const LOGIN_PATH: &str = "/login";
/// Default protected destination after a role denial.
pub const LANDING_PATH: &str = "/";

/// View
///
/// The pages rendered inside the protected shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Dashboard,
    Generos,
    Plataformas,
    Juegos,
    Categorias,
    Productos,
    Usuarios,
    Vendedores,
}

impl View {
    pub const fn resource(self) -> Option<CatalogResource> {
        match self {
            View::Dashboard => None,
            View::Generos => Some(CatalogResource::Generos),
            View::Plataformas => Some(CatalogResource::Plataformas),
            View::Juegos => Some(CatalogResource::Juegos),
            View::Categorias => Some(CatalogResource::Categorias),
            View::Productos => Some(CatalogResource::Productos),
            View::Usuarios => Some(CatalogResource::Usuarios),
            View::Vendedores => Some(CatalogResource::Vendedores),
        }
    }

    pub const fn title(self) -> &'static str {
        match self.resource() {
            Some(resource) => resource.title(),
            None => "Dashboard",
        }
    }
}

/// RouteDescriptor
///
/// One protected path. Every descriptor sits under the authenticated shell; a
/// `required_role` layers a second guard on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RouteDescriptor {
    pub path: &'static str,
    pub view: View,
    pub required_role: Option<Role>,
}

impl RouteDescriptor {
    pub const fn guard(&self) -> RouteGuard {
        match self.required_role {
            Some(role) => RouteGuard::requiring(role),
            None => RouteGuard::authenticated(),
        }
    }
}

const fn route(path: &'static str, view: View, required_role: Option<Role>) -> RouteDescriptor {
    RouteDescriptor {
        path,
        view,
        required_role,
    }
}

pub const ROUTE_TREE: &[RouteDescriptor] = &[
    route(LANDING_PATH, View::Dashboard, Some(Role::Admin)),
    route("/dashboard", View::Dashboard, Some(Role::Admin)),
    route("/listgeneros", View::Generos, None),
    route("/listplataformas", View::Plataformas, None),
    route("/listjuegos", View::Juegos, None),
    route("/listcategorias", View::Categorias, None),
    route("/listproductos", View::Productos, None),
    route("/listvendedores", View::Vendedores, Some(Role::Vendedor)),
    route("/listusuarios", View::Usuarios, Some(Role::Admin)),
];

pub fn find_route(path: &str) -> Option<&'static RouteDescriptor> {
    ROUTE_TREE.iter().find(|route| route.path == path)
}

/// Navigation
///
/// Result of resolving one path against the route tree for one session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    /// The public login form.
    Login,
    Render(View),
    Redirect(&'static str),
    /// Role denial on the landing route, rendered in place instead of looping.
    Denied(View),
}

/// resolve
///
/// Evaluates the route tree without HTTP: the public login route, then the shell's
/// authenticated-only guard, then the route's own guard. Unknown paths go to login.
pub fn resolve(path: &str, session: &Session) -> Navigation {
    if path == LOGIN_PATH {
        return Navigation::Login;
    }
    let Some(route) = find_route(path) else {
        return Navigation::Redirect(LOGIN_PATH);
    };

    let shell = RouteGuard::authenticated().decide(session);
    if let Some(target) = shell.redirect_target() {
        return Navigation::Redirect(target);
    }

    match route.guard().decide(session) {
        GuardOutcome::Render => Navigation::Render(route.view),
        GuardOutcome::RedirectToLanding if route.path == LANDING_PATH => Navigation::Denied(route.view),
        outcome => Navigation::Redirect(outcome.redirect_target().unwrap_or(LOGIN_PATH)),
    }
}

/// MenuViolation
///
/// A menu link that disagrees with the route tree.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MenuViolation {
    #[error("menu entry `{label}` links to `{route}`, which no route declares")]
    UnroutedLink { label: String, route: String },
    #[error("menu entry `{label}` shows `{route}` to role `{role}`, but its guard rejects that role")]
    RejectedLink {
        label: String,
        route: String,
        role: Role,
    },
}

/// consistency_violations
///
/// Checks that the menu never advertises a link the route tree would reject: for every
/// link and every role that sees it, resolving the link as that role must render.
pub fn consistency_violations(menu: &MenuDescriptor) -> Vec<MenuViolation> {
    let mut violations = Vec::new();

    for entry in menu.entries() {
        for link in entry.links() {
            if find_route(link).is_none() {
                violations.push(MenuViolation::UnroutedLink {
                    label: entry.label.clone(),
                    route: link.to_string(),
                });
                continue;
            }
            for &role in &entry.roles {
                let session = Session::with_user(User::new("consistency-check", role));
                if !matches!(resolve(link, &session), Navigation::Render(_)) {
                    violations.push(MenuViolation::RejectedLink {
                        label: entry.label.clone(),
                        route: link.to_string(),
                        role,
                    });
                }
            }
        }
    }

    violations
}

/// The axum handler for one descriptor. Guards are attached by the tier modules.
pub(crate) fn view_route(route: RouteDescriptor) -> MethodRouter<AppState> {
    get(
        move |session: Session, State(state): State<AppState>, Query(filter): Query<ListFilter>| async move {
            handlers::render_view(route, session, state, filter).await
        },
    )
}
