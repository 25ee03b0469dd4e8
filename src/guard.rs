use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::{
    error::AppError,
    menu::MenuState,
    models::Role,
    routes::{LANDING_PATH, LOGIN_PATH},
    session::Session,
    views,
};

/// RouteGuard
///
/// Gates a wrapped view on the session. `required_role` is compared by exact equality:
/// a guard admits one role, never "any of". A view needed by two roles is declared as
/// two routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RouteGuard {
    required_role: Option<Role>,
}

/// What a guard decided for one render pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardOutcome {
    Render,
    RedirectToLogin,
    RedirectToLanding,
}

impl RouteGuard {
    /// Any authenticated user passes.
    pub const fn authenticated() -> Self {
        Self {
            required_role: None,
        }
    }

    pub const fn requiring(role: Role) -> Self {
        Self {
            required_role: Some(role),
        }
    }

    pub const fn required_role(&self) -> Option<Role> {
        self.required_role
    }

    pub fn admits(&self, role: Role) -> bool {
        self.required_role.is_none_or(|required| required == role)
    }

    pub fn decide(&self, session: &Session) -> GuardOutcome {
        match session.current_user() {
            None => GuardOutcome::RedirectToLogin,
            Some(user) if !self.admits(user.role) => GuardOutcome::RedirectToLanding,
            Some(_) => GuardOutcome::Render,
        }
    }
}

impl GuardOutcome {
    pub const fn redirect_target(&self) -> Option<&'static str> {
        match self {
            GuardOutcome::Render => None,
            GuardOutcome::RedirectToLogin => Some(LOGIN_PATH),
            GuardOutcome::RedirectToLanding => Some(LANDING_PATH),
        }
    }

    /// JSON endpoints cannot follow a redirect; they get the matching status instead.
    pub fn into_api_result(self, session: &Session) -> Result<(), AppError> {
        match (self, session.current_user()) {
            (GuardOutcome::Render, _) => Ok(()),
            (GuardOutcome::RedirectToLanding, Some(user)) => Err(AppError::Forbidden(user.role)),
            _ => Err(AppError::Unauthorized),
        }
    }
}

/// GuardContext
///
/// Middleware state for `enforce`. The menu is needed to draw the shell around the
/// access-denied page.
#[derive(Clone)]
pub struct GuardContext {
    pub guard: RouteGuard,
    pub menu: MenuState,
}

impl GuardContext {
    pub fn new(guard: RouteGuard, menu: MenuState) -> Self {
        Self { guard, menu }
    }
}

/// enforce
///
/// Route layer wrapping a view with its guard. The wrapped handler only runs when the
/// guard renders.
///
/// A role denial on the landing route itself cannot redirect to the landing route, so
/// it renders the access-denied page (403) inside the shell instead.
pub async fn enforce(
    State(ctx): State<GuardContext>,
    session: Session,
    request: Request,
    next: Next,
) -> Response {
    let path = request.uri().path().to_owned();

    match ctx.guard.decide(&session) {
        GuardOutcome::Render => next.run(request).await,
        GuardOutcome::RedirectToLogin => {
            tracing::info!(%path, "no authenticated user, redirecting to {LOGIN_PATH}");
            Redirect::to(LOGIN_PATH).into_response()
        }
        GuardOutcome::RedirectToLanding => {
            let role = session.current_user().map(|user| user.role);
            tracing::info!(
                %path,
                required = ?ctx.guard.required_role(),
                actual = ?role,
                "access denied"
            );
            if path == LANDING_PATH {
                let page = views::access_denied_page(&session, &ctx.menu, &path);
                (StatusCode::FORBIDDEN, page).into_response()
            } else {
                Redirect::to(LANDING_PATH).into_response()
            }
        }
    }
}
