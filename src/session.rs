use std::convert::Infallible;

use axum::{
    extract::{FromRequestParts, Request, State},
    http::{HeaderMap, header, request::Parts},
    middleware::Next,
    response::Response,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{
    config::{AppConfig, Env},
    error::AppError,
    models::{Role, User},
};

/// Name of the cookie carrying the signed session token.
pub const SESSION_COOKIE: &str = "catalog_session";

/// Session
///
/// The single source of truth for "who is logged in and with which role". Each request
/// works on its own snapshot; `login` and `logout` replace the whole value and never
/// expose a half-updated user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    user: Option<User>,
}

impl Session {
    pub fn anonymous() -> Self {
        Self::default()
    }

    pub fn with_user(user: User) -> Self {
        Self { user: Some(user) }
    }

    pub fn current_user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Replaces the current user unconditionally.
    pub fn login(&mut self, user: User) {
        self.user = Some(user);
    }

    pub fn logout(&mut self) {
        self.user = None;
    }
}

/// Claims
///
/// Payload of the session JWT. `sub` holds the display name; the role is carried
/// verbatim so the guard never needs a round trip to the catalog API.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub role: Role,
    pub jti: Uuid,
    pub iat: usize,
    pub exp: usize,
}

/// issue_token
///
/// Signs the session's current user into a token valid for `session_ttl_minutes`.
/// An anonymous session has nothing to sign and is rejected.
pub fn issue_token(session: &Session, config: &AppConfig) -> Result<String, AppError> {
    let user = session.current_user().ok_or(AppError::Unauthorized)?;
    let now = Utc::now();
    let expires = Duration::try_minutes(config.session_ttl_minutes)
        .filter(|ttl| *ttl > Duration::zero())
        .and_then(|ttl| now.checked_add_signed(ttl))
        .ok_or(AppError::SessionTtl(config.session_ttl_minutes))?;

    let claims = Claims {
        sub: user.name.clone(),
        role: user.role,
        jti: Uuid::new_v4(),
        iat: now.timestamp().max(0) as usize,
        exp: expires.timestamp().max(0) as usize,
    };

    let key = EncodingKey::from_secret(config.session_secret.as_bytes());
    Ok(encode(&Header::default(), &claims, &key)?)
}

/// decode_token
///
/// Verifies signature and expiry, then rebuilds the session it was issued for.
pub fn decode_token(token: &str, config: &AppConfig) -> Result<Session, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(config.session_secret.as_bytes());
    let mut validation = Validation::default();
    validation.validate_exp = true;

    let data = decode::<Claims>(token, &key, &validation)?;
    Ok(Session::with_user(User::new(data.claims.sub, data.claims.role)))
}

/// session_from_headers
///
/// Resolution order:
/// 1. Local bypass (`x-user-name` + `x-user-role`), honored only in `Env::Local` with
///    `header_bypass` switched on.
/// 2. The `catalog_session` cookie.
/// 3. An `Authorization: Bearer` token.
///
/// Any failure yields an anonymous session; the guards turn that into a redirect.
pub fn session_from_headers(headers: &HeaderMap, config: &AppConfig) -> Session {
    if config.env == Env::Local && config.header_bypass {
        if let (Some(name), Some(role)) = (
            header_str(headers, "x-user-name"),
            header_str(headers, "x-user-role"),
        ) {
            match role.parse::<Role>() {
                Ok(role) => return Session::with_user(User::new(name, role)),
                Err(e) => tracing::debug!(error = %e, "ignoring local bypass headers"),
            }
        }
    }

    let Some(token) = cookie_value(headers, SESSION_COOKIE).or_else(|| bearer_token(headers)) else {
        return Session::anonymous();
    };

    match decode_token(token, config) {
        Ok(session) => session,
        Err(e) => {
            tracing::debug!(error = %e, "discarding invalid session token");
            Session::anonymous()
        }
    }
}

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|value| value.to_str().ok())
        .map(str::trim)
        .filter(|value| !value.is_empty())
}

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Finds a cookie by name across every `Cookie` header of the request.
pub fn cookie_value<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value)
        .filter(|value| !value.is_empty())
}

/// `Set-Cookie` value storing a freshly issued token.
pub fn session_cookie(token: &str, config: &AppConfig) -> String {
    let secure = if config.env == Env::Production {
        "; Secure"
    } else {
        ""
    };
    format!(
        "{SESSION_COOKIE}={token}; Path=/; HttpOnly; SameSite=Lax; Max-Age={}{secure}",
        config.session_ttl_minutes.saturating_mul(60)
    )
}

/// `Set-Cookie` value that makes the browser drop the session.
pub fn cleared_session_cookie() -> String {
    format!("{SESSION_COOKIE}=; Path=/; HttpOnly; SameSite=Lax; Max-Age=0")
}

/// Session Extractor
///
/// Reads the snapshot placed in the request extensions by `resolve_session`. It never
/// rejects: a missing snapshot is an anonymous session, and deciding what an anonymous
/// caller may do is the guard's job.
impl<S> FromRequestParts<S> for Session
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        Ok(parts.extensions.get::<Session>().cloned().unwrap_or_default())
    }
}

/// resolve_session
///
/// Outermost application middleware: decodes the session once per request and stores
/// it in the request extensions for guards and handlers.
pub async fn resolve_session(
    State(config): State<AppConfig>,
    mut request: Request,
    next: Next,
) -> Response {
    let session = session_from_headers(request.headers(), &config);
    request.extensions_mut().insert(session);
    next.run(request).await
}
