use axum::http::{HeaderMap, HeaderValue};
use catalog_admin::{
    AppConfig,
    config::Env,
    error::AppError,
    models::{Role, User},
    session::{self, Claims, Session},
};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        map.append(*name, HeaderValue::from_str(value).unwrap());
    }
    map
}

fn production_config() -> AppConfig {
    AppConfig {
        env: Env::Production,
        ..AppConfig::default()
    }
}

#[test]
fn test_login_replaces_and_is_idempotent() {
    let ana = User::new("Ana", Role::Operador);
    let mut once = Session::anonymous();
    once.login(ana.clone());

    let mut twice = Session::anonymous();
    twice.login(ana.clone());
    twice.login(ana.clone());
    assert_eq!(once.current_user(), twice.current_user());

    // No merge: the second user fully replaces the first.
    twice.login(User::new("Bruno", Role::Admin));
    assert_eq!(twice.current_user(), Some(&User::new("Bruno", Role::Admin)));
}

#[test]
fn test_logout_clears_user() {
    let mut session = Session::with_user(User::new("Ana", Role::Vendedor));
    assert!(session.is_authenticated());
    session.logout();
    assert!(!session.is_authenticated());
    assert_eq!(session.current_user(), None);
}

#[test]
fn test_token_resolves_from_cookie_and_bearer() {
    let config = production_config();
    let session = Session::with_user(User::new("Ana", Role::Vendedor));
    let token = session::issue_token(&session, &config).unwrap();

    let cookie = format!("theme=dark; {}={token}", session::SESSION_COOKIE);
    let from_cookie = session::session_from_headers(&headers(&[("cookie", &cookie)]), &config);
    assert_eq!(from_cookie, session);

    let bearer = format!("Bearer {token}");
    let from_bearer = session::session_from_headers(&headers(&[("authorization", &bearer)]), &config);
    assert_eq!(from_bearer, session);
}

#[test]
fn test_anonymous_session_cannot_be_issued() {
    assert!(session::issue_token(&Session::anonymous(), &AppConfig::default()).is_err());
}

#[test]
fn test_expired_or_forged_token_is_anonymous() {
    let config = production_config();

    let expired = Claims {
        sub: "Ana".to_string(),
        role: Role::Admin,
        jti: Uuid::new_v4(),
        iat: 1_000,
        exp: 2_000,
    };
    let expired_token = encode(
        &Header::default(),
        &expired,
        &EncodingKey::from_secret(config.session_secret.as_bytes()),
    )
    .unwrap();

    let forged = Session::with_user(User::new("Mallory", Role::Admin));
    let forged_token = session::issue_token(
        &forged,
        &AppConfig {
            session_secret: "some-other-secret".to_string(),
            ..production_config()
        },
    )
    .unwrap();

    for token in [expired_token, forged_token, "not-a-jwt".to_string()] {
        let bearer = format!("Bearer {token}");
        let resolved = session::session_from_headers(&headers(&[("authorization", &bearer)]), &config);
        assert_eq!(resolved, Session::anonymous());
    }
}

fn bypass_config(env: Env) -> AppConfig {
    AppConfig {
        env,
        header_bypass: true,
        ..AppConfig::default()
    }
}

#[test]
fn test_local_bypass_only_when_enabled_in_local_env() {
    let bypass = headers(&[("x-user-name", "Dev"), ("x-user-role", "admin")]);

    let local = session::session_from_headers(&bypass, &bypass_config(Env::Local));
    assert_eq!(local, Session::with_user(User::new("Dev", Role::Admin)));

    // Local without the opt-in, and production even with it, ignore the headers.
    assert_eq!(
        session::session_from_headers(&bypass, &AppConfig::default()),
        Session::anonymous()
    );
    assert_eq!(
        session::session_from_headers(&bypass, &bypass_config(Env::Production)),
        Session::anonymous()
    );

    // Unknown role in the bypass is ignored rather than trusted.
    let bad_role = headers(&[("x-user-name", "Dev"), ("x-user-role", "root")]);
    assert_eq!(
        session::session_from_headers(&bad_role, &bypass_config(Env::Local)),
        Session::anonymous()
    );
}

#[test]
fn test_out_of_range_ttl_is_an_error_not_a_panic() {
    let session = Session::with_user(User::new("Ana", Role::Operador));
    for minutes in [0, -5, 1_000_000_000_000_000, i64::MAX] {
        let config = AppConfig {
            session_ttl_minutes: minutes,
            ..AppConfig::default()
        };
        let err = session::issue_token(&session, &config).unwrap_err();
        assert!(matches!(err, AppError::SessionTtl(m) if m == minutes));
        assert_eq!(err.status(), 500);

        // The cookie header stays well-formed whatever the configured lifetime.
        assert!(session::session_cookie("abc", &config).contains("Max-Age="));
    }
}

#[test]
fn test_cookie_helpers() {
    let map = headers(&[("cookie", "a=1"), ("cookie", "catalog_session=abc; b=2")]);
    assert_eq!(session::cookie_value(&map, "catalog_session"), Some("abc"));
    assert_eq!(session::cookie_value(&map, "b"), Some("2"));
    assert_eq!(session::cookie_value(&map, "missing"), None);

    let set = session::session_cookie("abc", &production_config());
    assert!(set.starts_with("catalog_session=abc;"));
    assert!(set.contains("HttpOnly"));
    assert!(set.ends_with("; Secure"));

    assert!(!session::session_cookie("abc", &AppConfig::default()).contains("Secure"));
    assert!(session::cleared_session_cookie().contains("Max-Age=0"));
}
