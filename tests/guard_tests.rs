use catalog_admin::{
    error::AppError,
    guard::{GuardOutcome, RouteGuard},
    models::{Role, User},
    session::Session,
};

fn session_as(role: Role) -> Session {
    Session::with_user(User::new("tester", role))
}

fn all_guards() -> Vec<RouteGuard> {
    let mut guards = vec![RouteGuard::authenticated()];
    guards.extend(Role::ALL.into_iter().map(RouteGuard::requiring));
    guards
}

#[test]
fn test_anonymous_is_always_sent_to_login() {
    let anonymous = Session::anonymous();
    for guard in all_guards() {
        let outcome = guard.decide(&anonymous);
        assert_eq!(outcome, GuardOutcome::RedirectToLogin);
        assert_eq!(outcome.redirect_target(), Some("/login"));
    }
}

#[test]
fn test_wrong_role_is_sent_to_landing() {
    let admin_only = RouteGuard::requiring(Role::Admin);
    for role in [Role::Operador, Role::Vendedor] {
        let outcome = admin_only.decide(&session_as(role));
        assert_eq!(outcome, GuardOutcome::RedirectToLanding);
        assert_eq!(outcome.redirect_target(), Some("/"));
    }
}

#[test]
fn test_matching_or_absent_role_renders() {
    for role in Role::ALL {
        let session = session_as(role);
        assert_eq!(RouteGuard::authenticated().decide(&session), GuardOutcome::Render);
        assert_eq!(RouteGuard::requiring(role).decide(&session), GuardOutcome::Render);
        assert_eq!(GuardOutcome::Render.redirect_target(), None);
    }
}

#[test]
fn test_role_check_is_single_role_equality() {
    // Admin does not inherit vendedor access: a guard admits exactly one role.
    let vendedor_only = RouteGuard::requiring(Role::Vendedor);
    assert!(vendedor_only.admits(Role::Vendedor));
    assert!(!vendedor_only.admits(Role::Admin));
    assert!(!vendedor_only.admits(Role::Operador));
    assert_eq!(
        vendedor_only.decide(&session_as(Role::Admin)),
        GuardOutcome::RedirectToLanding
    );
}

#[test]
fn test_api_mapping_of_outcomes() {
    let admin_only = RouteGuard::requiring(Role::Admin);

    let anonymous = Session::anonymous();
    let err = admin_only
        .decide(&anonymous)
        .into_api_result(&anonymous)
        .unwrap_err();
    assert!(matches!(err, AppError::Unauthorized));
    assert_eq!(err.status(), 401);

    let seller = session_as(Role::Vendedor);
    let err = admin_only.decide(&seller).into_api_result(&seller).unwrap_err();
    assert!(matches!(err, AppError::Forbidden(Role::Vendedor)));
    assert_eq!(err.status(), 403);

    let admin = session_as(Role::Admin);
    assert!(admin_only.decide(&admin).into_api_result(&admin).is_ok());
}
