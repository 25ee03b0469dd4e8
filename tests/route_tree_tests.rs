use catalog_admin::{
    models::{Role, User},
    routes::{self, LANDING_PATH, LOGIN_PATH, Navigation, ROUTE_TREE, View},
    session::Session,
};

fn session_as(role: Role) -> Session {
    Session::with_user(User::new("tester", role))
}

#[test]
fn test_route_tree_paths_are_unique() {
    for (i, route) in ROUTE_TREE.iter().enumerate() {
        assert!(
            ROUTE_TREE[i + 1..].iter().all(|other| other.path != route.path),
            "duplicate path {}",
            route.path
        );
        assert_ne!(route.path, LOGIN_PATH, "login must stay outside the shell");
    }
}

#[test]
fn test_login_is_public() {
    assert_eq!(routes::resolve("/login", &Session::anonymous()), Navigation::Login);
    assert_eq!(routes::resolve("/login", &session_as(Role::Admin)), Navigation::Login);
}

#[test]
fn test_anonymous_never_reaches_a_view() {
    let anonymous = Session::anonymous();
    for route in ROUTE_TREE {
        assert_eq!(
            routes::resolve(route.path, &anonymous),
            Navigation::Redirect(LOGIN_PATH)
        );
    }
    assert_eq!(
        routes::resolve("/dashboard", &anonymous),
        Navigation::Redirect("/login")
    );
}

#[test]
fn test_admin_reaches_every_admin_and_open_route() {
    let admin = session_as(Role::Admin);
    for route in ROUTE_TREE {
        let expected = match route.required_role {
            None | Some(Role::Admin) => Navigation::Render(route.view),
            Some(_) => Navigation::Redirect(LANDING_PATH),
        };
        assert_eq!(routes::resolve(route.path, &admin), expected, "{}", route.path);
    }
}

#[test]
fn test_vendedor_redirected_from_admin_routes() {
    let seller = session_as(Role::Vendedor);
    assert_eq!(
        routes::resolve("/dashboard", &seller),
        Navigation::Redirect("/")
    );
    assert_eq!(
        routes::resolve("/listusuarios", &seller),
        Navigation::Redirect("/")
    );
    assert_eq!(
        routes::resolve("/listvendedores", &seller),
        Navigation::Render(View::Vendedores)
    );
    assert_eq!(
        routes::resolve("/listjuegos", &seller),
        Navigation::Render(View::Juegos)
    );
}

#[test]
fn test_landing_denial_does_not_loop() {
    for role in [Role::Operador, Role::Vendedor] {
        assert_eq!(
            routes::resolve(LANDING_PATH, &session_as(role)),
            Navigation::Denied(View::Dashboard)
        );
    }
}

#[test]
fn test_unknown_paths_go_to_login() {
    for session in [Session::anonymous(), session_as(Role::Admin)] {
        assert_eq!(
            routes::resolve("/unknown-path", &session),
            Navigation::Redirect(LOGIN_PATH)
        );
        // Matching is exact; trailing slashes are unknown paths too.
        assert_eq!(
            routes::resolve("/listjuegos/", &session),
            Navigation::Redirect(LOGIN_PATH)
        );
    }
}

#[test]
fn test_resource_guards_follow_route_tree() {
    use catalog_admin::catalog::CatalogResource;

    assert_eq!(CatalogResource::Usuarios.guard().required_role(), Some(Role::Admin));
    assert_eq!(
        CatalogResource::Vendedores.guard().required_role(),
        Some(Role::Vendedor)
    );
    for resource in [
        CatalogResource::Generos,
        CatalogResource::Plataformas,
        CatalogResource::Juegos,
        CatalogResource::Categorias,
        CatalogResource::Productos,
    ] {
        assert_eq!(resource.guard().required_role(), None, "{resource}");
    }
}
