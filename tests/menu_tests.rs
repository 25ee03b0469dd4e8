use catalog_admin::{
    icons::IconId,
    menu::{MenuConfigError, MenuDescriptor, MenuTarget, visible_entries},
    models::{Role, User},
    routes::{self, MenuViolation},
    session::Session,
};
use std::io::Write;

fn labels(entries: &[&catalog_admin::menu::MenuEntry]) -> Vec<String> {
    entries.iter().map(|entry| entry.label.clone()).collect()
}

#[test]
fn test_builtin_menu_loads() {
    let menu = MenuDescriptor::builtin().expect("built-in menu must be valid");
    assert!(!menu.entries().is_empty());

    let dashboard = &menu.entries()[0];
    assert_eq!(dashboard.label, "Dashboard");
    assert_eq!(dashboard.icon, IconId::FiHome);
    assert_eq!(dashboard.target(), MenuTarget::Route("/"));
}

#[test]
fn test_builtin_menu_matches_route_tree() {
    let menu = MenuDescriptor::builtin().unwrap();
    let violations = routes::consistency_violations(&menu);
    assert!(violations.is_empty(), "unexpected violations: {violations:?}");
}

#[test]
fn test_visibility_is_role_membership() {
    let menu = MenuDescriptor::builtin().unwrap();
    for role in Role::ALL {
        let user = User::new("u", role);
        let visible = visible_entries(menu.entries(), Some(&user));
        for entry in menu.entries() {
            let shown = visible.iter().any(|v| v.label == entry.label);
            assert_eq!(shown, entry.roles.contains(&role), "{} for {role}", entry.label);
        }
    }
}

#[test]
fn test_absent_user_sees_nothing() {
    let menu = MenuDescriptor::builtin().unwrap();
    assert!(visible_entries(menu.entries(), None).is_empty());
    assert!(menu.visible_to(&Session::anonymous()).is_empty());
}

#[test]
fn test_vendedor_menu_in_declaration_order() {
    let menu = MenuDescriptor::builtin().unwrap();
    let session = Session::with_user(User::new("Vera", Role::Vendedor));
    let visible = labels(&menu.visible_to(&session));

    assert_eq!(
        visible,
        vec!["Géneros", "Plataformas", "Juegos", "Tienda", "Vendedores"]
    );
    assert!(!visible.contains(&"Usuarios".to_string()));
    assert!(!visible.contains(&"Dashboard".to_string()));
}

#[test]
fn test_admin_menu_excludes_vendedores() {
    let menu = MenuDescriptor::builtin().unwrap();
    let session = Session::with_user(User::new("Ada", Role::Admin));
    let visible = labels(&menu.visible_to(&session));

    assert_eq!(visible.first().map(String::as_str), Some("Dashboard"));
    assert!(visible.contains(&"Usuarios".to_string()));
    assert!(!visible.contains(&"Vendedores".to_string()));
}

#[test]
fn test_landing_for_each_role() {
    let menu = MenuDescriptor::builtin().unwrap();
    assert_eq!(menu.landing_for(Role::Admin), Some("/"));
    assert_eq!(menu.landing_for(Role::Operador), Some("/listgeneros"));
    assert_eq!(menu.landing_for(Role::Vendedor), Some("/listgeneros"));
}

#[test]
fn test_unknown_icon_fails_fast() {
    let raw = r#"[{"label": "X", "icon": "FiRocket", "route": "/x", "roles": ["admin"]}]"#;
    let err = MenuDescriptor::from_json(raw).unwrap_err();
    assert!(matches!(err, MenuConfigError::Parse(_)));
    assert!(err.to_string().contains("FiRocket"));
}

#[test]
fn test_unknown_role_fails_fast() {
    let raw = r#"[{"label": "X", "icon": "FiHome", "route": "/x", "roles": ["superuser"]}]"#;
    assert!(matches!(
        MenuDescriptor::from_json(raw),
        Err(MenuConfigError::Parse(_))
    ));
}

#[test]
fn test_structural_validation() {
    let cases = [
        (
            r#"[{"label": "X", "icon": "FiHome", "route": "/x", "roles": []}]"#,
            "lists no roles",
        ),
        (
            r#"[{"label": "X", "icon": "FiHome", "roles": ["admin"]}]"#,
            "neither a route nor a submenu",
        ),
        (
            r#"[{"label": "X", "icon": "FiHome", "route": "/x",
                 "submenu": [{"label": "Y", "route": "/y"}], "roles": ["admin"]}]"#,
            "both a route and a submenu",
        ),
        (
            r#"[{"label": "X", "icon": "FiHome", "route": "x", "roles": ["admin"]}]"#,
            "not an absolute path",
        ),
        (
            r#"[{"label": " ", "icon": "FiHome", "route": "/x", "roles": ["admin"]}]"#,
            "empty label",
        ),
        (
            r#"[{"label": "X", "icon": "FiHome", "route": "/x", "roles": ["admin"]},
                {"label": "X", "icon": "FiHome", "route": "/y", "roles": ["admin"]}]"#,
            "more than once",
        ),
    ];

    for (raw, expected) in cases {
        let err = MenuDescriptor::from_json(raw).unwrap_err();
        assert!(
            err.to_string().contains(expected),
            "`{err}` should mention `{expected}`"
        );
    }
}

#[test]
fn test_load_from_file_and_missing_file() {
    let path = std::env::temp_dir().join(format!("menu-{}.json", uuid::Uuid::new_v4()));
    let mut file = std::fs::File::create(&path).unwrap();
    file.write_all(br#"[{"label": "Juegos", "icon": "FaGamepad", "route": "/listjuegos", "roles": ["operador"]}]"#)
        .unwrap();

    let menu = MenuDescriptor::load(path.to_str()).unwrap();
    assert_eq!(menu.entries().len(), 1);
    std::fs::remove_file(&path).unwrap();

    let err = MenuDescriptor::load(path.to_str()).unwrap_err();
    assert!(matches!(err, MenuConfigError::Io { .. }));
}

#[test]
fn test_consistency_check_reports_bad_links() {
    // A placeholder upload entry and an over-shared user list.
    let raw = r#"[
        {"label": "Administrar", "icon": "FiSettings",
         "submenu": [{"label": "Subir Tablas", "route": "/subirtablas"}],
         "roles": ["admin", "operador", "vendedor"]},
        {"label": "Usuarios", "icon": "FiUsers",
         "submenu": [{"label": "Listado", "route": "/listusuarios"}],
         "roles": ["admin", "operador"]}
    ]"#;
    let menu = MenuDescriptor::from_json(raw).unwrap();
    let violations = routes::consistency_violations(&menu);

    assert_eq!(
        violations,
        vec![
            MenuViolation::UnroutedLink {
                label: "Administrar".to_string(),
                route: "/subirtablas".to_string(),
            },
            MenuViolation::RejectedLink {
                label: "Usuarios".to_string(),
                route: "/listusuarios".to_string(),
                role: Role::Operador,
            },
        ]
    );
}
