//! Server-rendered HTML for the dashboard: the protected shell, the navigation
//! renderer and the page bodies placed in the shell's outlet.

use axum::response::Html;
use serde_json::Value;

use crate::{
    catalog::{CatalogResource, Record},
    icons::IconId,
    menu::{MenuDescriptor, MenuTarget},
    session::Session,
};

const STYLES: &str = r#"
body{margin:0;font-family:system-ui,sans-serif;background:#f4f6f9;color:#212529}
.wrapper{display:flex;min-height:100vh}
.app-sidebar{min-width:250px;background:#1f2d3d;color:#c2c7d0}
.sidebar-brand{padding:1rem;text-align:center;font-size:10px;letter-spacing:.1em}
.user-block{text-align:center;margin:.5rem 0 1rem}
.user-block h6{margin:0;font-size:.85rem}.user-block p{margin:0;font-size:.75rem;opacity:.7}
.nav{list-style:none;margin:0;padding:0}
.nav a,.nav summary{display:flex;gap:.75rem;align-items:center;padding:.5rem 1rem;color:inherit;text-decoration:none;cursor:pointer}
.nav a.active{background:#007bff;color:#fff}
.nav .nav{padding-left:1.5rem}
.nav .logout{margin-top:1rem;border-top:1px solid #4b545c;color:#dc3545}
.content{flex:1;display:flex;flex-direction:column}
.app-header,.app-footer{padding:.75rem 1.5rem;background:#fff;box-shadow:0 1px 2px rgba(0,0,0,.08)}
.app-main{flex:1;padding:1.5rem}
table{border-collapse:collapse;width:100%;background:#fff}
th,td{border:1px solid #dee2e6;padding:.4rem .6rem;text-align:left}
.cards{display:grid;grid-template-columns:repeat(auto-fill,minmax(180px,1fr));gap:1rem}
.card{background:#fff;padding:1rem;border-radius:6px}
.card strong{display:block;font-size:1.8rem}
.alert{padding:1rem;border-radius:6px;background:#f8d7da;color:#842029}
"#;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn document(title: &str, body: &str) -> Html<String> {
    Html(format!(
        r#"<!DOCTYPE html>
<html lang="es">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · Gestión de Videojuegos</title>
<style>{STYLES}</style>
</head>
<body>
{body}
</body>
</html>"#,
        title = escape(title),
    ))
}

/// render_navigation
///
/// The sidebar: brand, user block and the menu filtered by the session's role. A
/// submenu is rendered open when it contains the active path.
pub fn render_navigation(menu: &MenuDescriptor, session: &Session, active_path: &str) -> String {
    let user_block = match session.current_user() {
        Some(user) => format!(
            "<h6>{}</h6><p>{}</p>",
            escape(&user.name),
            user.role
        ),
        None => "<p>No autenticado</p>".to_string(),
    };

    let link = |route: &str, icon: IconId, label: &str| {
        let class = if route == active_path { " class=\"active\"" } else { "" };
        format!(
            r#"<a href="{}"{class}>{}<span>{}</span></a>"#,
            escape(route),
            icon.render(),
            escape(label)
        )
    };

    let mut items = String::new();
    for entry in menu.visible_to(session) {
        items.push_str("<li class=\"nav-item\">");
        match entry.target() {
            MenuTarget::Route(route) => items.push_str(&link(route, entry.icon, &entry.label)),
            MenuTarget::Submenu(children) => {
                let open = if children.iter().any(|child| child.route == active_path) {
                    " open"
                } else {
                    ""
                };
                items.push_str(&format!(
                    "<details{open}><summary>{}<span>{}</span>{}</summary><ul class=\"nav\">",
                    entry.icon.render(),
                    escape(&entry.label),
                    IconId::FiChevronRight.render()
                ));
                for child in children {
                    items.push_str("<li class=\"nav-item\">");
                    items.push_str(&link(&child.route, IconId::FiList, &child.label));
                    items.push_str("</li>");
                }
                items.push_str("</ul></details>");
            }
        }
        items.push_str("</li>");
    }

    format!(
        r#"<aside class="app-sidebar">
<div class="sidebar-brand">GESTION DE VIDEOJUEGOS</div>
<div class="user-block">{user_block}</div>
<nav><ul class="nav">{items}<li class="nav-item"><a class="logout" href="/logout">{}<span>Salir</span></a></li></ul></nav>
</aside>"#,
        IconId::FiLogOut.render()
    )
}

/// shell
///
/// The protected layout: navigation, header, the page content as the outlet, footer.
pub fn shell(
    session: &Session,
    menu: &MenuDescriptor,
    active_path: &str,
    title: &str,
    content: &str,
) -> Html<String> {
    let greeting = session
        .current_user()
        .map(|user| format!("{} ({})", escape(&user.name), user.role))
        .unwrap_or_default();

    let body = format!(
        r#"<div class="wrapper">
{nav}
<div class="content">
<header class="app-header"><strong>{title}</strong> <span style="float:right">{greeting}</span></header>
<main class="app-main">{content}</main>
<footer class="app-footer">Gestión de Videojuegos</footer>
</div>
</div>"#,
        nav = render_navigation(menu, session, active_path),
        title = escape(title),
    );
    document(title, &body)
}

pub fn login_page(error: Option<&str>) -> Html<String> {
    let message = match error {
        Some("credentials") => "<div class=\"alert\">Correo o contraseña incorrectos.</div>",
        Some(_) => "<div class=\"alert\">El servicio de autenticación no está disponible.</div>",
        None => "",
    };
    let body = format!(
        r#"<main class="app-main" style="max-width:360px;margin:10vh auto">
<h1>Iniciar sesión</h1>
{message}
<form method="post" action="/login">
<p><label>Correo<br><input type="email" name="email" required autofocus></label></p>
<p><label>Contraseña<br><input type="password" name="password" required></label></p>
<p><button type="submit">Ingresar</button></p>
</form>
</main>"#
    );
    document("Login", &body)
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => escape(s),
        Some(Value::Bool(true)) => "Sí".to_string(),
        Some(Value::Bool(false)) => "No".to_string(),
        Some(other) => escape(&other.to_string()),
    }
}

/// records_table
///
/// A list view body: search box and one table row per record. Columns are the union
/// of the records' keys, id column first.
pub fn records_table(
    resource: CatalogResource,
    path: &str,
    records: &[Record],
    query: Option<&str>,
) -> String {
    let mut columns: Vec<&str> = vec![resource.id_field()];
    for record in records {
        for key in record.keys() {
            if !columns.contains(&key.as_str()) {
                columns.push(key);
            }
        }
    }

    let search = format!(
        r#"<form method="get" action="{}"><input type="search" name="q" value="{}" placeholder="Buscar..."> <button type="submit">Buscar</button></form>"#,
        escape(path),
        escape(query.unwrap_or_default())
    );

    if records.is_empty() {
        return format!("{search}<p>No hay registros.</p>");
    }

    let head: String = columns
        .iter()
        .map(|column| format!("<th>{}</th>", escape(column)))
        .collect();
    let rows: String = records
        .iter()
        .map(|record| {
            let cells: String = columns
                .iter()
                .map(|column| format!("<td>{}</td>", cell(record.get(*column))))
                .collect();
            format!("<tr>{cells}</tr>")
        })
        .collect();

    format!(
        "{search}<p>{} registro(s)</p><table><thead><tr>{head}</tr></thead><tbody>{rows}</tbody></table>",
        records.len()
    )
}

/// Dashboard body: one card per collection; `None` marks an unavailable count.
pub fn dashboard(counts: &[(CatalogResource, Option<usize>)]) -> String {
    let cards: String = counts
        .iter()
        .map(|(resource, count)| {
            let value = count.map_or_else(|| "&mdash;".to_string(), |n| n.to_string());
            format!(
                "<div class=\"card\"><strong>{value}</strong>{}</div>",
                escape(resource.title())
            )
        })
        .collect();
    format!("<div class=\"cards\">{cards}</div>")
}

pub fn error_panel(message: &str) -> String {
    format!("<div class=\"alert\">{}</div>", escape(message))
}

/// Rendered when a role guard rejects the landing route itself.
pub fn access_denied_page(session: &Session, menu: &MenuDescriptor, path: &str) -> Html<String> {
    let content = error_panel("No tienes permiso para ver esta sección. Usa el menú para continuar.");
    shell(session, menu, path, "Acceso denegado", &content)
}
