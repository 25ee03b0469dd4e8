//! A stand-in for the catalog REST API, served on an ephemeral port. It records every
//! request line it receives so tests can assert what actually went upstream.
#![allow(dead_code)]

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
};
use serde_json::{Value, json};
use std::sync::{Arc, Mutex};
use tokio::net::TcpListener;

type Seen = Arc<Mutex<Vec<String>>>;

pub struct Upstream {
    /// Base URL to hand to the REST clients, e.g. `http://127.0.0.1:1234/api`.
    pub base_url: String,
    seen: Seen,
}

impl Upstream {
    /// `METHOD /raw/path` for every request received so far.
    pub fn requests(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

async fn upstream(State(seen): State<Seen>, method: Method, uri: Uri, body: Bytes) -> Response {
    let path = uri.path().to_string();
    seen.lock().unwrap().push(format!("{method} {path}"));

    match (method.as_str(), path.as_str()) {
        ("GET", "/api/generos") => Json(json!([
            {"idgenero": 1, "nombre": "Acción"},
            {"idgenero": 2, "nombre": "Aventura"}
        ]))
        .into_response(),
        ("GET", "/api/generos/1") => Json(json!({"idgenero": 1, "nombre": "Acción"})).into_response(),
        // Writes acknowledged without a usable body.
        ("POST", "/api/generos") => StatusCode::CREATED.into_response(),
        ("PUT", "/api/generos/1") => Json(json!("ok")).into_response(),
        ("DELETE", "/api/generos/1") | ("DELETE", "/api/usuarios/1") => {
            StatusCode::NO_CONTENT.into_response()
        }
        ("GET", "/api/plataformas") => StatusCode::SERVICE_UNAVAILABLE.into_response(),
        ("GET", "/api/juegos") => (StatusCode::OK, "not json").into_response(),
        ("POST", "/api/login") => login(&body),
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

fn login(body: &[u8]) -> Response {
    let credentials: Value = serde_json::from_slice(body).unwrap_or_default();
    match credentials["email"].as_str().unwrap_or_default() {
        "ada@tienda.local" => Json(json!({"nombre": "Ada", "rol": "admin"})).into_response(),
        "vera@tienda.local" => Json(json!({"name": "Vera", "role": "vendedor"})).into_response(),
        "root@tienda.local" => Json(json!({"nombre": "Root", "rol": "superuser"})).into_response(),
        "blocked@tienda.local" => StatusCode::FORBIDDEN.into_response(),
        "unknown@tienda.local" => StatusCode::NOT_FOUND.into_response(),
        "crash@tienda.local" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => StatusCode::UNAUTHORIZED.into_response(),
    }
}

pub async fn spawn_upstream() -> Upstream {
    let seen = Seen::default();
    let router = Router::new().fallback(upstream).with_state(seen.clone());

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    Upstream {
        base_url: format!("http://127.0.0.1:{}/api", port),
        seen,
    }
}
