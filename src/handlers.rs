use crate::{
    AppState,
    catalog::{CatalogResource, CatalogState, Record, check_record_id},
    error::AppError,
    menu::{MenuEntry, MenuState},
    models::{LoginRequest, LoginResponse, User},
    routes::{LANDING_PATH, LOGIN_PATH, RouteDescriptor},
    session::{self, Session},
    views,
};
use axum::{
    Form, Json,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use serde_json::Value;
use utoipa::IntoParams;

// --- Extractor Structs ---

/// ListFilter
///
/// Global "contains" filter shared by the list views and the catalog API.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListFilter {
    /// Case-insensitive text matched against every column of a record.
    pub q: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct ResourcePath {
    /// Catalog collection, e.g. `generos` or `usuarios`.
    pub resource: CatalogResource,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Path)]
pub struct RecordPath {
    pub resource: CatalogResource,
    /// Value of the collection's id column.
    pub id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoginPageParams {
    pub error: Option<String>,
}

/// filter_records
///
/// Keeps the records where any value contains `query`, ignoring case. A blank query
/// keeps everything.
pub fn filter_records(records: Vec<Record>, query: Option<&str>) -> Vec<Record> {
    let Some(needle) = query
        .map(str::trim)
        .filter(|q| !q.is_empty())
        .map(str::to_lowercase)
    else {
        return records;
    };

    records
        .into_iter()
        .filter(|record| {
            record.values().any(|value| {
                let text = match value {
                    Value::String(s) => s.to_lowercase(),
                    other => other.to_string().to_lowercase(),
                };
                text.contains(&needle)
            })
        })
        .collect()
}

// --- Shell Views ---

/// render_view
///
/// [Shell Route] Renders one route-tree view inside the protected layout. The guards
/// have already run by the time this is reached.
///
/// Catalog failures are shown as an error panel in place of the table; the shell and
/// navigation stay usable.
pub async fn render_view(
    route: RouteDescriptor,
    session: Session,
    state: AppState,
    filter: ListFilter,
) -> Html<String> {
    let content = match route.view.resource() {
        None => dashboard_content(&state.catalog).await,
        Some(resource) => match state.catalog.list(resource).await {
            Ok(records) => {
                let query = filter.q.as_deref();
                let rows = filter_records(records, query);
                views::records_table(resource, route.path, &rows, query)
            }
            Err(e) => {
                tracing::error!(error = %e, %resource, "failed to load catalog records");
                views::error_panel(&format!(
                    "No se pudieron cargar los registros de {}.",
                    resource.title()
                ))
            }
        },
    };

    views::shell(
        &session,
        &state.menu,
        route.path,
        route.view.title(),
        &content,
    )
}

async fn dashboard_content(catalog: &CatalogState) -> String {
    let mut counts = Vec::with_capacity(CatalogResource::ALL.len());
    for resource in CatalogResource::ALL {
        let count = match catalog.list(resource).await {
            Ok(records) => Some(records.len()),
            Err(e) => {
                tracing::warn!(error = %e, %resource, "dashboard count unavailable");
                None
            }
        };
        counts.push((resource, count));
    }
    views::dashboard(&counts)
}

/// fallback
///
/// Unknown paths are treated like an unauthenticated visit.
pub async fn fallback() -> Redirect {
    Redirect::to(LOGIN_PATH)
}

// --- Session Lifecycle (HTML) ---

/// login_page
///
/// [Public Route] The login form. `?error=` selects the message shown above it.
pub async fn login_page(Query(params): Query<LoginPageParams>) -> Html<String> {
    views::login_page(params.error.as_deref())
}

/// start_session
///
/// Authenticates the credentials, logs the user into a fresh session and signs it.
async fn start_session(state: &AppState, credentials: &LoginRequest) -> Result<(User, String), AppError> {
    let user = state
        .identity
        .authenticate(credentials)
        .await?
        .ok_or(AppError::InvalidCredentials)?;

    let mut session = Session::anonymous();
    session.login(user.clone());
    let token = session::issue_token(&session, &state.config)?;

    tracing::info!(user = %user.name, role = %user.role, "session started");
    Ok((user, token))
}

/// login_submit
///
/// [Public Route] Form login. On success the session cookie is set and the user is sent
/// to the first menu link their role can see; on failure back to the form.
pub async fn login_submit(
    State(state): State<AppState>,
    Form(credentials): Form<LoginRequest>,
) -> Response {
    match start_session(&state, &credentials).await {
        Ok((user, token)) => {
            let target = state.menu.landing_for(user.role).unwrap_or(LANDING_PATH);
            (
                [(header::SET_COOKIE, session::session_cookie(&token, &state.config))],
                Redirect::to(target),
            )
                .into_response()
        }
        Err(AppError::InvalidCredentials) => {
            tracing::info!(email = %credentials.email, "login rejected");
            Redirect::to("/login?error=credentials").into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "login failed");
            Redirect::to("/login?error=unavailable").into_response()
        }
    }
}

/// logout
///
/// [Public Route] Ends the session and returns to the login form.
pub async fn logout(mut session: Session) -> Response {
    if let Some(user) = session.current_user() {
        tracing::info!(user = %user.name, "session ended");
    }
    session.logout();
    (
        [(header::SET_COOKIE, session::cleared_session_cookie())],
        Redirect::to(LOGIN_PATH),
    )
        .into_response()
}

// --- JSON API ---

/// api_login
///
/// [API Route] Logs in and returns the session token, also set as the session cookie.
#[utoipa::path(
    post,
    path = "/api/session",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Session started", body = LoginResponse),
        (status = 401, description = "Invalid credentials"),
        (status = 502, description = "Identity provider unavailable")
    )
)]
pub async fn api_login(
    State(state): State<AppState>,
    Json(credentials): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (user, token) = start_session(&state, &credentials).await?;
    let cookie = session::session_cookie(&token, &state.config);
    Ok(([(header::SET_COOKIE, cookie)], Json(LoginResponse { token, user })))
}

/// api_logout
///
/// [API Route] Clears the session cookie. Bearer tokens simply stop being sent.
#[utoipa::path(
    delete,
    path = "/api/session",
    responses((status = 204, description = "Session cleared"))
)]
pub async fn api_logout() -> impl IntoResponse {
    (
        StatusCode::NO_CONTENT,
        [(header::SET_COOKIE, session::cleared_session_cookie())],
    )
}

/// get_me
///
/// [API Route] The user of the current session.
#[utoipa::path(
    get,
    path = "/api/me",
    responses(
        (status = 200, description = "Current user", body = User),
        (status = 401, description = "No session")
    )
)]
pub async fn get_me(session: Session) -> Result<Json<User>, AppError> {
    session
        .current_user()
        .cloned()
        .map(Json)
        .ok_or(AppError::Unauthorized)
}

/// get_menu
///
/// [API Route] The navigation entries visible to the caller, in display order. An
/// anonymous caller gets an empty list.
#[utoipa::path(
    get,
    path = "/api/menu",
    responses((status = 200, description = "Visible menu entries", body = [MenuEntry]))
)]
pub async fn get_menu(session: Session, State(menu): State<MenuState>) -> Json<Vec<MenuEntry>> {
    Json(menu.visible_to(&session).into_iter().cloned().collect())
}

fn authorize(resource: CatalogResource, session: &Session) -> Result<(), AppError> {
    resource.guard().decide(session).into_api_result(session)
}

fn into_record(value: Value) -> Result<Record, AppError> {
    match value {
        Value::Object(record) => Ok(record),
        _ => Err(AppError::BadRequest("expected a JSON object".to_string())),
    }
}

/// list_records
///
/// [API Route] Lists a catalog collection. Guarded exactly like the collection's list view.
#[utoipa::path(
    get,
    path = "/api/catalog/{resource}",
    params(ResourcePath, ListFilter),
    responses(
        (status = 200, description = "Records of the collection"),
        (status = 401, description = "No session"),
        (status = 403, description = "Role not allowed")
    )
)]
pub async fn list_records(
    session: Session,
    State(catalog): State<CatalogState>,
    Path(ResourcePath { resource }): Path<ResourcePath>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<Record>>, AppError> {
    authorize(resource, &session)?;
    let records = catalog.list(resource).await?;
    Ok(Json(filter_records(records, filter.q.as_deref())))
}

/// get_record
///
/// [API Route] One record by id.
#[utoipa::path(
    get,
    path = "/api/catalog/{resource}/{id}",
    params(RecordPath),
    responses(
        (status = 200, description = "Record found"),
        (status = 400, description = "Invalid record id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn get_record(
    session: Session,
    State(catalog): State<CatalogState>,
    Path(RecordPath { resource, id }): Path<RecordPath>,
) -> Result<Json<Record>, AppError> {
    authorize(resource, &session)?;
    check_record_id(&id)?;
    catalog
        .get(resource, &id)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// create_record
///
/// [API Route] Creates a record and returns it as stored upstream.
#[utoipa::path(
    post,
    path = "/api/catalog/{resource}",
    params(ResourcePath),
    request_body = Value,
    responses(
        (status = 201, description = "Created"),
        (status = 400, description = "Body is not a JSON object")
    )
)]
pub async fn create_record(
    session: Session,
    State(catalog): State<CatalogState>,
    Path(ResourcePath { resource }): Path<ResourcePath>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<Record>), AppError> {
    authorize(resource, &session)?;
    let created = catalog.create(resource, into_record(body)?).await?;
    tracing::info!(%resource, id = ?resource.record_id(&created), "record created");
    Ok((StatusCode::CREATED, Json(created)))
}

/// update_record
///
/// [API Route] Replaces the given columns of a record.
#[utoipa::path(
    put,
    path = "/api/catalog/{resource}/{id}",
    params(RecordPath),
    request_body = Value,
    responses(
        (status = 200, description = "Updated"),
        (status = 400, description = "Invalid record id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn update_record(
    session: Session,
    State(catalog): State<CatalogState>,
    Path(RecordPath { resource, id }): Path<RecordPath>,
    Json(body): Json<Value>,
) -> Result<Json<Record>, AppError> {
    authorize(resource, &session)?;
    check_record_id(&id)?;
    catalog
        .update(resource, &id, into_record(body)?)
        .await?
        .map(Json)
        .ok_or(AppError::NotFound)
}

/// delete_record
///
/// [API Route] Deletes a record.
#[utoipa::path(
    delete,
    path = "/api/catalog/{resource}/{id}",
    params(RecordPath),
    responses(
        (status = 204, description = "Deleted"),
        (status = 400, description = "Invalid record id"),
        (status = 404, description = "Not Found")
    )
)]
pub async fn delete_record(
    session: Session,
    State(catalog): State<CatalogState>,
    Path(RecordPath { resource, id }): Path<RecordPath>,
) -> Result<StatusCode, AppError> {
    authorize(resource, &session)?;
    check_record_id(&id)?;
    if catalog.delete(resource, &id).await? {
        tracing::info!(%resource, %id, "record deleted");
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound)
    }
}
