use std::{collections::HashMap, fmt, sync::Arc};

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use utoipa::ToSchema;

use crate::{error::CatalogError, guard::RouteGuard, routes};

/// One catalog row as the REST API returns it. The dashboard does not interpret the
/// columns beyond the id field.
pub type Record = Map<String, Value>;

/// CatalogResource
///
/// The REST collections the dashboard manages. The serialized name is also the URL
/// segment under the API base (`/api/generos`, ...).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CatalogResource {
    Generos,
    Plataformas,
    Juegos,
    Categorias,
    Productos,
    Usuarios,
    Vendedores,
}

impl CatalogResource {
    pub const ALL: [CatalogResource; 7] = [
        CatalogResource::Generos,
        CatalogResource::Plataformas,
        CatalogResource::Juegos,
        CatalogResource::Categorias,
        CatalogResource::Productos,
        CatalogResource::Usuarios,
        CatalogResource::Vendedores,
    ];

    pub const fn segment(self) -> &'static str {
        match self {
            CatalogResource::Generos => "generos",
            CatalogResource::Plataformas => "plataformas",
            CatalogResource::Juegos => "juegos",
            CatalogResource::Categorias => "categorias",
            CatalogResource::Productos => "productos",
            CatalogResource::Usuarios => "usuarios",
            CatalogResource::Vendedores => "vendedores",
        }
    }

    /// Primary key column used by the REST API for this collection.
    pub const fn id_field(self) -> &'static str {
        match self {
            CatalogResource::Generos => "idgenero",
            CatalogResource::Plataformas => "idplataforma",
            CatalogResource::Juegos => "idjuego",
            CatalogResource::Categorias => "idcategoria",
            CatalogResource::Productos => "idproducto",
            CatalogResource::Usuarios => "idusuario",
            CatalogResource::Vendedores => "idvendedor",
        }
    }

    pub const fn title(self) -> &'static str {
        match self {
            CatalogResource::Generos => "Géneros",
            CatalogResource::Plataformas => "Plataformas",
            CatalogResource::Juegos => "Juegos",
            CatalogResource::Categorias => "Categorías",
            CatalogResource::Productos => "Productos",
            CatalogResource::Usuarios => "Usuarios",
            CatalogResource::Vendedores => "Vendedores",
        }
    }

    /// The guard of this resource's list view. The JSON API reuses it so both surfaces
    /// admit exactly the same roles.
    pub fn guard(self) -> RouteGuard {
        routes::ROUTE_TREE
            .iter()
            .find(|route| route.view.resource() == Some(self))
            .map(|route| route.guard())
            .unwrap_or_default()
    }

    /// The id of `record` as a path segment, whether the API stores it as a number or a string.
    pub fn record_id(self, record: &Record) -> Option<String> {
        match record.get(self.id_field())? {
            Value::String(id) => Some(id.clone()),
            Value::Number(id) => Some(id.to_string()),
            _ => None,
        }
    }
}

impl fmt::Display for CatalogResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.segment())
    }
}

/// CatalogApi
///
/// The generic list/detail/create/update/delete contract the dashboard consumes. The
/// REST client is used in production; `InMemoryCatalog` stands in for it in tests.
#[async_trait]
pub trait CatalogApi: Send + Sync {
    async fn list(&self, resource: CatalogResource) -> Result<Vec<Record>, CatalogError>;
    async fn get(&self, resource: CatalogResource, id: &str) -> Result<Option<Record>, CatalogError>;
    async fn create(&self, resource: CatalogResource, record: Record) -> Result<Record, CatalogError>;
    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        record: Record,
    ) -> Result<Option<Record>, CatalogError>;
    /// Returns false when no such record existed.
    async fn delete(&self, resource: CatalogResource, id: &str) -> Result<bool, CatalogError>;
}

pub type CatalogState = Arc<dyn CatalogApi>;

/// check_record_id
///
/// A record id travels as exactly one URL path segment. Empty ids, dot segments and
/// anything containing a path separator are rejected before a request is built.
pub fn check_record_id(id: &str) -> Result<(), CatalogError> {
    if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\']) {
        return Err(CatalogError::InvalidId(id.to_string()));
    }
    Ok(())
}

/// RestCatalogClient
///
/// `CatalogApi` over the catalog REST API:
/// `GET/POST {base}/{resource}` and `GET/PUT/DELETE {base}/{resource}/{id}`.
#[derive(Clone)]
pub struct RestCatalogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RestCatalogClient {
    /// Fails when `base_url` is not an absolute URL that can carry path segments.
    pub fn new(http: reqwest::Client, base_url: &str) -> Result<Self, CatalogError> {
        let invalid = || CatalogError::InvalidUrl(base_url.to_string());
        let base_url = Url::parse(base_url.trim_end_matches('/')).map_err(|_| invalid())?;
        if base_url.cannot_be_a_base() {
            return Err(invalid());
        }
        Ok(Self { http, base_url })
    }

    fn url_with(&self, segments: &[&str]) -> Result<Url, CatalogError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| CatalogError::InvalidUrl(self.base_url.to_string()))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn collection_url(&self, resource: CatalogResource) -> Result<Url, CatalogError> {
        self.url_with(&[resource.segment()])
    }

    /// The id is pushed as one percent-encoded segment, so it can never climb out of
    /// the resource's collection.
    fn record_url(&self, resource: CatalogResource, id: &str) -> Result<Url, CatalogError> {
        check_record_id(id)?;
        self.url_with(&[resource.segment(), id])
    }
}

async fn decode_record(response: reqwest::Response, sent: Option<Record>) -> Result<Record, CatalogError> {
    let body = response.bytes().await?;
    if body.is_empty() {
        // Some endpoints acknowledge writes with an empty body.
        return sent.ok_or_else(|| CatalogError::Decode("empty body".to_string()));
    }
    match serde_json::from_slice::<Value>(&body) {
        Ok(Value::Object(record)) => Ok(record),
        Ok(_) => sent.ok_or_else(|| CatalogError::Decode("expected a JSON object".to_string())),
        Err(e) => Err(CatalogError::Decode(e.to_string())),
    }
}

fn check_status(status: StatusCode) -> Result<(), CatalogError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(CatalogError::Status(status.as_u16()))
    }
}

#[async_trait]
impl CatalogApi for RestCatalogClient {
    async fn list(&self, resource: CatalogResource) -> Result<Vec<Record>, CatalogError> {
        let response = self.http.get(self.collection_url(resource)?).send().await?;
        check_status(response.status())?;
        response
            .json::<Vec<Record>>()
            .await
            .map_err(|e| CatalogError::Decode(e.to_string()))
    }

    async fn get(&self, resource: CatalogResource, id: &str) -> Result<Option<Record>, CatalogError> {
        let response = self.http.get(self.record_url(resource, id)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(response.status())?;
        decode_record(response, None).await.map(Some)
    }

    async fn create(&self, resource: CatalogResource, record: Record) -> Result<Record, CatalogError> {
        let response = self
            .http
            .post(self.collection_url(resource)?)
            .json(&record)
            .send()
            .await?;
        check_status(response.status())?;
        decode_record(response, Some(record)).await
    }

    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        record: Record,
    ) -> Result<Option<Record>, CatalogError> {
        let response = self
            .http
            .put(self.record_url(resource, id)?)
            .json(&record)
            .send()
            .await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        check_status(response.status())?;
        decode_record(response, Some(record)).await.map(Some)
    }

    async fn delete(&self, resource: CatalogResource, id: &str) -> Result<bool, CatalogError> {
        let response = self.http.delete(self.record_url(resource, id)?).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        check_status(response.status())?;
        Ok(true)
    }
}

/// InMemoryCatalog
///
/// A `CatalogApi` kept in process memory, used by the tests and for running the
/// dashboard without the REST backend. New records get the next integer id.
#[derive(Default)]
pub struct InMemoryCatalog {
    records: RwLock<HashMap<CatalogResource, Vec<Record>>>,
    /// When true, every operation fails as an unreachable upstream would.
    pub should_fail: bool,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Seeds a collection. Non-object values are skipped.
    pub fn with_records(mut self, resource: CatalogResource, records: Vec<Value>) -> Self {
        let rows = records.into_iter().filter_map(|value| match value {
            Value::Object(record) => Some(record),
            _ => None,
        });
        self.records.get_mut().entry(resource).or_default().extend(rows);
        self
    }

    fn check(&self) -> Result<(), CatalogError> {
        if self.should_fail {
            Err(CatalogError::Status(StatusCode::SERVICE_UNAVAILABLE.as_u16()))
        } else {
            Ok(())
        }
    }
}

fn next_id(resource: CatalogResource, rows: &[Record]) -> u64 {
    rows.iter()
        .filter_map(|row| row.get(resource.id_field()))
        .filter_map(|id| match id {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.parse().ok(),
            _ => None,
        })
        .max()
        .unwrap_or(0)
        + 1
}

#[async_trait]
impl CatalogApi for InMemoryCatalog {
    async fn list(&self, resource: CatalogResource) -> Result<Vec<Record>, CatalogError> {
        self.check()?;
        let records = self.records.read().await;
        Ok(records.get(&resource).cloned().unwrap_or_default())
    }

    async fn get(&self, resource: CatalogResource, id: &str) -> Result<Option<Record>, CatalogError> {
        self.check()?;
        let records = self.records.read().await;
        Ok(records
            .get(&resource)
            .and_then(|rows| {
                rows.iter()
                    .find(|row| resource.record_id(row).as_deref() == Some(id))
            })
            .cloned())
    }

    async fn create(&self, resource: CatalogResource, mut record: Record) -> Result<Record, CatalogError> {
        self.check()?;
        let mut records = self.records.write().await;
        let rows = records.entry(resource).or_default();
        let id = next_id(resource, rows);
        record.insert(resource.id_field().to_string(), Value::from(id));
        rows.push(record.clone());
        Ok(record)
    }

    async fn update(
        &self,
        resource: CatalogResource,
        id: &str,
        record: Record,
    ) -> Result<Option<Record>, CatalogError> {
        self.check()?;
        let mut records = self.records.write().await;
        let Some(row) = records
            .get_mut(&resource)
            .and_then(|rows| {
                rows.iter_mut()
                    .find(|row| resource.record_id(row).as_deref() == Some(id))
            })
        else {
            return Ok(None);
        };
        // The id column is owned by the store; everything else is merged in.
        for (key, value) in record {
            if key != resource.id_field() {
                row.insert(key, value);
            }
        }
        Ok(Some(row.clone()))
    }

    async fn delete(&self, resource: CatalogResource, id: &str) -> Result<bool, CatalogError> {
        self.check()?;
        let mut records = self.records.write().await;
        let Some(rows) = records.get_mut(&resource) else {
            return Ok(false);
        };
        let before = rows.len();
        rows.retain(|row| resource.record_id(row).as_deref() != Some(id));
        Ok(rows.len() != before)
    }
}
