use std::sync::Arc;

use async_trait::async_trait;
use reqwest::StatusCode;

use crate::{
    error::CatalogError,
    models::{LoginRequest, User},
};

/// IdentityProvider
///
/// Verifies login credentials. `Ok(None)` means the credentials were rejected; `Err` is
/// reserved for the provider itself failing.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, credentials: &LoginRequest) -> Result<Option<User>, CatalogError>;
}

pub type IdentityState = Arc<dyn IdentityProvider>;

/// RestIdentityProvider
///
/// Posts credentials to `{CATALOG_API_URL}/login` and reads back `{ nombre, rol }`.
#[derive(Clone)]
pub struct RestIdentityProvider {
    http: reqwest::Client,
    login_url: String,
}

impl RestIdentityProvider {
    pub fn new(http: reqwest::Client, api_base_url: &str) -> Self {
        Self {
            http,
            login_url: format!("{}/login", api_base_url.trim_end_matches('/')),
        }
    }
}

#[async_trait]
impl IdentityProvider for RestIdentityProvider {
    async fn authenticate(&self, credentials: &LoginRequest) -> Result<Option<User>, CatalogError> {
        let response = self
            .http
            .post(&self.login_url)
            .json(credentials)
            .send()
            .await?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => response
                .json::<User>()
                .await
                .map(Some)
                .map_err(|e| CatalogError::Decode(e.to_string())),
            status => Err(CatalogError::Status(status.as_u16())),
        }
    }
}

/// StaticIdentityProvider
///
/// A fixed account list, for tests and for running the dashboard without the REST
/// backend.
#[derive(Default)]
pub struct StaticIdentityProvider {
    accounts: Vec<(String, String, User)>,
}

impl StaticIdentityProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_account(mut self, email: &str, password: &str, user: User) -> Self {
        self.accounts
            .push((email.to_string(), password.to_string(), user));
        self
    }
}

#[async_trait]
impl IdentityProvider for StaticIdentityProvider {
    async fn authenticate(&self, credentials: &LoginRequest) -> Result<Option<User>, CatalogError> {
        Ok(self
            .accounts
            .iter()
            .find(|(email, password, _)| {
                email.eq_ignore_ascii_case(credentials.email.trim()) && *password == credentials.password
            })
            .map(|(_, _, user)| user.clone()))
    }
}
