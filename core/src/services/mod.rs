//! Typed wrappers over the backend's REST resources.
//!
//! Services are thin: each maps a typed request onto one endpoint through the
//! shared `ApiClient` and decodes the typed response. Errors propagate
//! untouched except where an empty result is a meaningful answer (the
//! country and currency pickers fall back to bundled data).

pub mod auth;
pub mod countries;
pub mod currencies;
pub mod goals;
pub mod users;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{error, warn};

pub use auth::AuthService;
pub use countries::CountriesService;
pub use currencies::CurrenciesService;
pub use goals::GoalsService;
pub use users::UsersService;

use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::config::ClientConfig;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::session::SessionStore;

/// Every service, sharing one client and therefore one session.
#[derive(Debug, Clone)]
pub struct SpendlyApi {
    pub auth: AuthService,
    pub goals: GoalsService,
    pub countries: CountriesService,
    pub currencies: CurrenciesService,
    pub users: UsersService,
}

impl SpendlyApi {
    pub fn new(client: ApiClient, storage_url: &str) -> Self {
        Self {
            auth: AuthService::new(client.clone()),
            goals: GoalsService::new(client.clone()),
            countries: CountriesService::new(client.clone()),
            currencies: CurrenciesService::new(client.clone()),
            users: UsersService::new(client, storage_url),
        }
    }

    pub fn from_config(config: &ClientConfig, session: Arc<dyn SessionStore>) -> Result<Self> {
        let client = ApiClient::from_config(config, session)?;
        Ok(Self::new(client, &config.storage_url()))
    }
}

/// Fetch a list endpoint, degrading to an empty list on any failure.
pub(crate) async fn list_or_empty<T: DeserializeOwned>(
    client: &ApiClient,
    path: &str,
    cancel: &CancelToken,
) -> Vec<T> {
    let value = match client.get::<Value>(path, cancel).await {
        Ok(value) => value,
        Err(err) => {
            error!(%path, error = %err, "list request failed; using empty list");
            return Vec::new();
        }
    };
    match Envelope::decode(value) {
        Envelope::Malformed(reason) => {
            warn!(%path, %reason, "unexpected response format");
            Vec::new()
        }
        envelope => envelope.into_items(),
    }
}
