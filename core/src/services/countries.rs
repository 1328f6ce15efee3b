use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::types::Country;

use super::list_or_empty;

#[derive(Debug, Clone)]
pub struct CountriesService {
    client: ApiClient,
}

impl CountriesService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// All countries, localized by the server. Never fails: transport
    /// errors and unexpected shapes yield an empty list, which callers read
    /// as "use the bundled country list".
    pub async fn list(&self, cancel: &CancelToken) -> Vec<Country> {
        list_or_empty(&self.client, "/countries", cancel).await
    }
}
