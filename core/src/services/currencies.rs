use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::types::Currency;

use super::list_or_empty;

#[derive(Debug, Clone)]
pub struct CurrenciesService {
    client: ApiClient,
}

impl CurrenciesService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Active currencies; empty on any failure, like the country list.
    pub async fn list(&self, cancel: &CancelToken) -> Vec<Currency> {
        list_or_empty(&self.client, "/currencies", cancel).await
    }
}
