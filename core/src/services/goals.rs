use serde_json::Value;

use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::envelope::Envelope;
use crate::error::Result;
use crate::types::{CreateGoal, SavingsGoal, UpdateGoal};

/// CRUD over `/goals`. Malformed payloads are errors here; there is no
/// fallback list for goals.
#[derive(Debug, Clone)]
pub struct GoalsService {
    client: ApiClient,
}

impl GoalsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, cancel: &CancelToken) -> Result<Vec<SavingsGoal>> {
        let value: Value = self.client.get("/goals", cancel).await?;
        Envelope::decode(value).into_result()
    }

    pub async fn get(&self, id: u64, cancel: &CancelToken) -> Result<SavingsGoal> {
        self.client.get(&format!("/goals/{id}"), cancel).await
    }

    pub async fn create(&self, input: &CreateGoal, cancel: &CancelToken) -> Result<SavingsGoal> {
        self.client.post("/goals", input, cancel).await
    }

    /// Sends only the fields set in `input`; the transport verb is PUT.
    pub async fn update(&self, id: u64, input: &UpdateGoal, cancel: &CancelToken) -> Result<SavingsGoal> {
        self.client.put(&format!("/goals/{id}"), input, cancel).await
    }

    pub async fn delete(&self, id: u64, cancel: &CancelToken) -> Result<()> {
        self.client.delete_empty(&format!("/goals/{id}"), cancel).await
    }
}
