use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::envelope::Data;
use crate::error::Result;
use crate::types::{MessageResponse, UpdateUserRequest, UpdateUserSettings, User, UserSettings, UserSettingsResponse};

#[derive(Debug, Clone)]
pub struct UsersService {
    client: ApiClient,
    storage_url: String,
}

impl UsersService {
    pub fn new(client: ApiClient, storage_url: &str) -> Self {
        Self {
            client,
            storage_url: storage_url.trim_end_matches('/').to_string(),
        }
    }

    pub async fn get(&self, id: u64, cancel: &CancelToken) -> Result<User> {
        let envelope: Data<User> = self.client.get(&format!("/users/{id}"), cancel).await?;
        Ok(envelope.data)
    }

    pub async fn update(&self, id: u64, input: &UpdateUserRequest, cancel: &CancelToken) -> Result<User> {
        let envelope: Data<User> = self.client.put(&format!("/users/{id}"), input, cancel).await?;
        Ok(envelope.data)
    }

    pub async fn settings(&self, cancel: &CancelToken) -> Result<UserSettings> {
        let response: UserSettingsResponse = self.client.get("/user/settings", cancel).await?;
        Ok(response.settings)
    }

    pub async fn update_settings(&self, input: &UpdateUserSettings, cancel: &CancelToken) -> Result<UserSettings> {
        let response: UserSettingsResponse = self.client.put("/user/settings", input, cancel).await?;
        Ok(response.settings)
    }

    pub async fn delete_account(&self, cancel: &CancelToken) -> Result<MessageResponse> {
        self.client.delete("/user/account", cancel).await
    }

    pub async fn delete_avatar(&self, cancel: &CancelToken) -> Result<MessageResponse> {
        self.client.delete("/user/avatar", cancel).await
    }

    /// Absolute URL for an avatar path as stored on the user.
    pub fn avatar_url(&self, path: Option<&str>) -> Option<String> {
        let path = path.filter(|p| !p.is_empty())?;
        if path.starts_with("http://") || path.starts_with("https://") {
            return Some(path.to_string());
        }
        Some(format!("{}/{}", self.storage_url, path.trim_start_matches('/')))
    }
}
