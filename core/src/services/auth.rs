//! Credential and social sign-in, logout, and account recovery.
//!
//! Every call whose response carries a token installs it into the shared
//! session before returning; callers never touch the session themselves.

use serde::Serialize;
use tracing::info;

use crate::cancel::CancelToken;
use crate::client::ApiClient;
use crate::envelope::Data;
use crate::error::{ApiError, Result};
use crate::session::SessionStore;
use crate::types::{
    AppleLogin, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, GoogleLogin,
    LoginRequest, MessageResponse, RegisterRequest, ResetPasswordRequest, SocialVerifyRequest, User,
};

#[derive(Debug, Clone)]
pub struct AuthService {
    client: ApiClient,
}

/// Clears the session when dropped, including when the owning future is
/// dropped mid-request.
struct ClearSessionOnDrop<'a>(&'a dyn SessionStore);

impl Drop for ClearSessionOnDrop<'_> {
    fn drop(&mut self) {
        self.0.clear();
    }
}

impl AuthService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn register(&self, input: &RegisterRequest, cancel: &CancelToken) -> Result<AuthResponse> {
        self.open_session("/auth/register", input, cancel).await
    }

    pub async fn login(&self, input: &LoginRequest, cancel: &CancelToken) -> Result<AuthResponse> {
        self.open_session("/auth/login", input, cancel).await
    }

    pub async fn google_login(&self, input: GoogleLogin, cancel: &CancelToken) -> Result<AuthResponse> {
        self.social_verify(SocialVerifyRequest::from(input), cancel).await
    }

    pub async fn apple_login(&self, input: AppleLogin, cancel: &CancelToken) -> Result<AuthResponse> {
        self.social_verify(SocialVerifyRequest::from(input), cancel).await
    }

    pub async fn social_verify(&self, input: SocialVerifyRequest, cancel: &CancelToken) -> Result<AuthResponse> {
        self.open_session("/auth/social/verify", &input, cancel).await
    }

    /// Ends the session server-side. The local token is cleared whatever the
    /// outcome of the request.
    pub async fn logout(&self, cancel: &CancelToken) -> Result<()> {
        let _guard = ClearSessionOnDrop(self.client.session());
        let result = self.client.post_empty("/auth/logout", cancel).await;
        info!("logged out");
        result
    }

    pub async fn current_user(&self, cancel: &CancelToken) -> Result<User> {
        if !self.client.session().is_authenticated() {
            return Err(ApiError::NotAuthenticated);
        }
        match self.client.get::<Data<User>>("/auth/me", cancel).await {
            Ok(envelope) => Ok(envelope.data),
            Err(ApiError::Unauthorized(_)) => Err(ApiError::NotAuthenticated),
            Err(err) => Err(err),
        }
    }

    pub async fn forgot_password(
        &self,
        input: &ForgotPasswordRequest,
        cancel: &CancelToken,
    ) -> Result<MessageResponse> {
        self.client.post("/auth/forgot-password", input, cancel).await
    }

    pub async fn reset_password(
        &self,
        input: &ResetPasswordRequest,
        cancel: &CancelToken,
    ) -> Result<MessageResponse> {
        self.client.post("/auth/reset-password", input, cancel).await
    }

    pub async fn change_password(
        &self,
        input: &ChangePasswordRequest,
        cancel: &CancelToken,
    ) -> Result<MessageResponse> {
        self.client.post("/auth/change-password", input, cancel).await
    }

    async fn open_session<B>(&self, path: &str, body: &B, cancel: &CancelToken) -> Result<AuthResponse>
    where
        B: Serialize + ?Sized,
    {
        let response: AuthResponse = self.client.post(path, body, cancel).await?;
        if let Some(token) = &response.token {
            self.client.session().set(token.clone());
            info!(%path, "session opened");
        }
        Ok(response)
    }
}
