use serde::{Deserialize, Serialize};

use super::user::User;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
    pub device_name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub default_currency: String,
    pub device_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResetPasswordRequest {
    pub email: String,
    pub token: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub password: String,
    pub password_confirmation: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageResponse {
    #[serde(default)]
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SocialProvider {
    Google,
    Apple,
}

#[derive(Debug, Clone)]
pub struct GoogleLogin {
    pub token: String,
    pub device_name: String,
}

#[derive(Debug, Clone)]
pub struct AppleLogin {
    pub identity_token: String,
    pub user: Option<AppleUser>,
    pub device_name: String,
}

/// Name and email Apple shares on the first sign-in only.
/// Sent in Apple's own camelCase spelling.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppleUser {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "family_name")]
    pub family_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", alias = "given_name")]
    pub given_name: Option<String>,
}

/// Body of `POST /auth/social/verify`. Both providers share the endpoint;
/// the provider's credential always travels as `token`.
#[derive(Debug, Clone, Serialize)]
pub struct SocialVerifyRequest {
    pub provider: SocialProvider,
    pub token: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<AppleUser>,
    pub device_name: String,
}

impl From<GoogleLogin> for SocialVerifyRequest {
    fn from(login: GoogleLogin) -> Self {
        Self {
            provider: SocialProvider::Google,
            token: login.token,
            user: None,
            device_name: login.device_name,
        }
    }
}

impl From<AppleLogin> for SocialVerifyRequest {
    fn from(login: AppleLogin) -> Self {
        Self {
            provider: SocialProvider::Apple,
            token: login.identity_token,
            user: login.user,
            device_name: login.device_name,
        }
    }
}

/// What the backend said about the account being new, folded from the
/// `is_new_user` and `isNewUser` spellings into one value.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum NewUserHint {
    /// Neither spelling was present.
    #[default]
    Unspecified,
    New,
    Returning,
    /// The two spellings disagree.
    Conflicting,
}

impl NewUserHint {
    pub fn from_flags(snake: Option<bool>, camel: Option<bool>) -> Self {
        match (snake, camel) {
            (None, None) => NewUserHint::Unspecified,
            (Some(a), Some(b)) if a != b => NewUserHint::Conflicting,
            (Some(flag), _) | (None, Some(flag)) => {
                if flag {
                    NewUserHint::New
                } else {
                    NewUserHint::Returning
                }
            }
        }
    }

    /// Login flow: new when any spelling says so, or when the server says
    /// nothing.
    pub fn is_new_after_login(self) -> bool {
        !matches!(self, NewUserHint::Returning)
    }

    /// Signup flow: new unless any spelling is explicitly `false`.
    pub fn is_new_after_signup(self) -> bool {
        matches!(self, NewUserHint::New | NewUserHint::Unspecified)
    }
}

/// Response of every endpoint that opens a session.
#[derive(Debug, Clone, Deserialize)]
#[serde(from = "RawAuthResponse")]
pub struct AuthResponse {
    pub token: Option<String>,
    pub user: Option<User>,
    pub new_user: NewUserHint,
    pub message: Option<String>,
}

#[derive(Deserialize)]
struct RawAuthResponse {
    #[serde(default)]
    token: Option<String>,
    #[serde(default, alias = "currentUser", alias = "current_user")]
    user: Option<User>,
    #[serde(default)]
    is_new_user: Option<bool>,
    #[serde(default, rename = "isNewUser")]
    is_new_user_camel: Option<bool>,
    #[serde(default)]
    message: Option<String>,
}

impl From<RawAuthResponse> for AuthResponse {
    fn from(raw: RawAuthResponse) -> Self {
        Self {
            token: raw.token.filter(|token| !token.is_empty()),
            user: raw.user,
            new_user: NewUserHint::from_flags(raw.is_new_user, raw.is_new_user_camel),
            message: raw.message,
        }
    }
}
