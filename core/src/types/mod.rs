//! Domain DTOs for the Spendly API.
//!
//! # Design
//! Each entity has one canonical in-memory shape with snake_case field names,
//! which is also what gets serialized. Older payloads that use camelCase keys
//! are accepted through `#[serde(alias)]` on the same field, so both
//! spellings decode to the same value and never coexist past decoding.

pub mod auth;
pub mod country;
pub mod currency;
pub mod goal;
pub mod user;

pub use auth::{
    AppleLogin, AppleUser, AuthResponse, ChangePasswordRequest, ForgotPasswordRequest, GoogleLogin,
    LoginRequest, MessageResponse, NewUserHint, RegisterRequest, ResetPasswordRequest,
    SocialProvider, SocialVerifyRequest,
};
pub use country::Country;
pub use currency::Currency;
pub use goal::{CreateGoal, GoalStatus, SavingsGoal, UpdateGoal};
pub use user::{UpdateUserRequest, UpdateUserSettings, User, UserSettings, UserSettingsResponse};

/// Serde helpers for fields the backend encodes inconsistently.
pub(crate) mod lenient {
    use chrono::NaiveDate;
    use serde::de::Error;
    use serde::{Deserialize, Deserializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NumberOrString {
        Number(f64),
        Text(String),
    }

    /// Decimal columns arrive as numbers or as strings like `"500.00"`.
    pub fn amount<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<f64>, D::Error> {
        match Option::<NumberOrString>::deserialize(deserializer)? {
            None => Ok(None),
            Some(NumberOrString::Number(n)) => Ok(Some(n)),
            Some(NumberOrString::Text(s)) => s.trim().parse().map(Some).map_err(D::Error::custom),
        }
    }

    /// Dates arrive as `YYYY-MM-DD` or as a full ISO timestamp.
    pub fn date<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
        let Some(raw) = Option::<String>::deserialize(deserializer)? else {
            return Ok(None);
        };
        let day = raw.get(..10).unwrap_or(&raw);
        NaiveDate::parse_from_str(day, "%Y-%m-%d").map(Some).map_err(D::Error::custom)
    }
}
