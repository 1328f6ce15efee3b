use serde::{Deserialize, Serialize};

/// The authenticated account. Server-owned: refetch rather than cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    #[serde(default, alias = "defaultCurrency")]
    pub default_currency: String,
    #[serde(default, alias = "preferredLocale", skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
    #[serde(default, alias = "isPro")]
    pub is_pro: bool,
    #[serde(default, alias = "referralCode", skip_serializing_if = "Option::is_none")]
    pub referral_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub avatar: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<UserSettings>,
    #[serde(default, alias = "createdAt", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, alias = "updatedAt", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSettings {
    #[serde(default, alias = "darkMode")]
    pub dark_mode: bool,
    #[serde(default, alias = "notificationsEnabled")]
    pub notifications_enabled: bool,
    #[serde(default, alias = "biometricLockEnabled")]
    pub biometric_lock_enabled: bool,
    #[serde(default, alias = "budgetCycleDay", skip_serializing_if = "Option::is_none")]
    pub budget_cycle_day: Option<u8>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UserSettingsResponse {
    pub settings: UserSettings,
}

/// Partial profile update for `PUT /users/:id`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_currency: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
}

impl UpdateUserRequest {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Partial settings update for `PUT /user/settings`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateUserSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dark_mode: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notifications_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biometric_lock_enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_cycle_day: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preferred_locale: Option<String>,
}
