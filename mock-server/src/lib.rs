//! In-memory stand-in for the Spendly backend.
//!
//! Serves the auth, goals, countries, currencies and user endpoints with
//! Laravel-shaped payloads: 422 bodies carry `{message, errors}`, 401 bodies
//! `{message: "Unauthenticated."}`. `MockConfig` switches the list envelope
//! shapes and can force logout to fail, so clients can be tested against
//! each variant.

use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

/// How a list endpoint wraps its items.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ListShape {
    /// `[...]`
    Bare,
    /// `{"data": [...]}`
    #[default]
    Wrapped,
    /// `{"countries": "unavailable"}`
    Malformed,
}

#[derive(Clone, Debug)]
pub struct MockConfig {
    pub countries: ListShape,
    pub currencies: ListShape,
    /// Status returned by `/auth/logout`; anything but 2xx simulates failure.
    pub logout_status: u16,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            countries: ListShape::Wrapped,
            currencies: ListShape::Bare,
            logout_status: 200,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct User {
    pub id: u64,
    pub name: String,
    pub email: String,
    pub default_currency: String,
    pub country: Option<String>,
    pub state: Option<String>,
    pub avatar: Option<String>,
    #[serde(skip)]
    pub password: String,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Settings {
    pub dark_mode: bool,
    pub notifications_enabled: bool,
    pub biometric_lock_enabled: bool,
    pub budget_cycle_day: u8,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Goal {
    pub id: u64,
    pub user_id: u64,
    pub name: String,
    pub target_amount: f64,
    pub current_amount: f64,
    pub target_date: String,
    pub status: String,
}

#[derive(Debug, Default)]
pub struct Backend {
    pub config: MockConfig,
    pub users: HashMap<u64, User>,
    pub settings: HashMap<u64, Settings>,
    pub tokens: HashMap<String, u64>,
    pub reset_tokens: HashMap<String, String>,
    pub goals: HashMap<u64, Goal>,
    next_user_id: u64,
    next_goal_id: u64,
}

impl Backend {
    fn new(config: MockConfig) -> Self {
        Self {
            config,
            next_user_id: 1,
            next_goal_id: 1,
            ..Self::default()
        }
    }

    fn create_user(&mut self, name: &str, email: &str, password: &str, currency: &str) -> User {
        let user = User {
            id: self.next_user_id,
            name: name.to_string(),
            email: email.to_string(),
            default_currency: currency.to_string(),
            country: None,
            state: None,
            avatar: None,
            password: password.to_string(),
        };
        self.next_user_id += 1;
        self.users.insert(user.id, user.clone());
        self.settings.insert(
            user.id,
            Settings {
                notifications_enabled: true,
                budget_cycle_day: 1,
                ..Settings::default()
            },
        );
        user
    }

    fn find_by_email(&self, email: &str) -> Option<&User> {
        self.users.values().find(|u| u.email.eq_ignore_ascii_case(email))
    }

    fn issue_token(&mut self, user_id: u64) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.insert(token.clone(), user_id);
        token
    }
}

pub type Db = Arc<RwLock<Backend>>;

pub fn app() -> Router {
    app_with(MockConfig::default()).0
}

/// Router plus a handle on its state, for tests that inspect the backend.
pub fn app_with(config: MockConfig) -> (Router, Db) {
    let db: Db = Arc::new(RwLock::new(Backend::new(config)));
    let router = Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
        .route("/auth/social/verify", post(social_verify))
        .route("/auth/logout", post(logout))
        .route("/auth/me", get(me))
        .route("/auth/forgot-password", post(forgot_password))
        .route("/auth/reset-password", post(reset_password))
        .route("/auth/change-password", post(change_password))
        .route("/countries", get(countries))
        .route("/currencies", get(currencies))
        .route("/goals", get(list_goals).post(create_goal))
        .route("/goals/{id}", get(get_goal).put(update_goal).delete(delete_goal))
        .route("/users/{id}", get(get_user).put(update_user))
        .route("/user/settings", get(get_settings).put(update_settings))
        .route("/user/account", delete(delete_account))
        .route("/user/avatar", delete(delete_avatar))
        .with_state(db.clone());
    (router, db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

pub async fn run_with(listener: TcpListener, router: Router) -> Result<(), std::io::Error> {
    axum::serve(listener, router).await
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub enum Failure {
    Unauthenticated,
    Forbidden,
    NotFound,
    Invalid { message: String, errors: Value },
    Status(StatusCode),
}

impl Failure {
    fn field(field: &str, message: &str) -> Self {
        Failure::Invalid {
            message: message.to_string(),
            errors: json!({ field: [message] }),
        }
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        match self {
            Failure::Unauthenticated => {
                (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthenticated." }))).into_response()
            }
            Failure::Forbidden => {
                (StatusCode::FORBIDDEN, Json(json!({ "message": "This action is unauthorized." }))).into_response()
            }
            Failure::NotFound => StatusCode::NOT_FOUND.into_response(),
            Failure::Invalid { message, errors } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(json!({ "message": message, "errors": errors })),
            )
                .into_response(),
            Failure::Status(status) => {
                (status, Json(json!({ "message": "Server Error" }))).into_response()
            }
        }
    }
}

type Reply = Result<Json<Value>, Failure>;

fn bearer(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

fn authenticate(backend: &Backend, headers: &HeaderMap) -> Result<u64, Failure> {
    bearer(headers)
        .and_then(|token| backend.tokens.get(token).copied())
        .ok_or(Failure::Unauthenticated)
}

// ---------------------------------------------------------------------------
// Auth
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct RegisterInput {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
    #[serde(default)]
    pub default_currency: String,
    #[serde(default)]
    pub device_name: String,
    pub referral_code: Option<String>,
}

async fn register(State(db): State<Db>, Json(input): Json<RegisterInput>) -> Result<(StatusCode, Json<Value>), Failure> {
    let mut backend = db.write().await;

    let mut errors = serde_json::Map::new();
    if input.name.trim().is_empty() {
        errors.insert("name".into(), json!(["The name field is required."]));
    }
    if !input.email.contains('@') {
        errors.insert("email".into(), json!(["The email field must be a valid email address."]));
    } else if backend.find_by_email(&input.email).is_some() {
        errors.insert("email".into(), json!(["The email has already been taken."]));
    }
    if input.password.len() < 6 {
        errors.insert("password".into(), json!(["The password field must be at least 6 characters."]));
    } else if input.password != input.password_confirmation {
        errors.insert("password".into(), json!(["The password field confirmation does not match."]));
    }
    if !errors.is_empty() {
        let message = errors
            .values()
            .next()
            .and_then(|v| v[0].as_str())
            .unwrap_or("The given data was invalid.")
            .to_string();
        return Err(Failure::Invalid {
            message,
            errors: Value::Object(errors),
        });
    }

    let currency = if input.default_currency.is_empty() {
        "USD"
    } else {
        input.default_currency.as_str()
    };
    let user = backend.create_user(&input.name, &input.email, &input.password, currency);
    let token = backend.issue_token(user.id);
    tracing::info!(user_id = user.id, device = %input.device_name, referral = ?input.referral_code, "registered");
    Ok((
        StatusCode::CREATED,
        Json(json!({ "token": token, "user": user, "is_new_user": true })),
    ))
}

#[derive(Deserialize)]
pub struct LoginInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub device_name: String,
}

async fn login(State(db): State<Db>, Json(input): Json<LoginInput>) -> Reply {
    let mut backend = db.write().await;
    let user = backend
        .find_by_email(&input.email)
        .filter(|u| u.password == input.password)
        .cloned()
        .ok_or_else(|| Failure::field("email", "These credentials do not match our records."))?;
    let token = backend.issue_token(user.id);
    tracing::info!(user_id = user.id, device = %input.device_name, "logged in");
    // Login answers with the camelCase spelling of the flag.
    Ok(Json(json!({ "token": token, "user": user, "isNewUser": false })))
}

#[derive(Deserialize)]
pub struct SocialInput {
    pub provider: String,
    #[serde(default)]
    pub token: String,
    pub user: Option<SocialUser>,
    #[serde(default)]
    pub device_name: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SocialUser {
    pub email: Option<String>,
    pub given_name: Option<String>,
    pub family_name: Option<String>,
}

async fn social_verify(State(db): State<Db>, Json(input): Json<SocialInput>) -> Reply {
    if input.provider != "google" && input.provider != "apple" {
        return Err(Failure::field("provider", "The selected provider is invalid."));
    }
    if input.token.is_empty() {
        return Err(Failure::field("token", "The token field is required."));
    }

    let mut backend = db.write().await;
    let email = input
        .user
        .as_ref()
        .and_then(|u| u.email.clone())
        .unwrap_or_else(|| format!("{}-{}@social.spendly.test", input.provider, input.token));
    let (user, is_new) = match backend.find_by_email(&email).cloned() {
        Some(user) => (user, false),
        None => {
            let name = input
                .user
                .as_ref()
                .map(|u| {
                    [u.given_name.as_deref(), u.family_name.as_deref()]
                        .into_iter()
                        .flatten()
                        .collect::<Vec<_>>()
                        .join(" ")
                })
                .filter(|n| !n.is_empty())
                .unwrap_or_else(|| "Spendly User".to_string());
            (backend.create_user(&name, &email, "", "USD"), true)
        }
    };
    let token = backend.issue_token(user.id);
    tracing::info!(user_id = user.id, provider = %input.provider, device = %input.device_name, "social sign-in");
    Ok(Json(json!({ "token": token, "user": user, "is_new_user": is_new })))
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let mut backend = db.write().await;
    let status = StatusCode::from_u16(backend.config.logout_status).unwrap_or(StatusCode::OK);
    if !status.is_success() {
        return Err(Failure::Status(status));
    }
    authenticate(&backend, &headers)?;
    if let Some(token) = bearer(&headers) {
        backend.tokens.remove(token);
    }
    Ok(Json(json!({ "message": "Logged out successfully" })))
}

async fn me(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let backend = db.read().await;
    let user_id = authenticate(&backend, &headers)?;
    let user = backend.users.get(&user_id).ok_or(Failure::Unauthenticated)?;
    Ok(Json(json!({ "data": user })))
}

#[derive(Deserialize)]
pub struct ForgotInput {
    #[serde(default)]
    pub email: String,
}

async fn forgot_password(State(db): State<Db>, Json(input): Json<ForgotInput>) -> Reply {
    let mut backend = db.write().await;
    if backend.find_by_email(&input.email).is_none() {
        return Err(Failure::field("email", "We can't find a user with that email address."));
    }
    let token = Uuid::new_v4().simple().to_string();
    backend.reset_tokens.insert(input.email.to_lowercase(), token);
    Ok(Json(json!({ "message": "We have emailed your password reset link." })))
}

#[derive(Deserialize)]
pub struct ResetInput {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

async fn reset_password(State(db): State<Db>, Json(input): Json<ResetInput>) -> Reply {
    let mut backend = db.write().await;
    let key = input.email.to_lowercase();
    if backend.reset_tokens.get(&key) != Some(&input.token) {
        return Err(Failure::field("email", "This password reset token is invalid."));
    }
    if input.password.len() < 8 || input.password != input.password_confirmation {
        return Err(Failure::field("password", "The password field confirmation does not match."));
    }
    let user_id = backend
        .find_by_email(&input.email)
        .map(|u| u.id)
        .ok_or(Failure::NotFound)?;
    if let Some(user) = backend.users.get_mut(&user_id) {
        user.password = input.password;
    }
    backend.reset_tokens.remove(&key);
    Ok(Json(json!({ "message": "Your password has been reset." })))
}

#[derive(Deserialize)]
pub struct ChangePasswordInput {
    #[serde(default)]
    pub current_password: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub password_confirmation: String,
}

async fn change_password(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<ChangePasswordInput>,
) -> Reply {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    let user = backend.users.get_mut(&user_id).ok_or(Failure::Unauthenticated)?;
    if user.password != input.current_password {
        return Err(Failure::field("current_password", "The password is incorrect."));
    }
    if input.password.len() < 6 || input.password != input.password_confirmation {
        return Err(Failure::field("password", "The password field confirmation does not match."));
    }
    user.password = input.password;
    Ok(Json(json!({ "message": "Password changed successfully" })))
}

// ---------------------------------------------------------------------------
// Reference data
// ---------------------------------------------------------------------------

fn shaped(shape: ListShape, items: Value) -> Json<Value> {
    Json(match shape {
        ListShape::Bare => items,
        ListShape::Wrapped => json!({ "data": items }),
        ListShape::Malformed => json!({ "countries": "unavailable" }),
    })
}

async fn countries(State(db): State<Db>) -> Json<Value> {
    let shape = db.read().await.config.countries;
    shaped(
        shape,
        json!([
            { "code": "US", "name": "United States", "original_name": "United States" },
            { "code": "DE", "name": "Germany", "original_name": "Germany" },
            { "code": "IN", "name": "India", "original_name": "India" },
        ]),
    )
}

async fn currencies(State(db): State<Db>) -> Json<Value> {
    let shape = db.read().await.config.currencies;
    shaped(
        shape,
        json!([
            { "code": "USD", "name": "US Dollar", "symbol": "$" },
            { "code": "EUR", "name": "Euro", "symbol": "€" },
            { "code": "INR", "name": "Indian Rupee", "symbol": "₹" },
        ]),
    )
}

// ---------------------------------------------------------------------------
// Goals
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct CreateGoal {
    pub name: String,
    pub target_amount: f64,
    pub target_date: String,
}

#[derive(Deserialize)]
pub struct UpdateGoal {
    pub name: Option<String>,
    pub target_amount: Option<f64>,
    pub current_amount: Option<f64>,
    pub target_date: Option<String>,
    pub status: Option<String>,
}

async fn list_goals(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let backend = db.read().await;
    let user_id = authenticate(&backend, &headers)?;
    let mut goals: Vec<&Goal> = backend.goals.values().filter(|g| g.user_id == user_id).collect();
    goals.sort_by_key(|g| g.id);
    Ok(Json(json!(goals)))
}

async fn create_goal(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateGoal>,
) -> Result<(StatusCode, Json<Goal>), Failure> {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    if input.target_amount <= 0.0 {
        return Err(Failure::field("target_amount", "The target amount field must be greater than 0."));
    }
    let goal = Goal {
        id: backend.next_goal_id,
        user_id,
        name: input.name,
        target_amount: input.target_amount,
        current_amount: 0.0,
        target_date: input.target_date,
        status: "active".to_string(),
    };
    backend.next_goal_id += 1;
    backend.goals.insert(goal.id, goal.clone());
    Ok((StatusCode::CREATED, Json(goal)))
}

fn owned_goal(backend: &Backend, user_id: u64, id: u64) -> Result<&Goal, Failure> {
    backend
        .goals
        .get(&id)
        .filter(|g| g.user_id == user_id)
        .ok_or(Failure::NotFound)
}

async fn get_goal(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Result<Json<Goal>, Failure> {
    let backend = db.read().await;
    let user_id = authenticate(&backend, &headers)?;
    owned_goal(&backend, user_id, id).cloned().map(Json)
}

async fn update_goal(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<UpdateGoal>,
) -> Result<Json<Goal>, Failure> {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    owned_goal(&backend, user_id, id)?;
    let goal = backend.goals.get_mut(&id).ok_or(Failure::NotFound)?;
    if let Some(name) = input.name {
        goal.name = name;
    }
    if let Some(target_amount) = input.target_amount {
        goal.target_amount = target_amount;
    }
    if let Some(current_amount) = input.current_amount {
        goal.current_amount = current_amount;
    }
    if let Some(target_date) = input.target_date {
        goal.target_date = target_date;
    }
    if let Some(status) = input.status {
        goal.status = status;
    }
    Ok(Json(goal.clone()))
}

async fn delete_goal(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Result<StatusCode, Failure> {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    owned_goal(&backend, user_id, id)?;
    backend.goals.remove(&id);
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Deserialize)]
pub struct UpdateUser {
    pub name: Option<String>,
    pub email: Option<String>,
    pub default_currency: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

async fn get_user(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Reply {
    let backend = db.read().await;
    let user_id = authenticate(&backend, &headers)?;
    if user_id != id {
        return Err(Failure::Forbidden);
    }
    let user = backend.users.get(&id).ok_or(Failure::NotFound)?;
    Ok(Json(json!({ "data": user })))
}

async fn update_user(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<u64>,
    Json(input): Json<UpdateUser>,
) -> Reply {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    if user_id != id {
        return Err(Failure::Forbidden);
    }
    let user = backend.users.get_mut(&id).ok_or(Failure::NotFound)?;
    if let Some(name) = input.name {
        user.name = name;
    }
    if let Some(email) = input.email {
        user.email = email;
    }
    if let Some(currency) = input.default_currency {
        user.default_currency = currency;
    }
    if let Some(country) = input.country {
        user.country = Some(country);
    }
    if let Some(state) = input.state {
        user.state = Some(state);
    }
    Ok(Json(json!({ "data": user })))
}

#[derive(Deserialize)]
pub struct UpdateSettings {
    pub dark_mode: Option<bool>,
    pub notifications_enabled: Option<bool>,
    pub biometric_lock_enabled: Option<bool>,
    pub budget_cycle_day: Option<u8>,
    pub preferred_locale: Option<String>,
}

async fn get_settings(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let backend = db.read().await;
    let user_id = authenticate(&backend, &headers)?;
    let settings = backend.settings.get(&user_id).cloned().unwrap_or_default();
    Ok(Json(json!({ "settings": settings })))
}

async fn update_settings(State(db): State<Db>, headers: HeaderMap, Json(input): Json<UpdateSettings>) -> Reply {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    if input.budget_cycle_day.is_some_and(|day| !(1..=28).contains(&day)) {
        return Err(Failure::field("budget_cycle_day", "The budget cycle day must be between 1 and 28."));
    }
    let settings = backend.settings.entry(user_id).or_default();
    if let Some(dark_mode) = input.dark_mode {
        settings.dark_mode = dark_mode;
    }
    if let Some(enabled) = input.notifications_enabled {
        settings.notifications_enabled = enabled;
    }
    if let Some(enabled) = input.biometric_lock_enabled {
        settings.biometric_lock_enabled = enabled;
    }
    if let Some(day) = input.budget_cycle_day {
        settings.budget_cycle_day = day;
    }
    let settings = settings.clone();
    if let Some(locale) = input.preferred_locale {
        tracing::debug!(user_id, %locale, "preferred locale updated");
    }
    Ok(Json(json!({ "settings": settings })))
}

async fn delete_account(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    backend.users.remove(&user_id);
    backend.settings.remove(&user_id);
    backend.goals.retain(|_, g| g.user_id != user_id);
    backend.tokens.retain(|_, owner| *owner != user_id);
    Ok(Json(json!({ "message": "Account deleted successfully" })))
}

async fn delete_avatar(State(db): State<Db>, headers: HeaderMap) -> Reply {
    let mut backend = db.write().await;
    let user_id = authenticate(&backend, &headers)?;
    if let Some(user) = backend.users.get_mut(&user_id) {
        user.avatar = None;
    }
    Ok(Json(json!({ "message": "Avatar deleted successfully" })))
}
