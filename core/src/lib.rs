//! API-client and session layer for the Spendly personal-finance backend.
//!
//! # Overview
//! Typed services for authentication, savings goals, countries, currencies
//! and user profiles, built on an `ApiClient` that turns calls into plain-data
//! `HttpRequest` values and hands them to an injected `Transport`.
//!
//! # Design
//! - The bearer token lives in an injected `SessionStore`. Auth calls that
//!   receive a token install it; logout and any 401 clear it.
//! - Every call takes a `CancelToken`; transports honor it.
//! - List responses are decoded once through `Envelope`, which tells bare
//!   arrays, `{"data": [...]}` and malformed bodies apart.
//! - DTOs have one snake_case shape; camelCase keys are decode-time aliases.

pub mod cancel;
pub mod client;
pub mod config;
pub mod envelope;
pub mod error;
pub mod forms;
pub mod http;
pub mod onboarding;
pub mod services;
pub mod session;
pub mod transport;
pub mod types;

pub use cancel::CancelToken;
pub use client::ApiClient;
pub use config::ClientConfig;
pub use envelope::{Data, Envelope};
pub use error::{ApiError, Result};
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use onboarding::{Onboarding, OnboardingSelection, OnboardingStep};
pub use services::{AuthService, CountriesService, CurrenciesService, GoalsService, SpendlyApi, UsersService};
pub use session::{MemorySessionStore, SessionStore};
pub use transport::{ReqwestTransport, Transport};
