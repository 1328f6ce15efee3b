//! First-run wizard: pick a default currency, then a country and state.
//!
//! The wizard itself is a small step machine. Completion pushes only the
//! fields that changed to the user's profile and never fails: a profile
//! update error is logged and the wizard still finishes.

use tracing::{info, warn};

use crate::cancel::CancelToken;
use crate::services::{AuthService, UsersService};
use crate::types::{Currency, UpdateUserRequest, User};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnboardingStep {
    Splash,
    Welcome,
    Features,
    Currency,
    Location,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OnboardingSelection {
    pub currency: Option<String>,
    pub country: Option<String>,
    pub state: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Onboarding {
    step: OnboardingStep,
    authenticated: bool,
    selection: OnboardingSelection,
}

fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl Onboarding {
    /// Signed-in users skip the splash screen.
    pub fn new(authenticated: bool) -> Self {
        let step = if authenticated {
            OnboardingStep::Welcome
        } else {
            OnboardingStep::Splash
        };
        Self {
            step,
            authenticated,
            selection: OnboardingSelection::default(),
        }
    }

    pub fn step(&self) -> OnboardingStep {
        self.step
    }

    pub fn selection(&self) -> &OnboardingSelection {
        &self.selection
    }

    pub fn is_last_step(&self) -> bool {
        self.step == OnboardingStep::Location
    }

    /// Move to the next step. `Location` is terminal.
    pub fn advance(&mut self) -> OnboardingStep {
        self.step = match self.step {
            OnboardingStep::Splash => OnboardingStep::Welcome,
            OnboardingStep::Welcome => OnboardingStep::Features,
            OnboardingStep::Features => OnboardingStep::Currency,
            OnboardingStep::Currency | OnboardingStep::Location => OnboardingStep::Location,
        };
        self.step
    }

    /// "Get started" on the welcome screen jumps past the feature tour.
    pub fn skip_to_currency(&mut self) -> OnboardingStep {
        if matches!(self.step, OnboardingStep::Welcome | OnboardingStep::Features) {
            self.step = OnboardingStep::Currency;
        }
        self.step
    }

    /// Preselect a currency once the list has loaded: the caller's default if
    /// given, otherwise the first listed currency. An existing choice wins.
    pub fn seed_currency(&mut self, default: Option<&str>, loaded: &[Currency]) {
        if self.selection.currency.is_some() || loaded.is_empty() {
            return;
        }
        self.selection.currency = default
            .and_then(non_empty)
            .or_else(|| loaded.first().map(|c| c.code.clone()));
    }

    pub fn select_currency(&mut self, code: &str) {
        self.selection.currency = non_empty(code);
    }

    /// Choosing a new country resets the state.
    pub fn select_country(&mut self, code: &str) {
        let country = non_empty(code);
        if country != self.selection.country {
            self.selection.state = None;
        }
        self.selection.country = country;
    }

    pub fn select_state(&mut self, state: &str) {
        self.selection.state = non_empty(state);
    }

    /// Profile fields that differ from `current`, or `None` when nothing
    /// needs sending.
    pub fn pending_update(&self, current: &User) -> Option<UpdateUserRequest> {
        let update = UpdateUserRequest {
            default_currency: self
                .selection
                .currency
                .clone()
                .filter(|code| *code != current.default_currency),
            country: self.selection.country.clone(),
            state: self.selection.state.clone(),
            ..UpdateUserRequest::default()
        };
        (!update.is_empty()).then_some(update)
    }

    /// Finish the wizard. Returns whether the profile was updated.
    pub async fn complete(&self, auth: &AuthService, users: &UsersService, cancel: &CancelToken) -> bool {
        if !self.authenticated {
            return false;
        }
        let current = match auth.current_user(cancel).await {
            Ok(user) => user,
            Err(err) => {
                warn!(error = %err, "onboarding: could not load current user");
                return false;
            }
        };
        let Some(update) = self.pending_update(&current) else {
            return false;
        };
        match users.update(current.id, &update, cancel).await {
            Ok(_) => {
                info!(user_id = current.id, "onboarding: profile updated");
                true
            }
            Err(err) => {
                warn!(error = %err, "onboarding: profile update failed");
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn currency(code: &str) -> Currency {
        Currency {
            code: code.to_string(),
            name: code.to_string(),
            symbol: String::new(),
            flag: None,
        }
    }

    fn user(default_currency: &str) -> User {
        serde_json::from_value(serde_json::json!({
            "id": 9,
            "name": "Ana",
            "email": "ana@example.com",
            "default_currency": default_currency,
        }))
        .unwrap()
    }

    #[test]
    fn anonymous_flow_walks_every_step() {
        let mut wizard = Onboarding::new(false);
        assert_eq!(wizard.step(), OnboardingStep::Splash);
        assert_eq!(wizard.advance(), OnboardingStep::Welcome);
        assert_eq!(wizard.advance(), OnboardingStep::Features);
        assert_eq!(wizard.advance(), OnboardingStep::Currency);
        assert_eq!(wizard.advance(), OnboardingStep::Location);
        assert_eq!(wizard.advance(), OnboardingStep::Location);
        assert!(wizard.is_last_step());
    }

    #[test]
    fn authenticated_flow_starts_at_welcome_and_can_skip() {
        let mut wizard = Onboarding::new(true);
        assert_eq!(wizard.step(), OnboardingStep::Welcome);
        assert_eq!(wizard.skip_to_currency(), OnboardingStep::Currency);
    }

    #[test]
    fn seed_prefers_caller_default_then_first_loaded() {
        let loaded = vec![currency("USD"), currency("EUR")];

        let mut wizard = Onboarding::new(true);
        wizard.seed_currency(Some("GBP"), &loaded);
        assert_eq!(wizard.selection().currency.as_deref(), Some("GBP"));

        let mut wizard = Onboarding::new(true);
        wizard.seed_currency(None, &loaded);
        assert_eq!(wizard.selection().currency.as_deref(), Some("USD"));

        let mut wizard = Onboarding::new(true);
        wizard.select_currency("JPY");
        wizard.seed_currency(None, &loaded);
        assert_eq!(wizard.selection().currency.as_deref(), Some("JPY"));

        let mut wizard = Onboarding::new(true);
        wizard.seed_currency(Some("GBP"), &[]);
        assert_eq!(wizard.selection().currency, None);
    }

    #[test]
    fn changing_country_resets_state() {
        let mut wizard = Onboarding::new(true);
        wizard.select_country("US");
        wizard.select_state("CA");
        wizard.select_country("US");
        assert_eq!(wizard.selection().state.as_deref(), Some("CA"));
        wizard.select_country("DE");
        assert_eq!(wizard.selection().state, None);
    }

    #[test]
    fn pending_update_sends_only_changes() {
        let mut wizard = Onboarding::new(true);
        wizard.select_currency("USD");
        assert_eq!(wizard.pending_update(&user("USD")), None);

        wizard.select_currency("EUR");
        wizard.select_country("FR");
        let update = wizard.pending_update(&user("USD")).unwrap();
        assert_eq!(update.default_currency.as_deref(), Some("EUR"));
        assert_eq!(update.country.as_deref(), Some("FR"));
        assert_eq!(update.state, None);
    }
}
