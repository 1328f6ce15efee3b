//! Client-side checks run before the auth forms are submitted.
//!
//! Each validator returns the first problem per field; an empty
//! `FormErrors` means the form may be sent. The server validates again and
//! its messages arrive as `ApiError::Validation`.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

static EMAIL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\S+@\S+\.\S+").expect("Invalid regex pattern"));

pub const MIN_PASSWORD_LEN: usize = 6;
pub const MIN_RESET_PASSWORD_LEN: usize = 8;
const MIN_NAME_LEN: usize = 2;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<&'static str, &'static str>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: &str) -> Option<&'static str> {
        self.0.get(field).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    fn insert(&mut self, field: &'static str, message: &'static str) {
        self.0.entry(field).or_insert(message);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PasswordStrength {
    Weak,
    Medium,
    Strong,
}

fn check_email(errors: &mut FormErrors, email: &str) {
    if email.is_empty() {
        errors.insert("email", "Email is required");
    } else if !EMAIL.is_match(email) {
        errors.insert("email", "Please enter a valid email");
    }
}

fn check_confirmation(errors: &mut FormErrors, field: &'static str, password: &str, confirmation: &str) {
    if confirmation.is_empty() {
        errors.insert(field, "Please confirm your password");
    } else if password != confirmation {
        errors.insert(field, "Passwords do not match");
    }
}

pub fn validate_login(email: &str, password: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    check_email(&mut errors, email);
    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", "Password must be at least 6 characters");
    }
    errors
}

#[derive(Debug, Clone, Default)]
pub struct SignupForm<'a> {
    pub name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
    pub confirm_password: &'a str,
    pub accepted_terms: bool,
}

pub fn validate_signup(form: &SignupForm<'_>) -> FormErrors {
    let mut errors = FormErrors::default();

    if form.name.is_empty() {
        errors.insert("name", "Name is required");
    } else if form.name.chars().count() < MIN_NAME_LEN {
        errors.insert("name", "Name must be at least 2 characters");
    }

    check_email(&mut errors, form.email);

    let password = form.password;
    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < MIN_PASSWORD_LEN {
        errors.insert("password", "Password must be at least 6 characters");
    } else if !(has_lower(password) && has_upper(password) && has_digit(password)) {
        errors.insert("password", "Password must contain uppercase, lowercase, and number");
    }

    check_confirmation(&mut errors, "confirm_password", password, form.confirm_password);

    if !form.accepted_terms {
        errors.insert("terms", "You must accept the terms and conditions");
    }
    errors
}

pub fn validate_forgot_password(email: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    check_email(&mut errors, email);
    errors
}

pub fn validate_reset_password(password: &str, confirmation: &str) -> FormErrors {
    let mut errors = FormErrors::default();
    if password.is_empty() {
        errors.insert("password", "Password is required");
    } else if password.chars().count() < MIN_RESET_PASSWORD_LEN {
        errors.insert("password", "Password must be at least 8 characters");
    }
    check_confirmation(&mut errors, "password_confirmation", password, confirmation);
    errors
}

fn has_lower(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_lowercase())
}

fn has_upper(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_uppercase())
}

fn has_digit(s: &str) -> bool {
    s.chars().any(|c| c.is_ascii_digit())
}

/// Score from 0 to 5: length >= 6, length >= 10, mixed case, digit, symbol.
pub fn password_score(password: &str) -> u8 {
    if password.is_empty() {
        return 0;
    }
    let len = password.chars().count();
    let checks = [
        len >= 6,
        len >= 10,
        has_lower(password) && has_upper(password),
        has_digit(password),
        password.chars().any(|c| "!@#$%^&*".contains(c)),
    ];
    checks.iter().filter(|passed| **passed).count() as u8
}

pub fn password_strength(password: &str) -> PasswordStrength {
    match password_score(password) {
        0..=1 => PasswordStrength::Weak,
        2..=3 => PasswordStrength::Medium,
        _ => PasswordStrength::Strong,
    }
}
