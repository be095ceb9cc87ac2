//! Internal helpers for input validation.
//!
//! These utilities are **not** part of the public API. They centralize
//! validation so the ledger and the account directory reject bad input the
//! same way.

use std::sync::LazyLock;

use regex::Regex;

use crate::{EngineError, ResultEngine};

pub(crate) const MIN_PASSWORD_LEN: usize = 6;

static EMAIL: LazyLock<Regex> = LazyLock::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
});

/// Amounts (entry values, transaction costs) must be strictly positive.
pub(crate) fn ensure_positive(amount: i64, label: &str) -> ResultEngine<()> {
    if amount <= 0 {
        return Err(EngineError::InvalidInput(format!("{label} must be > 0")));
    }
    Ok(())
}

pub(crate) fn normalize_required_text(value: &str, label: &str) -> ResultEngine<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(EngineError::InvalidInput(format!(
            "{label} must not be empty"
        )));
    }
    Ok(trimmed.to_string())
}

/// Trim and lower-case an email, then check its shape.
pub(crate) fn normalize_email(value: &str) -> ResultEngine<String> {
    let email = value.trim().to_lowercase();
    if !EMAIL.is_match(&email) {
        return Err(EngineError::InvalidInput(format!(
            "{email} is not a valid email address"
        )));
    }
    Ok(email)
}

pub(crate) fn validate_password(password: &str) -> ResultEngine<()> {
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(EngineError::InvalidInput(format!(
            "password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
