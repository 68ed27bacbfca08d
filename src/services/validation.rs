use std::borrow::Cow;

use lazy_static::lazy_static;
use regex::Regex;
use validator::{ValidateEmail, ValidateUrl, ValidationError};

lazy_static! {
    static ref USERNAME_RE: Regex = Regex::new(r"^[a-z0-9_]*$").unwrap();
    static ref REVENUE_RE: Regex = Regex::new(r"^[0-9]+(\.[0-9]{1,2})?$").unwrap();
}

pub const MAX_REVENUE: f64 = 1_000_000_000.0;

fn error(code: &'static str, message: &'static str) -> ValidationError {
    ValidationError::new(code).with_message(Cow::Borrowed(message))
}

pub fn validate_username(value: &str) -> Result<(), ValidationError> {
    if value.len() < 3 {
        return Err(error("username", "Username must be at least 3 characters long"));
    }
    if !USERNAME_RE.is_match(value) {
        return Err(error(
            "username",
            "Only lowercase letters, numbers and underscores are allowed!",
        ));
    }
    Ok(())
}

/// Revenue as entered in forms, e.g. `1000` or `1000.50`.
pub fn parse_revenue(value: &str) -> Result<f64, ValidationError> {
    if !REVENUE_RE.is_match(value) {
        return Err(error("revenue", "Invalid revenue (eq. 1000.00)"));
    }
    let revenue: f64 = value
        .parse()
        .map_err(|_| error("revenue", "Invalid revenue (eq. 1000.00)"))?;
    if revenue >= MAX_REVENUE {
        return Err(error("revenue", "Revenue must be less than 1,000,000,000"));
    }
    Ok(revenue)
}

pub fn validate_revenue(value: &str) -> Result<(), ValidationError> {
    parse_revenue(value).map(|_| ())
}

/// Empty string means "clear"; anything else must be a revenue.
pub fn validate_revenue_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_revenue(value)
}

pub fn validate_email_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() || value.validate_email() {
        return Ok(());
    }
    Err(error("email", "Invalid email address"))
}

pub fn validate_url(value: &str) -> Result<(), ValidationError> {
    if value.validate_url() {
        return Ok(());
    }
    Err(error("url", "Invalid URL"))
}

pub fn validate_url_or_empty(value: &str) -> Result<(), ValidationError> {
    if value.is_empty() {
        return Ok(());
    }
    validate_url(value)
}
