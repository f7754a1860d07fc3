//! Field validation for submitted applications
//!
//! A string made only of whitespace counts as empty.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;

use super::model::ApplicationInput;

static EMAIL_PATTERN: OnceLock<Regex> = OnceLock::new();

fn email_pattern() -> &'static Regex {
    EMAIL_PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern compiles")
    })
}

/// A single rejected field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Wire path of the field, e.g. `loanTerms.amount`
    pub field: &'static str,
    pub reason: &'static str,
}

impl FieldViolation {
    fn new(field: &'static str, reason: &'static str) -> Self {
        Self { field, reason }
    }
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.field, self.reason)
    }
}

/// Returns true for empty or whitespace-only strings.
pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Syntactic e-mail check: one `@`, no whitespace, a dot in the domain.
pub fn is_valid_email(value: &str) -> bool {
    email_pattern().is_match(value)
}

/// Collect every violation in `input`, in field order.
pub fn violations(input: &ApplicationInput) -> Vec<FieldViolation> {
    let mut found = Vec::new();

    if is_blank(&input.application_number) {
        found.push(FieldViolation::new("applicationNumber", "is required"));
    }

    let terms = &input.loan_terms;
    if !(terms.amount.is_finite() && terms.amount > 0.0) {
        found.push(FieldViolation::new("loanTerms.amount", "must be greater than zero"));
    }
    if !(terms.monthly_payment.is_finite() && terms.monthly_payment >= 0.0) {
        found.push(FieldViolation::new(
            "loanTerms.monthlyPayment",
            "must not be negative",
        ));
    }
    if terms.terms <= 0 {
        found.push(FieldViolation::new("loanTerms.terms", "must be a positive number of months"));
    }

    let person = &input.personal_information;
    if is_blank(&person.name.first) {
        found.push(FieldViolation::new("personalInformation.name.first", "is required"));
    }
    if is_blank(&person.name.last) {
        found.push(FieldViolation::new("personalInformation.name.last", "is required"));
    }
    if is_blank(&person.phone_number) {
        found.push(FieldViolation::new("personalInformation.phoneNumber", "is required"));
    }
    if is_blank(&person.email) {
        found.push(FieldViolation::new("personalInformation.email", "is required"));
    } else if !is_valid_email(person.email.trim()) {
        found.push(FieldViolation::new(
            "personalInformation.email",
            "is not a valid address",
        ));
    }

    found
}

/// Validate `input`, returning all violations on failure.
pub fn validate(input: &ApplicationInput) -> Result<(), Vec<FieldViolation>> {
    let found = violations(input);
    if found.is_empty() {
        Ok(())
    } else {
        Err(found)
    }
}
