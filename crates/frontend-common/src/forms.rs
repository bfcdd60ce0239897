//! Client-side form validation
//!
//! Forms are checked before anything is sent so every invalid field is
//! reported at once, in the same shape the backend uses for 400 responses.

use club_http::types::RegisterRequest;
use club_http::{FieldErrors, FilePart, PaymentSubmission};
use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

pub const MIN_PASSWORD_LENGTH: usize = 8;
pub const MAX_RECEIPT_BYTES: usize = 5 * 1024 * 1024;
pub const RECEIPT_CONTENT_TYPES: &[&str] = &["image/jpeg", "image/png", "image/webp", "application/pdf"];

static EMAIL_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
        .expect("EMAIL_REGEX pattern is valid")
});

/// 10 to 15 digits, optional leading `+`, single spaces or dashes between digits
static PHONE_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\+?(?:[0-9][ -]?){9,14}[0-9]$").expect("PHONE_REGEX pattern is valid")
});

/// Whole amount with up to two decimals
static AMOUNT_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[0-9]+(?:\.[0-9]{1,2})?$").expect("AMOUNT_REGEX pattern is valid")
});

/// One or more fields failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Validation failed: {fields}")]
pub struct ValidationError {
    pub fields: FieldErrors,
}

impl ValidationError {
    fn check(fields: FieldErrors) -> Result<(), Self> {
        if fields.is_empty() {
            Ok(())
        } else {
            Err(Self { fields })
        }
    }
}

/// Sign-up form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationForm {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: Option<String>,
    pub department: Option<String>,
    pub year_of_study: Option<u8>,
}

impl RegistrationForm {
    /// Validate and convert into a registration request
    pub fn validate(&self) -> Result<RegisterRequest, ValidationError> {
        let mut errors = FieldErrors::new();

        if self.first_name.trim().is_empty() {
            errors.add("first_name", "First name is required.");
        }
        if self.last_name.trim().is_empty() {
            errors.add("last_name", "Last name is required.");
        }
        if self.email.trim().is_empty() {
            errors.add("email", "Email is required.");
        } else if !is_valid_email(self.email.trim()) {
            errors.add("email", "Enter a valid email address.");
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            errors.add(
                "password",
                format!("Password must be at least {MIN_PASSWORD_LENGTH} characters."),
            );
        }
        if self.password != self.confirm_password {
            errors.add("confirm_password", "Passwords do not match.");
        }
        if let Some(phone) = non_blank(self.phone.as_deref())
            && !is_valid_phone(phone)
        {
            errors.add("phone", "Enter a valid phone number.");
        }
        if let Some(year) = self.year_of_study
            && !(1..=6).contains(&year)
        {
            errors.add("year_of_study", "Year of study must be between 1 and 6.");
        }

        ValidationError::check(errors)?;

        Ok(RegisterRequest {
            email: self.email.trim().to_string(),
            password: self.password.clone(),
            first_name: self.first_name.trim().to_string(),
            last_name: self.last_name.trim().to_string(),
            phone: non_blank(self.phone.as_deref()).map(str::to_string),
            department: non_blank(self.department.as_deref()).map(str::to_string),
            year_of_study: self.year_of_study,
            membership_id: None,
        })
    }
}

/// Payment submission form input
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentForm {
    pub purpose: String,
    /// Decimal amount as typed, e.g. `"500"` or `"500.00"`
    pub amount: String,
    pub transaction_id: String,
    pub event: Option<i64>,
    pub receipt: Option<FilePart>,
}

impl PaymentForm {
    /// Validate and convert into a payment submission
    pub fn validate(self) -> Result<PaymentSubmission, ValidationError> {
        let mut errors = FieldErrors::new();

        if self.purpose.trim().is_empty() {
            errors.add("purpose", "Purpose is required.");
        }
        let amount = self.amount.trim();
        if !is_positive_amount(amount) {
            errors.add("amount", "Enter an amount greater than zero with at most two decimals.");
        }
        if self.transaction_id.trim().is_empty() {
            errors.add("transaction_id", "Transaction reference is required.");
        }
        if let Some(receipt) = &self.receipt {
            if !RECEIPT_CONTENT_TYPES.contains(&receipt.content_type.as_str()) {
                errors.add("receipt", "Receipt must be an image or a PDF.");
            }
            if receipt.is_empty() {
                errors.add("receipt", "Receipt file is empty.");
            } else if receipt.len() > MAX_RECEIPT_BYTES {
                errors.add("receipt", "Receipt must be smaller than 5 MB.");
            }
        } else {
            errors.add("receipt", "A payment receipt is required.");
        }

        match self.receipt {
            Some(receipt) if errors.is_empty() => Ok(PaymentSubmission {
                purpose: self.purpose.trim().to_string(),
                amount: amount.to_string(),
                transaction_id: self.transaction_id.trim().to_string(),
                event: self.event,
                receipt,
            }),
            _ => Err(ValidationError { fields: errors }),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|value| !value.is_empty())
}

fn is_valid_email(email: &str) -> bool {
    EMAIL_REGEX.is_match(email)
}

fn is_valid_phone(phone: &str) -> bool {
    PHONE_REGEX.is_match(phone)
}

fn is_positive_amount(amount: &str) -> bool {
    AMOUNT_REGEX.is_match(amount) && amount.bytes().any(|b| matches!(b, b'1'..=b'9'))
}
