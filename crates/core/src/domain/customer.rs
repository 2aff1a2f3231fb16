use serde::{Deserialize, Serialize};

use crate::errors::ValidationError;

/// Customer details carried on every purchase row. The mobile number is the only link
/// between a customer and their products.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerContact {
    pub name: String,
    pub mobile: String,
    pub email: Option<String>,
    pub notification_consent: bool,
}

/// Strips separators and an optional leading `+`, keeping 10 to 15 digits.
pub fn normalize_mobile(raw: &str) -> Result<String, ValidationError> {
    let digits: String = raw.chars().filter(|ch| ch.is_ascii_digit()).collect();
    let has_foreign_chars = raw
        .trim()
        .trim_start_matches('+')
        .chars()
        .any(|ch| !(ch.is_ascii_digit() || ch == ' ' || ch == '-'));

    if digits.is_empty() {
        return Err(ValidationError::MissingField("customer_mobile"));
    }
    if has_foreign_chars || !(10..=15).contains(&digits.len()) {
        return Err(ValidationError::InvalidValue {
            field: "customer_mobile",
            reason: format!("`{raw}` is not a 10 to 15 digit phone number"),
        });
    }
    Ok(digits)
}
