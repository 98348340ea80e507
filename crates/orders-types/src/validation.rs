//! Client-side validation for order form fields.
//!
//! Only the date of birth is checked, and only for its shape. The value is
//! never parsed into a calendar date, so `2024-99-99` is accepted. Digits are
//! ASCII only.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

/// Message shown next to the date-of-birth field when its format is wrong.
pub const DOB_FORMAT_MESSAGE: &str = "Date of birth must be in YYYY-MM-DD format";

static DOB_PATTERN: Lazy<Regex> = Lazy::new(|| {
	Regex::new(r"^[0-9]{4}-[0-9]{2}-[0-9]{2}$").expect("date of birth pattern is a valid regex")
});

/// Errors raised by local field validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
	/// The date of birth does not have the `YYYY-MM-DD` shape.
	#[error("{}", DOB_FORMAT_MESSAGE)]
	DobFormat,
}

/// Returns true when `value` has the `YYYY-MM-DD` shape.
pub fn is_valid_dob(value: &str) -> bool {
	DOB_PATTERN.is_match(value)
}

/// Validates an already trimmed date of birth.
pub fn validate_dob(value: &str) -> Result<(), ValidationError> {
	if is_valid_dob(value) {
		Ok(())
	} else {
		Err(ValidationError::DobFormat)
	}
}
