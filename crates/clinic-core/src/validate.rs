//! Input validation helpers shared by registration, profile and booking
//! requests.

use chrono::NaiveDate;

use crate::error::{Error, Result};

/// Minimum password length for patient accounts.
pub const USER_PASSWORD_MIN: usize = 8;

/// Minimum password length for doctor accounts.
pub const DOCTOR_PASSWORD_MIN: usize = 6;

/// Returns the trimmed value, or a validation error naming `field`.
pub fn required<'a>(field: &str, value: &'a str, message: &str) -> Result<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(Error::validation_field(field, message));
    }
    Ok(trimmed)
}

/// Like [`required`] for optional request fields.
pub fn required_opt<'a>(field: &str, value: Option<&'a str>, message: &str) -> Result<&'a str> {
    required(field, value.unwrap_or_default(), message)
}

/// Loose `local@domain.tld` check.
pub fn email(value: &str) -> Result<String> {
    let value = value.trim();
    let valid = match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.starts_with('.')
                && !domain.ends_with('.')
                && domain.contains('.')
                && !value.chars().any(char::is_whitespace)
                && !domain.contains('@')
        }
        None => false,
    };
    if !valid {
        return Err(Error::validation_field("email", "Please include a valid email"));
    }
    Ok(value.to_ascii_lowercase())
}

/// Rejects passwords shorter than `min` characters.
pub fn password(value: &str, min: usize) -> Result<()> {
    if value.chars().count() < min {
        return Err(Error::validation_field(
            "password",
            format!("Password must be at least {min} characters"),
        ));
    }
    Ok(())
}

/// Parses a strict `YYYY-MM-DD` date.
pub fn date(field: &str, value: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        Error::validation_field(
            field,
            format!("Invalid {field} format. Please use YYYY-MM-DD."),
        )
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_email_accepts_and_normalizes() {
        assert_eq!(email(" Ana@Clinic.PH ").unwrap(), "ana@clinic.ph");
    }

    #[test]
    fn test_email_rejects_malformed() {
        for bad in ["", "ana", "ana@", "@clinic.ph", "ana@clinic", "a na@clinic.ph", "a@.ph"] {
            assert!(email(bad).is_err(), "{bad} should be rejected");
        }
    }

    #[test]
    fn test_password_minimum() {
        assert!(password("1234567", USER_PASSWORD_MIN).is_err());
        assert!(password("12345678", USER_PASSWORD_MIN).is_ok());
        assert!(password("123456", DOCTOR_PASSWORD_MIN).is_ok());
    }

    #[test]
    fn test_required_trims() {
        assert_eq!(required("name", "  Ana ", "Name is required").unwrap(), "Ana");
        let err = required("name", "   ", "Name is required").unwrap_err();
        assert!(err.to_string().contains("Name is required"));
        assert!(required_opt("phone", None, "Phone number is required").is_err());
    }

    #[test]
    fn test_date_is_strict() {
        assert!(date("schedule_date", "2024-02-29").is_ok());
        assert!(date("schedule_date", "2023-02-29").is_err());
        assert!(date("schedule_date", "02/03/2024").is_err());
    }
}
