/// Input validators for signup/signin payloads
///
/// Enforces length limits (DoS protection) and format rules before any
/// hashing or database work happens.

use lazy_static::lazy_static;
use regex::Regex;

use crate::error::ValidationError;

const MAX_EMAIL_LENGTH: usize = 254; // RFC 5321
const MIN_EMAIL_LENGTH: usize = 5;
const MIN_USERNAME_LENGTH: usize = 3;
const MAX_USERNAME_LENGTH: usize = 30;

lazy_static! {
    // RFC 5322 simplified email regex (practical validation)
    static ref EMAIL_REGEX: Regex = Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$"
    ).unwrap();

    // Letters, digits, underscore, and any whitespace (normalized below)
    static ref USERNAME_REGEX: Regex = Regex::new(r"^[a-zA-Z0-9_\s]+$").unwrap();

    static ref WHITESPACE_RUN: Regex = Regex::new(r"\s+").unwrap();
}

/// Validates an email address and returns it trimmed.
pub fn is_valid_email(email: &str) -> Result<String, ValidationError> {
    let trimmed = email.trim();

    if trimmed.is_empty() {
        return Err(ValidationError::EmptyField("email".to_string()));
    }
    if trimmed.len() < MIN_EMAIL_LENGTH {
        return Err(ValidationError::TooShort(
            "email".to_string(),
            MIN_EMAIL_LENGTH,
        ));
    }
    if trimmed.len() > MAX_EMAIL_LENGTH {
        return Err(ValidationError::TooLong(
            "email".to_string(),
            MAX_EMAIL_LENGTH,
        ));
    }
    if !EMAIL_REGEX.is_match(trimmed) || trimmed.matches('@').count() != 1 {
        return Err(ValidationError::InvalidFormat(
            "email has invalid format".to_string(),
        ));
    }

    Ok(trimmed.to_string())
}

/// Validates a username and returns it with whitespace runs collapsed and
/// trimmed. Allowed characters: letters, digits, underscore, spaces.
pub fn is_valid_username(username: &str) -> Result<String, ValidationError> {
    let normalized = WHITESPACE_RUN.replace_all(username, " ").trim().to_string();

    if normalized.is_empty() {
        return Err(ValidationError::EmptyField("username".to_string()));
    }
    if normalized.len() < MIN_USERNAME_LENGTH {
        return Err(ValidationError::TooShort(
            "username".to_string(),
            MIN_USERNAME_LENGTH,
        ));
    }
    if normalized.len() > MAX_USERNAME_LENGTH {
        return Err(ValidationError::TooLong(
            "username".to_string(),
            MAX_USERNAME_LENGTH,
        ));
    }
    if !USERNAME_REGEX.is_match(&normalized) {
        return Err(ValidationError::InvalidFormat(
            "username may only contain letters, digits, underscores, and spaces".to_string(),
        ));
    }

    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_email() {
        assert!(is_valid_email("user@example.com").is_ok());
        assert!(is_valid_email("test.email@domain.co.uk").is_ok());
        assert!(is_valid_email("user+tag@example.com").is_ok());
    }

    #[test]
    fn test_invalid_email_format() {
        assert!(is_valid_email("invalid").is_err());
        assert!(is_valid_email("user@").is_err());
        assert!(is_valid_email("@example.com").is_err());
        assert!(is_valid_email("user@@example.com").is_err());
    }

    #[test]
    fn test_email_length_limits() {
        let too_long = format!("{}@example.com", "a".repeat(250));
        assert!(is_valid_email(&too_long).is_err());
        assert!(is_valid_email("a@b").is_err()); // Too short
        assert!(is_valid_email("a@a.com").is_ok()); // Shortest accepted form
    }

    #[test]
    fn test_email_is_trimmed() {
        assert_eq!(
            is_valid_email("  user@example.com  ").unwrap(),
            "user@example.com"
        );
    }

    #[test]
    fn test_valid_username() {
        assert_eq!(is_valid_username("john_doe").unwrap(), "john_doe");
        assert_eq!(is_valid_username("user123").unwrap(), "user123");
    }

    #[test]
    fn test_username_whitespace_normalized() {
        // NBSP and runs of spaces collapse to a single space
        assert_eq!(is_valid_username("john\u{a0} doe").unwrap(), "john doe");
        assert_eq!(is_valid_username("  a   b  ").unwrap(), "a b");
    }

    #[test]
    fn test_username_length_limits() {
        assert!(is_valid_username("ab").is_err());
        assert!(is_valid_username(&"a".repeat(31)).is_err());
        assert!(is_valid_username("").is_err());
    }

    #[test]
    fn test_username_rejects_special_characters() {
        assert!(is_valid_username("john.doe").is_err());
        assert!(is_valid_username("john@doe").is_err());
        assert!(is_valid_username("john;--").is_err());
    }
}
