//! Form field validators
//!
//! One implementation of the checks every form applies before anything
//! is sent to the backend. Each validator returns the first rule that
//! fails, as a [`FieldError`] whose `Display` is the user-facing message.

use std::sync::LazyLock;

use regex::Regex;
use rust_decimal::Decimal;
use thiserror::Error;

static ONLY_DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[0-9]+$").unwrap());
static HAS_LETTER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[A-Za-z]").unwrap());
static HAS_DIGIT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[0-9]").unwrap());
static LETTERS_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z\s]+$").unwrap());
static ALNUM_SPACES: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9\s]+$").unwrap());
static ALNUM: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]+$").unwrap());
static PHONE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(09|07)[0-9]{8}$").unwrap());
static PASSWORD_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9]{6,}$").unwrap());

/// Validation failure for a single form field
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("{0} cannot be only numbers")]
    OnlyNumbers(&'static str),

    #[error("{0} must contain letters")]
    NeedsLetters(&'static str),

    #[error("{0} must contain only letters")]
    LettersOnly(&'static str),

    #[error("Only letters and numbers allowed")]
    Alphanumeric,

    #[error("Only letters, numbers and spaces allowed")]
    AlphanumericSpaces,

    #[error("Only letters and numbers allowed (no spaces)")]
    AlphanumericNoSpaces,

    #[error("Phone must start with 09/07 and be 10 digits")]
    Phone,

    #[error("Must be 6+ chars with letters and numbers")]
    WeakPassword,

    #[error("Must be a valid number")]
    NotANumber,

    #[error("Must be greater than 0")]
    NotPositive,
}

fn required<'a>(value: &'a str, field: &'static str) -> Result<&'a str, FieldError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FieldError::Required(field));
    }
    Ok(trimmed)
}

/// Person name: letters and spaces only
pub fn person_name(value: &str) -> Result<(), FieldError> {
    let value = required(value, "Name")?;
    if !LETTERS_SPACES.is_match(value) {
        return Err(FieldError::LettersOnly("Name"));
    }
    Ok(())
}

/// Phone number: `09` or `07` followed by 8 digits
pub fn phone(value: &str) -> Result<(), FieldError> {
    let value = required(value, "Phone")?;
    if !PHONE.is_match(value) {
        return Err(FieldError::Phone);
    }
    Ok(())
}

/// Street address: must contain letters
pub fn address(value: &str) -> Result<(), FieldError> {
    let value = required(value, "Address")?;
    if ONLY_DIGITS.is_match(value) {
        return Err(FieldError::OnlyNumbers("Address"));
    }
    if !HAS_LETTER.is_match(value) {
        return Err(FieldError::NeedsLetters("Address"));
    }
    Ok(())
}

/// Password: 6+ letters/digits with at least one of each
pub fn password(value: &str) -> Result<(), FieldError> {
    if value.is_empty() {
        return Err(FieldError::Required("Password"));
    }
    if !PASSWORD_CHARS.is_match(value) || !HAS_LETTER.is_match(value) || !HAS_DIGIT.is_match(value)
    {
        return Err(FieldError::WeakPassword);
    }
    Ok(())
}

fn label(value: &str, field: &'static str, charset: FieldError) -> Result<(), FieldError> {
    let value = required(value, field)?;
    if ONLY_DIGITS.is_match(value) {
        return Err(FieldError::OnlyNumbers(field));
    }
    if !ALNUM_SPACES.is_match(value) {
        return Err(charset);
    }
    Ok(())
}

/// Branch name: letters, digits and spaces, not only digits
pub fn branch_name(value: &str) -> Result<(), FieldError> {
    label(value, "Branch name", FieldError::Alphanumeric)
}

/// Product name: letters, digits and spaces, not only digits
pub fn product_name(value: &str) -> Result<(), FieldError> {
    label(value, "Product name", FieldError::Alphanumeric)
}

/// Category name: letters, digits and spaces, not only digits
pub fn category_name(value: &str) -> Result<(), FieldError> {
    label(value, "Category", FieldError::AlphanumericSpaces)
}

/// Branch location: must contain letters
pub fn location(value: &str) -> Result<(), FieldError> {
    let value = required(value, "Location")?;
    if ONLY_DIGITS.is_match(value) {
        return Err(FieldError::OnlyNumbers("Location"));
    }
    if !HAS_LETTER.is_match(value) {
        return Err(FieldError::NeedsLetters("Location"));
    }
    Ok(())
}

/// Category code: letters and digits, no spaces
pub fn category_code(value: &str) -> Result<(), FieldError> {
    let value = required(value, "Code")?;
    if !ALNUM.is_match(value) {
        return Err(FieldError::AlphanumericNoSpaces);
    }
    Ok(())
}

/// Price entry: a decimal number greater than zero
pub fn price(value: &str, field: &'static str) -> Result<Decimal, FieldError> {
    let value = required(value, field)?;
    let parsed: Decimal = value.parse().map_err(|_| FieldError::NotANumber)?;
    if parsed <= Decimal::ZERO {
        return Err(FieldError::NotPositive);
    }
    Ok(parsed)
}
