//! # Validation Module
//!
//! Input validation for stock, customer, sale and payment fields.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: API Handler (axum)                                           │
//! │  ├── Type validation (deserialization)                                 │
//! │  └── THIS MODULE: Business rule validation                             │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Database (SQLite)                                            │
//! │  ├── NOT NULL constraints                                              │
//! │  ├── UNIQUE constraints                                                │
//! │  └── Foreign key constraints                                           │
//! │                                                                         │
//! │  Defense in depth: Multiple layers catch different errors              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust,no_run
//! use stockbook_core::validation::{validate_size, validate_quantity};
//!
//! validate_size("M").unwrap();
//! validate_quantity(5).unwrap();
//! ```

use crate::error::ValidationError;
use crate::MAX_ITEM_QUANTITY;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// String Validators
// =============================================================================

/// Validates a stock size label.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 50 characters
/// - Free-form otherwise: "S", "M", "XL", "42" are all fine
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_size;
///
/// assert!(validate_size("XL").is_ok());
/// assert!(validate_size("").is_err());
/// ```
pub fn validate_size(size: &str) -> ValidationResult<()> {
    let size = size.trim();

    if size.is_empty() {
        return Err(ValidationError::Required {
            field: "size".to_string(),
        });
    }

    if size.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "size".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a stock color label.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 50 characters
pub fn validate_color(color: &str) -> ValidationResult<()> {
    let color = color.trim();

    if color.is_empty() {
        return Err(ValidationError::Required {
            field: "color".to_string(),
        });
    }

    if color.len() > 50 {
        return Err(ValidationError::TooLong {
            field: "color".to_string(),
            max: 50,
        });
    }

    Ok(())
}

/// Validates a customer name.
///
/// ## Rules
/// - Must not be empty
/// - Maximum 200 characters
pub fn validate_customer_name(name: &str) -> ValidationResult<()> {
    let name = name.trim();

    if name.is_empty() {
        return Err(ValidationError::Required {
            field: "name".to_string(),
        });
    }

    if name.len() > 200 {
        return Err(ValidationError::TooLong {
            field: "name".to_string(),
            max: 200,
        });
    }

    Ok(())
}

/// Validates a customer phone number.
///
/// ## Rules
/// - Must not be empty (phone is half the customer's identity)
/// - Maximum 30 characters
/// - Digits, spaces, `+`, `-` and parentheses only
pub fn validate_phone(phone: &str) -> ValidationResult<()> {
    let phone = phone.trim();

    if phone.is_empty() {
        return Err(ValidationError::Required {
            field: "phone".to_string(),
        });
    }

    if phone.len() > 30 {
        return Err(ValidationError::TooLong {
            field: "phone".to_string(),
            max: 30,
        });
    }

    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || c == ' ' || c == '+' || c == '-' || c == '(' || c == ')')
    {
        return Err(ValidationError::InvalidFormat {
            field: "phone".to_string(),
            reason: "must contain only digits, spaces, +, - and parentheses".to_string(),
        });
    }

    Ok(())
}

/// Validates a search query.
///
/// ## Rules
/// - Can be empty (returns all/default results)
/// - Maximum 100 characters
///
/// ## Returns
/// The trimmed query string.
pub fn validate_search_query(query: &str) -> ValidationResult<String> {
    let query = query.trim();

    if query.len() > 100 {
        return Err(ValidationError::TooLong {
            field: "query".to_string(),
            max: 100,
        });
    }

    Ok(query.to_string())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a quantity value.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (9999)
pub fn validate_quantity(qty: i64) -> ValidationResult<()> {
    if qty <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "quantity".to_string(),
        });
    }

    if qty > MAX_ITEM_QUANTITY {
        return Err(ValidationError::OutOfRange {
            field: "quantity".to_string(),
            min: 1,
            max: MAX_ITEM_QUANTITY,
        });
    }

    Ok(())
}

/// Validates a rate or cost in cents.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (giveaways and corrections)
///
/// ## Example
/// ```rust
/// use stockbook_core::validation::validate_amount_cents;
///
/// assert!(validate_amount_cents(1099).is_ok());
/// assert!(validate_amount_cents(0).is_ok());
/// assert!(validate_amount_cents(-100).is_err());
/// ```
pub fn validate_amount_cents(cents: i64) -> ValidationResult<()> {
    if cents < 0 {
        return Err(ValidationError::OutOfRange {
            field: "amount".to_string(),
            min: 0,
            max: i64::MAX,
        });
    }

    Ok(())
}

/// Validates a payment or advance amount in cents.
///
/// ## Rules
/// - Must be positive (> 0)
/// - Cannot record zero or negative payments
pub fn validate_payment_amount(cents: i64) -> ValidationResult<()> {
    if cents <= 0 {
        return Err(ValidationError::MustBePositive {
            field: "payment amount".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
