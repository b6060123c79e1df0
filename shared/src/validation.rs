//! Validation utilities for the Rider Distribution Management platform

use chrono::NaiveDate;

// ============================================================================
// Quantity Validations
// ============================================================================

/// Validate that a quantity is strictly positive
pub fn validate_positive_quantity(quantity: i32) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be positive");
    }
    Ok(())
}

/// Validate an outcome amount against the remaining unaccounted quantity
pub fn validate_outcome_amount(amount: i32, remaining: i32) -> Result<(), &'static str> {
    if amount <= 0 {
        return Err("Amount must be positive");
    }
    if amount > remaining {
        return Err("Amount exceeds remaining unaccounted quantity");
    }
    Ok(())
}

// ============================================================================
// Batch Validations
// ============================================================================

/// Validate production and expiry dates for a new batch
pub fn validate_batch_dates(
    production_date: NaiveDate,
    expiry_date: NaiveDate,
) -> Result<(), &'static str> {
    if expiry_date < production_date {
        return Err("Expiry date must not be before production date");
    }
    Ok(())
}

// ============================================================================
// General Validations
// ============================================================================

/// Validate that a name field is non-empty after trimming
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name must not be empty");
    }
    Ok(())
}

/// Validate Indonesian mobile number format
/// Accepts: 081234567890, 0812-3456-7890, +6281234567890
pub fn validate_indonesian_phone(phone: &str) -> Result<(), &'static str> {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();

    // Domestic format: 10-13 digits starting with 08
    if (10..=13).contains(&digits.len()) && digits.starts_with("08") {
        return Ok(());
    }
    // International format with country code: starts with 628
    if (11..=14).contains(&digits.len()) && digits.starts_with("628") {
        return Ok(());
    }

    Err("Invalid Indonesian phone number format")
}
