// Validation utilities module
// Provides custom validation functions for domain-specific rules

use regex::Regex;
use rust_decimal::Decimal;
use std::sync::OnceLock;
use validator::ValidationError;

use crate::orders::MAX_UNIT_PRICE;

fn local_mobile_number() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[0-9]{9}$").expect("mobile number pattern is valid"))
}

fn block_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^[A-Za-z0-9]{1,8}$").expect("block id pattern is valid"))
}

/// Strips the spaces a buyer may type between digit groups ("97 123 4567")
pub fn normalize_mobile_number(number: &str) -> String {
    number.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Validates a Zambian mobile number without the +260 prefix
/// Nine digits once spaces are removed
pub fn validate_mobile_number(number: &str) -> Result<(), ValidationError> {
    if local_mobile_number().is_match(&normalize_mobile_number(number)) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_mobile_number"))
    }
}

/// Validates a block identifier such as "A1" or "GA"
pub fn validate_block_id(block_id: &str) -> Result<(), ValidationError> {
    if block_id_pattern().is_match(block_id) {
        Ok(())
    } else {
        Err(ValidationError::new("invalid_block_id"))
    }
}

/// Validates that a cardholder name is not blank
pub fn validate_cardholder_name(name: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::new("cardholder_name_required"))
    } else {
        Ok(())
    }
}

/// Validates a unit price between zero and MAX_UNIT_PRICE inclusive
pub fn validate_unit_price(price: &Decimal) -> Result<(), ValidationError> {
    if *price < Decimal::ZERO {
        Err(ValidationError::new("negative_unit_price"))
    } else if *price > MAX_UNIT_PRICE {
        Err(ValidationError::new("unit_price_too_large"))
    } else {
        Ok(())
    }
}
