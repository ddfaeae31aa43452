//! Validation utilities for the Warehouse Stock Tracker

/// Validate that a movement quantity is a positive integer
pub fn validate_quantity(quantity: i64) -> Result<(), &'static str> {
    if quantity <= 0 {
        return Err("Quantity must be a positive integer");
    }
    Ok(())
}

/// Validate a user-supplied entity name (warehouses, categories, products)
pub fn validate_name(name: &str) -> Result<(), &'static str> {
    if name.trim().is_empty() {
        return Err("Name cannot be empty");
    }
    if name.len() > 100 {
        return Err("Name must be at most 100 characters");
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_quantity_positive() {
        assert!(validate_quantity(1).is_ok());
        assert!(validate_quantity(10_000).is_ok());
    }

    #[test]
    fn test_validate_quantity_zero() {
        assert!(validate_quantity(0).is_err());
    }

    #[test]
    fn test_validate_quantity_negative() {
        assert!(validate_quantity(-5).is_err());
    }

    #[test]
    fn test_validate_name_valid() {
        assert!(validate_name("Main Warehouse").is_ok());
    }

    #[test]
    fn test_validate_name_empty() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn test_validate_name_too_long() {
        assert!(validate_name(&"x".repeat(101)).is_err());
    }
}
