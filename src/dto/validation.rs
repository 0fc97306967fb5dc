//! Validation helpers for DTOs.

use rust_decimal::Decimal;
use validator::ValidationError;

/// Validates that a monetary amount is non-negative and carries at most
/// two decimal places (whole minor units).
///
/// # Examples
///
/// ```ignore
/// validate_money(&"25.00".parse().unwrap()) // Ok
/// validate_money(&"-1.00".parse().unwrap()) // Err - negative
/// validate_money(&"0.005".parse().unwrap()) // Err - sub-minor precision
/// ```
pub fn validate_money(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() {
        let mut err = ValidationError::new("amount_negative");
        err.message = Some("Amount must not be negative".into());
        return Err(err);
    }

    if amount.normalize().scale() > 2 {
        let mut err = ValidationError::new("amount_precision");
        err.message = Some(
            format!("Amount must have at most two decimal places (got `{amount}`)").into(),
        );
        return Err(err);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_money_valid() {
        assert!(validate_money(&"0".parse().unwrap()).is_ok());
        assert!(validate_money(&"25.00".parse().unwrap()).is_ok());
        assert!(validate_money(&"0.01".parse().unwrap()).is_ok());
        assert!(validate_money(&"199.99".parse().unwrap()).is_ok());
    }

    #[test]
    fn test_validate_money_negative() {
        assert!(validate_money(&"-0.01".parse().unwrap()).is_err());
        assert!(validate_money(&"-25".parse().unwrap()).is_err());
    }

    #[test]
    fn test_validate_money_precision() {
        assert!(validate_money(&"0.005".parse().unwrap()).is_err());
        assert!(validate_money(&"1.999".parse().unwrap()).is_err());
        // Trailing zeros beyond two places are still whole minor units.
        assert!(validate_money(&"1.9900".parse().unwrap()).is_ok());
    }
}
