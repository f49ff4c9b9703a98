/// Economics module: the cosmetic token value metric.
///
/// The "egg" and "chicken" prices are market quotes fetched by the caller;
/// nothing in the ledger depends on the result.
use crate::error::ChainError;

/// Multiplier applied to the egg/chicken price ratio.
pub const TOKEN_VALUE_FACTOR: f64 = 7.0;

/// `((egg_price / chicken_price) * 7) / transaction_count`
pub fn token_value(
    egg_price: f64,
    chicken_price: f64,
    transaction_count: u64,
) -> Result<f64, ChainError> {
    if transaction_count == 0 {
        return Err(ChainError::InvalidTransaction(
            "Transaction count must be greater than 0".to_string(),
        ));
    }
    for (name, price) in [("egg", egg_price), ("chicken", chicken_price)] {
        if !price.is_finite() || price <= 0.0 {
            return Err(ChainError::InvalidTransaction(format!(
                "{} price must be a positive number, got {}",
                name, price
            )));
        }
    }

    Ok((egg_price / chicken_price) * TOKEN_VALUE_FACTOR / transaction_count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_value_formula() {
        let value = token_value(200.0, 100.0, 7).unwrap();
        assert!((value - 2.0).abs() < 1e-12);
    }

    #[test]
    fn test_zero_transactions_rejected() {
        assert!(token_value(200.0, 100.0, 0).is_err());
    }

    #[test]
    fn test_non_positive_prices_rejected() {
        assert!(token_value(200.0, 0.0, 5).is_err());
        assert!(token_value(-1.0, 100.0, 5).is_err());
        assert!(token_value(f64::NAN, 100.0, 5).is_err());
    }
}
