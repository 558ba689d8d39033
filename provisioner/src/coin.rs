//! Coin amounts attached to instantiate and execute calls

use std::fmt::{self, Display};

use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::errors::CoinParseError;

/// An amount of a single denomination
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    /// The amount, in the denomination's base unit
    pub amount: u128,
    /// The denomination, e.g. `usei` or `factory/<creator>/kUSD`
    pub denom: String,
}

impl Coin {
    /// Construct a coin
    pub fn new(amount: u128, denom: impl Into<String>) -> Self {
        Self {
            amount,
            denom: denom.into(),
        }
    }
}

impl Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Parse a comma separated coin list such as `"10000000usei"`.
///
/// An empty (or all-whitespace) string is the empty list.
pub fn parse_coins(s: &str) -> Result<Vec<Coin>, CoinParseError> {
    if s.trim().is_empty() {
        return Ok(Vec::new());
    }

    s.split(',').map(|part| parse_coin(part.trim())).collect()
}

fn parse_coin(s: &str) -> Result<Coin, CoinParseError> {
    let split = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
    let (amount, denom) = s.split_at(split);

    let valid_denom = denom.starts_with(|c: char| c.is_ascii_alphabetic())
        && denom
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "/:._-".contains(c));
    if amount.is_empty() || !valid_denom {
        return Err(CoinParseError(s.to_string()));
    }

    let amount = amount
        .parse::<u128>()
        .map_err(|_| CoinParseError(s.to_string()))?;
    Ok(Coin::new(amount, denom))
}

/// Render a coin list the way [`parse_coins`] reads it
pub fn format_coins(coins: &[Coin]) -> String {
    coins.iter().join(",")
}

#[cfg(test)]
mod tests {
    use super::{format_coins, parse_coins, Coin};

    #[test]
    fn test_parse_factory_denom() {
        let coins = parse_coins("1000000factory/sei1pool/kUSD, 5usei").unwrap();
        assert_eq!(
            coins,
            vec![
                Coin::new(1_000_000, "factory/sei1pool/kUSD"),
                Coin::new(5, "usei")
            ]
        );
        assert_eq!(format_coins(&coins), "1000000factory/sei1pool/kUSD,5usei");
    }

    #[test]
    fn test_empty_is_no_coins() {
        assert!(parse_coins("").unwrap().is_empty());
        assert!(parse_coins("  ").unwrap().is_empty());
    }

    #[test]
    fn test_rejects_malformed() {
        assert!(parse_coins("usei").is_err());
        assert!(parse_coins("100").is_err());
        assert!(parse_coins("100usei,").is_err());
        assert!(parse_coins("10 0usei").is_err());
    }
}
