use std::fmt;

use serde_derive::{Deserialize, Serialize};

use crate::{codec::u64_string, Error, Result};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    #[serde(with = "u64_string")]
    pub amount: u64,
    pub denom: String,
}

impl Coin {
    pub fn new(amount: u64, denom: &str) -> Result<Self> {
        validate_denom(denom)?;
        Ok(Self {
            amount,
            denom: denom.to_owned(),
        })
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

pub fn coins_to_string(coins: &[Coin]) -> String {
    coins
        .iter()
        .map(Coin::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

pub fn is_all_positive(coins: &[Coin]) -> bool {
    !coins.is_empty() && coins.iter().all(|coin| coin.amount > 0)
}

fn validate_denom(denom: &str) -> Result<()> {
    let valid_len = (3..=16).contains(&denom.len());
    let mut chars = denom.chars();
    let starts_with_letter = chars.next().is_some_and(|c| c.is_ascii_lowercase());
    let rest_valid = chars.all(|c| c.is_ascii_lowercase() || c.is_ascii_digit());

    if valid_len && starts_with_letter && rest_valid {
        Ok(())
    } else {
        Err(Error::InvalidCoins(format!("invalid denom {denom:?}")))
    }
}

fn parse_coin(coin: &str) -> Result<Coin> {
    let coin = coin.trim();
    let split = coin
        .find(|c: char| !c.is_ascii_digit())
        .ok_or_else(|| Error::InvalidCoins(format!("{coin:?} has no denom")))?;
    let (amount, denom) = coin.split_at(split);
    if amount.is_empty() {
        return Err(Error::InvalidCoins(format!("{coin:?} has no amount")));
    }
    let amount = amount
        .parse::<u64>()
        .map_err(|e| Error::InvalidCoins(format!("{coin:?}: {e}")))?;
    Coin::new(amount, denom)
}

/// Parses `10stake,5nametoken`. The result is sorted by denom and rejects duplicates.
pub fn parse_coins(coins: &str) -> Result<Vec<Coin>> {
    let coins = coins.trim();
    if coins.is_empty() {
        return Ok(vec![]);
    }

    let mut parsed = coins
        .split(',')
        .map(parse_coin)
        .collect::<Result<Vec<_>>>()?;
    parsed.sort_by(|a, b| a.denom.cmp(&b.denom));

    if let Some(pair) = parsed.windows(2).find(|pair| pair[0].denom == pair[1].denom) {
        return Err(Error::InvalidCoins(format!("duplicate denom {}", pair[0].denom)));
    }

    Ok(parsed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn parses_and_sorts() {
        let coins = parse_coins("5nametoken, 10stake,1atom").unwrap();
        assert_eq!(coins_to_string(&coins), "1atom,5nametoken,10stake");
    }

    #[test]
    fn empty_string_is_no_coins() {
        assert!(parse_coins("").unwrap().is_empty());
    }

    #[test]
    fn rejects_malformed_coins() {
        for bad in ["stake", "10", "10St", "10s", "1stake,2stake", "-1stake", "10stake!"] {
            assert!(parse_coins(bad).is_err(), "{bad} should not parse");
        }
    }

    #[test]
    fn positivity() {
        assert!(is_all_positive(&parse_coins("1stake").unwrap()));
        assert!(!is_all_positive(&parse_coins("0stake").unwrap()));
        assert!(!is_all_positive(&[]));
    }
}
