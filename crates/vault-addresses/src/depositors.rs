use std::collections::BTreeSet;

use ethers::types::Address;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DepositorsError {
    #[error("the depositor list is empty")]
    Empty,
    #[error("invalid depositor address {0:?}")]
    InvalidAddress(String),
    #[error("depositor {0:?} is listed more than once")]
    Duplicate(Address),
}

/// Parses a comma separated list of depositor addresses. Order is preserved
/// and whitespace around entries is ignored.
pub fn parse_depositors(list: &str) -> Result<Vec<Address>, DepositorsError> {
    let depositors = list
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<Address>()
                .map_err(|_| DepositorsError::InvalidAddress(s.to_string()))
        })
        .collect::<Result<Vec<_>, _>>()?;
    validate_depositors(&depositors)?;
    Ok(depositors)
}

/// Ensures that a depositor list is non-empty and that no depositor would be
/// funded twice.
pub fn validate_depositors(depositors: &[Address]) -> Result<(), DepositorsError> {
    if depositors.is_empty() {
        return Err(DepositorsError::Empty);
    }
    let mut seen = BTreeSet::new();
    for depositor in depositors {
        if !seen.insert(*depositor) {
            return Err(DepositorsError::Duplicate(*depositor));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_depositors() -> Result<(), Box<dyn std::error::Error>> {
        let depositors = parse_depositors(
            " 0x70997970C51812dc3A010C7d01b50e0d17dc79C8,0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC, ",
        )?;
        assert_eq!(
            depositors,
            vec![
                "0x70997970C51812dc3A010C7d01b50e0d17dc79C8".parse::<Address>()?,
                "0x3C44CdDdB6a900fa2b585dd299e03d12FA4293BC".parse::<Address>()?,
            ]
        );
        Ok(())
    }

    #[test]
    fn test_reject_bad_depositor_lists() {
        assert_eq!(parse_depositors(" , "), Err(DepositorsError::Empty));
        assert_eq!(
            parse_depositors("0x1234"),
            Err(DepositorsError::InvalidAddress("0x1234".to_string()))
        );
        let duplicate = "0x70997970C51812dc3A010C7d01b50e0d17dc79C8";
        assert_eq!(
            parse_depositors(&format!("{duplicate},{}", duplicate.to_lowercase())),
            Err(DepositorsError::Duplicate(duplicate.parse().unwrap()))
        );
    }
}
