/*!
# Accounts and Balances

The two inputs of the access decision: the connected wallet (if any) and the
membership token balance read for it.
*/

use crate::errors::{AddressError, AddressResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Longest address string accepted from a wallet provider
pub const MAX_ADDRESS_LEN: usize = 128;

/// A connected wallet's address, as reported by the wallet provider
///
/// The original spelling is preserved (EVM checksum casing, base58) because
/// chain readers need it verbatim. Profile rows are keyed by [`profile_key`].
///
/// [`profile_key`]: WalletAddress::profile_key
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct WalletAddress(String);

impl WalletAddress {
    /// Validate a raw address string
    ///
    /// Surrounding whitespace is ignored. Only ASCII alphanumerics are allowed,
    /// which also keeps the value safe inside backend filter expressions.
    pub fn parse(raw: &str) -> AddressResult<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(AddressError::Empty);
        }
        if trimmed.len() > MAX_ADDRESS_LEN {
            return Err(AddressError::TooLong {
                len: trimmed.len(),
                max: MAX_ADDRESS_LEN,
            });
        }
        if let Some((position, found)) = trimmed
            .char_indices()
            .find(|(_, c)| !c.is_ascii_alphanumeric())
        {
            return Err(AddressError::InvalidCharacter { found, position });
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Address exactly as the wallet reported it
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lowercased form used as the unique key of profile and stats rows
    pub fn profile_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// True when both addresses name the same profile row
    pub fn same_profile(&self, other: &WalletAddress) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl FromStr for WalletAddress {
    type Err = AddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl TryFrom<String> for WalletAddress {
    type Error = AddressError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<WalletAddress> for String {
    fn from(value: WalletAddress) -> Self {
        value.0
    }
}

impl fmt::Display for WalletAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interpret whatever the wallet provider currently reports as an account
///
/// A missing or blank address means "not connected", never a query for an
/// empty owner.
pub fn account_from_provider(raw: Option<&str>) -> AddressResult<Option<WalletAddress>> {
    match raw {
        None => Ok(None),
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => WalletAddress::parse(s).map(Some),
    }
}

/// Membership token balance of the current account
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Balance {
    /// No settled read yet for the current account
    #[default]
    NotLoaded,
    /// Number of tokens held
    Loaded(u64),
    /// Reads failed and are no longer being retried
    Failed(String),
}

impl Balance {
    pub fn is_settled(&self) -> bool {
        matches!(self, Balance::Loaded(_))
    }
}

/// What a single balance read reported back
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceObservation {
    Loaded(u64),
    Failed { message: String, retrying: bool },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_trims_and_keeps_casing() {
        let address = WalletAddress::parse("  0xAbC123  ").unwrap();
        assert_eq!(address.as_str(), "0xAbC123");
        assert_eq!(address.profile_key(), "0xabc123");
    }

    #[test]
    fn test_parse_rejects_empty_and_invalid() {
        assert_eq!(WalletAddress::parse("   "), Err(AddressError::Empty));
        assert_eq!(
            WalletAddress::parse("0xab%cd"),
            Err(AddressError::InvalidCharacter {
                found: '%',
                position: 4
            })
        );
        let long = "a".repeat(MAX_ADDRESS_LEN + 1);
        assert!(matches!(
            WalletAddress::parse(&long),
            Err(AddressError::TooLong { .. })
        ));
    }

    #[test]
    fn test_blank_provider_address_is_no_account() {
        assert_eq!(account_from_provider(None).unwrap(), None);
        assert_eq!(account_from_provider(Some("")).unwrap(), None);
        assert_eq!(account_from_provider(Some("  ")).unwrap(), None);
        assert!(account_from_provider(Some("0xAA")).unwrap().is_some());
    }

    #[test]
    fn test_same_profile_ignores_case() {
        let upper = WalletAddress::parse("0xABC").unwrap();
        let lower = WalletAddress::parse("0xabc").unwrap();
        assert_ne!(upper, lower);
        assert!(upper.same_profile(&lower));
    }

    #[test]
    fn test_serde_validates() {
        let ok: WalletAddress = serde_json::from_str("\"0xAA\"").unwrap();
        assert_eq!(ok.as_str(), "0xAA");
        assert!(serde_json::from_str::<WalletAddress>("\"\"").is_err());
    }
}
