use crate::{
    error::{ReadError, ReadResult},
    evm::Erc721BalanceReader,
    reader::ChainReader,
    solana::SplMembershipReader,
};
use backoff::ExponentialBackoff;
use serde::{Deserialize, Serialize};
use solana_sdk::pubkey::Pubkey;
use std::{str::FromStr, sync::Arc, time::Duration};
use url::Url;

/// Monad testnet RPC, addressed as `<base>/<client id>`
pub const MONAD_TESTNET_RPC: &str = "https://10143.rpc.thirdweb.com";

pub const MONAD_TESTNET_CHAIN_ID: u64 = 10143;

/// The Nads Central membership collection on Monad testnet
pub const NADS_MEMBERSHIP_CONTRACT: &str = "0x922dA3512e2BEBBe32bccE59adf7E6759fB8CEA2";

/// Configuration for balance reads
#[derive(Debug, Clone)]
pub struct ReadConfig {
    /// Retries after the first attempt
    pub max_retries: usize,

    /// Backoff strategy for retry delays
    pub retry_backoff: ExponentialBackoff,

    /// Upper bound on a single attempt
    pub attempt_timeout: Duration,
}

impl Default for ReadConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            retry_backoff: ExponentialBackoff {
                initial_interval: Duration::from_secs(1),
                max_interval: Duration::from_secs(30),
                max_elapsed_time: Some(Duration::from_secs(60)),
                multiplier: 2.0,
                ..Default::default()
            },
            attempt_timeout: Duration::from_secs(15),
        }
    }
}

/// Which chain holds the membership token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainTarget {
    /// ERC-721 collection on an EVM chain, read with `balanceOf`
    Evm {
        rpc_url: String,
        contract: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        client_id: Option<String>,
    },
    /// SPL mint on Solana, read from the owner's associated token account
    Solana {
        rpc_url: String,
        mint: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        token_program: Option<String>,
    },
}

impl Default for ChainTarget {
    fn default() -> Self {
        ChainTarget::Evm {
            rpc_url: MONAD_TESTNET_RPC.to_string(),
            contract: NADS_MEMBERSHIP_CONTRACT.to_string(),
            client_id: None,
        }
    }
}

impl ChainTarget {
    /// The RPC URL requests are sent to
    pub fn endpoint(&self) -> ReadResult<Url> {
        match self {
            ChainTarget::Evm {
                rpc_url, client_id, ..
            } => {
                let mut url = parse_url(rpc_url)?;
                if let Some(client_id) = client_id.as_deref().filter(|id| !id.trim().is_empty()) {
                    url.path_segments_mut()
                        .map_err(|_| {
                            ReadError::Config(format!("RPC URL cannot take a path: {}", rpc_url))
                        })?
                        .pop_if_empty()
                        .push(client_id.trim());
                }
                Ok(url)
            }
            ChainTarget::Solana { rpc_url, .. } => parse_url(rpc_url),
        }
    }

    pub fn build_reader(&self) -> ReadResult<Arc<dyn ChainReader>> {
        let endpoint = self.endpoint()?;
        match self {
            ChainTarget::Evm { contract, .. } => {
                Ok(Arc::new(Erc721BalanceReader::new(endpoint, contract)?))
            }
            ChainTarget::Solana {
                mint,
                token_program,
                ..
            } => {
                let mint = parse_pubkey("mint", mint)?;
                let mut reader = SplMembershipReader::new(endpoint.to_string(), mint);
                if let Some(program) = token_program {
                    reader = reader.with_token_program(parse_pubkey("token program", program)?);
                }
                Ok(Arc::new(reader))
            }
        }
    }
}

fn parse_url(raw: &str) -> ReadResult<Url> {
    Url::parse(raw).map_err(|e| ReadError::Config(format!("Invalid RPC URL {}: {}", raw, e)))
}

fn parse_pubkey(what: &str, raw: &str) -> ReadResult<Pubkey> {
    Pubkey::from_str(raw).map_err(|e| ReadError::Config(format!("Invalid {} {}: {}", what, raw, e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ReadConfig::default();
        assert_eq!(config.max_retries, 2);
        assert_eq!(config.attempt_timeout, Duration::from_secs(15));
        assert_eq!(config.retry_backoff.initial_interval, Duration::from_secs(1));
    }

    #[test]
    fn test_evm_endpoint_appends_client_id() {
        let target = ChainTarget::Evm {
            rpc_url: MONAD_TESTNET_RPC.to_string(),
            contract: NADS_MEMBERSHIP_CONTRACT.to_string(),
            client_id: Some("abc123".to_string()),
        };
        assert_eq!(
            target.endpoint().unwrap().as_str(),
            "https://10143.rpc.thirdweb.com/abc123"
        );
    }

    #[test]
    fn test_evm_endpoint_without_client_id() {
        let target = ChainTarget::Evm {
            rpc_url: "http://localhost:8545".to_string(),
            contract: NADS_MEMBERSHIP_CONTRACT.to_string(),
            client_id: Some("  ".to_string()),
        };
        assert_eq!(target.endpoint().unwrap().as_str(), "http://localhost:8545/");
    }

    #[test]
    fn test_invalid_url_is_config_error() {
        let target = ChainTarget::Solana {
            rpc_url: "not a url".to_string(),
            mint: Pubkey::new_unique().to_string(),
            token_program: None,
        };
        assert!(matches!(target.endpoint(), Err(ReadError::Config(_))));
    }

    #[test]
    fn test_target_from_yaml() {
        let yaml = r#"
kind: solana
rpc_url: http://127.0.0.1:8899
mint: So11111111111111111111111111111111111111112
"#;
        let target: ChainTarget = serde_yaml::from_str(yaml).unwrap();
        assert!(matches!(target, ChainTarget::Solana { token_program: None, .. }));
    }

    #[test]
    fn test_build_evm_reader() {
        let reader = ChainTarget::default().build_reader().unwrap();
        assert!(reader.describe().contains("0x922da3512e2bebbe32bcce59adf7e6759fb8cea2"));
    }

    #[test]
    fn test_build_reader_rejects_bad_contract() {
        let target = ChainTarget::Evm {
            rpc_url: MONAD_TESTNET_RPC.to_string(),
            contract: "0x1234".to_string(),
            client_id: None,
        };
        assert!(target.build_reader().is_err());
    }
}
