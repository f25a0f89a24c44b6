use crate::{
    error::{ReadError, ReadResult},
    reader::ChainReader,
};
use async_trait::async_trait;
use nads_central_gate::WalletAddress;
use solana_client::nonblocking::rpc_client::RpcClient;
use solana_sdk::{commitment_config::CommitmentConfig, pubkey::Pubkey};
use std::{str::FromStr, sync::Arc};
use tracing::debug;

/// Reads membership as the balance of the owner's associated token account
/// for an SPL mint. A missing token account counts as zero.
pub struct SplMembershipReader {
    rpc_client: Arc<RpcClient>,
    mint: Pubkey,
    token_program: Pubkey,
}

impl SplMembershipReader {
    pub fn new(rpc_url: String, mint: Pubkey) -> Self {
        Self::with_rpc_client(
            Arc::new(RpcClient::new_with_commitment(
                rpc_url,
                CommitmentConfig::confirmed(),
            )),
            mint,
        )
    }

    pub fn with_rpc_client(rpc_client: Arc<RpcClient>, mint: Pubkey) -> Self {
        Self {
            rpc_client,
            mint,
            token_program: spl_token::id(),
        }
    }

    /// Use a different token program (e.g. Token-2022)
    pub fn with_token_program(mut self, token_program: Pubkey) -> Self {
        self.token_program = token_program;
        self
    }

    pub fn mint(&self) -> &Pubkey {
        &self.mint
    }

    pub fn membership_account(&self, owner: &Pubkey) -> Pubkey {
        spl_associated_token_account::get_associated_token_address_with_program_id(
            owner,
            &self.mint,
            &self.token_program,
        )
    }
}

#[async_trait]
impl ChainReader for SplMembershipReader {
    async fn read_balance(&self, owner: &WalletAddress) -> ReadResult<u64> {
        let owner = Pubkey::from_str(owner.as_str())
            .map_err(|e| ReadError::InvalidAddress(format!("{}: {}", owner, e)))?;
        let token_account = self.membership_account(&owner);
        debug!("Reading {} balance from {}", self.mint, token_account);

        let amount = match self.rpc_client.get_token_account_balance(&token_account).await {
            Ok(amount) => amount,
            Err(solana_client::client_error::ClientError {
                kind:
                    solana_client::client_error::ClientErrorKind::RpcError(
                        solana_client::rpc_request::RpcError::RpcResponseError { .. },
                    ),
                ..
            }) => return Ok(0), // No token account, no membership
            Err(e) => return Err(ReadError::SolanaRpc(e)),
        };

        amount
            .amount
            .parse::<u64>()
            .map_err(|e| ReadError::Decode(format!("token amount {}: {}", amount.amount, e)))
    }

    fn describe(&self) -> String {
        format!("spl mint {} via {}", self.mint, self.rpc_client.url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_membership_account_is_associated_token_account() {
        let mint = Pubkey::new_unique();
        let owner = Pubkey::new_unique();
        let reader = SplMembershipReader::new("http://127.0.0.1:8899".to_string(), mint);

        assert_eq!(
            reader.membership_account(&owner),
            spl_associated_token_account::get_associated_token_address(&owner, &mint)
        );
        assert!(reader.describe().contains(&mint.to_string()));
    }

    #[tokio::test]
    async fn test_evm_owner_is_rejected() {
        let reader =
            SplMembershipReader::new("http://127.0.0.1:8899".to_string(), Pubkey::new_unique());
        let owner = WalletAddress::parse("0xAA").unwrap();
        let err = reader.read_balance(&owner).await.unwrap_err();
        assert!(matches!(err, ReadError::InvalidAddress(_)));
    }
}
