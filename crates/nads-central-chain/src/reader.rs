use crate::error::ReadResult;
use async_trait::async_trait;
use nads_central_gate::WalletAddress;

/// A source of membership token balances
///
/// One call is one attempt: retries and timeouts are applied by
/// [`BalanceFetcher`](crate::BalanceFetcher).
#[async_trait]
pub trait ChainReader: Send + Sync {
    /// Number of membership tokens held by `owner`
    async fn read_balance(&self, owner: &WalletAddress) -> ReadResult<u64>;

    /// Short human-readable description for logs
    fn describe(&self) -> String;
}
