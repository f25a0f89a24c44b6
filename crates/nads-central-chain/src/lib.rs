/*!
# Nads Central Chain

Reads how many membership tokens a wallet holds.

- [`Erc721BalanceReader`]: `balanceOf` on an ERC-721 contract over EVM JSON-RPC
  (the default target is the Nads collection on Monad testnet)
- [`SplMembershipReader`]: the owner's associated token account for an SPL mint
- [`BalanceFetcher`]: per-attempt timeout plus bounded exponential-backoff
  retries around any [`ChainReader`]

```rust,no_run
use nads_central_chain::{BalanceFetcher, ChainTarget};
use nads_central_gate::WalletAddress;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let reader = ChainTarget::default().build_reader()?;
let fetcher = BalanceFetcher::new(reader);

let owner = WalletAddress::parse("0x00000000000000000000000000000000000000aa")?;
let balance = fetcher.fetch(&owner).await?;
println!("holds {} membership tokens", balance);
# Ok(())
# }
```
*/

pub mod config;
pub mod error;
pub mod evm;
pub mod fetcher;
pub mod reader;
pub mod solana;

pub use config::{
    ChainTarget, ReadConfig, MONAD_TESTNET_CHAIN_ID, MONAD_TESTNET_RPC, NADS_MEMBERSHIP_CONTRACT,
};
pub use error::{ReadError, ReadResult};
pub use evm::Erc721BalanceReader;
pub use fetcher::BalanceFetcher;
pub use reader::ChainReader;
pub use solana::SplMembershipReader;
