/*!
# Nads Central SDK

A [`Session`] is one user's view of Nads Central: the connected wallet, the
gate decision for it, its profile, and the dashboard reads.

```rust,no_run
use nads_central_chain::ChainTarget;
use nads_central_gate::{Route, WalletAddress};
use nads_central_sdk::{Session, SessionConfig};
use nads_central_store::BackendTarget;

# async fn example() -> Result<(), Box<dyn std::error::Error>> {
let reader = ChainTarget::default().build_reader()?;
let store = BackendTarget::Memory.connect().await?;
let mut session = Session::new(reader, store, Route::Landing, SessionConfig::default());

session.connect(WalletAddress::parse("0x00000000000000000000000000000000000000aa")?);
session.run_until_idle().await;
println!("{:?} at {}", session.state(), session.location());
# Ok(())
# }
```
*/

pub mod dashboard;
pub mod error;
pub mod session;

pub use dashboard::{load_dashboard, Dashboard, ViewState};
pub use error::{SessionError, SessionResult};
pub use session::{Notice, ProfileState, Session, SessionConfig};
