/*!
# Nads Central Gate

Access gating for the Nads Central membership area: a wallet must hold the
membership token to be admitted to `/members`; holders of zero tokens are sent
to `/locked`; without a wallet the user stays on the landing page.

## Pieces

- [`WalletAddress`], [`Balance`], [`Route`]: the data the gate works on
- [`decide`]: the pure decision `(account, balance) -> GateState`
- [`RouteController`]: a step function that turns wallet, balance and navigation
  events into effects (fetch balance, ensure profile, navigate) with stale-read
  and duplicate-navigation protection
- [`Supervisor`]: fault boundary with retry and return-to-landing

## Usage

```rust
use nads_central_gate::{
    BalanceObservation, Effect, GateConfig, GateEvent, GateState, Route, RouteController,
    WalletAddress,
};
use std::time::Duration;

let mut controller = RouteController::with_config(
    Route::Landing,
    GateConfig { settle_delay: Duration::ZERO },
);

let address = WalletAddress::parse("0xAA").unwrap();
let effects = controller.handle(GateEvent::AccountChanged(Some(address)));
assert_eq!(controller.state(), GateState::Verifying);

let ticket = effects
    .iter()
    .find_map(|effect| match effect {
        Effect::FetchBalance { ticket, .. } => Some(*ticket),
        _ => None,
    })
    .unwrap();

let effects = controller.handle(GateEvent::BalanceObserved {
    ticket,
    observation: BalanceObservation::Loaded(1),
});
assert_eq!(effects, vec![Effect::Navigate(Route::Members)]);
```
*/

pub mod account;
pub mod controller;
pub mod decision;
pub mod errors;
pub mod route;
pub mod supervisor;

pub use account::{account_from_provider, Balance, BalanceObservation, WalletAddress};
pub use controller::{
    Effect, GateConfig, GateEvent, GateView, NavTicket, ReadTicket, RouteController,
    DEFAULT_SETTLE_DELAY,
};
pub use decision::{decide, GateState};
pub use errors::{AddressError, AddressResult};
pub use route::Route;
pub use supervisor::{BoundaryScope, Fallback, FallbackAction, Rendered, Supervisor};
