use crate::{account::Balance, route::Route, WalletAddress};
use serde::{Deserialize, Serialize};

/// Where the gate currently places the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GateState {
    Landing,
    /// Account present, balance not settled yet
    Verifying,
    Members,
    Locked,
}

impl GateState {
    /// Route this state navigates to; `Verifying` stays where it is
    pub fn destination(&self) -> Option<Route> {
        match self {
            GateState::Landing => Some(Route::Landing),
            GateState::Verifying => None,
            GateState::Members => Some(Route::Members),
            GateState::Locked => Some(Route::Locked),
        }
    }
}

/// The access decision
///
/// A read failure never admits: it is shown as `Verifying` until a balance
/// settles.
pub fn decide(account: Option<&WalletAddress>, balance: &Balance) -> GateState {
    match (account, balance) {
        (None, _) => GateState::Landing,
        (Some(_), Balance::NotLoaded | Balance::Failed(_)) => GateState::Verifying,
        (Some(_), Balance::Loaded(0)) => GateState::Locked,
        (Some(_), Balance::Loaded(_)) => GateState::Members,
    }
}
