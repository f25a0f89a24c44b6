/*!
# Route Controller

Step function over wallet, balance and navigation events. Every call to
[`RouteController::handle`] returns the side effects the caller must perform;
the controller itself never does I/O, which keeps the whole gate testable
without a wallet, an RPC endpoint or a UI.

## Staleness

Every account change opens a new epoch. Balance reads are issued with a
[`ReadTicket`] and only the most recent outstanding ticket is applied; results
for an older account, or for a superseded read, are dropped.

## Navigation

Entering `Members` or `Locked` navigates once. The first settlement after a
connect may be delayed by [`GateConfig::settle_delay`]; the delay only decides
when the navigation fires, the computed state is updated immediately.
*/

use crate::{
    account::{Balance, BalanceObservation},
    decision::{decide, GateState},
    route::Route,
    WalletAddress,
};
use std::time::Duration;
use tracing::{debug, info, warn};

/// Default pause between a settled balance and the resulting navigation
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_millis(1500);

/// Configuration for the route controller
#[derive(Debug, Clone)]
pub struct GateConfig {
    /// Delay before the first post-connect navigation fires
    pub settle_delay: Duration,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            settle_delay: DEFAULT_SETTLE_DELAY,
        }
    }
}

/// Identifies one balance read
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ReadTicket {
    pub epoch: u64,
    pub seq: u64,
}

/// Identifies one scheduled navigation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NavTicket(pub u64);

/// Inputs to the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateEvent {
    /// The wallet connected, disconnected, or switched accounts
    AccountChanged(Option<WalletAddress>),
    /// A balance read reported back
    BalanceObserved {
        ticket: ReadTicket,
        observation: BalanceObservation,
    },
    /// Re-read the balance for the current account
    RefreshRequested,
    /// The user (or the router) landed on a route
    Visited(Route),
    /// A scheduled navigation's delay has passed
    SettleElapsed(NavTicket),
}

/// Side effects requested by the controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    FetchBalance {
        ticket: ReadTicket,
        owner: WalletAddress,
    },
    CancelBalanceFetch,
    EnsureProfile {
        epoch: u64,
        address: WalletAddress,
    },
    ClearProfile,
    ScheduleNavigation {
        ticket: NavTicket,
        to: Route,
        after: Duration,
    },
    CancelScheduledNavigation,
    Navigate(Route),
    SurfaceReadError {
        message: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingNavigation {
    ticket: NavTicket,
    to: Route,
}

/// Snapshot of the gate for rendering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GateView {
    pub state: GateState,
    pub location: Route,
    pub account: Option<WalletAddress>,
    /// Set once balance reads have failed for good
    pub read_error: Option<String>,
    /// A delayed navigation is waiting to fire
    pub navigation_pending: bool,
}

/// Re-entrant access-gating state machine
#[derive(Debug)]
pub struct RouteController {
    config: GateConfig,
    account: Option<WalletAddress>,
    balance: Balance,
    state: GateState,
    location: Route,
    epoch: u64,
    read_seq: u64,
    outstanding_read: Option<ReadTicket>,
    pending_navigation: Option<PendingNavigation>,
    next_nav_ticket: u64,
    read_error: Option<String>,
    error_surfaced: bool,
}

impl RouteController {
    /// Create a controller with default configuration, starting at `location`
    pub fn new(location: Route) -> Self {
        Self::with_config(location, GateConfig::default())
    }

    pub fn with_config(location: Route, config: GateConfig) -> Self {
        Self {
            config,
            account: None,
            balance: Balance::NotLoaded,
            state: GateState::Landing,
            location,
            epoch: 0,
            read_seq: 0,
            outstanding_read: None,
            pending_navigation: None,
            next_nav_ticket: 0,
            read_error: None,
            error_surfaced: false,
        }
    }

    pub fn state(&self) -> GateState {
        self.state
    }

    pub fn location(&self) -> Route {
        self.location
    }

    pub fn account(&self) -> Option<&WalletAddress> {
        self.account.as_ref()
    }

    pub fn balance(&self) -> &Balance {
        &self.balance
    }

    /// Current account epoch; bumped on every account change
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn view(&self) -> GateView {
        GateView {
            state: self.state,
            location: self.location,
            account: self.account.clone(),
            read_error: self.read_error.clone().filter(|_| self.error_surfaced),
            navigation_pending: self.pending_navigation.is_some(),
        }
    }

    /// Apply one event and return the effects to perform, in order
    pub fn handle(&mut self, event: GateEvent) -> Vec<Effect> {
        let previous = self.state;
        let mut effects = Vec::new();

        match event {
            GateEvent::AccountChanged(account) => {
                if account == self.account {
                    debug!("Account unchanged, nothing to re-evaluate");
                    return effects;
                }
                self.switch_account(account, &mut effects);
            }
            GateEvent::BalanceObserved {
                ticket,
                observation,
            } => {
                if self.outstanding_read != Some(ticket) {
                    debug!(
                        "Discarding stale balance read (epoch {}, seq {}); current epoch {}",
                        ticket.epoch, ticket.seq, self.epoch
                    );
                    return effects;
                }
                self.observe_balance(ticket, observation, &mut effects);
            }
            GateEvent::RefreshRequested => {
                let Some(owner) = self.account.clone() else {
                    return effects;
                };
                if self.outstanding_read.is_some() {
                    debug!("Balance read already in flight, refresh coalesced");
                    return effects;
                }
                self.error_surfaced = false;
                let ticket = self.next_read_ticket();
                effects.push(Effect::FetchBalance { ticket, owner });
            }
            GateEvent::Visited(route) => {
                debug!("Visited {}", route);
                self.location = route;
            }
            GateEvent::SettleElapsed(ticket) => {
                match self.pending_navigation {
                    Some(pending) if pending.ticket == ticket => {
                        self.pending_navigation = None;
                        if self.location != pending.to {
                            self.navigate(pending.to, &mut effects);
                        }
                    }
                    _ => debug!("Ignoring elapsed navigation ticket {}", ticket.0),
                }
                return effects;
            }
        }

        self.reevaluate(previous, &mut effects);
        effects
    }

    fn switch_account(&mut self, account: Option<WalletAddress>, effects: &mut Vec<Effect>) {
        self.epoch += 1;
        self.balance = Balance::NotLoaded;
        self.read_error = None;
        self.error_surfaced = false;

        if self.outstanding_read.take().is_some() {
            effects.push(Effect::CancelBalanceFetch);
        }
        if self.pending_navigation.take().is_some() {
            effects.push(Effect::CancelScheduledNavigation);
        }

        match &account {
            None => {
                info!("Wallet disconnected");
                effects.push(Effect::ClearProfile);
            }
            Some(address) => {
                info!("Wallet connected: {}", address);
                effects.push(Effect::EnsureProfile {
                    epoch: self.epoch,
                    address: address.clone(),
                });
                let ticket = self.next_read_ticket();
                effects.push(Effect::FetchBalance {
                    ticket,
                    owner: address.clone(),
                });
            }
        }

        self.account = account;
    }

    fn observe_balance(
        &mut self,
        ticket: ReadTicket,
        observation: BalanceObservation,
        effects: &mut Vec<Effect>,
    ) {
        match observation {
            BalanceObservation::Loaded(amount) => {
                debug!("Balance settled at {} (seq {})", amount, ticket.seq);
                self.outstanding_read = None;
                self.balance = Balance::Loaded(amount);
                self.read_error = None;
                self.error_surfaced = false;
            }
            BalanceObservation::Failed {
                message,
                retrying: true,
            } => {
                debug!("Balance read attempt failed, retrying: {}", message);
                self.read_error = Some(message);
            }
            BalanceObservation::Failed {
                message,
                retrying: false,
            } => {
                self.outstanding_read = None;
                if !self.balance.is_settled() {
                    self.balance = Balance::Failed(message.clone());
                }
                self.read_error = Some(message.clone());
                if !self.error_surfaced {
                    warn!("Balance read failed: {}", message);
                    self.error_surfaced = true;
                    effects.push(Effect::SurfaceReadError { message });
                }
            }
        }
    }

    fn reevaluate(&mut self, previous: GateState, effects: &mut Vec<Effect>) {
        let next = decide(self.account.as_ref(), &self.balance);
        if next != previous {
            info!("Gate {:?} -> {:?}", previous, next);
        }
        self.state = next;

        let target = match next.destination() {
            Some(target) if self.location.is_gated() => target,
            _ => {
                self.cancel_pending(effects);
                return;
            }
        };

        if target == self.location {
            self.cancel_pending(effects);
            return;
        }

        if let Some(pending) = self.pending_navigation {
            if pending.to == target {
                return;
            }
            self.cancel_pending(effects);
        }

        // Only the landing page waits before leaving; other routes redirect at once
        let first_settlement = previous == GateState::Verifying
            && target != Route::Landing
            && self.location == Route::Landing;
        if first_settlement && !self.config.settle_delay.is_zero() {
            let ticket = NavTicket(self.next_nav_ticket);
            self.next_nav_ticket += 1;
            self.pending_navigation = Some(PendingNavigation { ticket, to: target });
            effects.push(Effect::ScheduleNavigation {
                ticket,
                to: target,
                after: self.config.settle_delay,
            });
        } else {
            self.navigate(target, effects);
        }
    }

    fn navigate(&mut self, to: Route, effects: &mut Vec<Effect>) {
        info!("Navigating {} -> {}", self.location, to);
        self.location = to;
        effects.push(Effect::Navigate(to));
    }

    fn cancel_pending(&mut self, effects: &mut Vec<Effect>) {
        if self.pending_navigation.take().is_some() {
            effects.push(Effect::CancelScheduledNavigation);
        }
    }

    fn next_read_ticket(&mut self) -> ReadTicket {
        self.read_seq += 1;
        let ticket = ReadTicket {
            epoch: self.epoch,
            seq: self.read_seq,
        };
        self.outstanding_read = Some(ticket);
        ticket
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(raw: &str) -> WalletAddress {
        WalletAddress::parse(raw).unwrap()
    }

    fn immediate() -> RouteController {
        RouteController::with_config(
            Route::Landing,
            GateConfig {
                settle_delay: Duration::ZERO,
            },
        )
    }

    fn fetch_ticket(effects: &[Effect]) -> ReadTicket {
        effects
            .iter()
            .find_map(|effect| match effect {
                Effect::FetchBalance { ticket, .. } => Some(*ticket),
                _ => None,
            })
            .expect("expected a FetchBalance effect")
    }

    fn loaded(ticket: ReadTicket, amount: u64) -> GateEvent {
        GateEvent::BalanceObserved {
            ticket,
            observation: BalanceObservation::Loaded(amount),
        }
    }

    #[test]
    fn test_connect_requests_profile_and_balance() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));

        assert_eq!(controller.state(), GateState::Verifying);
        assert_eq!(effects.len(), 2);
        assert!(matches!(&effects[0], Effect::EnsureProfile { epoch: 1, address } if address.as_str() == "0xAA"));
        assert!(matches!(&effects[1], Effect::FetchBalance { owner, .. } if owner.as_str() == "0xAA"));
        assert_eq!(controller.location(), Route::Landing);
    }

    #[test]
    fn test_same_account_is_noop() {
        let mut controller = immediate();
        controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        assert!(effects.is_empty());
        assert_eq!(controller.epoch(), 1);
    }

    #[test]
    fn test_settled_balance_routes() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let effects = controller.handle(loaded(fetch_ticket(&effects), 0));
        assert_eq!(effects, vec![Effect::Navigate(Route::Locked)]);
        assert_eq!(controller.state(), GateState::Locked);

        let effects = controller.handle(GateEvent::RefreshRequested);
        let effects = controller.handle(loaded(fetch_ticket(&effects), 2));
        assert_eq!(effects, vec![Effect::Navigate(Route::Members)]);
        assert_eq!(controller.location(), Route::Members);
    }

    #[test]
    fn test_members_evicted_when_balance_drops() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        controller.handle(loaded(fetch_ticket(&effects), 1));
        assert_eq!(controller.location(), Route::Members);

        let effects = controller.handle(GateEvent::RefreshRequested);
        let effects = controller.handle(loaded(fetch_ticket(&effects), 0));
        assert_eq!(effects, vec![Effect::Navigate(Route::Locked)]);
    }

    #[test]
    fn test_stale_read_is_discarded() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let stale = fetch_ticket(&effects);

        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xBB"))));
        assert!(effects.contains(&Effect::CancelBalanceFetch));
        let current = fetch_ticket(&effects);

        assert!(controller.handle(loaded(stale, 5)).is_empty());
        assert_eq!(controller.state(), GateState::Verifying);

        controller.handle(loaded(current, 0));
        assert_eq!(controller.state(), GateState::Locked);
    }

    #[test]
    fn test_no_repeat_navigation_on_same_balance() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        controller.handle(loaded(fetch_ticket(&effects), 4));

        for _ in 0..3 {
            let effects = controller.handle(GateEvent::RefreshRequested);
            let effects = controller.handle(loaded(fetch_ticket(&effects), 4));
            assert!(effects.is_empty());
        }
        assert_eq!(controller.location(), Route::Members);
    }

    #[test]
    fn test_refresh_coalesces_while_in_flight() {
        let mut controller = immediate();
        controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        assert!(controller.handle(GateEvent::RefreshRequested).is_empty());
    }

    #[test]
    fn test_disconnect_wins() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        controller.handle(loaded(fetch_ticket(&effects), 1));
        controller.handle(GateEvent::RefreshRequested);

        let effects = controller.handle(GateEvent::AccountChanged(None));
        assert_eq!(
            effects,
            vec![
                Effect::CancelBalanceFetch,
                Effect::ClearProfile,
                Effect::Navigate(Route::Landing)
            ]
        );
        assert_eq!(controller.state(), GateState::Landing);
    }

    #[test]
    fn test_settle_delay_schedules_first_navigation() {
        let mut controller = RouteController::new(Route::Landing);
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let effects = controller.handle(loaded(fetch_ticket(&effects), 3));

        let ticket = match effects.as_slice() {
            [Effect::ScheduleNavigation { ticket, to, after }] => {
                assert_eq!(*to, Route::Members);
                assert_eq!(*after, DEFAULT_SETTLE_DELAY);
                *ticket
            }
            other => panic!("unexpected effects: {:?}", other),
        };
        assert_eq!(controller.state(), GateState::Members);
        assert_eq!(controller.location(), Route::Landing);
        assert!(controller.view().navigation_pending);

        assert!(controller.handle(GateEvent::SettleElapsed(NavTicket(ticket.0 + 7))).is_empty());
        let effects = controller.handle(GateEvent::SettleElapsed(ticket));
        assert_eq!(effects, vec![Effect::Navigate(Route::Members)]);
        assert!(controller.handle(GateEvent::SettleElapsed(ticket)).is_empty());
    }

    #[test]
    fn test_settle_delay_only_on_landing() {
        let mut controller = RouteController::new(Route::Members);
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let effects = controller.handle(loaded(fetch_ticket(&effects), 0));

        assert_eq!(effects, vec![Effect::Navigate(Route::Locked)]);
        assert_eq!(controller.location(), Route::Locked);
        assert!(!controller.view().navigation_pending);
    }

    #[test]
    fn test_switch_to_non_holder_on_members_redirects_at_once() {
        let mut controller = RouteController::new(Route::Members);
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xA"))));
        let effects = controller.handle(loaded(fetch_ticket(&effects), 4));
        assert!(effects.is_empty());
        assert_eq!(controller.state(), GateState::Members);

        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xB"))));
        let effects = controller.handle(loaded(fetch_ticket(&effects), 0));
        assert_eq!(effects, vec![Effect::Navigate(Route::Locked)]);
        assert_eq!(
            controller.view(),
            GateView {
                state: GateState::Locked,
                location: Route::Locked,
                account: Some(address("0xB")),
                read_error: None,
                navigation_pending: false,
            }
        );
    }

    #[test]
    fn test_disconnect_cancels_scheduled_navigation() {
        let mut controller = RouteController::new(Route::Landing);
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let effects = controller.handle(loaded(fetch_ticket(&effects), 0));
        let ticket = match effects.as_slice() {
            [Effect::ScheduleNavigation { ticket, .. }] => *ticket,
            other => panic!("unexpected effects: {:?}", other),
        };

        let effects = controller.handle(GateEvent::AccountChanged(None));
        assert!(effects.contains(&Effect::CancelScheduledNavigation));
        assert!(controller.handle(GateEvent::SettleElapsed(ticket)).is_empty());
        assert_eq!(controller.location(), Route::Landing);
    }

    #[test]
    fn test_failed_read_surfaces_once() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let ticket = fetch_ticket(&effects);

        let effects = controller.handle(GateEvent::BalanceObserved {
            ticket,
            observation: BalanceObservation::Failed {
                message: "timeout".to_string(),
                retrying: true,
            },
        });
        assert!(effects.is_empty());
        assert_eq!(controller.view().read_error, None);

        let effects = controller.handle(GateEvent::BalanceObserved {
            ticket,
            observation: BalanceObservation::Failed {
                message: "retries exhausted".to_string(),
                retrying: false,
            },
        });
        assert_eq!(
            effects,
            vec![Effect::SurfaceReadError {
                message: "retries exhausted".to_string()
            }]
        );
        assert_eq!(controller.state(), GateState::Verifying);
        assert_eq!(
            controller.view().read_error.as_deref(),
            Some("retries exhausted")
        );
    }

    #[test]
    fn test_failed_reread_keeps_settled_balance() {
        let mut controller = immediate();
        let effects = controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        controller.handle(loaded(fetch_ticket(&effects), 2));

        let effects = controller.handle(GateEvent::RefreshRequested);
        controller.handle(GateEvent::BalanceObserved {
            ticket: fetch_ticket(&effects),
            observation: BalanceObservation::Failed {
                message: "rpc down".to_string(),
                retrying: false,
            },
        });
        assert_eq!(controller.balance(), &Balance::Loaded(2));
        assert_eq!(controller.state(), GateState::Members);
    }

    #[test]
    fn test_visiting_gated_route_without_account_redirects() {
        let mut controller = immediate();
        controller.handle(GateEvent::Visited(Route::Members));
        assert_eq!(controller.location(), Route::Landing);

        let effects = controller.handle(GateEvent::Visited(Route::NotFound));
        assert!(effects.is_empty());
        assert_eq!(controller.location(), Route::NotFound);
    }

    #[test]
    fn test_verifying_stays_on_current_route() {
        let mut controller = immediate();
        controller.handle(GateEvent::AccountChanged(Some(address("0xAA"))));
        let effects = controller.handle(GateEvent::Visited(Route::Locked));
        assert!(!effects.iter().any(|e| matches!(e, Effect::Navigate(_))));
        assert_eq!(controller.state(), GateState::Verifying);
        assert_eq!(controller.location(), Route::Locked);
    }
}
