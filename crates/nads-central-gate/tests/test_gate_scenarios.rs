use nads_central_gate::{
    decide, Balance, BalanceObservation, Effect, GateConfig, GateEvent, GateState, ReadTicket,
    Route, RouteController, WalletAddress,
};
use std::time::Duration;

fn controller_at(location: Route) -> RouteController {
    RouteController::with_config(
        location,
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

fn navigations(effects: &[Effect]) -> Vec<Route> {
    effects
        .iter()
        .filter_map(|effect| match effect {
            Effect::Navigate(route) => Some(*route),
            _ => None,
        })
        .collect()
}

#[test]
fn test_every_account_balance_combination() {
    let address = WalletAddress::parse("0xAA").unwrap();
    let accounts = [None, Some(&address)];
    let balances = [
        Balance::NotLoaded,
        Balance::Loaded(0),
        Balance::Loaded(1),
        Balance::Loaded(u64::MAX),
        Balance::Failed("provider error".to_string()),
    ];

    for account in accounts {
        for balance in &balances {
            let expected = match (account, balance) {
                (None, _) => GateState::Landing,
                (Some(_), Balance::Loaded(0)) => GateState::Locked,
                (Some(_), Balance::Loaded(_)) => GateState::Members,
                (Some(_), _) => GateState::Verifying,
            };
            assert_eq!(
                decide(account, balance),
                expected,
                "account={:?} balance={:?}",
                account,
                balance
            );
        }
    }
}

#[test]
fn test_connect_locked_then_token_acquired() {
    let mut controller = controller_at(Route::Landing);
    let mut seen = Vec::new();

    let effects = controller.handle(GateEvent::AccountChanged(Some(
        WalletAddress::parse("0xAA").unwrap(),
    )));
    assert_eq!(controller.state(), GateState::Verifying);
    assert!(effects.iter().any(|effect| matches!(
        effect,
        Effect::EnsureProfile { address, .. } if address.profile_key() == "0xaa"
    )));

    let effects = controller.handle(GateEvent::BalanceObserved {
        ticket: fetch_ticket(&effects),
        observation: BalanceObservation::Loaded(0),
    });
    seen.extend(navigations(&effects));
    assert_eq!(controller.state(), GateState::Locked);

    let effects = controller.handle(GateEvent::RefreshRequested);
    let effects = controller.handle(GateEvent::BalanceObserved {
        ticket: fetch_ticket(&effects),
        observation: BalanceObservation::Loaded(2),
    });
    seen.extend(navigations(&effects));

    assert_eq!(controller.state(), GateState::Members);
    assert_eq!(seen, vec![Route::Locked, Route::Members]);
}

#[test]
fn test_cold_load_holder_never_sees_locked() {
    let mut controller = controller_at(Route::Members);
    let mut states = vec![controller.state()];

    let effects = controller.handle(GateEvent::AccountChanged(Some(
        WalletAddress::parse("0xHolder").unwrap(),
    )));
    states.push(controller.state());

    let effects = controller.handle(GateEvent::BalanceObserved {
        ticket: fetch_ticket(&effects),
        observation: BalanceObservation::Loaded(5),
    });
    states.push(controller.state());

    assert_eq!(
        states,
        vec![GateState::Landing, GateState::Verifying, GateState::Members]
    );
    // Already on /members, nothing to navigate
    assert!(navigations(&effects).is_empty());
}

#[test]
fn test_switch_accounts_mid_flight() {
    let mut controller = controller_at(Route::Landing);

    let first = controller.handle(GateEvent::AccountChanged(Some(
        WalletAddress::parse("0xA").unwrap(),
    )));
    let second = controller.handle(GateEvent::AccountChanged(Some(
        WalletAddress::parse("0xB").unwrap(),
    )));

    let stale = controller.handle(GateEvent::BalanceObserved {
        ticket: fetch_ticket(&first),
        observation: BalanceObservation::Loaded(10),
    });
    assert!(stale.is_empty());
    assert_eq!(controller.state(), GateState::Verifying);

    let effects = controller.handle(GateEvent::BalanceObserved {
        ticket: fetch_ticket(&second),
        observation: BalanceObservation::Loaded(0),
    });
    assert_eq!(navigations(&effects), vec![Route::Locked]);
}

#[test]
fn test_disconnect_from_any_state_lands() {
    for balance in [0u64, 3] {
        let mut controller = controller_at(Route::Landing);
        let effects = controller.handle(GateEvent::AccountChanged(Some(
            WalletAddress::parse("0xAA").unwrap(),
        )));
        controller.handle(GateEvent::BalanceObserved {
            ticket: fetch_ticket(&effects),
            observation: BalanceObservation::Loaded(balance),
        });

        let effects = controller.handle(GateEvent::AccountChanged(None));
        assert!(effects.contains(&Effect::ClearProfile));
        assert_eq!(navigations(&effects), vec![Route::Landing]);
        assert_eq!(controller.state(), GateState::Landing);
    }
}
