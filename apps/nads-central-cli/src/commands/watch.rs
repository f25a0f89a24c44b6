use super::{open_session, print_session, state_label};
use crate::config::AppConfig;
use crate::error::CliResult;
use nads_central_gate::{GateState, Route, WalletAddress};
use nads_central_sdk::Notice;
use std::process::ExitCode;
use std::time::Duration;
use tracing::debug;

pub async fn execute(config: &AppConfig, wallet: String, interval: u64) -> CliResult<ExitCode> {
    let address = WalletAddress::parse(&wallet)?;
    let interval = interval.max(1);
    let mut session = open_session(config, Route::Landing).await?;

    println!("👀 Watching {} every {}s (Ctrl-C to stop)", address, interval);
    session.connect(address);

    let mut ticker = tokio::time::interval(Duration::from_secs(interval));
    // The first tick completes immediately
    ticker.tick().await;

    let mut last_state: Option<GateState> = None;
    let mut reported_notices = 0;

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = session.run_until_idle() => {}
        }

        let state = session.state();
        match last_state {
            None => {
                print_session(&session);
                reported_notices = session.notices().len();
            }
            Some(previous) if previous != state => {
                println!("🔄 {} at {}", state_label(state), session.location());
            }
            Some(_) => {}
        }
        last_state = Some(state);

        for notice in &session.notices()[reported_notices..] {
            match notice {
                Notice::BalanceReadFailed(error) => println!("❌ Balance read failed: {}", error),
                Notice::ProfileFailed(error) => println!("⚠️  {}", error),
            }
        }
        reported_notices = session.notices().len();

        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = ticker.tick() => {
                debug!("Refreshing balance");
                session.refresh_balance();
            }
        }
    }

    println!("👋 Stopped watching");
    Ok(ExitCode::SUCCESS)
}
