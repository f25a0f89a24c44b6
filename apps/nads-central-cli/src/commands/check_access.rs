use super::{exit_code_for, open_session, print_fallback, print_session};
use crate::config::AppConfig;
use crate::error::{CliError, CliResult};
use nads_central_gate::{Rendered, Route, Supervisor, WalletAddress};
use nads_central_sdk::Session;
use std::process::ExitCode;

pub async fn execute(
    config: &AppConfig,
    wallet: String,
    from: String,
    attempts: u32,
) -> CliResult<ExitCode> {
    let address = WalletAddress::parse(&wallet)?;
    let location = Route::from_path(&from);
    println!("🔍 Checking access for {} from {}", address, location);

    let attempts = attempts.max(1);
    let mut supervisor = Supervisor::wallet();

    for attempt in 1..=attempts {
        match supervisor
            .run_async(settle(config, &address, location))
            .await
        {
            Rendered::View(session) => {
                print_session(&session);
                if let Some(route) = session.navigations().last() {
                    println!("➡️  Navigated to {}", route);
                }
                return Ok(exit_code_for(session.state()));
            }
            Rendered::Fallback(fallback) => {
                print_fallback(&fallback);
                if attempt < attempts {
                    println!("🔁 Retrying ({}/{})", attempt + 1, attempts);
                    supervisor.retry();
                } else {
                    let route = supervisor.return_to_landing();
                    println!("↩️  Returned to {}", route);
                }
            }
        }
    }

    Ok(ExitCode::FAILURE)
}

/// Connect the wallet and wait until the gate has nothing left to do
async fn settle(
    config: &AppConfig,
    address: &WalletAddress,
    location: Route,
) -> CliResult<Session> {
    let mut session = open_session(config, location).await?;
    session.connect(address.clone());
    session.run_until_idle().await;

    if let Some(error) = session.view().read_error {
        return Err(CliError::BalanceUnavailable(error));
    }
    Ok(session)
}
