use super::print_profile;
use crate::config::AppConfig;
use crate::error::CliResult;
use nads_central_gate::WalletAddress;
use nads_central_store::{ensure_profile, update_profile, ProfileUpdate};
use std::process::ExitCode;

pub async fn show(config: &AppConfig, wallet: String) -> CliResult<ExitCode> {
    let address = WalletAddress::parse(&wallet)?;
    let store = config.backend.connect().await?;

    println!("🔍 Looking up profile for {}", address);
    match store.find_profile_by_address(&address).await? {
        Some(profile) => {
            print_profile(&profile);
            Ok(ExitCode::SUCCESS)
        }
        None => {
            println!("❌ No profile for {}", address);
            println!("   A profile is created the first time the wallet connects.");
            Ok(ExitCode::FAILURE)
        }
    }
}

pub async fn update(
    config: &AppConfig,
    wallet: String,
    username: Option<String>,
    avatar_url: Option<String>,
) -> CliResult<ExitCode> {
    let address = WalletAddress::parse(&wallet)?;
    let update = ProfileUpdate {
        username,
        avatar_url,
    };
    // Reject blank edits before touching the backend
    update.clone().into_patch()?;

    let store = config.backend.connect().await?;
    let profile = ensure_profile(&*store, &address).await?;
    let updated = update_profile(&*store, &profile.id, update).await?;

    println!("✅ Profile updated");
    print_profile(&updated);
    Ok(ExitCode::SUCCESS)
}
