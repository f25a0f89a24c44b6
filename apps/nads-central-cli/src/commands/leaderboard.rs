use crate::config::AppConfig;
use crate::error::CliResult;
use std::process::ExitCode;

pub async fn execute(config: &AppConfig, limit: u64) -> CliResult<ExitCode> {
    let store = config.backend.connect().await?;

    println!("🏆 Leaderboard (top {})", limit);
    let entries = store.leaderboard(limit).await?;
    if entries.is_empty() {
        println!("   No members have points yet");
    }

    for entry in &entries {
        println!(
            "   #{:<4} {:<44} {:>8} points",
            entry.rank,
            entry
                .username
                .as_deref()
                .unwrap_or(&entry.wallet_address),
            entry.current_points
        );
    }

    Ok(ExitCode::SUCCESS)
}
