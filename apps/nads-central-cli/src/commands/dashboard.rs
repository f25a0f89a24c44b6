use super::{exit_code_for, open_session, print_session};
use crate::config::AppConfig;
use crate::error::CliResult;
use nads_central_gate::{GateState, Route, WalletAddress};
use nads_central_sdk::{Dashboard, ViewState};
use std::fmt::Display;
use std::process::ExitCode;

pub async fn execute(config: &AppConfig, wallet: String) -> CliResult<ExitCode> {
    let address = WalletAddress::parse(&wallet)?;
    let mut session = open_session(config, Route::Members).await?;

    session.connect(address);
    session.run_until_idle().await;
    print_session(&session);

    if session.state() != GateState::Members {
        println!("🔒 The members dashboard requires the membership token");
        return Ok(exit_code_for(session.state()));
    }

    let dashboard = session.dashboard().await?;
    print_dashboard(&dashboard);
    Ok(ExitCode::SUCCESS)
}

fn print_dashboard(dashboard: &Dashboard) {
    println!("\n📊 Dashboard");

    print_view("Stats", &dashboard.stats, |stats| match stats {
        Some(stats) => {
            println!(
                "   Points: {} (earned {}, spent {})",
                stats.current_points, stats.total_earned, stats.total_spent
            );
            println!("   Today: {} points", stats.daily_points);
            println!(
                "   Streak: {} days (longest {})",
                stats.current_streak, stats.longest_streak
            );
            if let Some(date) = stats.last_interaction_date {
                println!("   Last active: {}", date);
            }
        }
        None => println!("   No activity yet"),
    });

    print_view("Rank", &dashboard.rank, |rank| match rank {
        Some(rank) => println!("   #{}", rank),
        None => println!("   Unranked"),
    });

    print_view("Available quests", &dashboard.available_quests, |count| {
        println!("   {}", count)
    });

    print_view("Recent activity", &dashboard.quest_history, |history| {
        if history.is_empty() {
            println!("   No quests completed");
        }
        for interaction in history.iter().take(10) {
            println!(
                "   {}  quest #{} {} (+{} points)",
                interaction.completed_at.format("%Y-%m-%d %H:%M"),
                interaction.quest_id,
                interaction.interaction_type,
                interaction.points_earned
            );
        }
    });
}

fn print_view<T>(title: impl Display, view: &ViewState<T>, ready: impl FnOnce(&T)) {
    println!("\n{}:", title);
    match view {
        ViewState::Ready(value) => ready(value),
        ViewState::Failed(error) => println!("   ⚠️  Could not load: {}", error),
    }
}
