pub mod check_access;
pub mod dashboard;
pub mod leaderboard;
pub mod migrate;
pub mod profile;
pub mod watch;

use crate::config::AppConfig;
use crate::error::CliResult;
use nads_central_gate::{Fallback, FallbackAction, GateState, GateView, Route, WalletAddress};
use nads_central_sdk::{ProfileState, Session};
use nads_central_store::Profile;
use std::process::ExitCode;

/// Exit status when the wallet is not admitted
pub const EXIT_NOT_ADMITTED: u8 = 2;

pub async fn open_session(config: &AppConfig, location: Route) -> CliResult<Session> {
    let reader = config.chain.build_reader()?;
    println!("🌐 Chain: {}", reader.describe());
    let store = config.backend.connect().await?;
    println!("🗄️  Backend: {}", store.describe());
    Ok(Session::new(reader, store, location, config.session_config()))
}

pub fn state_label(state: GateState) -> &'static str {
    match state {
        GateState::Landing => "🏠 Landing (no wallet)",
        GateState::Verifying => "⏳ Verifying",
        GateState::Members => "✅ Member",
        GateState::Locked => "🔒 Locked",
    }
}

pub fn exit_status(state: GateState) -> u8 {
    match state {
        GateState::Members => 0,
        _ => EXIT_NOT_ADMITTED,
    }
}

pub fn exit_code_for(state: GateState) -> ExitCode {
    ExitCode::from(exit_status(state))
}

pub fn print_profile(profile: &Profile) {
    println!("👤 Profile: {}", profile.display_name());
    println!("   Id: {}", profile.id);
    println!("   Wallet: {}", profile.wallet_address);
    if let Some(avatar_url) = &profile.avatar_url {
        println!("   Avatar: {}", avatar_url);
    }
    println!("   Member since: {}", profile.created_at.format("%Y-%m-%d %H:%M UTC"));
}

pub fn print_session(session: &Session) {
    for line in session_report(&session.view(), session.profile()) {
        println!("{}", line);
    }
    if let ProfileState::Ready(profile) = session.profile() {
        print_profile(profile);
    }
}

/// Route, state and any failure worth showing; a ready profile is printed separately
fn session_report(view: &GateView, profile: &ProfileState) -> Vec<String> {
    let mut lines = vec![
        format!("📍 Route: {}", view.location),
        format!("   State: {}", state_label(view.state)),
    ];
    if let Some(error) = &view.read_error {
        lines.push(format!("❌ Balance read failed: {}", error));
    }
    match profile {
        ProfileState::Failed(error) => lines.push(format!("⚠️  Profile unavailable: {}", error)),
        ProfileState::Loading => lines.push("⏳ Profile loading".to_string()),
        ProfileState::Ready(_) | ProfileState::Absent => {}
    }
    lines
}

pub fn print_fallback(fallback: &Fallback) {
    println!("❌ {}", fallback.title);
    println!("   {}", fallback.message);
    println!("   Details: {}", fallback.detail);
    let actions: Vec<&str> = fallback
        .actions
        .iter()
        .map(|action| match action {
            FallbackAction::Retry => "retry",
            FallbackAction::ReturnToLanding => "return to /",
        })
        .collect();
    println!("   Options: {}", actions.join(", "));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_members_exit_cleanly() {
        assert_eq!(exit_status(GateState::Members), 0);
        for state in [GateState::Landing, GateState::Verifying, GateState::Locked] {
            assert_eq!(exit_status(state), EXIT_NOT_ADMITTED);
        }
    }

    #[test]
    fn test_profile_failure_reported_once() {
        let view = GateView {
            state: GateState::Locked,
            location: Route::Locked,
            account: Some(WalletAddress::parse("0xAA").unwrap()),
            read_error: None,
            navigation_pending: false,
        };
        let lines = session_report(
            &view,
            &ProfileState::Failed("backend unavailable".to_string()),
        );

        assert_eq!(
            lines
                .iter()
                .filter(|line| line.contains("backend unavailable"))
                .count(),
            1
        );
        assert_eq!(lines[0], "📍 Route: /locked");
    }
}
