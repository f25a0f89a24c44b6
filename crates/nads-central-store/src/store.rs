use crate::{
    error::StoreResult,
    types::{DailyStats, LeaderboardEntry, Profile, ProfilePatch, QuestInteraction},
};
use async_trait::async_trait;
use nads_central_gate::WalletAddress;

/// Row store holding member profiles
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// Case-insensitive lookup; at most one row matches
    async fn find_profile_by_address(&self, address: &WalletAddress)
        -> StoreResult<Option<Profile>>;

    /// Create a profile with the lowercased address and no optional fields.
    /// Fails with `UniqueViolation` when the address already has a row.
    async fn insert_profile(&self, address: &WalletAddress) -> StoreResult<Profile>;

    /// Apply `patch` to the profile `id`; `None` when the row is gone
    async fn update_profile(&self, id: &str, patch: &ProfilePatch)
        -> StoreResult<Option<Profile>>;
}

/// Read-only projections maintained by the backend.
/// Addresses are matched on their lowercased form.
#[async_trait]
pub trait StatsStore: Send + Sync {
    async fn daily_stats(&self, address: &WalletAddress) -> StoreResult<Option<DailyStats>>;

    /// Newest first
    async fn quest_interactions(&self, address: &WalletAddress)
        -> StoreResult<Vec<QuestInteraction>>;

    /// Interactions whose status is `available`, across all wallets
    async fn available_quest_count(&self) -> StoreResult<u64>;

    /// Top wallets by current points
    async fn leaderboard(&self, limit: u64) -> StoreResult<Vec<LeaderboardEntry>>;

    /// One plus the number of wallets with strictly more points;
    /// `None` when the wallet has no stats yet
    async fn leaderboard_rank(&self, address: &WalletAddress) -> StoreResult<Option<u32>>;
}

/// A complete backend
pub trait Backend: ProfileStore + StatsStore {
    fn describe(&self) -> String;
}
