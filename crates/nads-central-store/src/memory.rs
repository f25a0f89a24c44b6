use crate::{
    error::{StoreError, StoreResult},
    store::{Backend, ProfileStore, StatsStore},
    types::{
        rank_entries, DailyStats, LeaderboardEntry, Profile, ProfilePatch, QuestInteraction,
        QUEST_STATUS_AVAILABLE,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use nads_central_gate::WalletAddress;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Default)]
struct Tables {
    profiles: Vec<Profile>,
    daily_stats: Vec<DailyStats>,
    quest_interactions: Vec<QuestInteraction>,
}

/// Process-local backend for demos and tests
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn profile_count(&self) -> usize {
        self.tables.lock().await.profiles.len()
    }

    /// Insert or replace the stats row for `stats.wallet_address`
    pub async fn put_daily_stats(&self, mut stats: DailyStats) {
        stats.wallet_address = stats.wallet_address.to_ascii_lowercase();
        let mut tables = self.tables.lock().await;
        tables
            .daily_stats
            .retain(|row| row.wallet_address != stats.wallet_address);
        tables.daily_stats.push(stats);
    }

    pub async fn push_quest_interaction(&self, mut interaction: QuestInteraction) {
        interaction.wallet_address = interaction.wallet_address.to_ascii_lowercase();
        self.tables.lock().await.quest_interactions.push(interaction);
    }
}

#[async_trait]
impl ProfileStore for MemoryStore {
    async fn find_profile_by_address(
        &self,
        address: &WalletAddress,
    ) -> StoreResult<Option<Profile>> {
        let key = address.profile_key();
        let tables = self.tables.lock().await;
        Ok(tables
            .profiles
            .iter()
            .find(|profile| profile.wallet_address.eq_ignore_ascii_case(&key))
            .cloned())
    }

    async fn insert_profile(&self, address: &WalletAddress) -> StoreResult<Profile> {
        let key = address.profile_key();
        let mut tables = self.tables.lock().await;
        if tables.profiles.iter().any(|profile| profile.wallet_address == key) {
            return Err(StoreError::UniqueViolation(key));
        }

        let now = Utc::now();
        let profile = Profile {
            id: Uuid::new_v4().to_string(),
            wallet_address: key,
            username: None,
            avatar_url: None,
            created_at: now,
            updated_at: now,
        };
        tables.profiles.push(profile.clone());
        Ok(profile)
    }

    async fn update_profile(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> StoreResult<Option<Profile>> {
        let mut tables = self.tables.lock().await;
        let Some(profile) = tables.profiles.iter_mut().find(|profile| profile.id == id) else {
            return Ok(None);
        };

        if let Some(username) = patch.username() {
            profile.username = Some(username.to_string());
        }
        if let Some(avatar_url) = patch.avatar_url() {
            profile.avatar_url = Some(avatar_url.to_string());
        }
        profile.updated_at = Utc::now();
        Ok(Some(profile.clone()))
    }
}

#[async_trait]
impl StatsStore for MemoryStore {
    async fn daily_stats(&self, address: &WalletAddress) -> StoreResult<Option<DailyStats>> {
        let key = address.profile_key();
        let tables = self.tables.lock().await;
        Ok(tables
            .daily_stats
            .iter()
            .find(|row| row.wallet_address == key)
            .cloned())
    }

    async fn quest_interactions(
        &self,
        address: &WalletAddress,
    ) -> StoreResult<Vec<QuestInteraction>> {
        let key = address.profile_key();
        let tables = self.tables.lock().await;
        let mut rows: Vec<QuestInteraction> = tables
            .quest_interactions
            .iter()
            .filter(|row| row.wallet_address == key)
            .cloned()
            .collect();
        rows.sort_by(|a, b| b.completed_at.cmp(&a.completed_at));
        Ok(rows)
    }

    async fn available_quest_count(&self) -> StoreResult<u64> {
        let tables = self.tables.lock().await;
        Ok(tables
            .quest_interactions
            .iter()
            .filter(|row| row.status == QUEST_STATUS_AVAILABLE)
            .count() as u64)
    }

    async fn leaderboard(&self, limit: u64) -> StoreResult<Vec<LeaderboardEntry>> {
        let tables = self.tables.lock().await;
        let mut rows: Vec<&DailyStats> = tables.daily_stats.iter().collect();
        rows.sort_by(|a, b| {
            b.current_points
                .cmp(&a.current_points)
                .then_with(|| a.wallet_address.cmp(&b.wallet_address))
        });

        let limit = usize::try_from(limit).unwrap_or(usize::MAX);
        Ok(rank_entries(rows.into_iter().take(limit).map(|row| {
            let username = tables
                .profiles
                .iter()
                .find(|profile| profile.wallet_address == row.wallet_address)
                .and_then(|profile| profile.username.clone());
            (row.wallet_address.clone(), username, row.current_points)
        })))
    }

    async fn leaderboard_rank(&self, address: &WalletAddress) -> StoreResult<Option<u32>> {
        let key = address.profile_key();
        let tables = self.tables.lock().await;
        let Some(mine) = tables.daily_stats.iter().find(|row| row.wallet_address == key) else {
            return Ok(None);
        };
        let ahead = tables
            .daily_stats
            .iter()
            .filter(|row| row.current_points > mine.current_points)
            .count();
        Ok(Some(ahead as u32 + 1))
    }
}

impl Backend for MemoryStore {
    fn describe(&self) -> String {
        "in-memory store".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn stats(address: &str, points: i64) -> DailyStats {
        DailyStats {
            wallet_address: address.to_string(),
            daily_points: 0,
            last_interaction_date: None,
            current_streak: 0,
            longest_streak: 0,
            current_points: points,
            total_earned: points,
            total_spent: 0,
        }
    }

    fn interaction(address: &str, quest_id: i32, minutes: i64, status: &str) -> QuestInteraction {
        let base = Utc.with_ymd_and_hms(2025, 7, 1, 12, 0, 0).unwrap();
        QuestInteraction {
            id: Uuid::new_v4().to_string(),
            wallet_address: address.to_string(),
            quest_id,
            interaction_type: "daily_checkin".to_string(),
            points_earned: 10,
            completed_at: base + Duration::minutes(minutes),
            daily_points: 10,
            streak_count: 1,
            status: status.to_string(),
        }
    }

    #[tokio::test]
    async fn test_lookup_is_case_insensitive() {
        let store = MemoryStore::new();
        let created = store
            .insert_profile(&WalletAddress::parse("0xABCdef").unwrap())
            .await
            .unwrap();
        assert_eq!(created.wallet_address, "0xabcdef");

        let found = store
            .find_profile_by_address(&WalletAddress::parse("0XABCDEF").unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, created.id);

        let duplicate = store
            .insert_profile(&WalletAddress::parse("0xabcdef").unwrap())
            .await;
        assert!(matches!(duplicate, Err(StoreError::UniqueViolation(_))));
    }

    #[tokio::test]
    async fn test_interactions_newest_first() {
        let store = MemoryStore::new();
        store.push_quest_interaction(interaction("0xAA", 1, 0, "completed")).await;
        store.push_quest_interaction(interaction("0xaa", 2, 30, "completed")).await;
        store.push_quest_interaction(interaction("0xbb", 3, 60, "available")).await;

        let rows = store
            .quest_interactions(&WalletAddress::parse("0xAa").unwrap())
            .await
            .unwrap();
        let quests: Vec<i32> = rows.iter().map(|row| row.quest_id).collect();
        assert_eq!(quests, vec![2, 1]);
        assert_eq!(store.available_quest_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_leaderboard_and_rank() {
        let store = MemoryStore::new();
        store.put_daily_stats(stats("0xaa", 40)).await;
        store.put_daily_stats(stats("0xbb", 90)).await;
        store.put_daily_stats(stats("0xcc", 40)).await;
        let profile = store
            .insert_profile(&WalletAddress::parse("0xbb").unwrap())
            .await
            .unwrap();
        store
            .update_profile(
                &profile.id,
                &crate::types::ProfileUpdate {
                    username: Some("whale".to_string()),
                    avatar_url: None,
                }
                .into_patch()
                .unwrap(),
            )
            .await
            .unwrap();

        let board = store.leaderboard(2).await.unwrap();
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].username.as_deref(), Some("whale"));
        assert_eq!((board[1].rank, board[1].wallet_address.as_str()), (2, "0xaa"));

        let rank = store
            .leaderboard_rank(&WalletAddress::parse("0xCC").unwrap())
            .await
            .unwrap();
        assert_eq!(rank, Some(2));
        let unranked = store
            .leaderboard_rank(&WalletAddress::parse("0xdd").unwrap())
            .await
            .unwrap();
        assert_eq!(unranked, None);
    }
}
