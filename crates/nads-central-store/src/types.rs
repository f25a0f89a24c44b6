use crate::error::{StoreError, StoreResult};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A member profile. `wallet_address` is always stored lowercased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub wallet_address: String,
    pub username: Option<String>,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Profile {
    pub fn display_name(&self) -> &str {
        self.username.as_deref().unwrap_or(&self.wallet_address)
    }
}

/// Per-wallet counters maintained by the backend
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStats {
    pub wallet_address: String,
    pub daily_points: i64,
    pub last_interaction_date: Option<NaiveDate>,
    pub current_streak: i32,
    pub longest_streak: i32,
    pub current_points: i64,
    pub total_earned: i64,
    pub total_spent: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestInteraction {
    pub id: String,
    pub wallet_address: String,
    pub quest_id: i32,
    pub interaction_type: String,
    pub points_earned: i64,
    pub completed_at: DateTime<Utc>,
    pub daily_points: i64,
    pub streak_count: i32,
    pub status: String,
}

/// Status of a quest that is open to be taken
pub const QUEST_STATUS_AVAILABLE: &str = "available";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    /// Competition rank: wallets with equal points share a rank
    pub rank: u32,
    pub wallet_address: String,
    pub username: Option<String>,
    pub current_points: i64,
}

/// Assign competition ranks to rows already sorted by points, descending
pub(crate) fn rank_entries(
    rows: impl IntoIterator<Item = (String, Option<String>, i64)>,
) -> Vec<LeaderboardEntry> {
    let mut entries: Vec<LeaderboardEntry> = Vec::new();
    for (position, (wallet_address, username, current_points)) in rows.into_iter().enumerate() {
        let rank = match entries.last() {
            Some(previous) if previous.current_points == current_points => previous.rank,
            _ => position as u32 + 1,
        };
        entries.push(LeaderboardEntry {
            rank,
            wallet_address,
            username,
            current_points,
        });
    }
    entries
}

/// A user-requested profile edit
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileUpdate {
    pub username: Option<String>,
    pub avatar_url: Option<String>,
}

/// A validated, non-empty profile edit
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    avatar_url: Option<String>,
}

impl ProfileUpdate {
    /// Trim the supplied fields and drop blank ones; at least one must remain
    pub fn into_patch(self) -> StoreResult<ProfilePatch> {
        let username = non_blank(self.username);
        let avatar_url = non_blank(self.avatar_url);

        if username.is_none() && avatar_url.is_none() {
            return Err(StoreError::Validation(
                "at least one of username or avatar_url must be non-empty".to_string(),
            ));
        }

        Ok(ProfilePatch {
            username,
            avatar_url,
        })
    }
}

impl ProfilePatch {
    pub fn username(&self) -> Option<&str> {
        self.username.as_deref()
    }

    pub fn avatar_url(&self) -> Option<&str> {
        self.avatar_url.as_deref()
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
