use crate::{
    database,
    error::{StoreError, StoreResult},
    store::{Backend, ProfileStore, StatsStore},
    types::{
        rank_entries, DailyStats, LeaderboardEntry, Profile, ProfilePatch, QuestInteraction,
        QUEST_STATUS_AVAILABLE,
    },
};
use async_trait::async_trait;
use chrono::Utc;
use nads_central_entities::{profiles, user_daily_stats, user_quest_interactions};
use nads_central_gate::WalletAddress;
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait as _, ActiveValue::Set, ColumnTrait as _, ConnectionTrait as _,
    DatabaseConnection, DbErr,
    EntityTrait as _, IntoActiveModel as _, PaginatorTrait as _, QueryFilter as _, QueryOrder as _,
    QuerySelect as _, SqlErr,
};
use std::collections::HashMap;
use uuid::Uuid;

/// Backend over a sea-orm connection
pub struct SqlStore {
    db: DatabaseConnection,
}

impl SqlStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Connect and apply pending migrations
    pub async fn connect(url: &str) -> StoreResult<Self> {
        Ok(Self::new(database::connect_and_migrate(url).await?))
    }

    pub fn connection(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl From<profiles::Model> for Profile {
    fn from(model: profiles::Model) -> Self {
        Self {
            id: model.id,
            wallet_address: model.wallet_address,
            username: model.username,
            avatar_url: model.avatar_url,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<user_daily_stats::Model> for DailyStats {
    fn from(model: user_daily_stats::Model) -> Self {
        Self {
            wallet_address: model.wallet_address,
            daily_points: model.daily_points,
            last_interaction_date: model.last_interaction_date,
            current_streak: model.current_streak,
            longest_streak: model.longest_streak,
            current_points: model.current_points,
            total_earned: model.total_earned,
            total_spent: model.total_spent,
        }
    }
}

impl From<user_quest_interactions::Model> for QuestInteraction {
    fn from(model: user_quest_interactions::Model) -> Self {
        Self {
            id: model.id,
            wallet_address: model.wallet_address,
            quest_id: model.quest_id,
            interaction_type: model.interaction_type,
            points_earned: model.points_earned,
            completed_at: model.completed_at,
            daily_points: model.daily_points,
            streak_count: model.streak_count,
            status: model.status,
        }
    }
}

fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

#[async_trait]
impl ProfileStore for SqlStore {
    async fn find_profile_by_address(
        &self,
        address: &WalletAddress,
    ) -> StoreResult<Option<Profile>> {
        let model = profiles::Entity::find()
            .filter(
                Expr::expr(Func::lower(Expr::col(profiles::Column::WalletAddress)))
                    .eq(address.profile_key()),
            )
            .one(&self.db)
            .await?;
        Ok(model.map(Profile::from))
    }

    async fn insert_profile(&self, address: &WalletAddress) -> StoreResult<Profile> {
        let now = Utc::now();
        let model = profiles::ActiveModel {
            id: Set(Uuid::new_v4().to_string()),
            wallet_address: Set(address.profile_key()),
            username: Set(None),
            avatar_url: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        match model.insert(&self.db).await {
            Ok(created) => Ok(created.into()),
            Err(err) if is_unique_violation(&err) => {
                Err(StoreError::UniqueViolation(address.profile_key()))
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn update_profile(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> StoreResult<Option<Profile>> {
        let Some(existing) = profiles::Entity::find_by_id(id.to_string())
            .one(&self.db)
            .await?
        else {
            return Ok(None);
        };

        let mut model = existing.into_active_model();
        if let Some(username) = patch.username() {
            model.username = Set(Some(username.to_string()));
        }
        if let Some(avatar_url) = patch.avatar_url() {
            model.avatar_url = Set(Some(avatar_url.to_string()));
        }
        model.updated_at = Set(Utc::now());

        match model.update(&self.db).await {
            Ok(updated) => Ok(Some(updated.into())),
            Err(DbErr::RecordNotUpdated) => Ok(None),
            Err(err) => Err(err.into()),
        }
    }
}

#[async_trait]
impl StatsStore for SqlStore {
    async fn daily_stats(&self, address: &WalletAddress) -> StoreResult<Option<DailyStats>> {
        let model = user_daily_stats::Entity::find()
            .filter(user_daily_stats::Column::WalletAddress.eq(address.profile_key()))
            .one(&self.db)
            .await?;
        Ok(model.map(DailyStats::from))
    }

    async fn quest_interactions(
        &self,
        address: &WalletAddress,
    ) -> StoreResult<Vec<QuestInteraction>> {
        let rows = user_quest_interactions::Entity::find()
            .filter(user_quest_interactions::Column::WalletAddress.eq(address.profile_key()))
            .order_by_desc(user_quest_interactions::Column::CompletedAt)
            .all(&self.db)
            .await?;
        Ok(rows.into_iter().map(QuestInteraction::from).collect())
    }

    async fn available_quest_count(&self) -> StoreResult<u64> {
        Ok(user_quest_interactions::Entity::find()
            .filter(user_quest_interactions::Column::Status.eq(QUEST_STATUS_AVAILABLE))
            .count(&self.db)
            .await?)
    }

    async fn leaderboard(&self, limit: u64) -> StoreResult<Vec<LeaderboardEntry>> {
        let rows = user_daily_stats::Entity::find()
            .order_by_desc(user_daily_stats::Column::CurrentPoints)
            .order_by_asc(user_daily_stats::Column::WalletAddress)
            .limit(limit)
            .all(&self.db)
            .await?;

        let addresses: Vec<String> = rows.iter().map(|row| row.wallet_address.clone()).collect();
        let names: HashMap<String, Option<String>> = profiles::Entity::find()
            .filter(profiles::Column::WalletAddress.is_in(addresses))
            .all(&self.db)
            .await?
            .into_iter()
            .map(|profile| (profile.wallet_address, profile.username))
            .collect();

        Ok(rank_entries(rows.into_iter().map(|row| {
            let username = names.get(&row.wallet_address).cloned().flatten();
            (row.wallet_address, username, row.current_points)
        })))
    }

    async fn leaderboard_rank(&self, address: &WalletAddress) -> StoreResult<Option<u32>> {
        let Some(mine) = self.daily_stats(address).await? else {
            return Ok(None);
        };
        let ahead = user_daily_stats::Entity::find()
            .filter(user_daily_stats::Column::CurrentPoints.gt(mine.current_points))
            .count(&self.db)
            .await?;
        Ok(Some(u32::try_from(ahead).unwrap_or(u32::MAX).saturating_add(1)))
    }
}

impl Backend for SqlStore {
    fn describe(&self) -> String {
        format!("SQL backend ({:?})", self.db.get_database_backend())
    }
}
