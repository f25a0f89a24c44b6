use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // wallet_address is always stored lowercased, so a plain unique
        // constraint is a case-insensitive one
        manager
            .create_table(
                Table::create()
                    .table(Profiles::Table)
                    .if_not_exists()
                    .col(string(Profiles::Id).primary_key())
                    .col(string_uniq(Profiles::WalletAddress))
                    .col(string_null(Profiles::Username))
                    .col(string_null(Profiles::AvatarUrl))
                    .col(timestamp_with_time_zone(Profiles::CreatedAt))
                    .col(timestamp_with_time_zone(Profiles::UpdatedAt))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserDailyStats::Table)
                    .if_not_exists()
                    .col(string(UserDailyStats::Id).primary_key())
                    .col(string_uniq(UserDailyStats::WalletAddress))
                    .col(timestamp_with_time_zone(UserDailyStats::CreatedAt))
                    .col(timestamp_with_time_zone(UserDailyStats::UpdatedAt))
                    .col(big_integer(UserDailyStats::DailyPoints).default(0))
                    .col(date_null(UserDailyStats::LastInteractionDate))
                    .col(integer(UserDailyStats::CurrentStreak).default(0))
                    .col(integer(UserDailyStats::LongestStreak).default(0))
                    .col(big_integer(UserDailyStats::CurrentPoints).default(0))
                    .col(big_integer(UserDailyStats::TotalEarned).default(0))
                    .col(big_integer(UserDailyStats::TotalSpent).default(0))
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(UserQuestInteractions::Table)
                    .if_not_exists()
                    .col(string(UserQuestInteractions::Id).primary_key())
                    .col(string(UserQuestInteractions::WalletAddress))
                    .col(timestamp_with_time_zone(UserQuestInteractions::CreatedAt))
                    .col(timestamp_with_time_zone(UserQuestInteractions::UpdatedAt))
                    .col(integer(UserQuestInteractions::QuestId))
                    .col(string(UserQuestInteractions::InteractionType))
                    .col(big_integer(UserQuestInteractions::PointsEarned).default(0))
                    .col(timestamp_with_time_zone(UserQuestInteractions::CompletedAt))
                    .col(big_integer(UserQuestInteractions::DailyPoints).default(0))
                    .col(integer(UserQuestInteractions::StreakCount).default(0))
                    .col(string(UserQuestInteractions::Status).default("completed"))
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_user_quest_interactions_wallet_completed")
                    .table(UserQuestInteractions::Table)
                    .col(UserQuestInteractions::WalletAddress)
                    .col(UserQuestInteractions::CompletedAt)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(UserQuestInteractions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(UserDailyStats::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profiles::Table).to_owned())
            .await?;
        Ok(())
    }
}

#[derive(DeriveIden)]
enum Profiles {
    Table,
    Id,
    WalletAddress,
    Username,
    AvatarUrl,
    CreatedAt,
    UpdatedAt,
}

#[derive(DeriveIden)]
enum UserDailyStats {
    Table,
    Id,
    WalletAddress,
    CreatedAt,
    UpdatedAt,
    DailyPoints,
    LastInteractionDate,
    CurrentStreak,
    LongestStreak,
    CurrentPoints,
    TotalEarned,
    TotalSpent,
}

#[derive(DeriveIden)]
enum UserQuestInteractions {
    Table,
    Id,
    WalletAddress,
    CreatedAt,
    UpdatedAt,
    QuestId,
    InteractionType,
    PointsEarned,
    CompletedAt,
    DailyPoints,
    StreakCount,
    Status,
}
