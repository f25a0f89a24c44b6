/*!
# Nads Central Store

Profile and stats storage behind two traits:

- [`ProfileStore`]: case-insensitive lookup, create, partial update
- [`StatsStore`]: daily stats, quest history, available quests, leaderboard

Three backends implement both: [`RestStore`] for a hosted PostgREST API,
[`SqlStore`] over sea-orm, and [`MemoryStore`].

[`ensure_profile`] is the get-or-create used on wallet connect. It relies on the
store's unique constraint on the lowercased address, so concurrent callers
always end up with the same row.
*/

pub mod config;
pub mod database;
pub mod error;
pub mod memory;
pub mod profiles;
pub mod rest;
pub mod sql;
pub mod store;
pub mod types;

pub use config::{BackendTarget, DEFAULT_SQLITE_URL};
pub use database::{connect_and_migrate, migrate, new_scratch_db, sqlite_url};
pub use error::{StoreError, StoreResult};
pub use memory::MemoryStore;
pub use profiles::{ensure_profile, update_profile};
pub use rest::RestStore;
pub use sql::SqlStore;
pub use store::{Backend, ProfileStore, StatsStore};
pub use types::{
    DailyStats, LeaderboardEntry, Profile, ProfilePatch, ProfileUpdate, QuestInteraction,
    QUEST_STATUS_AVAILABLE,
};
