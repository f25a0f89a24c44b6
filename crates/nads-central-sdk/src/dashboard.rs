use nads_central_gate::WalletAddress;
use nads_central_store::{DailyStats, QuestInteraction, StatsStore, StoreResult};
use tracing::warn;

/// One independently loaded view
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    Ready(T),
    Failed(String),
}

impl<T> ViewState<T> {
    pub fn ready(&self) -> Option<&T> {
        match self {
            ViewState::Ready(value) => Some(value),
            ViewState::Failed(_) => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ViewState::Failed(_))
    }
}

impl<T> From<StoreResult<T>> for ViewState<T> {
    fn from(result: StoreResult<T>) -> Self {
        match result {
            Ok(value) => ViewState::Ready(value),
            Err(e) => ViewState::Failed(e.to_string()),
        }
    }
}

/// Everything the members area shows for one wallet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dashboard {
    pub stats: ViewState<Option<DailyStats>>,
    pub quest_history: ViewState<Vec<QuestInteraction>>,
    pub rank: ViewState<Option<u32>>,
    pub available_quests: ViewState<u64>,
}

/// Load every view concurrently; one failing does not affect the others
pub async fn load_dashboard<S>(store: &S, address: &WalletAddress) -> Dashboard
where
    S: StatsStore + ?Sized,
{
    let (stats, quest_history, rank, available_quests) = tokio::join!(
        store.daily_stats(address),
        store.quest_interactions(address),
        store.leaderboard_rank(address),
        store.available_quest_count(),
    );

    let dashboard = Dashboard {
        stats: stats.into(),
        quest_history: quest_history.into(),
        rank: rank.into(),
        available_quests: available_quests.into(),
    };

    for (name, failed) in [
        ("stats", dashboard.stats.is_failed()),
        ("quest history", dashboard.quest_history.is_failed()),
        ("rank", dashboard.rank.is_failed()),
        ("available quests", dashboard.available_quests.is_failed()),
    ] {
        if failed {
            warn!("Dashboard view '{}' failed to load for {}", name, address);
        }
    }

    dashboard
}
