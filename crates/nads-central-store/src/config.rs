use crate::{
    error::{StoreError, StoreResult},
    memory::MemoryStore,
    rest::RestStore,
    sql::SqlStore,
    store::Backend,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

pub const DEFAULT_SQLITE_URL: &str = "sqlite://nads-central.db?mode=rwc";

/// Where profiles and stats live
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BackendTarget {
    /// Hosted PostgREST API; `api_key` is the project's public key
    Rest { url: String, api_key: String },
    Sqlite { url: String },
    Memory,
}

impl Default for BackendTarget {
    fn default() -> Self {
        BackendTarget::Sqlite {
            url: DEFAULT_SQLITE_URL.to_string(),
        }
    }
}

impl BackendTarget {
    pub async fn connect(&self) -> StoreResult<Arc<dyn Backend>> {
        match self {
            BackendTarget::Rest { url, api_key } => Ok(Arc::new(RestStore::new(url, api_key)?)),
            BackendTarget::Sqlite { url } => {
                if url.trim().is_empty() {
                    return Err(StoreError::Config("database URL is empty".to_string()));
                }
                Ok(Arc::new(SqlStore::connect(url).await?))
            }
            BackendTarget::Memory => Ok(Arc::new(MemoryStore::new())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_targets_from_yaml() {
        let rest: BackendTarget = serde_yaml::from_str(
            "kind: rest\nurl: https://abc.supabase.co\napi_key: anon\n",
        )
        .unwrap();
        assert_eq!(
            rest,
            BackendTarget::Rest {
                url: "https://abc.supabase.co".to_string(),
                api_key: "anon".to_string(),
            }
        );

        let memory: BackendTarget = serde_yaml::from_str("kind: memory\n").unwrap();
        assert_eq!(memory, BackendTarget::Memory);
    }

    #[tokio::test]
    async fn test_connect_memory_and_rest() {
        let memory = BackendTarget::Memory.connect().await.unwrap();
        assert_eq!(memory.describe(), "in-memory store");

        let rest = BackendTarget::Rest {
            url: "https://abc.supabase.co".to_string(),
            api_key: "anon".to_string(),
        }
        .connect()
        .await
        .unwrap();
        assert!(rest.describe().contains("abc.supabase.co/rest/v1"));
    }

    #[tokio::test]
    async fn test_empty_sqlite_url() {
        let result = BackendTarget::Sqlite { url: " ".to_string() }.connect().await;
        assert!(matches!(result, Err(StoreError::Config(_))));
    }
}
