/*!
# Hosted REST backend

Talks to a PostgREST endpoint (the API a Supabase project exposes under
`/rest/v1`). Every request carries the project's public key both as `apikey`
and as a bearer token.
*/

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
use reqwest::{header::CONTENT_RANGE, Method, RequestBuilder, Response};
use serde::{de::DeserializeOwned, Deserialize};
use serde_json::json;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

/// Postgres `unique_violation`
const UNIQUE_VIOLATION_CODE: &str = "23505";

pub struct RestStore {
    http: reqwest::Client,
    root: Url,
    api_key: String,
}

#[derive(Debug, Deserialize)]
struct PostgrestError {
    code: Option<String>,
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct PointsRow {
    wallet_address: String,
    current_points: i64,
}

#[derive(Debug, Deserialize)]
struct UsernameRow {
    wallet_address: String,
    username: Option<String>,
}

impl RestStore {
    /// `base_url` is the project URL; `/rest/v1` is appended unless present
    pub fn new(base_url: &str, api_key: &str) -> StoreResult<Self> {
        Self::with_client(reqwest::Client::new(), base_url, api_key)
    }

    pub fn with_client(http: reqwest::Client, base_url: &str, api_key: &str) -> StoreResult<Self> {
        if api_key.trim().is_empty() {
            return Err(StoreError::Config("backend API key is empty".to_string()));
        }
        Ok(Self {
            http,
            root: rest_root(base_url)?,
            api_key: api_key.trim().to_string(),
        })
    }

    fn table(&self, name: &str) -> StoreResult<Url> {
        self.root
            .join(name)
            .map_err(|e| StoreError::Config(format!("Invalid table URL {}: {}", name, e)))
    }

    fn request(&self, method: Method, url: Url) -> RequestBuilder {
        self.http
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    async fn fetch_rows<T: DeserializeOwned>(&self, request: RequestBuilder) -> StoreResult<Vec<T>> {
        let response = checked(request.send().await?).await?;
        response
            .json()
            .await
            .map_err(|e| StoreError::Decode(e.to_string()))
    }

    /// Row count via `Prefer: count=exact`
    async fn count_rows(&self, url: Url) -> StoreResult<u64> {
        let response = self
            .request(Method::GET, url)
            .header("Prefer", "count=exact")
            .header("Range", "0-0")
            .send()
            .await?;
        let response = checked(response).await?;
        response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|value| value.to_str().ok())
            .and_then(content_range_total)
            .ok_or_else(|| StoreError::Decode("missing or invalid Content-Range".to_string()))
    }
}

#[async_trait]
impl ProfileStore for RestStore {
    async fn find_profile_by_address(
        &self,
        address: &WalletAddress,
    ) -> StoreResult<Option<Profile>> {
        let mut url = self.table("profiles")?;
        // Addresses are alphanumeric, so ilike has no wildcards to escape
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("wallet_address", &format!("ilike.{}", address))
            .append_pair("limit", "1");

        debug!("Looking up profile for {}", address);
        let rows: Vec<Profile> = self.fetch_rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next())
    }

    async fn insert_profile(&self, address: &WalletAddress) -> StoreResult<Profile> {
        let key = address.profile_key();
        let body = json!([{ "wallet_address": key, "username": null, "avatar_url": null }]);
        let request = self
            .request(Method::POST, self.table("profiles")?)
            .header("Prefer", "return=representation")
            .json(&body);

        match self.fetch_rows::<Profile>(request).await {
            Ok(rows) => rows
                .into_iter()
                .next()
                .ok_or_else(|| StoreError::Decode("insert returned no row".to_string())),
            Err(StoreError::Backend { message, .. }) if message.starts_with(UNIQUE_VIOLATION_CODE) => {
                Err(StoreError::UniqueViolation(key))
            }
            Err(e) => Err(e),
        }
    }

    async fn update_profile(
        &self,
        id: &str,
        patch: &ProfilePatch,
    ) -> StoreResult<Option<Profile>> {
        let mut url = self.table("profiles")?;
        url.query_pairs_mut().append_pair("id", &format!("eq.{}", id));

        let mut body = serde_json::to_value(patch).map_err(|e| StoreError::Decode(e.to_string()))?;
        if let Some(fields) = body.as_object_mut() {
            fields.insert("updated_at".to_string(), json!(Utc::now()));
        }

        let request = self
            .request(Method::PATCH, url)
            .header("Prefer", "return=representation")
            .json(&body);
        let rows: Vec<Profile> = self.fetch_rows(request).await?;
        Ok(rows.into_iter().next())
    }
}

#[async_trait]
impl StatsStore for RestStore {
    async fn daily_stats(&self, address: &WalletAddress) -> StoreResult<Option<DailyStats>> {
        let mut url = self.table("user_daily_stats")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("wallet_address", &format!("eq.{}", address.profile_key()))
            .append_pair("limit", "1");
        let rows: Vec<DailyStats> = self.fetch_rows(self.request(Method::GET, url)).await?;
        Ok(rows.into_iter().next())
    }

    async fn quest_interactions(
        &self,
        address: &WalletAddress,
    ) -> StoreResult<Vec<QuestInteraction>> {
        let mut url = self.table("user_quest_interactions")?;
        url.query_pairs_mut()
            .append_pair("select", "*")
            .append_pair("wallet_address", &format!("eq.{}", address.profile_key()))
            .append_pair("order", "completed_at.desc");
        self.fetch_rows(self.request(Method::GET, url)).await
    }

    async fn available_quest_count(&self) -> StoreResult<u64> {
        let mut url = self.table("user_quest_interactions")?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("status", &format!("eq.{}", QUEST_STATUS_AVAILABLE));
        self.count_rows(url).await
    }

    async fn leaderboard(&self, limit: u64) -> StoreResult<Vec<LeaderboardEntry>> {
        let mut url = self.table("user_daily_stats")?;
        url.query_pairs_mut()
            .append_pair("select", "wallet_address,current_points")
            .append_pair("order", "current_points.desc,wallet_address.asc")
            .append_pair("limit", &limit.to_string());
        let rows: Vec<PointsRow> = self.fetch_rows(self.request(Method::GET, url)).await?;
        if rows.is_empty() {
            return Ok(Vec::new());
        }

        let addresses: Vec<&str> = rows.iter().map(|row| row.wallet_address.as_str()).collect();
        let mut url = self.table("profiles")?;
        url.query_pairs_mut()
            .append_pair("select", "wallet_address,username")
            .append_pair("wallet_address", &format!("in.({})", addresses.join(",")));
        let names: HashMap<String, Option<String>> = self
            .fetch_rows::<UsernameRow>(self.request(Method::GET, url))
            .await?
            .into_iter()
            .map(|row| (row.wallet_address, row.username))
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
        let mut url = self.table("user_daily_stats")?;
        url.query_pairs_mut()
            .append_pair("select", "id")
            .append_pair("current_points", &format!("gt.{}", mine.current_points));
        let ahead = self.count_rows(url).await?;
        Ok(Some(u32::try_from(ahead).unwrap_or(u32::MAX).saturating_add(1)))
    }
}

impl Backend for RestStore {
    fn describe(&self) -> String {
        format!("hosted REST backend at {}", self.root)
    }
}

/// Turn a non-success response into a `Backend` error. The message is
/// prefixed with the Postgres error code when the body carries one.
async fn checked(response: Response) -> StoreResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(backend_error(status.as_u16(), &body))
}

fn backend_error(status: u16, body: &str) -> StoreError {
    let message = match serde_json::from_str::<PostgrestError>(body) {
        Ok(PostgrestError {
            code: Some(code),
            message,
        }) => format!("{}: {}", code, message.unwrap_or_default()),
        Ok(PostgrestError {
            code: None,
            message: Some(message),
        }) => message,
        _ => body.to_string(),
    };
    StoreError::Backend { status, message }
}

fn rest_root(base_url: &str) -> StoreResult<Url> {
    let trimmed = base_url.trim().trim_end_matches('/');
    let root = if trimmed.ends_with("/rest/v1") {
        format!("{}/", trimmed)
    } else {
        format!("{}/rest/v1/", trimmed)
    };
    Url::parse(&root).map_err(|e| StoreError::Config(format!("Invalid backend URL {}: {}", base_url, e)))
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`
fn content_range_total(value: &str) -> Option<u64> {
    value.rsplit_once('/')?.1.parse().ok()
}
