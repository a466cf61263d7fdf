//! Data-provider access.
//!
//! Read-only lookups of identity, league entries and match history. The
//! [`DataProvider`] trait is the seam; [`RiotClient`] is the HTTP
//! implementation. No retries happen here: failures propagate as
//! [`FetchError`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use thiserror::Error;
use tracing::debug;
use url::Url;

use crate::models::{MatchParticipation, PlayerIdentity, RankEntry};

/// Header carrying the provider API key.
const API_KEY_HEADER: &str = "x-riot-token";

/// Failures reported by, or on the way to, the data provider.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("Player not found")]
    NotFound,

    #[error("Provider API key is invalid")]
    Unauthorized,

    #[error("Provider access forbidden")]
    Forbidden,

    #[error("Rate limited by provider, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Bad request to provider")]
    BadRequest,

    #[error("Provider server fault (HTTP {status})")]
    ServerFault { status: u16 },

    #[error("Provider unreachable: {0}")]
    Transport(String),

    #[error("Provider response unparseable: {0}")]
    Decode(String),
}

impl FetchError {
    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, retry_after_secs: Option<u64>) -> Self {
        match status {
            400 => FetchError::BadRequest,
            401 => FetchError::Unauthorized,
            403 => FetchError::Forbidden,
            404 => FetchError::NotFound,
            429 => FetchError::RateLimited {
                retry_after_secs: retry_after_secs.unwrap_or(60),
            },
            status => FetchError::ServerFault { status },
        }
    }

    /// HTTP status to report to callers.
    pub fn status_code(&self) -> u16 {
        match self {
            FetchError::NotFound => 404,
            FetchError::Unauthorized => 401,
            FetchError::Forbidden => 403,
            FetchError::RateLimited { .. } => 429,
            FetchError::BadRequest => 400,
            FetchError::ServerFault { status } if *status >= 500 => *status,
            FetchError::ServerFault { .. } => 500,
            FetchError::Transport(_) => 503,
            FetchError::Decode(_) => 502,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            FetchError::Decode(e.to_string())
        } else {
            FetchError::Transport(e.to_string())
        }
    }
}

/// Read-only source of player data.
#[async_trait]
pub trait DataProvider: Send + Sync {
    /// Look up an account by display name.
    async fn get_identity(&self, name: &str) -> Result<PlayerIdentity, FetchError>;

    /// League entries for an encrypted summoner id.
    async fn get_rank_entries(&self, summoner_id: &str) -> Result<Vec<RankEntry>, FetchError>;

    /// Most recent match ids, newest first, optionally restricted to one queue.
    async fn get_recent_match_ids(
        &self,
        puuid: &str,
        count: u32,
        queue: Option<u32>,
    ) -> Result<Vec<String>, FetchError>;

    /// This player's line in a match, `None` if they did not take part.
    async fn get_match_participant(
        &self,
        match_id: &str,
        puuid: &str,
    ) -> Result<Option<MatchParticipation>, FetchError>;
}

/// Configuration for the provider HTTP client.
#[derive(Debug, Clone)]
pub struct RiotClientConfig {
    /// Platform host (summoner and league endpoints)
    pub platform_url: Url,

    /// Regional host (match endpoints)
    pub regional_url: Url,

    pub api_key: String,

    /// Connection and request timeout
    pub timeout: Duration,
}

/// HTTP client for the Riot Games API.
pub struct RiotClient {
    client: Client,
    config: RiotClientConfig,
}

impl RiotClient {
    pub fn new(config: RiotClientConfig) -> Result<Self, FetchError> {
        let mut headers = HeaderMap::new();
        let key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| FetchError::Unauthorized)?;
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder()
            .connect_timeout(config.timeout)
            .timeout(config.timeout)
            .default_headers(headers)
            .build()?;

        Ok(Self { client, config })
    }

    /// Append percent-encoded path segments to a base URL.
    fn endpoint(base: &Url, segments: &[&str]) -> Url {
        let mut url = base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    async fn get_json<T: DeserializeOwned>(&self, url: Url) -> Result<T, FetchError> {
        debug!("GET {}", url.path());

        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let retry_after = if status == StatusCode::TOO_MANY_REQUESTS {
                response
                    .headers()
                    .get("retry-after")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
            } else {
                None
            };
            return Err(FetchError::from_status(status.as_u16(), retry_after));
        }

        response
            .json()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}

/// Match detail payload, reduced to what aggregation needs.
#[derive(Debug, Deserialize)]
struct MatchDto {
    info: MatchInfoDto,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MatchInfoDto {
    game_duration: u64,
    participants: Vec<MatchParticipation>,
}

impl MatchDto {
    fn into_participant(self, puuid: &str) -> Option<MatchParticipation> {
        let duration = self.info.game_duration;
        self.info
            .participants
            .into_iter()
            .find(|p| p.puuid == puuid)
            .map(|mut p| {
                p.game_duration = duration;
                p
            })
    }
}

#[async_trait]
impl DataProvider for RiotClient {
    async fn get_identity(&self, name: &str) -> Result<PlayerIdentity, FetchError> {
        let url = Self::endpoint(
            &self.config.platform_url,
            &["lol", "summoner", "v4", "summoners", "by-name", name],
        );
        self.get_json(url).await
    }

    async fn get_rank_entries(&self, summoner_id: &str) -> Result<Vec<RankEntry>, FetchError> {
        let url = Self::endpoint(
            &self.config.platform_url,
            &["lol", "league", "v4", "entries", "by-summoner", summoner_id],
        );
        self.get_json(url).await
    }

    async fn get_recent_match_ids(
        &self,
        puuid: &str,
        count: u32,
        queue: Option<u32>,
    ) -> Result<Vec<String>, FetchError> {
        let mut url = Self::endpoint(
            &self.config.regional_url,
            &["lol", "match", "v5", "matches", "by-puuid", puuid, "ids"],
        );
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("count", &count.to_string());
            if let Some(queue) = queue {
                query.append_pair("queue", &queue.to_string());
            }
        }
        self.get_json(url).await
    }

    async fn get_match_participant(
        &self,
        match_id: &str,
        puuid: &str,
    ) -> Result<Option<MatchParticipation>, FetchError> {
        let url = Self::endpoint(
            &self.config.regional_url,
            &["lol", "match", "v5", "matches", match_id],
        );
        let detail: MatchDto = self.get_json(url).await?;
        Ok(detail.into_participant(puuid))
    }
}

/// In-memory provider for tests, counting every upstream call.
#[cfg(test)]
pub struct MockProvider {
    pub identities: std::collections::HashMap<String, PlayerIdentity>,
    pub ranks: std::collections::HashMap<String, Vec<RankEntry>>,
    pub matches: std::collections::HashMap<String, Vec<MatchParticipation>>,
    pub fail_matches: bool,
    pub calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockProvider {
    pub fn new() -> Self {
        Self {
            identities: Default::default(),
            ranks: Default::default(),
            matches: Default::default(),
            fail_matches: false,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    /// Register a player with an optional solo rank and a match history.
    pub fn with_player(
        mut self,
        name: &str,
        solo: Option<(&str, Option<&str>)>,
        matches: Vec<MatchParticipation>,
    ) -> Self {
        let puuid = format!("puuid-{}", name.to_lowercase());
        let id = format!("enc-{}", name.to_lowercase());
        self.identities.insert(
            name.to_lowercase(),
            PlayerIdentity {
                id: id.clone(),
                puuid: puuid.clone(),
                name: name.to_string(),
                summoner_level: 100,
                profile_icon_id: 1,
            },
        );
        let entries = solo
            .map(|(tier, division)| RankEntry {
                queue_type: crate::models::SOLO_QUEUE.to_string(),
                tier: tier.to_string(),
                division: division.map(str::to_string),
                league_points: 50,
                wins: 12,
                losses: 8,
                hot_streak: false,
                veteran: false,
                fresh_blood: false,
                inactive: false,
            })
            .into_iter()
            .collect();
        self.ranks.insert(id, entries);
        self.matches.insert(puuid, matches);
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
    }
}

#[cfg(test)]
#[async_trait]
impl DataProvider for MockProvider {
    async fn get_identity(&self, name: &str) -> Result<PlayerIdentity, FetchError> {
        self.record();
        self.identities
            .get(&name.to_lowercase())
            .cloned()
            .ok_or(FetchError::NotFound)
    }

    async fn get_rank_entries(&self, summoner_id: &str) -> Result<Vec<RankEntry>, FetchError> {
        self.record();
        Ok(self.ranks.get(summoner_id).cloned().unwrap_or_default())
    }

    async fn get_recent_match_ids(
        &self,
        puuid: &str,
        count: u32,
        _queue: Option<u32>,
    ) -> Result<Vec<String>, FetchError> {
        self.record();
        if self.fail_matches {
            return Err(FetchError::ServerFault { status: 503 });
        }
        let len = self.matches.get(puuid).map_or(0, Vec::len);
        Ok((0..len.min(count as usize))
            .map(|i| format!("{}#{}", puuid, i))
            .collect())
    }

    async fn get_match_participant(
        &self,
        match_id: &str,
        puuid: &str,
    ) -> Result<Option<MatchParticipation>, FetchError> {
        self.record();
        let index: usize = match_id
            .rsplit('#')
            .next()
            .and_then(|i| i.parse().ok())
            .ok_or(FetchError::NotFound)?;
        Ok(self
            .matches
            .get(puuid)
            .and_then(|m| m.get(index))
            .cloned())
    }
}
