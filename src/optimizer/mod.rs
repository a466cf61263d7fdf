//! External team optimizer.
//!
//! The optimizer is an opaque remote service that turns per-player feature
//! vectors into up to three ranked team splits. Every failure here is
//! recoverable: the caller falls back to the local partition.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};
use url::Url;

use crate::models::Role;

/// Health checks give up sooner than balance requests.
const HEALTH_TIMEOUT: Duration = Duration::from_secs(3);

/// Errors that can occur when calling the optimizer.
#[derive(Debug, Error)]
pub enum OptimizerError {
    #[error("Optimizer timed out after {0} ms")]
    Timeout(u64),

    #[error("Optimizer unavailable: {0}")]
    Unavailable(String),

    #[error("Optimizer response unusable: {0}")]
    BadResponse(String),
}

/// Per-player input to the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeaturePayload {
    pub summoner_name: String,
    pub primary_position: Role,
    pub secondary_position: Role,
    /// Hidden rating from tier and division
    pub tier_score: f64,
    pub win_rate: f64,
    pub avg_kda: f64,
    pub avg_cs_per_min: f64,
    pub avg_vision_score: f64,
    pub objective_participation: f64,
}

/// A player as placed by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandidatePlayer {
    pub summoner_name: String,
    /// Raw position string; unknown values are read as `FILL`
    pub assigned_position: String,
    pub hidden_mmr: f64,
}

impl CandidatePlayer {
    pub fn role(&self) -> Role {
        self.assigned_position.parse().unwrap_or(Role::Fill)
    }
}

/// One ranked split proposed by the optimizer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub rank: u8,
    pub team_a: Vec<CandidatePlayer>,
    pub team_b: Vec<CandidatePlayer>,
    pub team_a_win_rate: f64,
    pub team_b_win_rate: f64,
    pub balance_score: f64,
}

/// Trait for team optimizers.
#[async_trait]
pub trait OptimizerClient: Send + Sync {
    /// Optimizer name for logging.
    fn name(&self) -> &'static str;

    /// Propose up to three ranked splits for the given players.
    async fn optimize(&self, players: &[FeaturePayload]) -> Result<Vec<Candidate>, OptimizerError>;

    /// Check if the optimizer is reachable. Never fails.
    async fn health_check(&self) -> bool;
}

#[derive(Debug, Serialize)]
struct OptimizeRequest<'a> {
    players: &'a [FeaturePayload],
}

#[derive(Debug, Deserialize)]
struct OptimizeResponse {
    results: Vec<Candidate>,
}

/// HTTP optimizer client.
pub struct HttpOptimizer {
    client: reqwest::Client,
    base_url: Url,
    timeout: Duration,
}

impl HttpOptimizer {
    pub fn new(base_url: Url, timeout: Duration) -> Result<Self, OptimizerError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| OptimizerError::Unavailable(e.to_string()))?;

        Ok(Self {
            client,
            base_url,
            timeout,
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl OptimizerClient for HttpOptimizer {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn optimize(&self, players: &[FeaturePayload]) -> Result<Vec<Candidate>, OptimizerError> {
        let url = self.endpoint(&["team", "balance"]);
        debug!("Sending {} players to optimizer at {}", players.len(), url);

        let response = self
            .client
            .post(url)
            .json(&OptimizeRequest { players })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OptimizerError::Timeout(self.timeout.as_millis() as u64)
                } else {
                    OptimizerError::Unavailable(e.to_string())
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            let snippet: String = body.chars().take(200).collect();
            return Err(OptimizerError::Unavailable(format!(
                "optimizer returned {}: {}",
                status, snippet
            )));
        }

        let parsed: OptimizeResponse = response
            .json()
            .await
            .map_err(|e| OptimizerError::BadResponse(e.to_string()))?;

        Ok(parsed.results)
    }

    async fn health_check(&self) -> bool {
        let url = self.endpoint(&["health"]);

        match self.client.get(url).timeout(HEALTH_TIMEOUT).send().await {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                warn!("Optimizer health check failed: {}", e);
                false
            }
        }
    }
}

/// Scripted optimizer for tests.
#[cfg(test)]
pub enum MockBehavior {
    Respond(Vec<Candidate>),
    Fail,
    Hang,
}

#[cfg(test)]
pub struct MockOptimizer {
    behavior: MockBehavior,
    calls: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MockOptimizer {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior,
            calls: std::sync::atomic::AtomicUsize::new(0),
        }
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
#[async_trait]
impl OptimizerClient for MockOptimizer {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn optimize(&self, _players: &[FeaturePayload]) -> Result<Vec<Candidate>, OptimizerError> {
        self.calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        match &self.behavior {
            MockBehavior::Respond(candidates) => Ok(candidates.clone()),
            MockBehavior::Fail => Err(OptimizerError::Unavailable("connection refused".into())),
            MockBehavior::Hang => {
                tokio::time::sleep(Duration::from_secs(3600)).await;
                Err(OptimizerError::Unavailable("unreachable".into()))
            }
        }
    }

    async fn health_check(&self) -> bool {
        !matches!(self.behavior, MockBehavior::Fail)
    }
}
