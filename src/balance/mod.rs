//! Team balancing.
//!
//! [`TeamPartitioner`] fetches every roster member's profile concurrently,
//! asks the external optimizer for ranked splits under a deadline, and falls
//! back to the deterministic [`fallback::partition`] whenever the optimizer
//! is disabled, slow, unreachable or answers with nothing usable.

pub mod fallback;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures_util::future::join_all;
use thiserror::Error;
use tracing::{info, warn};

use crate::calculate::profile_score;
use crate::fetch::FetchError;
use crate::models::{BalanceResult, PlayerInput, PlayerProfile, TeamPlayer, UNRANKED};
use crate::optimizer::{Candidate, CandidatePlayer, FeaturePayload, OptimizerClient, OptimizerError};
use crate::profile::ProfileAggregator;

pub const MIN_PLAYERS: usize = 2;
pub const MAX_PLAYERS: usize = 10;

/// Most candidates ever returned from one balance call.
pub const MAX_CANDIDATES: usize = 3;

/// Errors surfaced to callers of [`TeamPartitioner::balance`].
#[derive(Debug, Error)]
pub enum BalanceError {
    #[error("Invalid roster: {0}")]
    Validation(String),

    #[error(transparent)]
    Upstream(#[from] FetchError),
}

/// Splits a roster into two balanced teams.
pub struct TeamPartitioner {
    profiles: Arc<ProfileAggregator>,
    optimizer: Option<Arc<dyn OptimizerClient>>,
    deadline: Duration,
}

impl TeamPartitioner {
    /// `optimizer: None` always uses the local fallback.
    pub fn new(
        profiles: Arc<ProfileAggregator>,
        optimizer: Option<Arc<dyn OptimizerClient>>,
        deadline: Duration,
    ) -> Self {
        Self {
            profiles,
            optimizer,
            deadline,
        }
    }

    /// Check roster size.
    pub fn validate(roster: &[PlayerInput]) -> Result<(), BalanceError> {
        if roster.len() < MIN_PLAYERS || roster.len() > MAX_PLAYERS {
            return Err(BalanceError::Validation(format!(
                "roster must have between {} and {} players, got {}",
                MIN_PLAYERS,
                MAX_PLAYERS,
                roster.len()
            )));
        }
        if let Some(blank) = roster.iter().position(|p| p.summoner_name.trim().is_empty()) {
            return Err(BalanceError::Validation(format!(
                "player {} has an empty summoner name",
                blank + 1
            )));
        }
        Ok(())
    }

    /// Produce one to three candidate splits, best first.
    ///
    /// Fails on an invalid roster or when any profile cannot be built.
    /// Optimizer trouble is never an error.
    pub async fn balance(&self, roster: &[PlayerInput]) -> Result<Vec<BalanceResult>, BalanceError> {
        Self::validate(roster)?;

        // Wait for every fetch, then fail on the first error.
        let profiles = join_all(
            roster
                .iter()
                .map(|p| self.profiles.get_profile(&p.summoner_name)),
        )
        .await
        .into_iter()
        .collect::<Result<Vec<_>, _>>()?;

        let payload = build_payload(roster, &profiles);

        let results = match self.run_optimizer(&payload).await {
            Ok(candidates) => to_results(candidates, roster, &profiles),
            Err(e) => {
                warn!("Falling back to local partition: {}", e);
                vec![fallback::partition(roster, &profiles)]
            }
        };

        if let Some(best) = results.first() {
            info!(
                "Balanced {} players into {} candidate(s), best score {:.2}",
                roster.len(),
                results.len(),
                best.balance_score
            );
        }
        Ok(results)
    }

    async fn run_optimizer(
        &self,
        payload: &[FeaturePayload],
    ) -> Result<Vec<Candidate>, OptimizerError> {
        let optimizer = self
            .optimizer
            .as_ref()
            .ok_or_else(|| OptimizerError::Unavailable("optimizer disabled".to_string()))?;

        let candidates = tokio::time::timeout(self.deadline, optimizer.optimize(payload))
            .await
            .map_err(|_| OptimizerError::Timeout(self.deadline.as_millis() as u64))??;

        if candidates.is_empty() {
            return Err(OptimizerError::BadResponse(format!(
                "{} returned no candidates",
                optimizer.name()
            )));
        }
        Ok(candidates)
    }
}

/// Feature vectors for the optimizer. Missing stats are sent as zeros; the
/// profiles themselves keep them absent.
pub fn build_payload(roster: &[PlayerInput], profiles: &[PlayerProfile]) -> Vec<FeaturePayload> {
    roster
        .iter()
        .zip(profiles)
        .map(|(player, profile)| {
            let stats = profile.stats.as_ref();
            FeaturePayload {
                summoner_name: player.summoner_name.clone(),
                primary_position: player.primary_position,
                secondary_position: player.secondary_position,
                tier_score: profile_score(profile),
                win_rate: profile.win_rate,
                avg_kda: stats.map_or(0.0, |s| s.avg_kda),
                avg_cs_per_min: stats.map_or(0.0, |s| s.avg_cs_per_min),
                avg_vision_score: stats.map_or(0.0, |s| s.avg_vision_score),
                objective_participation: stats.map_or(0.0, |s| s.objective_participation),
            }
        })
        .collect()
}

/// Map optimizer candidates onto results, filling tier/division from the
/// fetched profiles.
fn to_results(
    mut candidates: Vec<Candidate>,
    roster: &[PlayerInput],
    profiles: &[PlayerProfile],
) -> Vec<BalanceResult> {
    let mut by_name: HashMap<&str, &PlayerProfile> = HashMap::new();
    for (player, profile) in roster.iter().zip(profiles) {
        by_name.insert(profile.summoner_name.as_str(), profile);
        by_name.insert(player.summoner_name.as_str(), profile);
    }

    let place = |p: CandidatePlayer| {
        let profile = by_name.get(p.summoner_name.as_str());
        TeamPlayer {
            assigned_position: p.role(),
            hidden_mmr: p.hidden_mmr,
            tier: profile.map_or(UNRANKED, |pr| pr.tier_label()).to_string(),
            rank: profile.map_or("", |pr| pr.division_label()).to_string(),
            summoner_name: p.summoner_name,
        }
    };

    candidates.sort_by_key(|c| c.rank);
    candidates.truncate(MAX_CANDIDATES);
    candidates
        .into_iter()
        .map(|c| BalanceResult {
            rank: c.rank,
            team_a: c.team_a.into_iter().map(place).collect(),
            team_b: c.team_b.into_iter().map(place).collect(),
            team_a_win_rate: c.team_a_win_rate,
            team_b_win_rate: c.team_b_win_rate,
            balance_score: c.balance_score,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::MockCache;
    use crate::fetch::{DataProvider, MockProvider};
    use crate::models::{MatchParticipation, PlayerIdentity, RankEntry, Role};
    use crate::optimizer::{MockBehavior, MockOptimizer};
    use crate::profile::ProfileSettings;
    use pretty_assertions::assert_eq;

    fn game() -> MatchParticipation {
        MatchParticipation {
            puuid: String::new(),
            summoner_name: "P1".to_string(),
            champion_name: "Jinx".to_string(),
            team_position: "BOTTOM".to_string(),
            kills: 8,
            deaths: 4,
            assists: 4,
            total_minions_killed: 210,
            neutral_minions_killed: 0,
            vision_score: 12,
            win: true,
            game_duration: 1800,
            dragon_kills: 1,
            baron_kills: 0,
        }
    }

    fn provider() -> Arc<MockProvider> {
        Arc::new(
            MockProvider::new()
                .with_player("P1", Some(("GOLD", Some("I"))), vec![game()])
                .with_player("P2", Some(("SILVER", Some("III"))), vec![])
                .with_player("P3", Some(("GOLD", Some("IV"))), vec![])
                .with_player("P4", Some(("IRON", Some("II"))), vec![]),
        )
    }

    fn partitioner(
        provider: Arc<MockProvider>,
        optimizer: Option<Arc<MockOptimizer>>,
    ) -> TeamPartitioner {
        let profiles = Arc::new(ProfileAggregator::new(
            provider,
            Arc::new(MockCache::new()),
            ProfileSettings::default(),
        ));
        TeamPartitioner::new(
            profiles,
            optimizer.map(|o| o as Arc<dyn OptimizerClient>),
            Duration::from_secs(30),
        )
    }

    fn roster(names: &[&str]) -> Vec<PlayerInput> {
        names
            .iter()
            .map(|n| PlayerInput::new(*n, Role::Mid, Role::Fill))
            .collect()
    }

    fn candidate(rank: u8, a: &str, b: &str) -> Candidate {
        Candidate {
            rank,
            team_a: vec![CandidatePlayer {
                summoner_name: a.to_string(),
                assigned_position: "TOP".to_string(),
                hidden_mmr: 5.5,
            }],
            team_b: vec![CandidatePlayer {
                summoner_name: b.to_string(),
                assigned_position: "JUNGLE".to_string(),
                hidden_mmr: 5.2,
            }],
            team_a_win_rate: 0.51,
            team_b_win_rate: 0.49,
            balance_score: 0.95,
        }
    }

    fn team_names(team: &[TeamPlayer]) -> Vec<&str> {
        team.iter().map(|p| p.summoner_name.as_str()).collect()
    }

    #[tokio::test]
    async fn test_roster_size_validated_before_any_fetch() {
        let provider = provider();
        let partitioner = partitioner(provider.clone(), None);

        let one = roster(&["P1"]);
        assert!(matches!(
            partitioner.balance(&one).await,
            Err(BalanceError::Validation(_))
        ));

        let eleven: Vec<_> = (0..11)
            .map(|i| PlayerInput::new(format!("X{}", i), Role::Top, Role::Fill))
            .collect();
        assert!(matches!(
            partitioner.balance(&eleven).await,
            Err(BalanceError::Validation(_))
        ));

        assert_eq!(provider.call_count(), 0);
    }

    #[test]
    fn test_blank_name_rejected() {
        let roster = vec![
            PlayerInput::new("P1", Role::Top, Role::Fill),
            PlayerInput::new("  ", Role::Top, Role::Fill),
        ];
        assert!(matches!(
            TeamPartitioner::validate(&roster),
            Err(BalanceError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_optimizer_uses_fallback() {
        let optimizer = Arc::new(MockOptimizer::new(MockBehavior::Fail));
        let partitioner = partitioner(provider(), Some(optimizer.clone()));

        let results = partitioner
            .balance(&roster(&["P1", "P2", "P3", "P4"]))
            .await
            .unwrap();

        assert_eq!(results.len(), 1);
        let best = &results[0];
        assert_eq!(team_names(&best.team_a), vec!["P1", "P2"]);
        assert_eq!(team_names(&best.team_b), vec!["P3", "P4"]);
        assert_eq!(best.balance_score, 2.5);
        assert!((best.team_a_win_rate - 0.5926).abs() < 0.001);
        assert_eq!(optimizer.call_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_optimizer_deadline_falls_back_without_retry() {
        let optimizer = Arc::new(MockOptimizer::new(MockBehavior::Hang));
        let partitioner = partitioner(provider(), Some(optimizer.clone()));

        let results = partitioner.balance(&roster(&["P1", "P2"])).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].rank, 1);
        assert_eq!(optimizer.call_count(), 1);
    }

    #[tokio::test]
    async fn test_disabled_optimizer_uses_fallback() {
        let partitioner = partitioner(provider(), None);

        let results = partitioner.balance(&roster(&["P1", "P2"])).await.unwrap();

        assert_eq!(results.len(), 1);
        assert_eq!(team_names(&results[0].team_a), vec!["P1"]);
    }

    #[tokio::test]
    async fn test_empty_optimizer_answer_uses_fallback() {
        let optimizer = Arc::new(MockOptimizer::new(MockBehavior::Respond(vec![])));
        let partitioner = partitioner(provider(), Some(optimizer));

        let results = partitioner.balance(&roster(&["P1", "P2"])).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_optimizer_candidates_are_mapped() {
        let optimizer = Arc::new(MockOptimizer::new(MockBehavior::Respond(vec![
            candidate(2, "P2", "P1"),
            candidate(1, "P1", "Ghost"),
            candidate(3, "P1", "P2"),
            candidate(4, "P2", "P1"),
        ])));
        let partitioner = partitioner(provider(), Some(optimizer));

        let results = partitioner.balance(&roster(&["P1", "P2"])).await.unwrap();

        assert_eq!(results.len(), 3);
        assert_eq!(
            results.iter().map(|r| r.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );

        let best = &results[0];
        assert_eq!(best.team_a[0].tier, "GOLD");
        assert_eq!(best.team_a[0].rank, "I");
        assert_eq!(best.team_a[0].assigned_position, Role::Top);
        assert_eq!(best.team_b[0].summoner_name, "Ghost");
        assert_eq!(best.team_b[0].tier, "UNRANKED");
        assert_eq!(best.team_b[0].rank, "");
        assert_eq!(best.team_a_win_rate, 0.51);
    }

    #[tokio::test]
    async fn test_unknown_player_fails_whole_call() {
        let optimizer = Arc::new(MockOptimizer::new(MockBehavior::Fail));
        let partitioner = partitioner(provider(), Some(optimizer.clone()));

        let err = partitioner
            .balance(&roster(&["P1", "Nobody", "P2"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BalanceError::Upstream(FetchError::NotFound)));
        assert_eq!(optimizer.call_count(), 0);
    }

    #[tokio::test]
    async fn test_sibling_fetches_finish_after_a_failure() {
        let provider = provider();
        let partitioner = partitioner(provider.clone(), None);

        let err = partitioner
            .balance(&roster(&["Nobody", "P1", "P2"]))
            .await
            .unwrap_err();

        assert!(matches!(err, BalanceError::Upstream(FetchError::NotFound)));
        // Nobody: identity. P1: identity, league, ids, 1 match. P2: identity, league, ids.
        assert_eq!(provider.call_count(), 8);
    }

    /// Holds every identity lookup until the whole roster is in flight.
    struct GatedProvider {
        inner: MockProvider,
        gate: tokio::sync::Barrier,
    }

    #[async_trait::async_trait]
    impl DataProvider for GatedProvider {
        async fn get_identity(&self, name: &str) -> Result<PlayerIdentity, FetchError> {
            self.gate.wait().await;
            self.inner.get_identity(name).await
        }

        async fn get_rank_entries(&self, summoner_id: &str) -> Result<Vec<RankEntry>, FetchError> {
            self.inner.get_rank_entries(summoner_id).await
        }

        async fn get_recent_match_ids(
            &self,
            puuid: &str,
            count: u32,
            queue: Option<u32>,
        ) -> Result<Vec<String>, FetchError> {
            self.inner.get_recent_match_ids(puuid, count, queue).await
        }

        async fn get_match_participant(
            &self,
            match_id: &str,
            puuid: &str,
        ) -> Result<Option<MatchParticipation>, FetchError> {
            self.inner.get_match_participant(match_id, puuid).await
        }
    }

    #[tokio::test]
    async fn test_profiles_are_fetched_concurrently() {
        let provider = Arc::new(GatedProvider {
            inner: MockProvider::new()
                .with_player("P1", Some(("GOLD", Some("I"))), vec![])
                .with_player("P2", Some(("SILVER", Some("III"))), vec![])
                .with_player("P3", Some(("GOLD", Some("IV"))), vec![]),
            gate: tokio::sync::Barrier::new(3),
        });
        let profiles = Arc::new(ProfileAggregator::new(
            provider,
            Arc::new(MockCache::new()),
            ProfileSettings::default(),
        ));
        let partitioner = TeamPartitioner::new(profiles, None, Duration::from_secs(30));

        let results = tokio::time::timeout(
            Duration::from_secs(5),
            partitioner.balance(&roster(&["P1", "P2", "P3"])),
        )
        .await
        .expect("profile fetches ran one at a time")
        .unwrap();

        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_payload_defaults_missing_stats_to_zero() {
        let provider = provider();
        let aggregator = ProfileAggregator::new(
            provider,
            Arc::new(MockCache::new()),
            ProfileSettings::default(),
        );
        let roster = roster(&["P1", "P2"]);
        let profiles = vec![
            aggregator.get_profile("P1").await.unwrap(),
            aggregator.get_profile("P2").await.unwrap(),
        ];

        let payload = build_payload(&roster, &profiles);

        assert_eq!(payload[0].tier_score, 4.75);
        assert_eq!(payload[0].avg_kda, 3.0);
        assert_eq!(payload[0].objective_participation, 1.0);
        assert_eq!(payload[1].tier_score, 3.25);
        assert_eq!(payload[1].avg_kda, 0.0);
        assert_eq!(payload[1].avg_cs_per_min, 0.0);
        assert!(profiles[1].stats.is_none());
    }
}
