//! Player profile aggregation.
//!
//! Builds a [`PlayerProfile`] from the data provider behind two cache-aside
//! layers: the whole profile under `profile:<lowercased name>` and the match
//! aggregate under `stats:<puuid>`.

use std::sync::Arc;
use std::time::Duration;

use futures_util::future::try_join_all;
use tracing::{debug, info, warn};

use crate::cache::{get_json, set_json, CacheStore};
use crate::calculate::{aggregate_stats, MATCH_WINDOW};
use crate::fetch::{DataProvider, FetchError};
use crate::models::{MatchParticipation, PlayerProfile, PlayerStats, RankEntry};

/// Queue id of ranked solo games in match history.
pub const SOLO_QUEUE_ID: u32 = 420;

/// Tuning for profile aggregation.
#[derive(Debug, Clone)]
pub struct ProfileSettings {
    pub profile_ttl: Duration,
    pub stats_ttl: Duration,

    /// Matches requested per player, capped at the aggregation window
    pub match_count: u32,

    /// Match-history queue filter
    pub queue: Option<u32>,
}

impl Default for ProfileSettings {
    fn default() -> Self {
        Self {
            profile_ttl: Duration::from_secs(3600),
            stats_ttl: Duration::from_secs(3600),
            match_count: MATCH_WINDOW as u32,
            queue: Some(SOLO_QUEUE_ID),
        }
    }
}

/// Cache key of a player's profile.
pub fn profile_key(name: &str) -> String {
    format!("profile:{}", name.to_lowercase())
}

/// Cache key of a player's match aggregate.
pub fn stats_key(puuid: &str) -> String {
    format!("stats:{}", puuid)
}

/// Assembles player profiles from the provider and the cache.
pub struct ProfileAggregator {
    provider: Arc<dyn DataProvider>,
    cache: Arc<dyn CacheStore>,
    settings: ProfileSettings,
}

impl ProfileAggregator {
    pub fn new(
        provider: Arc<dyn DataProvider>,
        cache: Arc<dyn CacheStore>,
        settings: ProfileSettings,
    ) -> Self {
        Self {
            provider,
            cache,
            settings,
        }
    }

    pub fn cache(&self) -> &Arc<dyn CacheStore> {
        &self.cache
    }

    /// Fetch a player's profile.
    ///
    /// Fails only when the identity or league lookup fails. Match-history
    /// problems leave `stats` empty instead.
    pub async fn get_profile(&self, name: &str) -> Result<PlayerProfile, FetchError> {
        let key = profile_key(name);
        if let Some(profile) = get_json::<PlayerProfile>(self.cache.as_ref(), &key).await {
            return Ok(profile);
        }

        debug!("Profile cache miss for {}", name);
        let identity = self.provider.get_identity(name).await?;
        let entries = self.provider.get_rank_entries(&identity.id).await?;
        let solo = RankEntry::select_solo(entries);

        let stats = self.get_stats(&identity.puuid, solo.as_ref()).await;
        let profile = PlayerProfile::assemble(identity, solo.as_ref(), stats);

        info!(
            "Built profile for {} ({} {}, {} games analyzed)",
            profile.summoner_name,
            profile.tier_label(),
            profile.division_label(),
            profile
                .stats
                .as_ref()
                .map_or(0, |s| s.recent_games_analyzed)
        );

        set_json(self.cache.as_ref(), &key, &profile, self.settings.profile_ttl).await;
        Ok(profile)
    }

    /// Aggregate a player's recent matches, `None` when there is no usable
    /// history or it could not be fetched.
    pub async fn get_stats(&self, puuid: &str, solo: Option<&RankEntry>) -> Option<PlayerStats> {
        let key = stats_key(puuid);
        if let Some(stats) = get_json::<PlayerStats>(self.cache.as_ref(), &key).await {
            return Some(stats);
        }

        let matches = match self.fetch_matches(puuid).await {
            Ok(matches) => matches,
            Err(e) => {
                warn!("Match history unavailable for {}: {}", puuid, e);
                return None;
            }
        };

        let stats = aggregate_stats(puuid, &matches, solo)?;
        set_json(self.cache.as_ref(), &key, &stats, self.settings.stats_ttl).await;
        Some(stats)
    }

    /// Drop cached data for a player so the next lookup hits the provider.
    pub async fn invalidate(&self, name: &str) {
        let key = profile_key(name);
        if let Some(profile) = get_json::<PlayerProfile>(self.cache.as_ref(), &key).await {
            self.cache.delete(&stats_key(&profile.puuid)).await;
        }
        self.cache.delete(&key).await;
    }

    async fn fetch_matches(&self, puuid: &str) -> Result<Vec<MatchParticipation>, FetchError> {
        let count = self.settings.match_count.min(MATCH_WINDOW as u32);
        let ids = self
            .provider
            .get_recent_match_ids(puuid, count, self.settings.queue)
            .await?;

        let participants = try_join_all(
            ids.iter()
                .map(|id| self.provider.get_match_participant(id, puuid)),
        )
        .await?;

        Ok(participants.into_iter().flatten().collect())
    }
}
