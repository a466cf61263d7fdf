//! Player identity, aggregated stats and the assembled profile.

use serde::{Deserialize, Serialize};

use super::{RankEntry, Role};

/// Account identity as returned by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerIdentity {
    /// Encrypted summoner id, used for league lookups
    pub id: String,

    /// Globally unique player id, used for match lookups
    pub puuid: String,

    pub name: String,

    pub summoner_level: u32,

    pub profile_icon_id: u32,
}

/// Aggregate over a player's recent solo-queue matches.
///
/// Never constructed for an empty window: no evidence is `None`, not zeros.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub puuid: String,
    pub summoner_name: String,

    /// Rank echo, `UNRANKED` / empty when the player has no solo entry
    pub tier: String,
    pub rank: String,
    pub lp: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,

    pub avg_kda: f64,
    pub avg_cs_per_min: f64,
    pub avg_vision_score: f64,

    /// Fraction of matches with at least one dragon or baron kill
    pub objective_participation: f64,

    pub primary_position: Role,

    /// Sample size, 1..=20
    pub recent_games_analyzed: u32,
}

/// A player's profile: identity, best-effort solo rank and optional stats.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerProfile {
    pub puuid: String,
    pub summoner_name: String,
    pub summoner_level: u32,
    pub profile_icon_id: u32,
    pub tier: Option<String>,
    #[serde(rename = "rank")]
    pub division: Option<String>,
    pub lp: u32,
    pub wins: u32,
    pub losses: u32,
    pub win_rate: f64,
    pub stats: Option<PlayerStats>,
}

impl PlayerProfile {
    /// Assemble a profile from its parts.
    pub fn assemble(
        identity: PlayerIdentity,
        solo: Option<&RankEntry>,
        stats: Option<PlayerStats>,
    ) -> Self {
        let (wins, losses) = solo.map_or((0, 0), |r| (r.wins, r.losses));

        Self {
            puuid: identity.puuid,
            summoner_name: identity.name,
            summoner_level: identity.summoner_level,
            profile_icon_id: identity.profile_icon_id,
            tier: solo.map(|r| r.tier.clone()),
            division: solo.and_then(|r| r.division.clone()),
            lp: solo.map_or(0, |r| r.league_points),
            wins,
            losses,
            win_rate: crate::calculate::calculate_win_rate(wins, losses),
            stats,
        }
    }

    /// Tier for display, `UNRANKED` when absent.
    pub fn tier_label(&self) -> &str {
        self.tier.as_deref().unwrap_or(UNRANKED)
    }

    /// Division for display, empty when absent.
    pub fn division_label(&self) -> &str {
        self.division.as_deref().unwrap_or("")
    }
}

/// Display value for players without a solo-queue entry.
pub const UNRANKED: &str = "UNRANKED";
