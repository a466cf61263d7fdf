//! One player's line in a finished match.

use serde::{Deserialize, Serialize};

use super::Role;

/// Per-match participation record. Only lives long enough to be aggregated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchParticipation {
    pub puuid: String,
    #[serde(default)]
    pub summoner_name: String,
    #[serde(default)]
    pub champion_name: String,
    /// Raw provider position (`TOP`, `MIDDLE`, `UTILITY`, ...)
    #[serde(default)]
    pub team_position: String,
    pub kills: u32,
    pub deaths: u32,
    pub assists: u32,
    pub total_minions_killed: u32,
    pub neutral_minions_killed: u32,
    pub vision_score: u32,
    pub win: bool,
    /// Match length in seconds; copied in from the match-level info block
    #[serde(default)]
    pub game_duration: u64,
    #[serde(default)]
    pub dragon_kills: u32,
    #[serde(default)]
    pub baron_kills: u32,
}

impl MatchParticipation {
    pub fn role(&self) -> Role {
        Role::from_provider(&self.team_position)
    }

    /// (kills + assists) / deaths, with zero deaths counted as one.
    pub fn kda(&self) -> f64 {
        (self.kills + self.assists) as f64 / self.deaths.max(1) as f64
    }

    /// Lane minions plus neutral monsters per minute. Zero-length matches yield 0.
    pub fn cs_per_min(&self) -> f64 {
        if self.game_duration == 0 {
            return 0.0;
        }
        let minutes = self.game_duration as f64 / 60.0;
        (self.total_minions_killed + self.neutral_minions_killed) as f64 / minutes
    }

    pub fn took_objective(&self) -> bool {
        self.dragon_kills > 0 || self.baron_kills > 0
    }
}
