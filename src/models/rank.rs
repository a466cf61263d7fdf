//! Competitive rank: tiers, divisions and provider league entries.

use serde::{Deserialize, Serialize};

/// Queue type of the solo ranked ladder.
pub const SOLO_QUEUE: &str = "RANKED_SOLO_5x5";

/// The ten ordered competitive tiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Tier {
    Iron,
    Bronze,
    Silver,
    Gold,
    Platinum,
    Emerald,
    Diamond,
    Master,
    Grandmaster,
    Challenger,
}

impl Tier {
    pub const ALL: [Tier; 10] = [
        Tier::Iron,
        Tier::Bronze,
        Tier::Silver,
        Tier::Gold,
        Tier::Platinum,
        Tier::Emerald,
        Tier::Diamond,
        Tier::Master,
        Tier::Grandmaster,
        Tier::Challenger,
    ];

    /// Parse a provider tier string, ignoring case. Unknown names yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
    }

    /// Ordinal position on the ladder, Iron = 1 through Challenger = 10.
    pub fn value(self) -> u8 {
        self as u8 + 1
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Iron => "IRON",
            Tier::Bronze => "BRONZE",
            Tier::Silver => "SILVER",
            Tier::Gold => "GOLD",
            Tier::Platinum => "PLATINUM",
            Tier::Emerald => "EMERALD",
            Tier::Diamond => "DIAMOND",
            Tier::Master => "MASTER",
            Tier::Grandmaster => "GRANDMASTER",
            Tier::Challenger => "CHALLENGER",
        }
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Sub-tier division, I being the highest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Division {
    I,
    II,
    III,
    IV,
}

impl Division {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "I" => Some(Division::I),
            "II" => Some(Division::II),
            "III" => Some(Division::III),
            "IV" => Some(Division::IV),
            _ => None,
        }
    }

    /// Fractional bonus on top of the tier step. Always below 1.
    pub fn bonus(self) -> f64 {
        match self {
            Division::I => 0.75,
            Division::II => 0.5,
            Division::III => 0.25,
            Division::IV => 0.0,
        }
    }
}

/// A league entry as reported by the data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RankEntry {
    pub queue_type: String,
    pub tier: String,
    /// Division; the provider calls it `rank`. Absent above Master.
    #[serde(rename = "rank", default)]
    pub division: Option<String>,
    pub league_points: u32,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub hot_streak: bool,
    #[serde(default)]
    pub veteran: bool,
    #[serde(default)]
    pub fresh_blood: bool,
    #[serde(default)]
    pub inactive: bool,
}

impl RankEntry {
    pub fn is_solo(&self) -> bool {
        self.queue_type == SOLO_QUEUE
    }

    /// Pick the solo-queue entry, if the player is ranked there.
    pub fn select_solo(entries: Vec<RankEntry>) -> Option<RankEntry> {
        entries.into_iter().find(RankEntry::is_solo)
    }
}
