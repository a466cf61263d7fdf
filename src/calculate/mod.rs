//! Rating and statistics calculation.
//!
//! Pure functions only:
//! - Hidden rating from tier and division
//! - Win rate
//! - Recent-match aggregation (see [`stats`])

mod stats;

pub use stats::{aggregate_stats, primary_role, MATCH_WINDOW};

use crate::models::{Division, PlayerProfile, Tier};

/// Tier assumed for players without a solo-queue entry.
pub const DEFAULT_TIER: &str = "IRON";

/// Division assumed for players without a solo-queue entry.
pub const DEFAULT_DIVISION: &str = "IV";

/// Ladder position of a tier string, 0 when unrecognized.
pub fn tier_value(tier: &str) -> u8 {
    Tier::parse(tier).map_or(0, Tier::value)
}

/// Sub-tier bonus of a division string, 0 when unrecognized.
pub fn division_bonus(division: &str) -> f64 {
    Division::parse(division).map_or(0.0, Division::bonus)
}

/// Hidden rating: tier ordinal plus division bonus.
///
/// The bonus never reaches 1, so any higher tier outranks every division of
/// a lower one. Unknown tiers score as 0 plus their bonus.
pub fn score(tier: &str, division: &str) -> f64 {
    tier_value(tier) as f64 + division_bonus(division)
}

/// Hidden rating of a profile, treating unranked players as Iron IV.
pub fn profile_score(profile: &PlayerProfile) -> f64 {
    score(
        profile.tier.as_deref().unwrap_or(DEFAULT_TIER),
        profile.division.as_deref().unwrap_or(DEFAULT_DIVISION),
    )
}

/// Calculate win rate from wins/losses.
pub fn calculate_win_rate(wins: u32, losses: u32) -> f64 {
    let total = u64::from(wins) + u64::from(losses);
    if total == 0 {
        0.0
    } else {
        wins as f64 / total as f64
    }
}
