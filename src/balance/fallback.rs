//! Deterministic local partition used when the optimizer cannot answer.

use std::cmp::Ordering;

use crate::calculate::profile_score;
use crate::models::{BalanceResult, PlayerInput, PlayerProfile, TeamPlayer};

/// Split a roster into two teams by alternating down the score order.
///
/// `profiles[i]` must belong to `roster[i]`. Players are sorted by hidden
/// rating, highest first, keeping roster order among equal scores; even
/// positions go to team A and odd ones to team B. Everyone plays their
/// declared primary position.
pub fn partition(roster: &[PlayerInput], profiles: &[PlayerProfile]) -> BalanceResult {
    let mut ranked: Vec<(&PlayerInput, &PlayerProfile, f64)> = roster
        .iter()
        .zip(profiles)
        .map(|(player, profile)| (player, profile, profile_score(profile)))
        .collect();

    // stable: ties keep roster order
    ranked.sort_by(|a, b| b.2.partial_cmp(&a.2).unwrap_or(Ordering::Equal));

    let mut team_a = Vec::with_capacity(ranked.len() / 2 + 1);
    let mut team_b = Vec::with_capacity(ranked.len() / 2);
    let (mut score_a, mut score_b) = (0.0, 0.0);

    for (idx, (player, profile, score)) in ranked.into_iter().enumerate() {
        let placed = TeamPlayer {
            summoner_name: player.summoner_name.clone(),
            assigned_position: player.primary_position,
            hidden_mmr: score,
            tier: profile.tier_label().to_string(),
            rank: profile.division_label().to_string(),
        };
        if idx % 2 == 0 {
            score_a += score;
            team_a.push(placed);
        } else {
            score_b += score;
            team_b.push(placed);
        }
    }

    let total = score_a + score_b;
    let team_a_win_rate = if total > 0.0 { score_a / total } else { 0.5 };

    BalanceResult {
        rank: 1,
        team_a,
        team_b,
        team_a_win_rate,
        team_b_win_rate: 1.0 - team_a_win_rate,
        balance_score: (score_a - score_b).abs(),
    }
}
