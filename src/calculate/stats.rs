//! Recent-match aggregation.

use crate::models::{MatchParticipation, PlayerStats, RankEntry, Role, UNRANKED};

use super::calculate_win_rate;

/// Maximum number of recent matches considered per player.
pub const MATCH_WINDOW: usize = 20;

/// Reduce a player's recent matches into summary statistics.
///
/// Only the first [`MATCH_WINDOW`] matches are used. An empty window yields
/// `None`; callers must not substitute zeros for it.
pub fn aggregate_stats(
    puuid: &str,
    matches: &[MatchParticipation],
    solo: Option<&RankEntry>,
) -> Option<PlayerStats> {
    let window = &matches[..matches.len().min(MATCH_WINDOW)];
    let first = window.first()?;
    let games = window.len() as f64;

    let total_kda: f64 = window.iter().map(MatchParticipation::kda).sum();
    let total_cs: f64 = window.iter().map(MatchParticipation::cs_per_min).sum();
    let total_vision: f64 = window.iter().map(|m| m.vision_score as f64).sum();
    let objective_games = window.iter().filter(|m| m.took_objective()).count();

    let (wins, losses) = solo.map_or((0, 0), |r| (r.wins, r.losses));

    Some(PlayerStats {
        puuid: puuid.to_string(),
        summoner_name: first.summoner_name.clone(),
        tier: solo.map_or_else(|| UNRANKED.to_string(), |r| r.tier.clone()),
        rank: solo.and_then(|r| r.division.clone()).unwrap_or_default(),
        lp: solo.map_or(0, |r| r.league_points),
        wins,
        losses,
        win_rate: calculate_win_rate(wins, losses),
        avg_kda: total_kda / games,
        avg_cs_per_min: total_cs / games,
        avg_vision_score: total_vision / games,
        objective_participation: objective_games as f64 / games,
        primary_position: primary_role(window),
        recent_games_analyzed: window.len() as u32,
    })
}

/// Most frequently played role.
///
/// Raw provider positions are counted before normalisation, so unrelated
/// unknown strings never add up. Ties go to the position seen first.
pub fn primary_role(matches: &[MatchParticipation]) -> Role {
    let mut counts: Vec<(&MatchParticipation, u32)> = Vec::new();
    for m in matches {
        match counts
            .iter_mut()
            .find(|(seen, _)| seen.team_position == m.team_position)
        {
            Some((_, count)) => *count += 1,
            None => counts.push((m, 1)),
        }
    }

    let mut best: Option<(&MatchParticipation, u32)> = None;
    for (m, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((m, count));
        }
    }

    best.map_or(Role::Fill, |(m, _)| m.role())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn game(position: &str, kills: u32, deaths: u32, assists: u32) -> MatchParticipation {
        MatchParticipation {
            puuid: "puuid-1".to_string(),
            summoner_name: "Chovy".to_string(),
            champion_name: "Azir".to_string(),
            team_position: position.to_string(),
            kills,
            deaths,
            assists,
            total_minions_killed: 270,
            neutral_minions_killed: 30,
            vision_score: 20,
            win: true,
            game_duration: 1800,
            dragon_kills: 0,
            baron_kills: 0,
        }
    }

    fn solo() -> RankEntry {
        RankEntry {
            queue_type: "RANKED_SOLO_5x5".to_string(),
            tier: "GRANDMASTER".to_string(),
            division: None,
            league_points: 700,
            wins: 90,
            losses: 60,
            hot_streak: false,
            veteran: true,
            fresh_blood: false,
            inactive: false,
        }
    }

    #[test]
    fn test_empty_window_is_absent() {
        assert!(aggregate_stats("puuid-1", &[], Some(&solo())).is_none());
        assert!(aggregate_stats("puuid-1", &[], None).is_none());
    }

    #[test]
    fn test_zero_deaths_counts_as_one() {
        let stats = aggregate_stats("puuid-1", &[game("MIDDLE", 10, 0, 10)], None).unwrap();
        assert_eq!(stats.avg_kda, 20.0);
        assert_eq!(stats.recent_games_analyzed, 1);
    }

    #[test]
    fn test_averages() {
        let mut with_dragon = game("MIDDLE", 2, 2, 2);
        with_dragon.dragon_kills = 1;
        with_dragon.vision_score = 40;
        with_dragon.game_duration = 1200;

        let matches = vec![game("MIDDLE", 4, 1, 4), with_dragon];
        let stats = aggregate_stats("puuid-1", &matches, Some(&solo())).unwrap();

        // KDA 8 and 2; cs/min 10 and 15
        assert_eq!(stats.avg_kda, 5.0);
        assert_eq!(stats.avg_cs_per_min, 12.5);
        assert_eq!(stats.avg_vision_score, 30.0);
        assert_eq!(stats.objective_participation, 0.5);
        assert_eq!(stats.primary_position, Role::Mid);
    }

    #[test]
    fn test_rank_echo() {
        let stats = aggregate_stats("puuid-1", &[game("TOP", 1, 1, 1)], Some(&solo())).unwrap();
        assert_eq!(stats.tier, "GRANDMASTER");
        assert_eq!(stats.rank, "");
        assert_eq!(stats.lp, 700);
        assert_eq!(stats.win_rate, 0.6);

        let unranked = aggregate_stats("puuid-1", &[game("TOP", 1, 1, 1)], None).unwrap();
        assert_eq!(unranked.tier, "UNRANKED");
        assert_eq!(unranked.win_rate, 0.0);
    }

    #[test]
    fn test_window_is_bounded() {
        let matches: Vec<_> = (0..25).map(|_| game("TOP", 1, 1, 1)).collect();
        let stats = aggregate_stats("puuid-1", &matches, None).unwrap();
        assert_eq!(stats.recent_games_analyzed, 20);
    }

    #[test]
    fn test_primary_role_tie_goes_to_first_seen() {
        let matches = vec![
            game("UTILITY", 0, 1, 5),
            game("BOTTOM", 5, 1, 0),
            game("BOTTOM", 5, 1, 0),
            game("UTILITY", 0, 1, 5),
        ];
        assert_eq!(primary_role(&matches), Role::Support);
    }

    #[test]
    fn test_primary_role_unknown_positions_do_not_pool() {
        let matches = vec![
            game("", 0, 1, 0),
            game("Invalid", 0, 1, 0),
            game("TOP", 0, 1, 0),
            game("TOP", 0, 1, 0),
        ];
        assert_eq!(primary_role(&matches), Role::Top);
    }

    #[test]
    fn test_primary_role_unknown_winner_is_fill() {
        let matches = vec![game("", 0, 1, 0), game("", 0, 1, 0), game("TOP", 0, 1, 0)];
        assert_eq!(primary_role(&matches), Role::Fill);
        assert_eq!(primary_role(&[]), Role::Fill);
    }
}
