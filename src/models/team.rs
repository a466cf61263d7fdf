//! Roster input and partition results.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Role;

/// One roster entry supplied by the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerInput {
    pub summoner_name: String,
    pub primary_position: Role,
    pub secondary_position: Role,
}

impl PlayerInput {
    pub fn new(summoner_name: impl Into<String>, primary: Role, secondary: Role) -> Self {
        Self {
            summoner_name: summoner_name.into(),
            primary_position: primary,
            secondary_position: secondary,
        }
    }
}

/// Parses `name[:PRIMARY[:SECONDARY]]`; missing roles default to `FILL`.
impl FromStr for PlayerInput {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(format!("missing summoner name in '{}'", s));
        }

        let primary = parts.next().map(Role::from_str).transpose()?;
        let secondary = parts.next().map(Role::from_str).transpose()?;
        if parts.next().is_some() {
            return Err(format!("too many fields in '{}'", s));
        }

        Ok(Self::new(
            name,
            primary.unwrap_or(Role::Fill),
            secondary.unwrap_or(Role::Fill),
        ))
    }
}

/// A player placed on a team.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TeamPlayer {
    pub summoner_name: String,
    pub assigned_position: Role,
    pub hidden_mmr: f64,
    pub tier: String,
    pub rank: String,
}

/// One candidate two-team split.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceResult {
    /// Recommendation rank, 1..=3
    pub rank: u8,
    pub team_a: Vec<TeamPlayer>,
    pub team_b: Vec<TeamPlayer>,
    pub team_a_win_rate: f64,
    pub team_b_win_rate: f64,
    /// Lower is more even
    pub balance_score: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_player_input_parse() {
        let input: PlayerInput = "Faker:mid:top".parse().unwrap();
        assert_eq!(input, PlayerInput::new("Faker", Role::Mid, Role::Top));

        let input: PlayerInput = "Keria".parse().unwrap();
        assert_eq!(input.primary_position, Role::Fill);
        assert_eq!(input.secondary_position, Role::Fill);
    }

    #[test]
    fn test_player_input_parse_errors() {
        assert!("".parse::<PlayerInput>().is_err());
        assert!("Faker:MIDDLE".parse::<PlayerInput>().is_err());
        assert!("Faker:MID:TOP:ADC".parse::<PlayerInput>().is_err());
    }

    #[test]
    fn test_player_input_wire_names() {
        let json = r#"{"summonerName":"Zeus","primaryPosition":"TOP","secondaryPosition":"FILL"}"#;
        let input: PlayerInput = serde_json::from_str(json).unwrap();
        assert_eq!(input.summoner_name, "Zeus");
        assert_eq!(input.primary_position, Role::Top);
    }

    #[test]
    fn test_balance_result_wire_names() {
        let result = BalanceResult {
            rank: 1,
            team_a: vec![],
            team_b: vec![],
            team_a_win_rate: 0.5,
            team_b_win_rate: 0.5,
            balance_score: 0.0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["teamAWinRate"], 0.5);
        assert!(json["teamB"].is_array());
    }
}
