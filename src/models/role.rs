//! Team positions.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// A position on the map. `Fill` means "any" and is also where unknown
/// provider positions land.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Top,
    Jungle,
    Mid,
    Adc,
    Support,
    Fill,
}

impl Role {
    /// Normalize a provider `teamPosition` string.
    pub fn from_provider(position: &str) -> Self {
        match position {
            "TOP" => Role::Top,
            "JUNGLE" => Role::Jungle,
            "MIDDLE" => Role::Mid,
            "BOTTOM" => Role::Adc,
            "UTILITY" => Role::Support,
            _ => Role::Fill,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Top => "TOP",
            Role::Jungle => "JUNGLE",
            Role::Mid => "MID",
            Role::Adc => "ADC",
            Role::Support => "SUPPORT",
            Role::Fill => "FILL",
        }
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "TOP" => Ok(Role::Top),
            "JUNGLE" => Ok(Role::Jungle),
            "MID" => Ok(Role::Mid),
            "ADC" => Ok(Role::Adc),
            "SUPPORT" => Ok(Role::Support),
            "FILL" => Ok(Role::Fill),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
