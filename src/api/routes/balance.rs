use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::api::state::AppState;
use crate::api::{ApiError, Envelope};
use crate::models::{BalanceResult, PlayerInput, Role};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePlayer {
    pub summoner_name: String,
    pub primary_position: String,
    #[serde(default)]
    pub secondary_position: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceRequest {
    #[serde(default)]
    pub players: Vec<BalancePlayer>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceData {
    pub player_count: usize,
    pub results: Vec<BalanceResult>,
}

impl BalancePlayer {
    fn into_input(self) -> Result<PlayerInput, ApiError> {
        let primary: Role = self.primary_position.parse().map_err(ApiError::BadRequest)?;
        let secondary = match self.secondary_position.as_deref() {
            None | Some("") => Role::Fill,
            Some(s) => s.parse().map_err(ApiError::BadRequest)?,
        };
        Ok(PlayerInput::new(self.summoner_name, primary, secondary))
    }
}

pub async fn balance_teams(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<Envelope<BalanceData>>, ApiError> {
    let Json(request) = payload.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let roster = request
        .players
        .into_iter()
        .map(BalancePlayer::into_input)
        .collect::<Result<Vec<_>, _>>()?;

    let results = state.partitioner.balance(&roster).await?;

    Ok(Envelope::ok(BalanceData {
        player_count: roster.len(),
        results,
    }))
}
