use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;

use crate::api::state::AppState;
use crate::api::{ApiError, Envelope};
use crate::models::PlayerProfile;

#[derive(Debug, Default, Deserialize)]
pub struct SummonerParams {
    /// Drop cached layers before the lookup
    #[serde(default)]
    pub refresh: bool,
}

pub async fn get_summoner(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<SummonerParams>,
) -> Result<Json<Envelope<PlayerProfile>>, ApiError> {
    let name = name.trim();
    if name.is_empty() {
        return Err(ApiError::BadRequest("summoner name is required".to_string()));
    }

    if params.refresh {
        state.profiles.invalidate(name).await;
    }

    let profile = state.profiles.get_profile(name).await?;
    Ok(Envelope::ok(profile))
}
