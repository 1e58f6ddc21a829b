use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
};
use serde_json::Value;
use crate::error::ApiError;
use crate::models::{Created, Entity, ObjectId, Record, Statline, StatlineInput, Validate};
use crate::AppState;

// POST /api/stats - Record a player's statline for a match
//
// match_id and player_id are checked for shape only, so a statline may point
// at a match or player that does not exist.
pub async fn create_statline(
    State(state): State<AppState>,
    payload: Result<Json<StatlineInput>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(input) = payload?;
    let stat = input.validate()?;
    let store = state.store()?;

    let id = store.insert(Statline::COLLECTION, &stat).await?;
    tracing::info!(
        "Created statline {} for player {} in match {}",
        id,
        stat.player_id,
        stat.match_id
    );

    Ok(Json(Created { id: id.into_string() }))
}

// GET /api/stats/by-match/{match_id} - All statlines recorded for a match
pub async fn list_stats_by_match(
    State(state): State<AppState>,
    Path(match_id): Path<String>,
) -> Result<Json<Vec<Record<Statline>>>, ApiError> {
    let match_id = ObjectId::parse(&match_id).ok_or(ApiError::BadRequest("Invalid match_id"))?;
    let store = state.store()?;

    let filter = vec![("match_id", Value::String(match_id.into_string()))];
    let stats = super::list_records(store, &filter).await?;

    Ok(Json(stats))
}
