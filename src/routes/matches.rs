use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use crate::error::ApiError;
use crate::models::{Created, Entity, Match, MatchInput, Record, Validate};
use crate::AppState;

// POST /api/matches - Create a match
pub async fn create_match(
    State(state): State<AppState>,
    payload: Result<Json<MatchInput>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(input) = payload?;
    let game = input.validate()?;
    let store = state.store()?;

    let id = store.insert(Match::COLLECTION, &game).await?;
    tracing::info!("Created match vs {} on {} as {}", game.opponent, game.date, id);

    Ok(Json(Created { id: id.into_string() }))
}

// GET /api/matches - List all matches
pub async fn list_matches(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record<Match>>>, ApiError> {
    let matches = super::list_records(state.store()?, &Vec::new()).await?;
    Ok(Json(matches))
}
