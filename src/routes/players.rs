use axum::{
    extract::{rejection::JsonRejection, State},
    response::Json,
};
use crate::error::ApiError;
use crate::models::{Created, Entity, Player, PlayerInput, Record, Validate};
use crate::AppState;

// POST /api/players - Create a player
pub async fn create_player(
    State(state): State<AppState>,
    payload: Result<Json<PlayerInput>, JsonRejection>,
) -> Result<Json<Created>, ApiError> {
    let Json(input) = payload?;
    let player = input.validate()?;
    let store = state.store()?;

    let id = store.insert(Player::COLLECTION, &player).await?;
    tracing::info!("Created player {} (#{}) as {}", player.name, player.number, id);

    Ok(Json(Created { id: id.into_string() }))
}

// GET /api/players - List all players
pub async fn list_players(
    State(state): State<AppState>,
) -> Result<Json<Vec<Record<Player>>>, ApiError> {
    let players = super::list_records(state.store()?, &Vec::new()).await?;
    Ok(Json(players))
}
