use axum::response::Json;
use serde::Serialize;

pub const ROOT_MESSAGE: &str = "Basketball Team API running";

#[derive(Serialize)]
pub struct RootResponse {
    message: &'static str,
}

// GET / - Constant acknowledgement
pub async fn root() -> Json<RootResponse> {
    Json(RootResponse { message: ROOT_MESSAGE })
}
