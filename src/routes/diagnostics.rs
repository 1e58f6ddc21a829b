use axum::{extract::State, response::Json};
use serde::{Deserialize, Serialize};
use crate::AppState;

/// Collections reported by the diagnostic endpoint.
pub const MAX_LISTED_COLLECTIONS: usize = 10;
const MAX_ERROR_CHARS: usize = 50;

#[derive(Debug, Serialize, Deserialize)]
pub struct DiagnosticReport {
    pub backend: String,
    pub database: String,
    pub database_url: Option<String>,
    pub database_name: Option<String>,
    pub connection_status: String,
    pub collections: Vec<String>,
}

fn truncate(message: &str) -> String {
    message.chars().take(MAX_ERROR_CHARS).collect()
}

fn presence(value: &Option<String>) -> String {
    let label = if value.is_some() { "✅ Set" } else { "❌ Not Set" };
    label.to_string()
}

// GET /test - Report store connectivity and configuration
//
// Never fails: every problem is described in the 200 response body.
pub async fn test_database(State(state): State<AppState>) -> Json<DiagnosticReport> {
    let mut report = DiagnosticReport {
        backend: "✅ Running".to_string(),
        database: "❌ Not Available".to_string(),
        database_url: None,
        database_name: None,
        connection_status: "Not Connected".to_string(),
        collections: Vec::new(),
    };

    match &state.store {
        Some(store) => {
            report.database = "✅ Available".to_string();
            report.database_url = Some("✅ Configured".to_string());
            report.database_name = Some(store.name().to_string());
            report.connection_status = "Connected".to_string();

            match store.list_collection_names().await {
                Ok(mut names) => {
                    names.truncate(MAX_LISTED_COLLECTIONS);
                    report.collections = names;
                    report.database = "✅ Connected & Working".to_string();
                }
                Err(e) => {
                    tracing::warn!("Diagnostic collection listing failed: {}", e);
                    report.database = format!("⚠️  Connected but Error: {}", truncate(&e.to_string()));
                }
            }
        }
        None => {
            report.database = "⚠️  Available but not initialized".to_string();
        }
    }

    report.database_url = Some(presence(&state.config.database_url));
    report.database_name = Some(presence(&state.config.database_name));

    Json(report)
}
