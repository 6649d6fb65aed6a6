//! Display preference handlers.

use axum::{Json, extract::State};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::Result;
use crate::state::AppState;

/// Display preferences as exchanged with clients.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PreferencesBody {
    pub dark_mode: bool,
}

/// Current display preferences.
pub async fn show(State(state): State<AppState>) -> Json<PreferencesBody> {
    Json(PreferencesBody {
        dark_mode: state.preferences().dark_mode(),
    })
}

/// Replace display preferences.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Json(body): Json<PreferencesBody>,
) -> Result<Json<PreferencesBody>> {
    state.preferences().set_dark_mode(body.dark_mode).await?;
    Ok(Json(body))
}
