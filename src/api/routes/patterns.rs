//! Pattern Routes
//!
//! - GET /patterns/:user_id - Correlations, stats and predictions over the
//!   user's recent confirmed history

use axum::{
    extract::{Path, State},
    Json,
};
use std::sync::Arc;

use crate::api::dto::PatternsResponse;
use crate::api::error::ApiResult;
use crate::api::state::AppState;
use crate::journal::{analyze, StructuredRecord};

/// GET /patterns/:user_id
///
/// Reads at most `history_limit` confirmed entries, newest first. Below
/// `min_entries` nothing is analyzed.
pub async fn get_patterns(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
) -> ApiResult<Json<PatternsResponse>> {
    let entries = state
        .store
        .recent_confirmed(&user_id, state.config.history_limit)
        .await?;

    if entries.len() < state.config.min_entries {
        tracing::debug!(
            user_id = %user_id,
            entries = entries.len(),
            required = state.config.min_entries,
            "Not enough history for patterns"
        );
        return Ok(Json(PatternsResponse::not_enough_data()));
    }

    let records = entries
        .iter()
        .map(|entry| StructuredRecord::from_value(&entry.extracted_json))
        .collect::<Result<Vec<_>, _>>()?;

    let analysis = analyze(&records);

    tracing::info!(
        user_id = %user_id,
        entries = records.len(),
        patterns = analysis.patterns.len(),
        "Patterns computed"
    );

    Ok(Json(PatternsResponse {
        has_enough_data: true,
        patterns: analysis.patterns,
        stats: Some(analysis.stats),
        predictions: analysis.predictions,
    }))
}
