//! Entry Routes
//!
//! - POST /entries/draft - Extract a check-in and store it as a draft
//! - PATCH /entries/:entry_id/confirm - Confirm a draft with edited data
//! - GET /entries/:user_id - Confirmed entries for the timeline

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use std::sync::Arc;

use crate::api::dto::{
    ConfirmRequest, ConfirmResponse, DraftRequest, DraftResponse, TimelineEntry, TimelineParams,
    TimelineResponse,
};
use crate::api::error::{ApiError, ApiResult};
use crate::api::state::AppState;
use crate::journal::{extract_tags, StructuredRecord};
use crate::storage::{parse_date, Entry, MonthFilter, NewEntry, DATE_FORMAT};

const MAX_TEXT_LEN: usize = 10_000;

/// POST /entries/draft
pub async fn create_draft(
    State(state): State<Arc<AppState>>,
    Json(req): Json<DraftRequest>,
) -> ApiResult<(StatusCode, Json<DraftResponse>)> {
    validate_draft_request(&req)?;
    let date = parse_date(&req.date)?;

    let mut record = state.extractor.extract(&req.text).await?;

    let condition = req
        .condition
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_lowercase);
    if condition.is_some() {
        record.condition = condition.clone();
    }
    if let Some(data) = req.condition_data {
        record.condition_data.extend(data);
    }

    let extracted = record.to_value();
    let mut new_entry = NewEntry::new(req.user_id.trim(), date, req.text, extracted.clone());
    if let Some(condition) = condition {
        new_entry = new_entry.condition(condition);
    }

    let entry = state.store.insert_draft(new_entry).await?;

    tracing::info!(
        entry_id = %entry.id,
        user_id = %entry.user_id,
        extractor = state.extractor.name(),
        "Draft entry created"
    );

    Ok((
        StatusCode::CREATED,
        Json(DraftResponse {
            entry_id: entry.id,
            extracted_data: extracted,
        }),
    ))
}

/// PATCH /entries/:entry_id/confirm
///
/// The submitted record replaces the draft's extraction. It is normalized
/// before storage; a non-object is rejected with 422.
pub async fn confirm_entry(
    State(state): State<Arc<AppState>>,
    Path(entry_id): Path<String>,
    Json(req): Json<ConfirmRequest>,
) -> ApiResult<Json<ConfirmResponse>> {
    let mut record = StructuredRecord::from_value(&req.extracted_data)?;

    let entry = state
        .store
        .get(&entry_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Entry {}", entry_id)))?;

    if record.condition.is_none() {
        record.condition = entry.condition.clone();
    }

    state.store.confirm(&entry_id, &record.to_value()).await?;

    tracing::info!(entry_id = %entry_id, user_id = %entry.user_id, "Entry confirmed");

    Ok(Json(ConfirmResponse {
        message: "Entry confirmed".to_string(),
        entry_id,
    }))
}

/// GET /entries/:user_id?month=YYYY-MM
pub async fn list_entries(
    State(state): State<Arc<AppState>>,
    Path(user_id): Path<String>,
    Query(params): Query<TimelineParams>,
) -> ApiResult<Json<TimelineResponse>> {
    let month = params
        .month
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(MonthFilter::parse)
        .transpose()?;

    let entries = state.store.list_confirmed(&user_id, month).await?;

    let entries = entries
        .iter()
        .map(timeline_entry)
        .collect::<ApiResult<Vec<_>>>()?;

    Ok(Json(TimelineResponse { entries }))
}

fn timeline_entry(entry: &Entry) -> ApiResult<TimelineEntry> {
    let record = StructuredRecord::from_value(&entry.extracted_json)?;

    Ok(TimelineEntry {
        id: entry.id.clone(),
        date: entry.date.format(DATE_FORMAT).to_string(),
        raw_text: entry.raw_text.clone(),
        tags: extract_tags(&record),
        mood: record.mood(),
    })
}

fn validate_draft_request(req: &DraftRequest) -> ApiResult<()> {
    if req.user_id.trim().is_empty() {
        return Err(ApiError::Validation("user_id cannot be empty".to_string()));
    }

    if req.text.trim().is_empty() {
        return Err(ApiError::Validation("text cannot be empty".to_string()));
    }

    if req.text.len() > MAX_TEXT_LEN {
        return Err(ApiError::Validation(format!(
            "text exceeds maximum length of {} bytes",
            MAX_TEXT_LEN
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(user_id: &str, text: &str) -> DraftRequest {
        DraftRequest {
            user_id: user_id.to_string(),
            text: text.to_string(),
            date: "2026-02-14".to_string(),
            condition: None,
            condition_data: None,
        }
    }

    #[test]
    fn test_validate_draft_request() {
        assert!(validate_draft_request(&request("u1", "slept 5h")).is_ok());
        assert!(validate_draft_request(&request(" ", "slept 5h")).is_err());
        assert!(validate_draft_request(&request("u1", "\n")).is_err());
        assert!(validate_draft_request(&request("u1", &"x".repeat(MAX_TEXT_LEN + 1))).is_err());
    }
}
