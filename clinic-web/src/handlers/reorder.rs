//! Reorder endpoints for the three ranked catalog collections.
//!
//! All three accept `{ "orderedIds": [...] }` and persist rank = position + 1
//! per id, but they deliberately do not share one contract:
//!
//! - price categories: session required, 400 on a bad body shape, 500 on
//!   malformed JSON or a failing update (strict batch);
//! - service categories: no session check at all, every failure surfaces as
//!   500, strict batch;
//! - services: session required, 400 on malformed JSON or a bad body shape,
//!   best-effort batch that reports success even when individual updates fail.
//!
//! The inconsistencies are inherited behavior, kept on purpose; see DESIGN.md.

use crate::AppState;
use crate::error::AppError;
use crate::middleware::session_gate::CurrentSession;
use crate::models::Collection;
use crate::services::ordering::{FailureMode, assign_ranks};
use axum::{Json, extract::State};
use serde_json::{Value, json};

/// Bodies are parsed by hand rather than through a typed extractor so each
/// endpoint keeps control of how parse and shape violations are reported.
fn parse_body(body: &str) -> Result<Value, anyhow::Error> {
    Ok(serde_json::from_str(body)?)
}

fn extract_ordered_ids(value: &Value) -> Result<Vec<String>, anyhow::Error> {
    let entries = value
        .get("orderedIds")
        .and_then(Value::as_array)
        .ok_or_else(|| anyhow::anyhow!("orderedIds must be an array"))?;

    entries
        .iter()
        .map(|entry| {
            entry
                .as_str()
                .map(str::to_owned)
                .ok_or_else(|| anyhow::anyhow!("orderedIds entries must be strings"))
        })
        .collect()
}

pub async fn reorder_price_categories(
    State(state): State<AppState>,
    session: CurrentSession,
    body: String,
) -> Result<Json<Value>, AppError> {
    session.require()?;

    // Malformed JSON counts as an unexpected exception here; only the shape
    // precondition gets a 400.
    let value = parse_body(&body).map_err(AppError::InternalError)?;
    let ordered_ids = extract_ordered_ids(&value).map_err(AppError::BadRequest)?;

    assign_ranks(
        state.catalog.as_ref(),
        Collection::PriceCategories,
        &ordered_ids,
        FailureMode::Strict,
    )
    .await?;

    tracing::info!(count = ordered_ids.len(), "Price categories reordered");

    Ok(Json(json!({ "success": true })))
}

pub async fn reorder_service_categories(
    State(state): State<AppState>,
    body: String,
) -> Result<Json<Value>, AppError> {
    let value = parse_body(&body).map_err(AppError::InternalError)?;
    let ordered_ids = extract_ordered_ids(&value).map_err(AppError::InternalError)?;

    assign_ranks(
        state.catalog.as_ref(),
        Collection::ServiceCategories,
        &ordered_ids,
        FailureMode::Strict,
    )
    .await?;

    tracing::info!(count = ordered_ids.len(), "Service categories reordered");

    Ok(Json(json!({ "success": true })))
}

pub async fn reorder_services(
    State(state): State<AppState>,
    session: CurrentSession,
    body: String,
) -> Result<Json<Value>, AppError> {
    session.require()?;

    let value = parse_body(&body).map_err(AppError::BadRequest)?;
    let ordered_ids = extract_ordered_ids(&value).map_err(AppError::BadRequest)?;

    assign_ranks(
        state.catalog.as_ref(),
        Collection::Services,
        &ordered_ids,
        FailureMode::BestEffort,
    )
    .await?;

    tracing::info!(count = ordered_ids.len(), "Services reordered");

    Ok(Json(json!({ "success": true })))
}
