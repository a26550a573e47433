//! Media image management for the dashboard: upload, list, delete.

use crate::AppState;
use crate::error::AppError;
use crate::middleware::session_gate::CurrentSession;
use axum::{
    Json,
    extract::{Multipart, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use uuid::Uuid;

const IMAGE_PREFIX: &str = "images/";
const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

pub async fn upload_image(
    State(state): State<AppState>,
    session: CurrentSession,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    session.require()?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read multipart field: {}", e)))?
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No file uploaded")))?;

    let original_name = field.file_name().unwrap_or("unnamed").to_string();
    let content_type = field
        .content_type()
        .unwrap_or("application/octet-stream")
        .to_string();

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::BadRequest(anyhow::anyhow!("Failed to read file bytes: {}", e)))?
        .to_vec();

    if data.len() > MAX_IMAGE_BYTES {
        return Err(AppError::BadRequest(anyhow::anyhow!(
            "File too large (max 10MB)"
        )));
    }

    let extension = std::path::Path::new(&original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("bin");

    let key = format!("{}{}.{}", IMAGE_PREFIX, Uuid::new_v4(), extension);

    state.images.upload(&key, data, &content_type).await?;

    tracing::info!(key = %key, original_name = %original_name, "Image uploaded");

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "key": key,
            "url": state.images.public_url(&key),
        })),
    ))
}

pub async fn list_images(
    State(state): State<AppState>,
    session: CurrentSession,
) -> Result<Json<Value>, AppError> {
    session.require()?;

    let objects = state.images.list(IMAGE_PREFIX).await?;

    let images: Vec<Value> = objects
        .iter()
        .map(|object| {
            json!({
                "key": object.key,
                "size": object.size,
                "url": state.images.public_url(&object.key),
            })
        })
        .collect();

    Ok(Json(json!({ "images": images })))
}

#[derive(Deserialize)]
pub struct DeleteImageRequest {
    pub key: String,
}

pub async fn delete_image(
    State(state): State<AppState>,
    session: CurrentSession,
    Json(payload): Json<DeleteImageRequest>,
) -> Result<Json<Value>, AppError> {
    session.require()?;

    state.images.delete(&payload.key).await?;

    tracing::info!(key = %payload.key, "Image deleted");

    Ok(Json(json!({ "success": true })))
}
