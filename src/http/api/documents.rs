//! Document upload endpoints.

use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    Json,
};
use serde::Deserialize;

use crate::documents::{CreatedDocument, Document, FileUpload};
use crate::http::api::error::ApiError;
use crate::http::server::AppState;

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: Option<String>,
    pub num_pages: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct NotionRequest {
    pub url: Option<String>,
}

fn file_upload(params: UploadParams, headers: &HeaderMap, bytes: Bytes) -> FileUpload {
    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    FileUpload {
        name: params.name.unwrap_or_default(),
        content_type,
        bytes,
        num_pages: params.num_pages,
    }
}

/// `POST /api/teams/{team_id}/documents/upload?name=&num_pages=`
pub async fn upload_document(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedDocument>), ApiError> {
    let created = state
        .documents
        .upload_document(&team_id, file_upload(params, &headers, body))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/teams/{team_id}/documents/{document_id}/versions?name=&num_pages=`
pub async fn upload_version(
    State(state): State<AppState>,
    Path((team_id, document_id)): Path<(String, String)>,
    Query(params): Query<UploadParams>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, Json<CreatedDocument>), ApiError> {
    let created = state
        .documents
        .upload_version(&team_id, &document_id, file_upload(params, &headers, body))
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `POST /api/teams/{team_id}/documents` with `{ "url": "<notion link>" }`
pub async fn add_notion_page(
    State(state): State<AppState>,
    Path(team_id): Path<String>,
    Json(request): Json<NotionRequest>,
) -> Result<(StatusCode, Json<CreatedDocument>), ApiError> {
    let created = state
        .documents
        .add_notion_page(&team_id, request.url.as_deref())
        .await?;
    Ok((StatusCode::CREATED, Json(created)))
}

/// `GET /api/teams/{team_id}/documents/{document_id}`
pub async fn get_document(
    State(state): State<AppState>,
    Path((team_id, document_id)): Path<(String, String)>,
) -> Result<Json<Document>, ApiError> {
    Ok(Json(state.documents.get(&team_id, &document_id).await?))
}
