use super::{ApiError, AppState};
use crate::{
    error::StemError,
    io::filename::{is_allowed_audio, job_stem, sanitize_filename},
    types::{SeparationMode, SeparationOutcome},
};
use axum::{
    body::Body,
    extract::{rejection::JsonRejection, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use serde_json::{json, Value};
use tokio_util::io::ReaderStream;
use tracing::info;

type ApiResult<T> = Result<T, ApiError>;

// POST /upload

pub async fn upload(State(st): State<AppState>, mut multipart: Multipart) -> ApiResult<Json<Value>> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let original = field.file_name().unwrap_or_default().to_string();
        if original.is_empty() {
            return Err(ApiError::bad_request("No selected file"));
        }

        let filename = match sanitize_filename(&original) {
            Ok(name) if is_allowed_audio(&original) && is_allowed_audio(&name) => name,
            _ => return Err(ApiError::bad_request("File type not allowed")),
        };

        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;

        let path = st.layout.upload_path(&filename)?;
        tokio::fs::write(&path, &data).await.map_err(StemError::from)?;
        info!(%filename, bytes = data.len(), "stored upload");

        return Ok(Json(json!({
            "message": "File uploaded successfully",
            "filename": filename,
        })));
    }

    Err(ApiError::bad_request("No file part"))
}

// POST /separate

#[derive(Debug, Deserialize)]
pub struct SeparateBody {
    filename: Option<String>,
    separation_type: Option<String>,
}

pub async fn separate(
    State(st): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<SeparateBody>, JsonRejection>,
) -> ApiResult<Json<Value>> {
    let Json(body) = body?;
    let filename = body
        .filename
        .filter(|f| !f.is_empty())
        .ok_or_else(|| ApiError::bad_request("No filename provided"))?;

    let in_path = st.layout.upload_path(&filename)?;
    if !is_file(&in_path).await {
        return Err(ApiError::not_found(format!("File not found: {filename}")));
    }

    let mode = SeparationMode::from_selector(body.separation_type.as_deref());
    let req = st.cfg.request(mode);

    let outcome = st.separator.separate(&in_path, &req).await?;
    match outcome {
        SeparationOutcome::Completed => {}
        SeparationOutcome::NoValidInput => return Err(ApiError::bad_request(outcome.diagnostic())),
        SeparationOutcome::Failed { .. } => return Err(ApiError::internal(outcome.diagnostic())),
    }

    let job = job_stem(&filename);
    let songs = match st.layout.list_artifacts_async(job).await {
        Err(StemError::NotFound { .. }) => {
            return Err(ApiError::not_found("Separated files not found"))
        }
        other => other?,
    };
    let download_urls = download_urls(&st, &headers, job, &songs);

    Ok(Json(json!({
        "message": outcome.diagnostic(),
        "songs": songs,
        "download_urls": download_urls,
    })))
}

// GET /download/{job}

pub async fn list_downloads(
    State(st): State<AppState>,
    headers: HeaderMap,
    Path(job): Path<String>,
) -> ApiResult<Json<Value>> {
    let songs = st.layout.list_artifacts_async(&job).await?;
    let download_urls = download_urls(&st, &headers, &job, &songs);

    Ok(Json(json!({
        "songs": songs,
        "download_urls": download_urls,
    })))
}

// GET /download/{job}/{song}

pub async fn download_song(
    State(st): State<AppState>,
    Path((job, song)): Path<(String, String)>,
) -> ApiResult<Response> {
    let path = st.layout.artifact_path(&job, &song)?;
    if !is_file(&path).await {
        return Err(ApiError::not_found("File not found"));
    }

    let file = tokio::fs::File::open(&path).await.map_err(StemError::from)?;
    let len = file.metadata().await.map_err(StemError::from)?.len();
    let mime = mime_guess::from_path(&path).first_or_octet_stream();
    let disposition = format!("attachment; filename=\"{song}\"");

    Ok((
        [
            (header::CONTENT_TYPE, mime.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
            (header::CONTENT_LENGTH, len.to_string()),
        ],
        Body::from_stream(ReaderStream::new(file)),
    )
        .into_response())
}

// DELETE /delete/{job}

pub async fn delete_job(State(st): State<AppState>, Path(job): Path<String>) -> ApiResult<Response> {
    let removed = st.layout.delete_job_async(&job).await?;

    if removed.is_empty() {
        return Ok((
            StatusCode::NOT_FOUND,
            Json(json!({
                "message": "No files found to delete",
                "filename": job,
            })),
        )
            .into_response());
    }

    let deleted: Vec<String> = removed.iter().map(|p| p.display().to_string()).collect();
    Ok(Json(json!({
        "message": "Files deleted successfully",
        "deleted_files": deleted,
    }))
    .into_response())
}

fn download_urls(st: &AppState, headers: &HeaderMap, job: &str, songs: &[String]) -> Vec<String> {
    let base = match &st.cfg.public_base_url {
        Some(url) => url.trim_end_matches('/').to_string(),
        None => {
            let host = headers
                .get(header::HOST)
                .and_then(|h| h.to_str().ok())
                .unwrap_or(&st.cfg.listen_addr);
            format!("http://{host}")
        }
    };

    songs
        .iter()
        .map(|song| format!("{base}/download/{job}/{song}"))
        .collect()
}

async fn is_file(path: &std::path::Path) -> bool {
    tokio::fs::metadata(path).await.is_ok_and(|m| m.is_file())
}
