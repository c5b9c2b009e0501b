// src/api/handlers/artifacts.rs
use crate::api::AppState;
use crate::errors::ServiceError;
use crate::response::Reply;
use actix_web::http::StatusCode;
use actix_web::web;

/// Downloads a compiled artifact as an attachment.
pub async fn download(state: web::Data<AppState>, path: web::Path<String>) -> Reply {
    let id = path.into_inner();
    match state.store.read(&id).await {
        Ok(bytes) => {
            if let Some(info) = state.store.info(&id).await {
                log::debug!("[download] {} built {} ({} bytes)", id, info.created_at, info.size);
            }
            Reply::file(id, bytes)
        }
        Err(ServiceError::InvalidArtifactName(_)) | Err(ServiceError::ArtifactMissing(_)) => {
            Reply::failed(StatusCode::NOT_FOUND)
        }
        Err(e) => {
            log::warn!("[download] reading {} failed: {}", id, e);
            Reply::failed(StatusCode::INTERNAL_SERVER_ERROR)
        }
    }
}
