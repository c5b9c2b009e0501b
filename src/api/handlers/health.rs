// src/api/handlers/health.rs
use crate::api::AppState;
use crate::response::Reply;
use actix_web::http::StatusCode;
use actix_web::web;
use serde_json::json;

pub async fn ping() -> Reply {
    Reply::json(json!({
        "message": "pong",
        "service": "cc99-backend",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Sends browsers on to the frontend when one is configured.
pub async fn index(state: web::Data<AppState>) -> Reply {
    match &state.config.frontend_url {
        Some(url) => Reply::redirect(StatusCode::FOUND, url.clone()),
        None => Reply::failed(StatusCode::NOT_FOUND),
    }
}
