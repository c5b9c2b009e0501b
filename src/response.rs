// src/response.rs
//! The single rendering path for every handler.
//!
//! Handlers build one `Reply` and hand it back to actix; `Reply::render`
//! is the only code that writes to the HTTP response.

use crate::status::{Locale, St};
use actix_files::NamedFile;
use actix_web::body::BoxBody;
use actix_web::http::{StatusCode, header};
use actix_web::web::Bytes;
use actix_web::{HttpRequest, HttpResponse, Responder};
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::path::PathBuf;

/// Body of the JSON variant. The logical status travels here, never in
/// the HTTP status line.
#[derive(Debug, Clone, Serialize)]
pub struct JsonBody {
    pub st: St,
    pub msg: String,
    pub data: Value,
}

#[derive(Debug, Clone)]
pub enum Reply {
    Json {
        st: St,
        /// `None` means "use the catalog description for `st`".
        msg: Option<String>,
        data: Value,
    },
    File { name: String, bytes: Bytes },
    Redirect { code: StatusCode, target: String },
    Failed { code: StatusCode },
    Image { path: PathBuf },
}

impl Reply {
    /// Success reply carrying `data`.
    pub fn json<T: Serialize>(data: T) -> Self {
        match serde_json::to_value(data) {
            Ok(data) => Reply::Json { st: St::Ok, msg: Some(String::new()), data },
            Err(e) => {
                log::error!("[response] failed to serialize reply data: {}", e);
                Reply::json_error_with_message(St::ServerErr, e.to_string())
            }
        }
    }

    pub fn json_error(st: St) -> Self {
        Reply::Json { st, msg: None, data: Value::Null }
    }

    pub fn json_error_with_message(st: St, msg: impl Into<String>) -> Self {
        Reply::Json { st, msg: Some(msg.into()), data: Value::Null }
    }

    pub fn file(name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Reply::File { name: name.into(), bytes: bytes.into() }
    }

    pub fn redirect(code: StatusCode, target: impl Into<String>) -> Self {
        Reply::Redirect { code, target: target.into() }
    }

    pub fn failed(code: StatusCode) -> Self {
        Reply::Failed { code }
    }

    pub fn image(path: impl Into<PathBuf>) -> Self {
        Reply::Image { path: path.into() }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Reply::Json { .. } => "JSON",
            Reply::File { .. } => "File",
            Reply::Redirect { .. } => "Redirect",
            Reply::Failed { .. } => "Failed",
            Reply::Image { .. } => "Image",
        }
    }

    /// Resolves the JSON variant into its wire body.
    pub fn json_body(&self, locale: Locale) -> Option<JsonBody> {
        match self {
            Reply::Json { st, msg, data } => Some(JsonBody {
                st: *st,
                msg: msg.clone().unwrap_or_else(|| st.describe(locale).to_string()),
                data: data.clone(),
            }),
            _ => None,
        }
    }

    /// Writes the active variant to an HTTP response.
    pub fn render(&self, req: &HttpRequest) -> HttpResponse {
        match self {
            Reply::Json { .. } => {
                let locale = req.app_data::<Locale>().copied().unwrap_or_default();
                match self.json_body(locale) {
                    Some(body) => HttpResponse::Ok().json(body),
                    None => HttpResponse::InternalServerError().finish(),
                }
            }
            Reply::File { name, bytes } => HttpResponse::Ok()
                .insert_header((
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", urlencoding::encode(name)),
                ))
                .content_type("application/octet-stream")
                .body(bytes.clone()),
            Reply::Redirect { code, target } => HttpResponse::build(*code)
                .insert_header((header::LOCATION, target.as_str()))
                .finish(),
            Reply::Failed { code } => HttpResponse::build(*code).finish(),
            Reply::Image { path } => match NamedFile::open(path) {
                Ok(file) => file.into_response(req),
                Err(e) => {
                    log::warn!("[response] image {} unavailable: {}", path.display(), e);
                    HttpResponse::NotFound().finish()
                }
            },
        }
    }
}

impl Responder for Reply {
    type Body = BoxBody;

    fn respond_to(self, req: &HttpRequest) -> HttpResponse<Self::Body> {
        self.render(req)
    }
}

impl fmt::Display for Reply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Reply::Json { .. } => {
                let body = self.json_body(Locale::default());
                let json = body
                    .and_then(|b| serde_json::to_string(&b).ok())
                    .unwrap_or_default();
                write!(f, "{{Type:JSON Json:{}}}", json)
            }
            Reply::File { name, bytes } => {
                write!(f, "{{Type:File File:<{} byte> FileName:{}}}", bytes.len(), name)
            }
            other => write!(f, "{{Type:{}}}", other.kind()),
        }
    }
}
