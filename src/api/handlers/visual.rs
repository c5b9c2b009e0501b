// src/api/handlers/visual.rs
use crate::api::AppState;
use crate::api::dispatch::recover;
use crate::api::params::Bound;
use crate::models::VisualReq;
use crate::pipeline;
use crate::response::Reply;
use crate::status::St;
use actix_web::web;

pub async fn visual(state: web::Data<AppState>, params: Bound<VisualReq>) -> Reply {
    let Some(req) = params.into_inner().filter(|r| !r.code.is_empty()) else {
        return Reply::json_error(St::ParamErr);
    };
    recover(pipeline::visualize(&state.config.toolchain, &req.code)).await
}
