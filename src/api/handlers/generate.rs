// src/api/handlers/generate.rs
use crate::api::AppState;
use crate::api::dispatch::recover;
use crate::api::params::Bound;
use crate::models::GenReq;
use crate::pipeline;
use crate::response::Reply;
use crate::status::St;
use actix_web::web;

pub async fn generate(state: web::Data<AppState>, params: Bound<GenReq>) -> Reply {
    let Some(req) = params.into_inner().filter(|r| !r.code.is_empty()) else {
        return Reply::json_error(St::ParamErr);
    };
    recover(pipeline::compile(
        &state.config.toolchain,
        &state.store,
        &req.code,
        &req.compile_options,
    ))
    .await
}
