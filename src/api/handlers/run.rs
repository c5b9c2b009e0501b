// src/api/handlers/run.rs
use crate::api::AppState;
use crate::api::dispatch::recover;
use crate::api::params::Bound;
use crate::models::RunReq;
use crate::pipeline;
use crate::response::Reply;
use crate::status::St;
use actix_web::web;

pub async fn run(state: web::Data<AppState>, params: Bound<RunReq>) -> Reply {
    let Some(req) = params.into_inner().filter(|r| !r.file.is_empty()) else {
        return Reply::json_error(St::ParamErr);
    };
    recover(pipeline::execute(
        &state.config.toolchain,
        &state.store,
        &req.file,
        &req.exec_args,
        &req.stdin,
    ))
    .await
}
