// src/api/routes.rs
use super::AppState;
use super::handlers;
use actix_web::web;

/// Request bodies carry whole source files; the form default of 16 KiB
/// is far too small.
const BODY_LIMIT: usize = 4 << 20;

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(handlers::index)).service(
        web::scope("/api")
            .route("/ping", web::get().to(handlers::ping))
            .route("/gen", web::post().to(handlers::generate))
            .route("/run", web::post().to(handlers::run))
            .route("/visual", web::post().to(handlers::visual))
            .route("/download/{file}", web::get().to(handlers::download)),
    );
}

/// Shared data plus routes, for `App::configure`.
pub fn configure_app(state: AppState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg| {
        let locale = state.config.locale;
        cfg.app_data(web::Data::new(state))
            .app_data(locale)
            .app_data(web::FormConfig::default().limit(BODY_LIMIT))
            .app_data(web::JsonConfig::default().limit(BODY_LIMIT));
        configure_routes(cfg);
    }
}
