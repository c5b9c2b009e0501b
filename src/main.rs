use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware};
use cc99_backend::api::{AppState, configure_app};
use cc99_backend::{banner, config, pipeline};
use std::time::Duration;

const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    banner::print_banner();

    // a missing .env is normal; everything can come from the environment
    let dotenv = dotenvy::dotenv();

    env_logger::init_from_env(env_logger::Env::new().default_filter_or("info"));

    if let Err(e) = dotenv {
        log::debug!("no .env loaded: {}", e);
    }

    let app_config = config::AppConfig::from_env().map_err(std::io::Error::other)?;

    match pipeline::probe_compiler(&app_config.toolchain).await {
        Ok(version) => log::info!("loaded compiler: {}", version),
        Err(e) => {
            log::error!("{}", e);
            return Err(std::io::Error::other(e));
        }
    }

    let bind = (app_config.bind.clone(), app_config.port);
    let artifact_ttl = app_config.artifact_ttl;
    let state = AppState::new(app_config).map_err(std::io::Error::other)?;
    log::info!("artifacts in {}", state.store.dir().display());

    if let Some(ttl) = artifact_ttl {
        let store = state.store.clone();
        actix_rt::spawn(async move {
            let mut tick = actix_rt::time::interval(SWEEP_INTERVAL.min(ttl));
            loop {
                tick.tick().await;
                store.sweep(ttl).await;
            }
        });
    }

    log::info!("[server] running on {}:{}", bind.0, bind.1);

    HttpServer::new(move || {
        App::new()
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::default())
            .configure(configure_app(state.clone()))
    })
    .bind(bind)?
    .run()
    .await
}
