use actix_web::middleware::NormalizePath;
use actix_web::web::Data;
use actix_web::{App, HttpServer, Responder, get};

use hrm_attendance::config::Config;
use hrm_attendance::db::init_db;
use hrm_attendance::docs::ApiDoc;
use hrm_attendance::error::{json_config, query_config};
use hrm_attendance::routes::{self, Limiters};
use hrm_attendance::utils::outcome_cache::OutcomeCache;
use tracing::info;
use tracing_appender::rolling;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[get("/")]
async fn index() -> impl Responder {
    "Attendance service"
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    // Rolling daily log
    let file_appender = rolling::daily(&config.log_dir, "attendance.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_max_level(tracing::Level::DEBUG)
        .with_ansi(false)
        .with_target(false)
        .with_level(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .pretty()
        .init();

    let pool = init_db(&config.database_url).await?;
    let cache = Data::new(OutcomeCache::new(
        config.policy,
        config.outcome_cache_capacity,
    ));

    info!(
        addr = %config.server_addr,
        late_after_minute = cache.policy().late_after(),
        "Attendance service starting..."
    );
    let limiters = Limiters::from_config(&config)?;

    let server_addr = config.server_addr.clone();
    let api_prefix = config.api_prefix.clone();
    let upload_limit = config.upload_limit_bytes;

    HttpServer::new(move || {
        App::new()
            .wrap(actix_web::middleware::Logger::default())
            .wrap(NormalizePath::trim())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}") // wildcard so JS/CSS assets resolve
                    .url("/api-doc/openapi.json", ApiDoc::openapi()),
            )
            .app_data(Data::new(pool.clone()))
            .app_data(cache.clone())
            .app_data(json_config(upload_limit))
            .app_data(query_config())
            .service(index)
            .configure(|cfg| routes::configure(cfg, &api_prefix, &limiters))
    })
    .bind(server_addr)?
    .run()
    .await?;

    Ok(())
}
