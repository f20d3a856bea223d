pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{error, middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::config::CheckoutConfig;
use crate::errors::AppError;
use crate::handlers::orders::{ApiDoc, CheckoutService};
use crate::infrastructure::{DieselCustomerRepository, DieselOrderRepository, DieselProductCatalog};

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    if !applied.is_empty() {
        log::info!("Applied {} database migration(s)", applied.len());
    }
    Ok(())
}

/// Wire the checkout coordinator to the PostgreSQL adapters sharing `pool`.
pub fn build_service(pool: DbPool, checkout: CheckoutConfig) -> CheckoutService {
    CheckoutService::new(
        DieselCustomerRepository::new(pool.clone()),
        DieselProductCatalog::new(pool.clone()),
        DieselOrderRepository::new(pool, checkout.lock_timeout),
        checkout,
    )
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    checkout: CheckoutConfig,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let service = web::Data::new(build_service(pool, checkout));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(service.clone())
            .app_data(web::JsonConfig::default().error_handler(|err, _req| {
                error::Error::from(AppError::BadRequest(err.to_string()))
            }))
            .app_data(web::QueryConfig::default().error_handler(|err, _req| {
                error::Error::from(AppError::BadRequest(err.to_string()))
            }))
            .wrap(Logger::default())
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
            .service(
                web::scope("/orders")
                    .route("", web::post().to(handlers::orders::create_order))
                    .route("", web::get().to(handlers::orders::list_orders))
                    .route("/{id}", web::get().to(handlers::orders::get_order)),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
