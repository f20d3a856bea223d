use checkout_engine::config::AppConfig;
use checkout_engine::{build_server, create_pool, run_migrations};
use dotenvy::dotenv;
use std::io;

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = AppConfig::from_env().map_err(io::Error::other)?;

    let pool = create_pool(&config.database_url, config.pool_size).map_err(io::Error::other)?;
    run_migrations(&pool).map_err(io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} (checkout attempts: {}, lock timeout: {:?})",
        config.host,
        config.port,
        config.checkout.max_attempts,
        config.checkout.lock_timeout
    );

    build_server(pool, config.checkout, &config.host, config.port)?.await
}
