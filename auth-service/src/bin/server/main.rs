use std::sync::Arc;
use std::time::Duration;

use auth::Authenticator;
use auth_service::config::Config;
use auth_service::domain::auth::service::AuthService;
use auth_service::inbound::http::router::create_router;
use auth_service::outbound::cache::RedisTokenCache;
use auth_service::outbound::repositories::PostgresTokenRepository;
use auth_service::outbound::repositories::PostgresUserRepository;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "auth_service=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "auth-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;

    tracing::info!(
        http_port = config.server.http_port,
        access_token_ttl_secs = config.jwt.access_token_ttl_secs,
        refresh_token_ttl_days = config.jwt.refresh_token_ttl_days,
        confirm_token_ttl_secs = config.auth.confirm_token_ttl_secs,
        "Configuration loaded"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(5)
        .acquire_timeout(Duration::from_secs(3))
        .connect(&config.database.url)
        .await?;
    tracing::info!(
        max_connections = 5,
        database = "postgresql",
        "Database connection pool created"
    );

    sqlx::migrate!("./migrations").run(&pg_pool).await?;
    tracing::info!(database = "postgresql", "Database migrations completed");

    let authenticator = Arc::new(Authenticator::new(
        config.jwt.secret.as_bytes(),
        config.auth.pepper.clone(),
        config.jwt.access_token_ttl_secs,
        config.jwt.refresh_token_ttl_days,
    ));

    let user_repository = Arc::new(PostgresUserRepository::new(pg_pool.clone()));
    let token_repository = Arc::new(PostgresTokenRepository::new(
        pg_pool,
        config.auth.confirm_token_ttl_secs,
    ));
    let token_cache = Arc::new(RedisTokenCache::new(
        &config.redis.url,
        config.auth.confirm_token_ttl_secs as u64,
    )?);

    let auth_service = Arc::new(AuthService::new(
        user_repository,
        token_repository,
        token_cache,
        Arc::clone(&authenticator),
        config.auth.confirm_token_length,
    ));

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    let http_application = create_router(auth_service, authenticator);
    axum::serve(http_listener, http_application).await?;

    Ok(())
}
