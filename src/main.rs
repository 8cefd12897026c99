use customer_service::configuration::get_configuration;
use customer_service::db::{self, CustomerRepository};
use customer_service::startup::run;
use customer_service::telemetry::{get_subscriber, init_subscriber};
use sqlx::postgres::PgPoolOptions;
use std::io::{Error, ErrorKind};
use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let subscriber = get_subscriber("customer-service".into(), "info".into());
    init_subscriber(subscriber);

    let settings = get_configuration()
        .map_err(|err| Error::new(ErrorKind::InvalidInput, format!("configuration: {err}")))?;

    tracing::info!(
        db_host = %settings.database.host,
        db_port = settings.database.port,
        db_name = %settings.database.database_name,
        "Connecting to PostgreSQL"
    );

    let pg_pool = PgPoolOptions::new()
        .max_connections(settings.database.max_connections)
        .acquire_timeout(Duration::from_secs(30))
        .connect(&settings.database.connection_string())
        .await
        .map_err(|err| Error::new(ErrorKind::ConnectionRefused, format!("database: {err}")))?;

    sqlx::migrate!("./migrations")
        .run(&pg_pool)
        .await
        .map_err(|err| Error::new(ErrorKind::Other, format!("migrations: {err}")))?;

    let mut repository: Arc<dyn CustomerRepository> =
        Arc::new(db::PgCustomerRepository::new(pg_pool.clone()));
    if let Some(redis) = settings.redis.as_ref() {
        tracing::info!("Customer cache enabled, ttl {}s", redis.ttl_seconds);
        let cached = db::CachedCustomerRepository::try_new(repository, redis)
            .await
            .map_err(|err| Error::new(ErrorKind::ConnectionRefused, format!("redis: {err}")))?;
        repository = Arc::new(cached);
    }
    let ids = Arc::new(db::PgIdAllocator::new(pg_pool));

    let address = format!("{}:{}", settings.app_host, settings.app_port);
    tracing::info!("Start server at {:?}", &address);
    let listener = TcpListener::bind(&address)?;

    run(listener, repository, ids, settings).await?.await
}
