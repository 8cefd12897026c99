use crate::db::{IdAllocator, CUSTOMER_COUNTER_KEY, INITIAL_COUNTER_VALUE};
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::Instrument;

/// Counter row incremented atomically by Postgres. The first call creates
/// the row with the initial value.
pub struct PgIdAllocator {
    pool: PgPool,
}

impl PgIdAllocator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdAllocator for PgIdAllocator {
    async fn next_id(&self) -> Result<String, String> {
        let query_span = tracing::info_span!("Incrementing customer counter");
        sqlx::query_scalar::<_, i64>(
            r#"
            INSERT INTO counter (name, value)
            VALUES ($1, $2)
            ON CONFLICT (name) DO UPDATE SET value = counter.value + 1
            RETURNING value
            "#,
        )
        .bind(CUSTOMER_COUNTER_KEY)
        .bind(INITIAL_COUNTER_VALUE)
        .fetch_one(&self.pool)
        .instrument(query_span)
        .await
        .map(|value| {
            tracing::debug!("Generated numeric customer ID: {}", value);
            value.to_string()
        })
        .map_err(|err| {
            tracing::error!("Failed to increment customer counter: {:?}", err);
            "Failed to generate customer ID".to_string()
        })
    }
}
