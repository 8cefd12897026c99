use crate::db::{CustomerRepository, SaveError};
use crate::models;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::Instrument;

const SELECT_CUSTOMER: &str = r#"
    SELECT
        id,
        email,
        password_hash,
        role,
        first_name,
        last_name,
        phone,
        addresses,
        favorite_restaurants,
        created_at,
        updated_at
    FROM customer
"#;

#[derive(sqlx::FromRow)]
struct CustomerRow {
    id: String,
    email: String,
    password_hash: String,
    role: String,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    addresses: Json<Vec<models::Address>>,
    favorite_restaurants: Json<Vec<String>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<CustomerRow> for models::Customer {
    type Error = String;

    fn try_from(row: CustomerRow) -> Result<Self, Self::Error> {
        let role = row.role.parse::<models::Role>().map_err(|err| {
            tracing::error!("Customer {} has an unknown role stored: {}", row.id, err);
            "Stored customer has an invalid role".to_string()
        })?;

        Ok(models::Customer {
            id: row.id,
            email: row.email,
            password_hash: row.password_hash,
            role,
            first_name: row.first_name,
            last_name: row.last_name,
            phone: row.phone,
            addresses: row.addresses.0,
            favorite_restaurants: row.favorite_restaurants.0,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

pub struct PgCustomerRepository {
    pool: PgPool,
}

impl PgCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn fetch_where(
        &self,
        column: &'static str,
        value: &str,
    ) -> Result<Option<models::Customer>, String> {
        let query_span = tracing::info_span!("Fetching customer", column);
        let sql = format!("{SELECT_CUSTOMER} WHERE {column} = $1 LIMIT 1");
        sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .instrument(query_span)
            .await
            .map_err(|err| {
                tracing::error!("Failed to fetch customer by {}: {:?}", column, err);
                "Could not fetch customer".to_string()
            })?
            .map(models::Customer::try_from)
            .transpose()
    }
}

#[async_trait]
impl CustomerRepository for PgCustomerRepository {
    async fn fetch(&self, id: &str) -> Result<Option<models::Customer>, String> {
        self.fetch_where("id", id).await
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<models::Customer>, String> {
        self.fetch_where("lower(email)", &email.to_lowercase()).await
    }

    async fn exists(&self, id: &str) -> Result<bool, String> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customer WHERE id = $1)")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to check customer existence: {:?}", err);
                "Could not check customer existence".to_string()
            })
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, String> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM customer WHERE lower(email) = $1)")
            .bind(email.to_lowercase())
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to check customer email: {:?}", err);
                "Could not check customer existence".to_string()
            })
    }

    async fn save(&self, customer: models::Customer) -> Result<models::Customer, SaveError> {
        let query_span = tracing::info_span!("Saving customer into the database");
        let result = sqlx::query(
            r#"
            INSERT INTO customer (
                id,
                email,
                password_hash,
                role,
                first_name,
                last_name,
                phone,
                addresses,
                favorite_restaurants,
                created_at,
                updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                email = EXCLUDED.email,
                password_hash = EXCLUDED.password_hash,
                role = EXCLUDED.role,
                first_name = EXCLUDED.first_name,
                last_name = EXCLUDED.last_name,
                phone = EXCLUDED.phone,
                addresses = EXCLUDED.addresses,
                favorite_restaurants = EXCLUDED.favorite_restaurants,
                updated_at = EXCLUDED.updated_at
            "#,
        )
        .bind(&customer.id)
        .bind(&customer.email)
        .bind(&customer.password_hash)
        .bind(customer.role.as_str())
        .bind(&customer.first_name)
        .bind(&customer.last_name)
        .bind(&customer.phone)
        .bind(Json(&customer.addresses))
        .bind(Json(&customer.favorite_restaurants))
        .bind(customer.created_at)
        .bind(customer.updated_at)
        .execute(&self.pool)
        .instrument(query_span)
        .await;

        match result {
            Ok(_) => {
                tracing::info!("Customer {} has been saved to the database", customer.id);
                Ok(customer)
            }
            Err(err)
                if err
                    .as_database_error()
                    .is_some_and(|db_err| db_err.is_unique_violation()) =>
            {
                tracing::warn!("Email {} is already stored: {:?}", customer.email, err);
                Err(SaveError::DuplicateEmail(customer.email))
            }
            Err(err) => {
                tracing::error!("Failed to execute query: {:?}", err);
                Err(SaveError::Failed("Failed to save customer".to_string()))
            }
        }
    }

    #[tracing::instrument(name = "Delete customer.", skip(self))]
    async fn delete(&self, id: &str) -> Result<bool, String> {
        sqlx::query::<sqlx::Postgres>("DELETE FROM customer WHERE id = $1;")
            .bind(id)
            .execute(&self.pool)
            .await
            .map(|result| result.rows_affected() > 0)
            .map_err(|err| {
                tracing::error!("Failed to delete customer: {:?}", err);
                "Failed to delete customer".to_string()
            })
    }

    async fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<models::Customer>, u64), String> {
        let query_span = tracing::info_span!("Fetching customers page", offset, limit);
        let sql = format!("{SELECT_CUSTOMER} ORDER BY CAST(id AS BIGINT) LIMIT $1 OFFSET $2");
        let rows = sqlx::query_as::<_, CustomerRow>(&sql)
            .bind(i64::from(limit))
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .instrument(query_span)
            .await
            .map_err(|err| {
                tracing::error!("Failed to fetch customers: {:?}", err);
                "Could not fetch customers".to_string()
            })?;

        let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM customer")
            .fetch_one(&self.pool)
            .await
            .map_err(|err| {
                tracing::error!("Failed to count customers: {:?}", err);
                "Could not count customers".to_string()
            })?;

        let customers = rows
            .into_iter()
            .map(models::Customer::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok((customers, total.max(0) as u64))
    }
}
