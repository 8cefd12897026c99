use crate::configuration::RedisSettings;
use crate::db::{CustomerRepository, SaveError};
use crate::models;
use async_trait::async_trait;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use std::sync::Arc;

/// Cache-aside over another repository. Records are cached under their id
/// and their email; writes drop both keys. Redis trouble is logged and
/// otherwise ignored.
pub struct CachedCustomerRepository {
    inner: Arc<dyn CustomerRepository>,
    connection: ConnectionManager,
    ttl_seconds: u64,
}

impl CachedCustomerRepository {
    pub async fn try_new(
        inner: Arc<dyn CustomerRepository>,
        settings: &RedisSettings,
    ) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(settings.url.as_str())?;
        let connection = ConnectionManager::new(client).await?;

        Ok(Self {
            inner,
            connection,
            ttl_seconds: settings.ttl_seconds,
        })
    }

    fn id_key(id: &str) -> String {
        format!("customer:{}", id)
    }

    fn email_key(email: &str) -> String {
        format!("customer:email:{}", email)
    }

    async fn read(&self, key: &str) -> Option<models::Customer> {
        let mut conn = self.connection.clone();
        match conn.get::<_, Option<String>>(key).await {
            Ok(Some(json)) => serde_json::from_str(&json)
                .map_err(|err| tracing::warn!("Dropping unreadable cache entry {}: {:?}", key, err))
                .ok(),
            Ok(None) => None,
            Err(err) => {
                tracing::warn!("Redis read failed for {}: {:?}", key, err);
                None
            }
        }
    }

    async fn store(&self, customer: &models::Customer) {
        let json = match serde_json::to_string(customer) {
            Ok(json) => json,
            Err(err) => {
                tracing::warn!("Customer {} can't be cached: {:?}", customer.id, err);
                return;
            }
        };

        let mut conn = self.connection.clone();
        for key in [Self::id_key(&customer.id), Self::email_key(&customer.email)] {
            if let Err(err) = conn
                .set_ex::<_, _, ()>(&key, &json, self.ttl_seconds)
                .await
            {
                tracing::warn!("Redis write failed for {}: {:?}", key, err);
            }
        }
    }

    async fn evict(&self, keys: Vec<String>) {
        let mut conn = self.connection.clone();
        if let Err(err) = conn.del::<_, ()>(&keys).await {
            tracing::warn!("Redis eviction failed for {:?}: {:?}", keys, err);
        }
    }
}

#[async_trait]
impl CustomerRepository for CachedCustomerRepository {
    async fn fetch(&self, id: &str) -> Result<Option<models::Customer>, String> {
        if let Some(customer) = self.read(&Self::id_key(id)).await {
            tracing::debug!("Cache hit for customer {}", id);
            return Ok(Some(customer));
        }

        let customer = self.inner.fetch(id).await?;
        if let Some(customer) = &customer {
            self.store(customer).await;
        }
        Ok(customer)
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<models::Customer>, String> {
        if let Some(customer) = self.read(&Self::email_key(email)).await {
            return Ok(Some(customer));
        }

        let customer = self.inner.fetch_by_email(email).await?;
        if let Some(customer) = &customer {
            self.store(customer).await;
        }
        Ok(customer)
    }

    async fn exists(&self, id: &str) -> Result<bool, String> {
        self.inner.exists(id).await
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, String> {
        self.inner.exists_by_email(email).await
    }

    async fn save(&self, customer: models::Customer) -> Result<models::Customer, SaveError> {
        let mut stale = vec![Self::id_key(&customer.id), Self::email_key(&customer.email)];
        // An email change leaves a cached copy under the previous address.
        if let Ok(Some(previous)) = self.inner.fetch(&customer.id).await {
            if previous.email != customer.email {
                stale.push(Self::email_key(&previous.email));
            }
        }

        let saved = self.inner.save(customer).await?;
        self.evict(stale).await;
        Ok(saved)
    }

    async fn delete(&self, id: &str) -> Result<bool, String> {
        let mut stale = vec![Self::id_key(id)];
        if let Ok(Some(previous)) = self.inner.fetch(id).await {
            stale.push(Self::email_key(&previous.email));
        }

        let deleted = self.inner.delete(id).await?;
        self.evict(stale).await;
        Ok(deleted)
    }

    async fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<models::Customer>, u64), String> {
        self.inner.fetch_page(offset, limit).await
    }
}
