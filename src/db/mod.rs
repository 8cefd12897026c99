mod cache;
mod counter;
mod customer;
mod memory;

pub use cache::CachedCustomerRepository;
pub use counter::PgIdAllocator;
pub use customer::PgCustomerRepository;
pub use memory::{InMemoryCustomerRepository, InMemoryIdAllocator};

use crate::models;
use async_trait::async_trait;

/// Document store for customer records. Failures come back as a message
/// that has already been logged at the failure site.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    async fn fetch(&self, id: &str) -> Result<Option<models::Customer>, String>;

    async fn fetch_by_email(&self, email: &str) -> Result<Option<models::Customer>, String>;

    async fn exists(&self, id: &str) -> Result<bool, String>;

    async fn exists_by_email(&self, email: &str) -> Result<bool, String>;

    /// Insert or replace the whole record keyed by its id.
    async fn save(&self, customer: models::Customer) -> Result<models::Customer, SaveError>;

    async fn delete(&self, id: &str) -> Result<bool, String>;

    /// Records ordered by numeric id, plus the total count.
    async fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<models::Customer>, u64), String>;
}

/// Why a save was refused. A duplicate email can still get here when two
/// writers pass the service-level check at the same time.
#[derive(Debug, thiserror::Error)]
pub enum SaveError {
    #[error("Email {0} is already registered")]
    DuplicateEmail(String),
    #[error("{0}")]
    Failed(String),
}

/// Hands out customer ids. Values are strictly increasing decimal strings,
/// unique across callers and restarts.
#[async_trait]
pub trait IdAllocator: Send + Sync {
    async fn next_id(&self) -> Result<String, String>;
}

pub const CUSTOMER_COUNTER_KEY: &str = "customer-counter";
pub const INITIAL_COUNTER_VALUE: i64 = 1;
