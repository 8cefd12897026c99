use crate::db::{CustomerRepository, IdAllocator, SaveError, INITIAL_COUNTER_VALUE};
use crate::models;
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use tokio::sync::RwLock;

/// Process-local store. Keyed by numeric id so listings come out in id order.
#[derive(Default)]
pub struct InMemoryCustomerRepository {
    customers: RwLock<BTreeMap<(usize, String), models::Customer>>,
}

impl InMemoryCustomerRepository {
    pub fn new() -> Self {
        Self::default()
    }

    // Shorter decimal strings sort first, which is numeric order for ids without leading zeros.
    fn key(id: &str) -> (usize, String) {
        (id.len(), id.to_string())
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn fetch(&self, id: &str) -> Result<Option<models::Customer>, String> {
        Ok(self.customers.read().await.get(&Self::key(id)).cloned())
    }

    async fn fetch_by_email(&self, email: &str) -> Result<Option<models::Customer>, String> {
        Ok(self
            .customers
            .read()
            .await
            .values()
            .find(|customer| customer.email.eq_ignore_ascii_case(email))
            .cloned())
    }

    async fn exists(&self, id: &str) -> Result<bool, String> {
        Ok(self.customers.read().await.contains_key(&Self::key(id)))
    }

    async fn exists_by_email(&self, email: &str) -> Result<bool, String> {
        Ok(self.fetch_by_email(email).await?.is_some())
    }

    async fn save(&self, customer: models::Customer) -> Result<models::Customer, SaveError> {
        let mut customers = self.customers.write().await;
        let taken = customers
            .values()
            .any(|other| other.email.eq_ignore_ascii_case(&customer.email) && other.id != customer.id);
        if taken {
            return Err(SaveError::DuplicateEmail(customer.email));
        }

        customers.insert(Self::key(&customer.id), customer.clone());
        Ok(customer)
    }

    async fn delete(&self, id: &str) -> Result<bool, String> {
        Ok(self.customers.write().await.remove(&Self::key(id)).is_some())
    }

    async fn fetch_page(
        &self,
        offset: u64,
        limit: u32,
    ) -> Result<(Vec<models::Customer>, u64), String> {
        let customers = self.customers.read().await;
        let page = customers
            .values()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect();

        Ok((page, customers.len() as u64))
    }
}

/// Atomic counter with the same numbering as the Postgres counter row.
pub struct InMemoryIdAllocator {
    next: AtomicI64,
}

impl Default for InMemoryIdAllocator {
    fn default() -> Self {
        Self {
            next: AtomicI64::new(INITIAL_COUNTER_VALUE),
        }
    }
}

impl InMemoryIdAllocator {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl IdAllocator for InMemoryIdAllocator {
    async fn next_id(&self) -> Result<String, String> {
        Ok(self.next.fetch_add(1, Ordering::SeqCst).to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use std::collections::HashSet;
    use std::sync::Arc;

    fn customer(id: &str, email: &str) -> models::Customer {
        models::Customer {
            id: id.to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: models::Role::Customer,
            first_name: None,
            last_name: None,
            phone: None,
            addresses: vec![],
            favorite_restaurants: vec![],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn concurrent_allocation_has_no_duplicates_or_gaps() {
        let allocator = Arc::new(InMemoryIdAllocator::new());
        let handles: Vec<_> = (0..64)
            .map(|_| {
                let allocator = allocator.clone();
                tokio::spawn(async move { allocator.next_id().await.unwrap() })
            })
            .collect();

        let mut ids = HashSet::new();
        for handle in handles {
            ids.insert(handle.await.unwrap().parse::<i64>().unwrap());
        }

        assert_eq!(64, ids.len());
        assert_eq!((1..=64).collect::<HashSet<i64>>(), ids);
    }

    #[tokio::test]
    async fn pages_follow_numeric_id_order() {
        let repository = InMemoryCustomerRepository::new();
        for id in ["10", "2", "1"] {
            repository
                .save(customer(id, &format!("{id}@example.com")))
                .await
                .unwrap();
        }

        let (page, total) = repository.fetch_page(0, 2).await.unwrap();
        assert_eq!(3, total);
        assert_eq!(
            vec!["1", "2"],
            page.iter().map(|c| c.id.as_str()).collect::<Vec<_>>()
        );

        let (page, _) = repository.fetch_page(2, 2).await.unwrap();
        assert_eq!("10", page[0].id);
    }

    #[tokio::test]
    async fn email_stays_unique() {
        let repository = InMemoryCustomerRepository::new();
        repository.save(customer("1", "a@b.com")).await.unwrap();

        assert!(matches!(
            repository.save(customer("2", "a@b.com")).await,
            Err(SaveError::DuplicateEmail(_))
        ));
        assert!(matches!(
            repository.save(customer("3", "A@B.com")).await,
            Err(SaveError::DuplicateEmail(_))
        ));
        assert!(repository.save(customer("1", "a@b.com")).await.is_ok());
    }
}
