//! Customer CRUD over the repository seam.
//!
//! Lookups that find nothing are reported as `NotFound` here so handlers can
//! return them as is. Persistence failures become `Error::Database`.

use crate::db::{CustomerRepository, IdAllocator, SaveError};
use crate::errors::Error;
use crate::forms::{self, CustomerForm, CustomerUpdateForm};
use crate::helpers::{password, Page};
use crate::models::{self, Customer, Identity, Role};
use chrono::Utc;
use std::sync::Arc;

pub type Result<T> = std::result::Result<T, Error>;

const INVALID_CREDENTIALS: &str = "Invalid email or password";

pub struct CustomerService {
    repository: Arc<dyn CustomerRepository>,
    ids: Arc<dyn IdAllocator>,
}

impl CustomerService {
    pub fn new(repository: Arc<dyn CustomerRepository>, ids: Arc<dyn IdAllocator>) -> Self {
        Self { repository, ids }
    }

    #[tracing::instrument(name = "Create customer", skip_all, fields(email = %form.email))]
    pub async fn create(&self, form: CustomerForm) -> Result<Customer> {
        if let Some(id) = form.id.as_ref() {
            tracing::warn!("Ignoring client-supplied id {} on create", forms::describe(id));
        }
        if let Some(role) = form.role.as_ref() {
            tracing::warn!("Ignoring client-supplied role {} on create", forms::describe(role));
        }

        let email = models::normalize_email(&form.email);
        let password = forms::non_blank(form.password)
            .ok_or_else(|| Error::BadRequest("Password is required for customer creation".to_string()))?;

        if self.repository.exists_by_email(&email).await.map_err(Error::Database)? {
            return Err(Error::BadRequest(format!("Email {email} is already registered")));
        }

        let password_hash = password::hash_password(&password).map_err(Error::Internal)?;
        let id = self.ids.next_id().await.map_err(Error::Database)?;
        if id.is_empty() {
            return Err(Error::Database("Customer id could not be allocated".to_string()));
        }

        let now = Utc::now();
        let customer = Customer {
            id,
            email,
            password_hash,
            role: Role::Customer,
            first_name: form.first_name,
            last_name: form.last_name,
            phone: form.phone,
            addresses: form.addresses.unwrap_or_default(),
            favorite_restaurants: models::dedup_favorites(
                form.favorite_restaurants.unwrap_or_default(),
            ),
            created_at: now,
            updated_at: now,
        };

        let saved = self.save(customer).await?;
        tracing::info!("Customer {} created", saved.id);
        Ok(saved)
    }

    #[tracing::instrument(name = "Get customer", skip(self))]
    pub async fn get_by_id(&self, id: &str) -> Result<Customer> {
        self.repository
            .fetch(id)
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("Customer not found with id: {id}")))
    }

    #[tracing::instrument(name = "Get customer by email", skip(self))]
    pub async fn get_by_email(&self, email: &str) -> Result<Customer> {
        self.repository
            .fetch_by_email(&models::normalize_email(email))
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::NotFound(format!("Customer not found with email: {email}")))
    }

    pub async fn exists_by_email(&self, email: &str) -> Result<bool> {
        self.repository
            .exists_by_email(&models::normalize_email(email))
            .await
            .map_err(Error::Database)
    }

    /// Partial merge onto the stored record. See [`CustomerUpdateForm`] for
    /// which fields count as "given".
    #[tracing::instrument(name = "Update customer", skip(self, form))]
    pub async fn update(&self, id: &str, form: CustomerUpdateForm) -> Result<Customer> {
        let mut customer = self.get_by_id(id).await?;

        if let Some(given) = form.id.as_ref() {
            tracing::warn!("Ignoring client-supplied id {} on update", forms::describe(given));
        }
        if let Some(role) = form.role.as_ref() {
            tracing::warn!(
                "Role change to {} via profile update ignored, use the role endpoint",
                forms::describe(role)
            );
        }

        if let Some(email) = forms::non_blank(form.email) {
            let email = models::normalize_email(&email);
            if email != customer.email {
                let taken = self
                    .repository
                    .fetch_by_email(&email)
                    .await
                    .map_err(Error::Database)?
                    .is_some_and(|other| other.id != customer.id);
                if taken {
                    return Err(Error::BadRequest(format!("Email {email} is already registered")));
                }
            }
            customer.email = email;
        }
        if let Some(first_name) = forms::non_blank(form.first_name) {
            customer.first_name = Some(first_name);
        }
        if let Some(last_name) = forms::non_blank(form.last_name) {
            customer.last_name = Some(last_name);
        }
        if let Some(phone) = form.phone {
            customer.phone = phone;
        }
        if let Some(password) = forms::non_blank(form.password) {
            customer.password_hash = password::hash_password(&password).map_err(Error::Internal)?;
        }
        if let Some(addresses) = form.addresses {
            customer.addresses = addresses;
        }
        if let Some(favorites) = form.favorite_restaurants {
            customer.favorite_restaurants = models::dedup_favorites(favorites);
        }
        customer.updated_at = Utc::now();

        self.save(customer).await
    }

    #[tracing::instrument(name = "Update customer role", skip(self))]
    pub async fn update_role(&self, id: &str, role: Option<&str>) -> Result<Customer> {
        let role = role
            .filter(|r| !r.trim().is_empty())
            .ok_or_else(|| Error::BadRequest("Role is required".to_string()))?;
        let role: Role = role.parse().map_err(Error::BadRequest)?;

        let mut customer = self.get_by_id(id).await?;
        customer.role = role;
        customer.updated_at = Utc::now();

        let saved = self.save(customer).await?;
        tracing::info!("Customer {} role set to {}", saved.id, saved.role);
        Ok(saved)
    }

    /// `false` when there was nothing to delete.
    #[tracing::instrument(name = "Delete customer", skip(self))]
    pub async fn delete(&self, id: &str) -> Result<bool> {
        if !self.repository.exists(id).await.map_err(Error::Database)? {
            return Ok(false);
        }
        self.repository.delete(id).await.map_err(Error::Database)
    }

    #[tracing::instrument(name = "List customers", skip(self))]
    pub async fn list(&self, page: u32, size: u32) -> Result<Page<Customer>> {
        let offset = u64::from(page) * u64::from(size);
        let (content, total) = self
            .repository
            .fetch_page(offset, size)
            .await
            .map_err(Error::Database)?;

        Ok(Page::new(content, page, size, total))
    }

    /// Unknown email and wrong password fail the same way.
    #[tracing::instrument(name = "Authenticate customer", skip(self, password))]
    pub async fn authenticate(&self, email: &str, password: &str) -> Result<Identity> {
        let customer = self
            .repository
            .fetch_by_email(&models::normalize_email(email))
            .await
            .map_err(Error::Database)?
            .ok_or_else(|| Error::Unauthorized(INVALID_CREDENTIALS.to_string()))?;

        if !password::verify_password(password, &customer.password_hash).map_err(Error::Internal)? {
            tracing::warn!("Wrong password for customer {}", customer.id);
            return Err(Error::Unauthorized(INVALID_CREDENTIALS.to_string()));
        }

        Ok(Identity {
            subject_id: customer.id,
            email: customer.email,
            role: customer.role,
        })
    }

    async fn save(&self, customer: Customer) -> Result<Customer> {
        self.repository.save(customer).await.map_err(|err| match err {
            SaveError::DuplicateEmail(_) => Error::BadRequest(err.to_string()),
            SaveError::Failed(message) => Error::Database(message),
        })
    }
}
