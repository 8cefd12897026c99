use crate::models;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::convert::From;

/// Outward representation of a customer. No password material.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub role: models::Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub addresses: Vec<models::Address>,
    pub favorite_restaurants: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<models::Customer> for Customer {
    fn from(customer: models::Customer) -> Self {
        Self {
            id: customer.id,
            email: customer.email,
            role: customer.role,
            first_name: customer.first_name,
            last_name: customer.last_name,
            phone: customer.phone,
            addresses: customer.addresses,
            favorite_restaurants: customer.favorite_restaurants,
            created_at: customer.created_at,
            updated_at: customer.updated_at,
        }
    }
}

/// Login result: who the caller is plus a bearer token.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Login {
    pub id: String,
    pub email: String,
    pub role: models::Role,
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_at: DateTime<Utc>,
}
