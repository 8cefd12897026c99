use crate::models::Role;
use chrono::{DateTime, Utc};
use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub phone: Option<String>,
    pub addresses: Vec<Address>,
    pub favorite_restaurants: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Default, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub is_default: bool,
    #[serde(default)]
    pub location: Option<Location>,
}

#[derive(Default, Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lon: f64,
}

/// Stored and looked-up form of an email address.
pub fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

/// Favorites behave as a set: first occurrence wins, order kept.
pub fn dedup_favorites(favorites: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    favorites
        .into_iter()
        .filter(|id| seen.insert(id.clone()))
        .collect()
}
