use crate::models;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use serde_valid::Validate;

/// Registration payload. `id` and `role` are accepted so they can be
/// reported, but never used.
#[derive(Default, Debug, Clone, PartialEq, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CustomerForm {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    #[validate(max_length = 254)]
    #[validate(pattern = r"^[^@\s]+@[^@\s]+$")]
    pub email: String,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Value>,
    #[serde(default)]
    #[validate(max_length = 100)]
    pub first_name: Option<String>,
    #[serde(default)]
    #[validate(max_length = 100)]
    pub last_name: Option<String>,
    #[serde(default)]
    #[validate(max_length = 32)]
    pub phone: Option<String>,
    #[serde(default)]
    pub addresses: Option<Vec<models::Address>>,
    #[serde(default)]
    pub favorite_restaurants: Option<Vec<String>>,
}

/// Partial update payload. Absent fields leave the stored value alone;
/// `phone: null` clears the phone.
#[derive(Default, Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerUpdateForm {
    #[serde(default)]
    pub id: Option<Value>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub role: Option<Value>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default, deserialize_with = "present")]
    pub phone: Option<Option<String>>,
    #[serde(default)]
    pub addresses: Option<Vec<models::Address>>,
    #[serde(default)]
    pub favorite_restaurants: Option<Vec<String>>,
}

// Only runs for keys present in the payload, so `Some(None)` means explicit null.
fn present<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Value given, not blank.
pub fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// Render a client-supplied id or role for the log line.
pub fn describe(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
