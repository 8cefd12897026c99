use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    #[default]
    Customer,
    Admin,
}

impl Role {
    pub const ALL: [Role; 2] = [Role::Customer, Role::Admin];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "CUSTOMER",
            Role::Admin => "ADMIN",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive, surrounding whitespace ignored.
impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_uppercase().as_str() {
            "CUSTOMER" => Ok(Role::Customer),
            "ADMIN" => Ok(Role::Admin),
            _ => Err(format!(
                "Invalid role: {}. Valid roles: [{}]",
                s,
                Role::ALL.map(|r| r.as_str()).join(", ")
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_any_case() {
        assert_eq!(Role::Admin, "admin".parse().unwrap());
        assert_eq!(Role::Admin, "ADMIN".parse().unwrap());
        assert_eq!(Role::Customer, " Customer ".parse().unwrap());
    }

    #[test]
    fn rejects_unknown_role() {
        let err = "OWNER".parse::<Role>().unwrap_err();
        assert!(err.contains("OWNER"));
    }

    #[test]
    fn serializes_upper_case() {
        assert_eq!("\"ADMIN\"", serde_json::to_string(&Role::Admin).unwrap());
    }
}
