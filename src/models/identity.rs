use crate::models::Role;

/// Caller identity bound to a request by the authentication middleware.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    pub subject_id: String,
    pub email: String,
    pub role: Role,
}

impl Identity {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// ADMIN may touch any record, everyone else only their own.
    pub fn may_access(&self, customer_id: &str) -> bool {
        self.is_admin() || self.subject_id == customer_id
    }
}
