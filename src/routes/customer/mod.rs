mod add;
mod delete;
mod get;
mod login;
mod role;
mod update;

pub use add::*;
pub use delete::*;
pub use get::*;
pub use login::*;
pub use role::*;
pub use update::*;

use crate::errors::Error;
use crate::models;

/// A CUSTOMER only reaches their own record; ADMIN reaches all of them.
fn ensure_owner(identity: &models::Identity, customer_id: &str) -> Result<(), Error> {
    if identity.may_access(customer_id) {
        return Ok(());
    }

    tracing::warn!(
        "Customer {} tried to reach customer {customer_id}",
        identity.subject_id
    );
    Err(Error::Forbidden("Access denied".to_string()))
}
