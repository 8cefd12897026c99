mod customer;
mod identity;
mod role;

pub use customer::*;
pub use identity::*;
pub use role::*;
