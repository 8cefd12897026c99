pub mod customer;
pub mod login;
pub mod page;
pub mod role;

pub use customer::*;
pub use login::*;
pub use page::*;
pub use role::*;
