pub mod json;
pub mod jwt;
pub mod password;

pub use json::*;
pub use jwt::{Claims, TokenCodec, TokenError};
