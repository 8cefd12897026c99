pub mod authentication;
pub mod authorization;
pub mod error_handler;
