//! Request handlers.

pub mod conversion;
pub mod health;
