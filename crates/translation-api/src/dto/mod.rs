//! Data Transfer Objects for API responses.

pub mod response;
