//! Middleware layers.

pub mod logging;
