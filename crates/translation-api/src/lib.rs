//! # translation-api
//!
//! HTTP layer for the file translation service built on Axum.
//!
//! Every pattern in the converter registry becomes a `POST` route under
//! `{prefix}/{version}/`. Each route collects the request body under the
//! configured size ceiling, hands it to its converter, and maps the result
//! to a response.

pub mod body;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use router::{build_router, connect_routes};
pub use state::AppState;
