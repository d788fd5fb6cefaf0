//! # translation-core
//!
//! Core crate for the file translation service. Contains the configuration
//! schemas, the option > settings > default resolution of the service
//! configuration, and the unified error system.
//!
//! This crate has **no** internal dependencies on other translation crates.

pub mod config;
pub mod error;
pub mod result;

pub use config::translation::{TranslationConfig, TranslationOptions, TranslationSettings};
pub use error::{AppError, ErrorKind};
pub use result::AppResult;
