//! Convenience result type alias for the translation service.

use crate::error::AppError;

/// A specialized `Result` type for translation service operations.
pub type AppResult<T> = Result<T, AppError>;
