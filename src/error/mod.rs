//! Error types for client operations.
//!
//! Every call resolves with [`ClientResult`]. Streaming calls additionally
//! hand the same [`ClientError`] to the caller's error sink exactly once
//! before resolving.

mod category;
mod client_error;

pub use category::ErrorCategory;
pub use client_error::ClientError;

/// Result alias for client operations.
pub type ClientResult<T> = Result<T, ClientError>;
