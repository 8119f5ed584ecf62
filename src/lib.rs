//! Reactor Uploader Library
//!
//! Uploads extension package zips to the Reactor API and waits for the
//! server to finish processing them.

pub mod app;
pub mod auth;
pub mod cli;
pub mod config;
pub mod constants;
pub mod environment;
pub mod errors;

// Re-export commonly used types for convenience
pub use errors::{AppError, Result};

#[cfg(test)]
mod tests {
    use super::*;
    use constants::*;

    #[test]
    fn test_constants_accessible() {
        // Test that our constants are accessible
        assert_eq!(DEFAULT_MAX_ATTEMPTS, 50);
        assert_eq!(MANIFEST_ENTRY, "extension.json");
        assert!(USER_AGENT.starts_with("reactor-uploader/"));
        assert_eq!(DEFAULT_METASCOPES.len(), 2);
    }

    #[test]
    fn test_error_types() {
        // Test that our error types work correctly
        let auth_error = errors::AuthError::NoScopeCandidates;
        let app_error = AppError::Auth(auth_error);

        assert_eq!(app_error.category(), "authentication");
    }
}
