//! Core application logic for the Reactor uploader
//!
//! This module contains the Reactor HTTP client, the extension package
//! models, manifest extraction and status polling.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::path::Path;
//! use reactor_uploader::app::{read_manifest, ClientConfig, ReactorClient};
//! use reactor_uploader::environment::Environment;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let zip = Path::new("package-hello-world-1.0.0.zip");
//! let manifest = read_manifest(zip)?;
//!
//! let client = ReactorClient::new(
//!     &ClientConfig::default(),
//!     Environment::Production.config(),
//!     "access-token",
//!     false,
//! )?;
//! let existing = client.find_existing_package(&manifest).await?;
//! let id = client.upload_package(&manifest, existing.as_ref(), zip).await?;
//! println!("Uploaded {}", id);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod manifest;
pub mod models;
pub mod status;

// Re-export main public API
pub use client::{ClientConfig, ReactorClient, UploadTarget};
pub use manifest::read_manifest;
pub use models::{ExtensionPackageManifest, ExtensionPackageRecord, ProcessingStatus};
pub use status::{poll_until_settled, Delay, StatusSource, TokioDelay};

/// Log a section header for a pipeline step in verbose mode
pub fn log_verbose_header(title: &str) {
    tracing::info!("---------- {} ----------", title);
}

/// Log capture for tests that assert on verbose output
#[cfg(test)]
pub(crate) mod log_capture {
    use std::io;
    use std::sync::{Arc, Mutex};

    use tracing::subscriber::DefaultGuard;

    /// Shared buffer the subscriber writes formatted events into
    #[derive(Clone, Default)]
    pub struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl LogBuffer {
        pub fn contents(&self) -> String {
            String::from_utf8_lossy(&self.0.lock().unwrap()).into_owned()
        }

        /// Number of lines containing `needle`
        pub fn count(&self, needle: &str) -> usize {
            self.contents()
                .lines()
                .filter(|line| line.contains(needle))
                .count()
        }
    }

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    /// Capture INFO and above on the current thread until the guard drops
    pub fn capture() -> (DefaultGuard, LogBuffer) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::INFO)
            .with_ansi(false)
            .with_writer(move || writer.clone())
            .finish();
        (tracing::subscriber::set_default(subscriber), buffer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_structure() {
        // Ensure public API is accessible
        let config = ClientConfig::default();
        assert!(config.request_timeout > config.connect_timeout);
        assert_eq!(TokioDelay, TokioDelay::default());
    }
}
