//! Application constants for the Reactor uploader
//!
//! Grouped by functional domain. Per-environment endpoints live in
//! [`crate::environment`]; only values shared by every environment are here.

use std::time::Duration;

/// Environment variable names for credentials
pub mod env {
    /// Prefix of the variable holding the private key (path or PEM content)
    pub const PRIVATE_KEY_PREFIX: &str = "REACTOR_IO_INTEGRATION_PRIVATE_KEY";

    /// Prefix of the variable holding the client secret
    pub const CLIENT_SECRET_PREFIX: &str = "REACTOR_IO_INTEGRATION_CLIENT_SECRET";

    /// Legacy names that must no longer be used, oldest first
    pub const LEGACY_PRODUCTION_PRIVATE_KEY: &str = "REACTOR_UPLOADER_PRIVATE_KEY_PRODUCTION";
    pub const LEGACY_PRODUCTION_CLIENT_SECRET: &str = "REACTOR_UPLOADER_CLIENT_SECRET_PRODUCTION";
    pub const LEGACY_PRIVATE_KEY: &str = "REACTOR_UPLOADER_PRIVATE_KEY";
    pub const LEGACY_CLIENT_SECRET: &str = "REACTOR_UPLOADER_CLIENT_SECRET";
}

/// Authentication constants
pub mod auth {
    /// Metascopes a technical account may be provisioned with, preferred first
    pub const DEFAULT_METASCOPES: &[&str] = &[
        "ent_reactor_extension_developer_sdk",
        "ent_reactor_admin_sdk",
    ];

    /// Scope requested by OAuth server-to-server credentials
    pub const DEFAULT_OAUTH_SCOPE: &str = "AdobeID,openid,read_organizations,additional_info.job_function,additional_info.projectedProductContext,additional_info.roles";

    /// Upstream error code meaning the account lacks the requested scope
    pub const INVALID_SCOPE_CODE: &str = "invalid_scope";

    /// Lifetime of the signed JWT assertion (seconds)
    pub const JWT_LIFETIME_SECS: i64 = 60 * 60 * 24;

    /// Marker identifying inline PEM content instead of a key path
    pub const PEM_MARKER: &str = "-----BEGIN";
}

/// HTTP client configuration constants
pub mod http {
    use super::Duration;

    /// Default user agent for all HTTP requests
    pub const USER_AGENT: &str = concat!("reactor-uploader/", env!("CARGO_PKG_VERSION"));

    /// Default HTTP request timeout (uploads included)
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(120);

    /// Connection establishment timeout
    pub const CONNECT_TIMEOUT: Duration = Duration::from_secs(30);
}

/// Reactor API request conventions
pub mod reactor {
    /// JSON:API media type with the Reactor revision
    pub const ACCEPT: &str = "application/vnd.api+json;revision=1";

    /// Content type for JSON request bodies
    pub const CONTENT_TYPE: &str = "application/vnd.api+json";

    /// API key the Reactor gateway expects
    pub const API_KEY: &str = "Activation-DTM";

    /// Multipart field carrying the zip
    pub const PACKAGE_FIELD: &str = "package";

    /// Availability in which an existing package may be updated in place
    pub const UPDATABLE_AVAILABILITY: &str = "development";
}

/// Extension package archive layout
pub mod package {
    /// Manifest entry at the root of the zip
    pub const MANIFEST_ENTRY: &str = "extension.json";

    /// Largest manifest read from a zip
    pub const MAX_MANIFEST_BYTES: u64 = 1024 * 1024;

    /// File names produced by the extension packager
    pub const PACKAGER_ZIP_PATTERN: &str = r"^package-.*-.*\.zip$";

    /// Any zip file
    pub const ZIP_PATTERN: &str = r"\.zip$";
}

/// Status polling
pub mod poll {
    use super::Duration;

    /// Wait between status checks while the package is pending
    pub const INTERVAL: Duration = Duration::from_secs(1);

    /// Default number of status checks before giving up
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 50;
}

/// Configuration file locations
pub mod files {
    /// Project-local configuration file
    pub const LOCAL_CONFIG_FILE: &str = "reactor-uploader.toml";

    /// Directory under the user config dir
    pub const CONFIG_DIR_NAME: &str = "reactor-uploader";

    /// File name under the user config dir
    pub const CONFIG_FILE_NAME: &str = "config.toml";
}

// Re-export commonly used constants for convenience
pub use auth::{DEFAULT_METASCOPES, INVALID_SCOPE_CODE};
pub use http::USER_AGENT;
pub use package::MANIFEST_ENTRY;
pub use poll::{DEFAULT_MAX_ATTEMPTS, INTERVAL as POLL_INTERVAL};
