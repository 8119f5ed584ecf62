//! Command-line argument parsing for the Reactor uploader
//!
//! One command: upload a zip. Every credential can be passed as an argument;
//! whatever is missing is taken from the environment or asked for.

use std::path::PathBuf;

use clap::Parser;

use crate::auth::{AuthScheme, CredentialArgs};
use crate::constants::poll;
use crate::environment::Environment;

/// Upload an extension package zip to Reactor
#[derive(Parser, Debug, Clone)]
#[command(
    name = "reactor-uploader",
    version,
    about = "Upload an extension package to Reactor",
    long_about = "Uploads an extension package zip to the Reactor API, creating a new development \
package or updating the existing one, then waits until the server has processed it."
)]
pub struct Cli {
    /// Path to the extension package zip; discovered in the current directory when omitted
    #[arg(value_name = "ZIP")]
    pub zip_path: Option<PathBuf>,

    /// Environment to upload to
    #[arg(short, long, value_enum, default_value_t = Environment::Production)]
    pub environment: Environment,

    /// How to authenticate; inferred from the other credential arguments when omitted
    #[arg(long, value_enum)]
    pub auth_scheme: Option<AuthScheme>,

    /// Path to the private key, or its PEM content
    #[arg(long)]
    pub private_key: Option<String>,

    /// Organization ID
    #[arg(long)]
    pub org_id: Option<String>,

    /// Technical account ID
    #[arg(long)]
    pub tech_account_id: Option<String>,

    /// Client ID (API key)
    #[arg(long, alias = "api-key")]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(long)]
    pub client_secret: Option<String>,

    /// OAuth scope; replaces the configured scope candidates
    #[arg(long)]
    pub scope: Option<String>,

    /// Pre-issued access token; skips every other authentication step
    #[arg(long)]
    pub access_token: Option<String>,

    /// Number of status checks, one per second, before giving up on processing
    #[arg(long, value_name = "SECONDS", default_value_t = poll::DEFAULT_MAX_ATTEMPTS)]
    pub upload_timeout: u32,

    /// Configuration file path
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log every step, request and response
    #[arg(short, long)]
    pub verbose: bool,

    /// Very verbose logging (debug level)
    #[arg(long)]
    pub very_verbose: bool,
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the logging level based on verbosity flags
    pub fn log_level(&self) -> tracing::Level {
        if self.very_verbose {
            tracing::Level::DEBUG
        } else if self.verbose {
            tracing::Level::INFO
        } else {
            tracing::Level::WARN
        }
    }

    /// Whether pipeline steps are traced
    pub fn is_verbose(&self) -> bool {
        self.verbose || self.very_verbose
    }

    /// Credential arguments for the resolver
    pub fn credential_args(&self) -> CredentialArgs {
        CredentialArgs {
            auth_scheme: self.auth_scheme,
            access_token: self.access_token.clone(),
            private_key: self.private_key.clone(),
            org_id: self.org_id.clone(),
            tech_account_id: self.tech_account_id.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
            scope: self.scope.clone(),
        }
    }
}
