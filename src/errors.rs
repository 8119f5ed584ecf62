//! Error types for the Reactor uploader
//!
//! Every stage of the upload pipeline has its own error enum. Messages are
//! written for the person running the tool: they are printed verbatim when
//! the pipeline stops.

use std::path::PathBuf;
use thiserror::Error;

/// Authentication-related errors
#[derive(Error, Debug)]
pub enum AuthError {
    /// The token endpoint rejected every attempt, or failed in a way that
    /// rules out trying another scope
    #[error("Error retrieving access token. {message}")]
    TokenRequest {
        message: String,
        /// Upstream error code (e.g. `invalid_scope`), when the provider sent one
        code: Option<String>,
    },

    /// Scope candidate list was empty
    #[error("No authorization scopes are configured to authenticate with")]
    NoScopeCandidates,

    /// Private key could not be read
    #[error("Failed to read private key at {path}: {source}")]
    PrivateKeyRead {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Private key could not be used to sign the JWT assertion
    #[error("Failed to sign authentication assertion with the private key: {0}")]
    Signing(#[from] jsonwebtoken::errors::Error),

    /// Legacy credential environment variables are still set
    #[error(
        "The environment variables {old_private_key} and {old_client_secret} were renamed. \
         The new names are {new_private_key} and {new_client_secret}. \
         Please update all your places where you use the old variable names!"
    )]
    RenamedEnvironmentVariables {
        old_private_key: String,
        old_client_secret: String,
        new_private_key: String,
        new_client_secret: String,
    },

    /// Interactive prompt failed
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// HTTP client could not be built
    #[error("HTTP client setup failed")]
    Http(#[from] reqwest::Error),
}

impl AuthError {
    /// Upstream provider error code, if any
    pub fn code(&self) -> Option<&str> {
        match self {
            AuthError::TokenRequest { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Errors reading the manifest out of an extension package zip
#[derive(Error, Debug)]
pub enum ManifestError {
    /// Archive could not be opened or decoded
    #[error("Error inspecting zip file for extension info. {reason}")]
    Unreadable { reason: String },

    /// Archive has no manifest entry
    #[error("No extension.json found within the extension package zip file.")]
    MissingManifest,

    /// Manifest entry is not valid JSON
    #[error("Error inspecting zip file for extension info. Invalid extension.json: {0}")]
    JsonParse(#[from] serde_json::Error),

    /// Manifest parsed but lacks a required field
    #[error("The extension.json within the extension package zip file has no {field}.")]
    MissingField { field: &'static str },
}

/// Errors talking to the Reactor extension package resource
#[derive(Error, Debug)]
pub enum ReactorError {
    /// Existing-package lookup failed
    #[error("Error detecting whether extension package exists on server. {detail}")]
    Lookup { detail: String },

    /// Create or update request failed
    #[error("Error uploading extension package. {detail}")]
    Upload { detail: String },

    /// Status request failed
    #[error("Error requesting extension package processing status. {detail}")]
    StatusRequest { detail: String },

    /// Zip could not be opened for upload
    #[error("Failed to open extension package zip {path}: {source}")]
    ZipOpen {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Request URL could not be built
    #[error("Invalid URL: {url} - {error}")]
    InvalidUrl { url: String, error: String },

    /// A header value (usually the access token) is not valid in HTTP
    #[error("Invalid value for the {name} header: {reason}")]
    InvalidHeader { name: &'static str, reason: String },

    /// HTTP client could not be built or a request could not be assembled
    #[error("HTTP client setup failed: {0}")]
    Client(#[from] reqwest::Error),
}

/// Terminal outcomes of status polling other than success
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PollError {
    /// Package stayed pending for the whole attempt budget
    #[error("The extension package failed to be processed within the expected timeframe.")]
    Timeout { attempts: u32 },

    /// Server reported that processing failed
    #[error("Extension package processing failed. \ntitle:  {title}\ndetail: {detail}")]
    Processing { title: String, detail: String },

    /// Server reported a status outside the known set
    #[error("Unknown extension package processing status.")]
    UnknownStatus { status: Option<String> },
}

/// Interactive prompt errors
#[derive(Error, Debug)]
pub enum PromptError {
    /// A value is required but stdin is not a terminal
    #[error("Cannot ask for {what}: not running in an interactive terminal. Pass it as a command line argument instead")]
    NotInteractive { what: String },

    /// Terminal I/O failed while prompting
    #[error("Prompt failed")]
    Terminal(#[from] dialoguer::Error),

    /// The prompt was given an empty answer where one is required
    #[error("A value for {what} is required")]
    Empty { what: String },

    /// A selection prompt answered with an index outside its list
    #[error("Selection {index} is not one of the {options} options offered")]
    InvalidSelection { index: usize, options: usize },
}

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Explicit configuration file not found
    #[error("Configuration file not found: {path}")]
    NotFound { path: PathBuf },

    /// Configuration file could not be read
    #[error("Failed to read configuration file {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Invalid configuration format
    #[error("Invalid configuration format")]
    InvalidFormat(#[from] toml::de::Error),

    /// Invalid configuration value
    #[error("Invalid configuration value for {field}: {value}. {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Top-level application error that can represent any error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Authentication error
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// Manifest error
    #[error(transparent)]
    Manifest(#[from] ManifestError),

    /// Reactor API error
    #[error(transparent)]
    Reactor(#[from] ReactorError),

    /// Polling error
    #[error(transparent)]
    Poll(#[from] PollError),

    /// Prompt error
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Configuration error
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Generic I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl AppError {
    /// Get error category for logging
    pub fn category(&self) -> &'static str {
        match self {
            AppError::Auth(_) => "authentication",
            AppError::Manifest(_) => "manifest",
            AppError::Reactor(_) => "reactor",
            AppError::Poll(_) => "processing",
            AppError::Prompt(_) => "prompt",
            AppError::Config(_) => "config",
            AppError::Io(_) => "io",
        }
    }
}

/// Result type alias for convenience
pub type Result<T> = std::result::Result<T, AppError>;

/// Authentication result type alias
pub type AuthResult<T> = std::result::Result<T, AuthError>;

/// Manifest result type alias
pub type ManifestResult<T> = std::result::Result<T, ManifestError>;

/// Reactor request result type alias
pub type ReactorResult<T> = std::result::Result<T, ReactorError>;

/// Prompt result type alias
pub type PromptResult<T> = std::result::Result<T, PromptError>;

/// Configuration result type alias
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
