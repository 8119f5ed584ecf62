//! Authentication against the Reactor identity service
//!
//! Credentials are resolved from arguments, environment variables and
//! prompts, then exchanged for an access token.
//!
//! # Examples
//!
//! ```rust,no_run
//! use reactor_uploader::app::ClientConfig;
//! use reactor_uploader::auth::{acquire_access_token, CredentialArgs, CredentialResolver, ProcessEnv};
//! use reactor_uploader::cli::prompts::TerminalPrompter;
//! use reactor_uploader::config::AuthConfigToml;
//! use reactor_uploader::environment::Environment;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let env = Environment::Production.config();
//! let resolver = CredentialResolver::new(&env, &ProcessEnv, &TerminalPrompter);
//! let credentials = resolver.resolve(&CredentialArgs::default())?;
//! let token = acquire_access_token(
//!     credentials,
//!     &env,
//!     &AuthConfigToml::default(),
//!     &ClientConfig::default(),
//!     false,
//! )
//! .await?;
//! # Ok(())
//! # }
//! ```

pub mod credentials;
pub mod exchange;
pub mod token;

// Re-export main public API
pub use credentials::{
    check_renamed_environment_variables, AuthScheme, CredentialArgs, CredentialResolver,
    Credentials, PrivateKeySource, ProcessEnv, VarSource,
};
pub use exchange::{JwtExchange, OAuthExchange};
pub use token::{acquire_access_token, acquire_token, ScopeCandidates, TokenExchange, TokenFailure};
