//! Deployment environments and their endpoints
//!
//! Every run targets exactly one Reactor environment. The environment picks
//! the API endpoints, the identity endpoints, and the names of the
//! environment variables that may hold fallback credentials.

use std::fmt;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::constants::{env as env_constants, reactor};

/// Reactor deployment environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, ValueEnum, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Qe,
    Integration,
    #[default]
    Production,
}

impl Environment {
    /// Lowercase name as accepted on the command line
    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Development => "development",
            Environment::Qe => "qe",
            Environment::Integration => "integration",
            Environment::Production => "production",
        }
    }

    /// Suffix appended to credential variable names (none for production)
    fn env_var_suffix(&self) -> Option<&'static str> {
        match self {
            Environment::Development => Some("DEVELOPMENT"),
            Environment::Qe => Some("QE"),
            Environment::Integration => Some("INTEGRATION"),
            Environment::Production => None,
        }
    }

    /// Built-in settings for this environment
    pub fn config(&self) -> EnvironmentConfig {
        let (reactor_host, ims_host) = match self {
            Environment::Development => ("https://reactor-dev.adobe.io", STAGE_IMS),
            Environment::Qe => ("https://reactor-qe.adobe.io", STAGE_IMS),
            Environment::Integration => ("https://reactor-integration.adobe.io", STAGE_IMS),
            Environment::Production => ("https://reactor.adobe.io", PRODUCTION_IMS),
        };

        let env_var = |prefix: &str| match self.env_var_suffix() {
            Some(suffix) => format!("{}_{}", prefix, suffix),
            None => prefix.to_string(),
        };

        EnvironmentConfig {
            environment: *self,
            extension_packages: format!("{}/extension_packages", reactor_host),
            jwt_exchange: format!("{}/ims/exchange/jwt", ims_host),
            oauth_token: format!("{}/ims/token/v3", ims_host),
            audience_prefix: format!("{}/c/", ims_host),
            metascope_prefix: format!("{}/s/", ims_host),
            private_key_env_var: env_var(env_constants::PRIVATE_KEY_PREFIX),
            client_secret_env_var: env_var(env_constants::CLIENT_SECRET_PREFIX),
            lookup_availability: Some(reactor::UPDATABLE_AVAILABILITY.to_string()),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const PRODUCTION_IMS: &str = "https://ims-na1.adobelogin.com";
const STAGE_IMS: &str = "https://ims-na1-stg1.adobelogin.com";

/// Settings for one deployment environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvironmentConfig {
    /// Environment these settings belong to
    pub environment: Environment,
    /// Extension package collection URL
    pub extension_packages: String,
    /// Endpoint exchanging a signed JWT for an access token
    pub jwt_exchange: String,
    /// OAuth client-credentials token endpoint
    pub oauth_token: String,
    /// Prefix of the JWT `aud` claim; the client id is appended
    pub audience_prefix: String,
    /// Prefix turning a metascope name into its claim key
    pub metascope_prefix: String,
    /// Variable holding the private key when not passed as an argument
    pub private_key_env_var: String,
    /// Variable holding the client secret when not passed as an argument
    pub client_secret_env_var: String,
    /// Availability filter applied when looking up an existing package
    pub lookup_availability: Option<String>,
}

impl EnvironmentConfig {
    /// URL of a single extension package
    pub fn extension_package_url(&self, id: &str) -> String {
        format!("{}/{}", self.extension_packages.trim_end_matches('/'), id)
    }
}
