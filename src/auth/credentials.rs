//! Credential resolution
//!
//! Credentials come from command line arguments first, then from the
//! environment variables configured for the target environment, then from
//! interactive prompts. A value found earlier is never asked for again.

use std::collections::HashMap;
use std::env;
use std::fs;
use std::path::PathBuf;

use clap::ValueEnum;
use tracing::debug;

use crate::cli::prompts::Prompter;
use crate::constants::{auth, env as env_constants};
use crate::environment::EnvironmentConfig;
use crate::errors::{AuthError, AuthResult, PromptError};

/// Way the user authenticates
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum AuthScheme {
    /// Service account integration signing a JWT assertion
    Jwt,
    /// OAuth server-to-server client credentials
    Oauth,
    /// Pre-issued access token
    AccessToken,
}

/// Credential values as passed on the command line
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialArgs {
    pub auth_scheme: Option<AuthScheme>,
    pub access_token: Option<String>,
    /// Path to a PEM file, or inline PEM content
    pub private_key: Option<String>,
    pub org_id: Option<String>,
    pub tech_account_id: Option<String>,
    /// Client id, also called API key
    pub client_id: Option<String>,
    pub client_secret: Option<String>,
    pub scope: Option<String>,
}

/// Where the private key comes from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrivateKeySource {
    Path(PathBuf),
    Inline(String),
}

impl PrivateKeySource {
    /// Inline PEM if the value looks like one, otherwise a path
    pub fn from_value(value: &str) -> Self {
        if value.trim_start().starts_with(auth::PEM_MARKER) {
            PrivateKeySource::Inline(value.to_string())
        } else {
            PrivateKeySource::Path(PathBuf::from(value))
        }
    }

    /// PEM bytes of the key
    pub fn read(&self) -> AuthResult<Vec<u8>> {
        match self {
            PrivateKeySource::Inline(pem) => Ok(pem.as_bytes().to_vec()),
            PrivateKeySource::Path(path) => fs::read(path).map_err(|source| {
                AuthError::PrivateKeyRead {
                    path: path.clone(),
                    source,
                }
            }),
        }
    }
}

/// Fully resolved credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    AccessToken(String),
    Integration {
        client_id: String,
        client_secret: String,
        technical_account_id: String,
        org_id: String,
        private_key: PrivateKeySource,
    },
    OAuthServerToServer {
        client_id: String,
        client_secret: String,
        /// Explicit scope; configured candidates are used when absent
        scope: Option<String>,
    },
}

/// Read access to environment variables
pub trait VarSource: Send + Sync {
    /// Non-empty value of `name`
    fn var(&self, name: &str) -> Option<String>;
}

/// The process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl VarSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        env::var(name).ok().filter(|value| !value.is_empty())
    }
}

impl VarSource for HashMap<String, String> {
    fn var(&self, name: &str) -> Option<String> {
        self.get(name).filter(|value| !value.is_empty()).cloned()
    }
}

/// Refuse to run while credential variables with retired names are set
///
/// # Errors
///
/// Returns `AuthError::RenamedEnvironmentVariables` naming the old and new
/// variables
pub fn check_renamed_environment_variables(vars: &dyn VarSource) -> AuthResult<()> {
    let renames = [
        (
            env_constants::LEGACY_PRODUCTION_PRIVATE_KEY,
            env_constants::LEGACY_PRODUCTION_CLIENT_SECRET,
            env_constants::LEGACY_PRIVATE_KEY,
            env_constants::LEGACY_CLIENT_SECRET,
        ),
        (
            env_constants::LEGACY_PRIVATE_KEY,
            env_constants::LEGACY_CLIENT_SECRET,
            env_constants::PRIVATE_KEY_PREFIX,
            env_constants::CLIENT_SECRET_PREFIX,
        ),
    ];

    for (old_key, old_secret, new_key, new_secret) in renames {
        if vars.var(old_key).is_some() || vars.var(old_secret).is_some() {
            return Err(AuthError::RenamedEnvironmentVariables {
                old_private_key: old_key.to_string(),
                old_client_secret: old_secret.to_string(),
                new_private_key: new_key.to_string(),
                new_client_secret: new_secret.to_string(),
            });
        }
    }

    Ok(())
}

/// Scheme implied by the arguments, if any
///
/// Environment variables alone never imply a scheme; only explicit
/// arguments do.
pub fn implied_scheme(args: &CredentialArgs) -> Option<AuthScheme> {
    // An explicit token wins over any requested scheme
    if args.access_token.is_some() {
        return Some(AuthScheme::AccessToken);
    }
    if let Some(scheme) = args.auth_scheme {
        return Some(scheme);
    }
    if args.org_id.is_some() || args.tech_account_id.is_some() {
        return Some(AuthScheme::Jwt);
    }
    if args.scope.is_some() {
        return Some(AuthScheme::Oauth);
    }
    if args.client_id.is_some() {
        return Some(AuthScheme::Jwt);
    }
    None
}

const SCHEME_CHOICES: [(AuthScheme, &str); 3] = [
    (AuthScheme::Jwt, "Provide Adobe I/O integration details (JWT)"),
    (AuthScheme::Oauth, "Provide OAuth server-to-server credentials"),
    (AuthScheme::AccessToken, "Provide access token"),
];

/// Gathers credentials for one environment
pub struct CredentialResolver<'a> {
    env: &'a EnvironmentConfig,
    vars: &'a dyn VarSource,
    prompter: &'a dyn Prompter,
}

impl<'a> CredentialResolver<'a> {
    pub fn new(
        env: &'a EnvironmentConfig,
        vars: &'a dyn VarSource,
        prompter: &'a dyn Prompter,
    ) -> Self {
        Self {
            env,
            vars,
            prompter,
        }
    }

    /// Resolve credentials, prompting only for what is still missing
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Prompt` if a prompt is needed and fails
    pub fn resolve(&self, args: &CredentialArgs) -> AuthResult<Credentials> {
        let scheme = match implied_scheme(args) {
            Some(scheme) => scheme,
            None => self.prompt_scheme()?,
        };
        debug!("Authenticating with scheme {:?}", scheme);

        match scheme {
            AuthScheme::AccessToken => Ok(Credentials::AccessToken(self.gather(
                args.access_token.as_deref(),
                None,
                "What is your access token?",
                true,
            )?)),
            AuthScheme::Jwt => {
                let private_key = self.gather(
                    args.private_key.as_deref(),
                    Some(self.env.private_key_env_var.as_str()),
                    "What is the path (relative or absolute) to your private key?",
                    false,
                )?;
                let org_id =
                    self.gather(args.org_id.as_deref(), None, "What is your organization ID?", false)?;
                let technical_account_id = self.gather(
                    args.tech_account_id.as_deref(),
                    None,
                    "What is your technical account ID?",
                    false,
                )?;
                let client_id =
                    self.gather(args.client_id.as_deref(), None, "What is your API key?", false)?;
                let client_secret = self.client_secret(args)?;

                Ok(Credentials::Integration {
                    client_id,
                    client_secret,
                    technical_account_id,
                    org_id,
                    private_key: PrivateKeySource::from_value(&private_key),
                })
            }
            AuthScheme::Oauth => {
                let client_id = self.gather(
                    args.client_id.as_deref(),
                    None,
                    "What is your client ID (API key)?",
                    false,
                )?;
                let client_secret = self.client_secret(args)?;

                Ok(Credentials::OAuthServerToServer {
                    client_id,
                    client_secret,
                    scope: args.scope.clone(),
                })
            }
        }
    }

    fn client_secret(&self, args: &CredentialArgs) -> AuthResult<String> {
        self.gather(
            args.client_secret.as_deref(),
            Some(self.env.client_secret_env_var.as_str()),
            "What is your client secret?",
            true,
        )
    }

    fn prompt_scheme(&self) -> AuthResult<AuthScheme> {
        let items: Vec<String> = SCHEME_CHOICES
            .iter()
            .map(|(_, label)| label.to_string())
            .collect();
        let index = self
            .prompter
            .select("How would you like to authenticate?", &items)?;
        SCHEME_CHOICES
            .get(index)
            .map(|(scheme, _)| *scheme)
            .ok_or(AuthError::Prompt(PromptError::InvalidSelection {
                index,
                options: SCHEME_CHOICES.len(),
            }))
    }

    /// Argument, else environment variable, else prompt
    fn gather(
        &self,
        arg: Option<&str>,
        var_name: Option<&str>,
        prompt: &str,
        secret: bool,
    ) -> AuthResult<String> {
        if let Some(value) = arg.filter(|value| !value.is_empty()) {
            return Ok(value.to_string());
        }
        if let Some(value) = var_name.and_then(|name| self.vars.var(name)) {
            return Ok(value);
        }

        let value = if secret {
            self.prompter.secret(prompt)?
        } else {
            self.prompter.input(prompt)?
        };
        Ok(value)
    }
}
