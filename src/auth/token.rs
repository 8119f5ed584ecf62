//! Access token acquisition with scope fallback
//!
//! A service account is provisioned with one of several scopes and there is
//! no way to ask which one beforehand. Candidates are tried in order; only a
//! provider answer of `invalid_scope` moves on to the next one.

use async_trait::async_trait;
use tracing::debug;

use crate::app::{log_verbose_header, ClientConfig};
use crate::auth::credentials::Credentials;
use crate::auth::exchange::{JwtExchange, OAuthExchange};
use crate::config::AuthConfigToml;
use crate::constants::auth;
use crate::environment::EnvironmentConfig;
use crate::errors::{AuthError, AuthResult};

/// Ordered, non-empty list of scopes, preferred first
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeCandidates(Vec<String>);

impl ScopeCandidates {
    /// # Errors
    ///
    /// Returns `AuthError::NoScopeCandidates` if `scopes` is empty
    pub fn new(scopes: Vec<String>) -> AuthResult<Self> {
        if scopes.is_empty() {
            return Err(AuthError::NoScopeCandidates);
        }
        Ok(Self(scopes))
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Failed exchange as reported by the provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TokenFailure {
    pub message: String,
    /// Provider error code; absent for transport failures and unparseable bodies
    pub code: Option<String>,
}

impl TokenFailure {
    fn is_invalid_scope(&self) -> bool {
        self.code.as_deref() == Some(auth::INVALID_SCOPE_CODE)
    }
}

/// One way of trading credentials plus a scope for an access token
#[async_trait]
pub trait TokenExchange: Send + Sync {
    /// What a candidate is called in log headers
    fn scope_kind(&self) -> &'static str;

    async fn exchange(&self, scope: &str) -> Result<String, TokenFailure>;
}

/// Try each candidate until one yields a token
///
/// # Errors
///
/// Returns `AuthError::TokenRequest` with the provider's message and code
/// when the last candidate fails with `invalid_scope`, or any candidate
/// fails otherwise
pub async fn acquire_token(
    exchange: &dyn TokenExchange,
    candidates: &ScopeCandidates,
    verbose: bool,
) -> AuthResult<String> {
    let last = candidates.len() - 1;

    for (index, scope) in candidates.iter().enumerate() {
        if verbose {
            log_verbose_header(&format!(
                "Authenticating with {} {}",
                exchange.scope_kind(),
                scope
            ));
        }

        match exchange.exchange(scope).await {
            Ok(token) => {
                debug!("Obtained access token with {} {}", exchange.scope_kind(), scope);
                return Ok(token);
            }
            Err(failure) if failure.is_invalid_scope() && index < last => {
                debug!("{} {} not provisioned: {}", exchange.scope_kind(), scope, failure.message);
            }
            Err(failure) => {
                return Err(AuthError::TokenRequest {
                    message: failure.message,
                    code: failure.code,
                })
            }
        }
    }

    Err(AuthError::NoScopeCandidates)
}

/// Turn resolved credentials into an access token
///
/// # Errors
///
/// Returns `AuthError` if the key cannot be read, no scope is configured,
/// or the exchange fails
pub async fn acquire_access_token(
    credentials: Credentials,
    env: &EnvironmentConfig,
    scopes: &AuthConfigToml,
    client_config: &ClientConfig,
    verbose: bool,
) -> AuthResult<String> {
    match credentials {
        Credentials::AccessToken(token) => Ok(token),
        Credentials::Integration {
            client_id,
            client_secret,
            technical_account_id,
            org_id,
            private_key,
        } => {
            let pem = private_key.read()?;
            let exchange = JwtExchange::new(
                client_config.build_http_client()?,
                env,
                client_id,
                client_secret,
                technical_account_id,
                org_id,
                &pem,
            )?;
            let candidates = ScopeCandidates::new(scopes.metascopes.clone())?;
            acquire_token(&exchange, &candidates, verbose).await
        }
        Credentials::OAuthServerToServer {
            client_id,
            client_secret,
            scope,
        } => {
            let exchange = OAuthExchange::new(
                client_config.build_http_client()?,
                env,
                client_id,
                client_secret,
            );
            let candidates = match scope {
                Some(scope) => ScopeCandidates::new(vec![scope])?,
                None => ScopeCandidates::new(scopes.oauth_scopes.clone())?,
            };
            acquire_token(&exchange, &candidates, verbose).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::environment::Environment;
    use httpmock::prelude::*;
    use serde_json::json;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// Replays scripted outcomes and records the scopes tried
    struct ScriptedExchange {
        outcomes: Mutex<VecDeque<Result<String, TokenFailure>>>,
        attempts: Mutex<Vec<String>>,
    }

    impl ScriptedExchange {
        fn new(outcomes: Vec<Result<String, TokenFailure>>) -> Self {
            Self {
                outcomes: Mutex::new(outcomes.into()),
                attempts: Mutex::new(Vec::new()),
            }
        }

        fn attempts(&self) -> Vec<String> {
            self.attempts.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TokenExchange for ScriptedExchange {
        fn scope_kind(&self) -> &'static str {
            "metascope"
        }

        async fn exchange(&self, scope: &str) -> Result<String, TokenFailure> {
            self.attempts.lock().unwrap().push(scope.to_string());
            self.outcomes
                .lock()
                .unwrap()
                .pop_front()
                .expect("unexpected exchange attempt")
        }
    }

    fn failure(code: Option<&str>, message: &str) -> Result<String, TokenFailure> {
        Err(TokenFailure {
            message: message.to_string(),
            code: code.map(str::to_string),
        })
    }

    fn candidates(scopes: &[&str]) -> ScopeCandidates {
        ScopeCandidates::new(scopes.iter().map(|s| s.to_string()).collect()).unwrap()
    }

    #[test]
    fn test_empty_candidates_rejected() {
        assert!(matches!(
            ScopeCandidates::new(vec![]),
            Err(AuthError::NoScopeCandidates)
        ));
    }

    #[tokio::test]
    async fn test_every_scope_invalid() {
        let exchange = ScriptedExchange::new(vec![
            failure(Some("invalid_scope"), "Invalid metascope one."),
            failure(Some("invalid_scope"), "Invalid metascope two."),
            failure(Some("invalid_scope"), "Invalid metascope three."),
        ]);

        let error = acquire_token(&exchange, &candidates(&["a", "b", "c"]), true)
            .await
            .unwrap_err();

        assert_eq!(exchange.attempts(), vec!["a", "b", "c"]);
        assert_eq!(
            error.to_string(),
            "Error retrieving access token. Invalid metascope three."
        );
        assert_eq!(error.code(), Some("invalid_scope"));
    }

    #[tokio::test]
    async fn test_other_error_aborts_early() {
        let exchange = ScriptedExchange::new(vec![
            failure(Some("invalid_scope"), "Invalid metascope."),
            failure(Some("invalid_client"), "Client secret is wrong."),
        ]);

        let error = acquire_token(&exchange, &candidates(&["a", "b", "c"]), false)
            .await
            .unwrap_err();

        assert_eq!(exchange.attempts(), vec!["a", "b"]);
        assert_eq!(error.code(), Some("invalid_client"));
        assert_eq!(
            error.to_string(),
            "Error retrieving access token. Client secret is wrong."
        );
    }

    #[tokio::test]
    async fn test_missing_code_aborts() {
        let exchange = ScriptedExchange::new(vec![failure(None, "connection refused")]);

        let error = acquire_token(&exchange, &candidates(&["a", "b"]), false)
            .await
            .unwrap_err();

        assert_eq!(exchange.attempts(), vec!["a"]);
        assert_eq!(error.code(), None);
    }

    #[tokio::test]
    async fn test_first_success_skips_remaining_scopes() {
        let exchange = ScriptedExchange::new(vec![
            failure(Some("invalid_scope"), "Invalid metascope."),
            Ok("generatedAccessToken".to_string()),
        ]);

        let token = acquire_token(&exchange, &candidates(&["a", "b", "c"]), false)
            .await
            .unwrap();

        assert_eq!(token, "generatedAccessToken");
        assert_eq!(exchange.attempts(), vec!["a", "b"]);
    }

    #[tokio::test]
    async fn test_verbose_header_before_each_attempt() {
        let (_guard, logs) = crate::app::log_capture::capture();
        let exchange = ScriptedExchange::new(vec![
            failure(Some("invalid_scope"), "Invalid metascope."),
            Ok("generatedAccessToken".to_string()),
        ]);

        acquire_token(
            &exchange,
            &candidates(&["ent_reactor_extension_developer_sdk", "ent_reactor_admin_sdk"]),
            true,
        )
        .await
        .unwrap();

        assert_eq!(
            logs.count("---------- Authenticating with metascope ent_reactor_extension_developer_sdk ----------"),
            1
        );
        assert_eq!(
            logs.count("---------- Authenticating with metascope ent_reactor_admin_sdk ----------"),
            1
        );
    }

    #[tokio::test]
    async fn test_access_token_credentials_make_no_requests() {
        let token = acquire_access_token(
            Credentials::AccessToken("generatedAccessToken".to_string()),
            &Environment::Production.config(),
            &AuthConfigToml::default(),
            &ClientConfig::default(),
            false,
        )
        .await
        .unwrap();

        assert_eq!(token, "generatedAccessToken");
    }

    #[tokio::test]
    async fn test_oauth_uses_configured_scopes() {
        let server = MockServer::start_async().await;
        let rejected = server.mock(|when, then| {
            when.method(POST)
                .path("/ims/token/v3")
                .body_includes("scope=first");
            then.status(400).json_body(json!({
                "error": "invalid_scope",
                "error_description": "Invalid scope first"
            }));
        });
        let accepted = server.mock(|when, then| {
            when.method(POST)
                .path("/ims/token/v3")
                .body_includes("scope=second");
            then.status(200)
                .json_body(json!({ "access_token": "generatedAccessToken" }));
        });

        let mut env = Environment::Production.config();
        env.oauth_token = server.url("/ims/token/v3");
        let scopes = AuthConfigToml {
            oauth_scopes: vec!["first".to_string(), "second".to_string()],
            ..Default::default()
        };

        let token = acquire_access_token(
            Credentials::OAuthServerToServer {
                client_id: "MyClientId".to_string(),
                client_secret: "MyClientSecret".to_string(),
                scope: None,
            },
            &env,
            &scopes,
            &ClientConfig::default(),
            false,
        )
        .await
        .unwrap();

        rejected.assert();
        accepted.assert();
        assert_eq!(token, "generatedAccessToken");
    }
}
