//! Token exchanges against the identity service
//!
//! Both exchanges post a form and read back `access_token`. Failures keep the
//! provider's `error` code so the scope loop can tell an unprovisioned scope
//! apart from everything else.

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::header::CACHE_CONTROL;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::auth::token::{TokenExchange, TokenFailure};
use crate::constants::auth;
use crate::environment::EnvironmentConfig;
use crate::errors::AuthResult;

/// Successful token response
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
}

/// Error body of the identity service
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    error: Option<String>,
    error_description: Option<String>,
}

/// Exchange of a signed JWT assertion for an access token
pub struct JwtExchange {
    http: Client,
    endpoint: String,
    audience: String,
    metascope_prefix: String,
    org_id: String,
    technical_account_id: String,
    client_id: String,
    client_secret: String,
    key: EncodingKey,
}

impl JwtExchange {
    /// Creates a new JwtExchange
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Signing` if `private_key_pem` is not an RSA key
    pub fn new(
        http: Client,
        env: &EnvironmentConfig,
        client_id: String,
        client_secret: String,
        technical_account_id: String,
        org_id: String,
        private_key_pem: &[u8],
    ) -> AuthResult<Self> {
        let key = EncodingKey::from_rsa_pem(private_key_pem)?;

        Ok(Self {
            http,
            endpoint: env.jwt_exchange.clone(),
            audience: format!("{}{}", env.audience_prefix, client_id),
            metascope_prefix: env.metascope_prefix.clone(),
            org_id,
            technical_account_id,
            client_id,
            client_secret,
            key,
        })
    }

    /// Claims of the assertion for one metascope
    pub fn claims(&self, metascope: &str, issued_at: i64) -> Value {
        let mut claims = Map::new();
        claims.insert(
            "exp".to_string(),
            Value::from(issued_at + auth::JWT_LIFETIME_SECS),
        );
        claims.insert("iss".to_string(), Value::from(self.org_id.clone()));
        claims.insert(
            "sub".to_string(),
            Value::from(self.technical_account_id.clone()),
        );
        claims.insert("aud".to_string(), Value::from(self.audience.clone()));
        claims.insert(
            format!("{}{}", self.metascope_prefix, metascope),
            Value::Bool(true),
        );
        Value::Object(claims)
    }

    /// RS256-signed assertion for one metascope
    pub fn assertion(&self, metascope: &str) -> AuthResult<String> {
        let claims = self.claims(metascope, Utc::now().timestamp());
        Ok(encode(&Header::new(Algorithm::RS256), &claims, &self.key)?)
    }
}

#[async_trait]
impl TokenExchange for JwtExchange {
    fn scope_kind(&self) -> &'static str {
        "metascope"
    }

    async fn exchange(&self, scope: &str) -> Result<String, TokenFailure> {
        let assertion = self.assertion(scope).map_err(|e| TokenFailure {
            message: e.to_string(),
            code: None,
        })?;

        let form = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("jwt_token", assertion.as_str()),
        ];
        let request = self
            .http
            .post(&self.endpoint)
            .header(CACHE_CONTROL, "no-cache")
            .form(&form);

        send_token_request(request).await
    }
}

/// OAuth server-to-server client credentials exchange
pub struct OAuthExchange {
    http: Client,
    endpoint: String,
    client_id: String,
    client_secret: String,
}

impl OAuthExchange {
    pub fn new(
        http: Client,
        env: &EnvironmentConfig,
        client_id: String,
        client_secret: String,
    ) -> Self {
        Self {
            http,
            endpoint: env.oauth_token.clone(),
            client_id,
            client_secret,
        }
    }
}

#[async_trait]
impl TokenExchange for OAuthExchange {
    fn scope_kind(&self) -> &'static str {
        "scope"
    }

    async fn exchange(&self, scope: &str) -> Result<String, TokenFailure> {
        let form = [
            ("grant_type", "client_credentials"),
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("scope", scope),
        ];
        let request = self.http.post(&self.endpoint).form(&form);

        send_token_request(request).await
    }
}

async fn send_token_request(request: reqwest::RequestBuilder) -> Result<String, TokenFailure> {
    let response = request.send().await.map_err(|e| TokenFailure {
        message: e.to_string(),
        code: None,
    })?;

    let success = response.status().is_success();
    debug!("Token endpoint answered {}", response.status());
    let body = response.text().await.map_err(|e| TokenFailure {
        message: e.to_string(),
        code: None,
    })?;

    parse_token_response(success, &body)
}

/// Access token from a success body, or the provider's failure
pub fn parse_token_response(success: bool, body: &str) -> Result<String, TokenFailure> {
    if success {
        if let Ok(token) = serde_json::from_str::<TokenResponse>(body) {
            return Ok(token.access_token);
        }
        return Err(TokenFailure {
            message: format!(
                "No access token was returned. Full response body: {}",
                body
            ),
            code: None,
        });
    }

    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(error) => Err(TokenFailure {
            message: error
                .error_description
                .or_else(|| error.error.clone())
                .unwrap_or_else(|| body.to_string()),
            code: error.error,
        }),
        Err(_) => Err(TokenFailure {
            message: body.to_string(),
            code: None,
        }),
    }
}
