//! JWT-bearer grant against the DocuSign account server.
//!
//! The handshake is linear: sign an assertion, exchange it for an access
//! token, then resolve the token to an account and its regional base URI.
//! Each call to [`Authenticator::authenticate`] starts from scratch.

use crate::config::{DocuSignConfig, Environment};
use crate::domain::model::{AccessToken, AccountSession};
use crate::domain::ports::Authenticator;
use crate::utils::error::{AuthStage, DocuSignError, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

pub const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
pub const SCOPE: &str = "signature impersonation";
pub const ASSERTION_LIFETIME_SECS: i64 = 3600;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssertionClaims {
    pub iss: String,
    pub sub: String,
    pub iat: i64,
    pub exp: i64,
    pub aud: String,
    pub scope: String,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    expires_in: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct UserInfoResponse {
    accounts: Option<Vec<UserAccount>>,
}

#[derive(Debug, Deserialize)]
struct UserAccount {
    account_id: String,
    base_uri: String,
}

pub struct JwtAuthenticator {
    client_id: String,
    user_id: String,
    private_key: SecretString,
    environment: Environment,
    auth_base: String,
    http: Client,
}

impl JwtAuthenticator {
    /// Fails with `ConfigurationMissing` when the configuration was loaded
    /// auth-only.
    pub fn from_config(config: &DocuSignConfig, http: Client) -> Result<Self> {
        let (user_id, private_key) = config.impersonation()?;
        Ok(Self {
            client_id: config.client_id.clone(),
            user_id: user_id.to_string(),
            private_key: private_key.clone(),
            environment: config.environment(),
            auth_base: config.auth_base(),
            http,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    pub fn assertion_claims(&self, now: DateTime<Utc>) -> AssertionClaims {
        let iat = now.timestamp();
        AssertionClaims {
            iss: self.client_id.clone(),
            sub: self.user_id.clone(),
            iat,
            exp: iat + ASSERTION_LIFETIME_SECS,
            aud: self.environment.audience().to_string(),
            scope: SCOPE.to_string(),
        }
    }

    /// RS256-signed assertion for the token request.
    pub fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String> {
        let key = EncodingKey::from_rsa_pem(self.private_key.expose_secret().as_bytes())
            .map_err(|e| auth_failure(AuthStage::Assertion, None, e.to_string()))?;

        jsonwebtoken::encode(
            &Header::new(Algorithm::RS256),
            &self.assertion_claims(now),
            &key,
        )
        .map_err(|e| auth_failure(AuthStage::Assertion, None, e.to_string()))
    }

    /// Unauthenticated -> TokenObtained
    pub async fn request_token(&self) -> Result<AccessToken> {
        let now = Utc::now();
        let assertion = self.sign_assertion(now)?;
        let url = format!("{}/oauth/token", self.auth_base);

        tracing::debug!("Requesting access token from: {}", url);
        let response = self
            .http
            .post(&url)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Token endpoint response status: {}", status);
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("Token request rejected with status {}", status);
            return Err(auth_failure(
                AuthStage::TokenExchange,
                Some(status.as_u16()),
                body,
            ));
        }

        let parsed: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            auth_failure(
                AuthStage::TokenExchange,
                Some(status.as_u16()),
                format!("unreadable token response: {}", e),
            )
        })?;
        let token = parsed.access_token.ok_or_else(|| {
            auth_failure(
                AuthStage::TokenExchange,
                Some(status.as_u16()),
                "response has no access_token".to_string(),
            )
        })?;
        let lifetime = parsed.expires_in.unwrap_or(ASSERTION_LIFETIME_SECS);
        let expires_at = Some(lifetime)
            .filter(|seconds| *seconds > 0)
            .and_then(Duration::try_seconds)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .ok_or_else(|| {
                auth_failure(
                    AuthStage::TokenExchange,
                    Some(status.as_u16()),
                    format!("expires_in out of range: {}", lifetime),
                )
            })?;

        Ok(AccessToken {
            token: SecretString::from(token),
            expires_at,
        })
    }

    /// TokenObtained -> AccountResolved. The first listed account is used.
    pub async fn resolve_account(&self, access_token: AccessToken) -> Result<AccountSession> {
        let url = format!("{}/oauth/userinfo", self.auth_base);

        tracing::debug!("Requesting user info from: {}", url);
        let response = self
            .http
            .get(&url)
            .bearer_auth(access_token.token.expose_secret())
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("User info response status: {}", status);
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("User info request rejected with status {}", status);
            return Err(auth_failure(AuthStage::UserInfo, Some(status.as_u16()), body));
        }

        let parsed: UserInfoResponse = serde_json::from_str(&body).map_err(|e| {
            auth_failure(
                AuthStage::UserInfo,
                Some(status.as_u16()),
                format!("unreadable user info response: {}", e),
            )
        })?;
        let account = parsed
            .accounts
            .and_then(|accounts| accounts.into_iter().next())
            .ok_or_else(|| {
                auth_failure(
                    AuthStage::UserInfo,
                    Some(status.as_u16()),
                    "user info lists no accounts".to_string(),
                )
            })?;

        let session = AccountSession {
            access_token,
            account_id: account.account_id,
            base_uri: account.base_uri,
        };
        tracing::info!(
            "Resolved DocuSign account {} at {}",
            session.account_id,
            session.base_uri
        );
        Ok(session)
    }
}

#[async_trait]
impl Authenticator for JwtAuthenticator {
    async fn authenticate(&self) -> Result<AccountSession> {
        let token = self.request_token().await?;
        self.resolve_account(token).await
    }
}

fn auth_failure(stage: AuthStage, status: Option<u16>, message: String) -> DocuSignError {
    DocuSignError::AuthenticationFailed {
        stage,
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use jsonwebtoken::{DecodingKey, Validation};

    const PRIVATE_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pem");
    const PUBLIC_KEY: &str = include_str!("../../tests/fixtures/test_rsa_key.pub.pem");

    fn authenticator(test_mode: bool) -> JwtAuthenticator {
        let config =
            DocuSignConfig::new("client-123", test_mode).with_impersonation("user-456", PRIVATE_KEY);
        JwtAuthenticator::from_config(&config, Client::new()).unwrap()
    }

    #[test]
    fn test_claims() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let claims = authenticator(true).assertion_claims(now);

        assert_eq!(
            claims,
            AssertionClaims {
                iss: "client-123".to_string(),
                sub: "user-456".to_string(),
                iat: 1_700_000_000,
                exp: 1_700_003_600,
                aud: "account-d.docusign.com".to_string(),
                scope: "signature impersonation".to_string(),
            }
        );
        assert_eq!(
            authenticator(false).assertion_claims(now).aud,
            "account.docusign.com"
        );
    }

    #[test]
    fn test_signed_assertion_verifies() {
        let jwt = authenticator(true).sign_assertion(Utc::now()).unwrap();

        let header = jsonwebtoken::decode_header(&jwt).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);

        let mut validation = Validation::new(Algorithm::RS256);
        validation.set_audience(&["account-d.docusign.com"]);
        let key = DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes()).unwrap();
        let decoded = jsonwebtoken::decode::<AssertionClaims>(&jwt, &key, &validation).unwrap();
        assert_eq!(decoded.claims.sub, "user-456");
        assert_eq!(decoded.claims.exp - decoded.claims.iat, 3600);
    }

    #[test]
    fn test_bad_private_key() {
        let config = DocuSignConfig::new("client", true).with_impersonation("user", "not a pem");
        let authenticator = JwtAuthenticator::from_config(&config, Client::new()).unwrap();
        match authenticator.sign_assertion(Utc::now()) {
            Err(DocuSignError::AuthenticationFailed { stage, status, .. }) => {
                assert_eq!(stage, AuthStage::Assertion);
                assert_eq!(status, None);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_auth_only_config_cannot_authenticate() {
        let config = DocuSignConfig::new("client", true);
        assert!(matches!(
            JwtAuthenticator::from_config(&config, Client::new()),
            Err(DocuSignError::ConfigurationMissing { .. })
        ));
    }
}
