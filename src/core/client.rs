use crate::config::DocuSignConfig;
use crate::core::auth::{JwtAuthenticator, SCOPE};
use crate::core::envelope::{build_envelope, BuildOptions};
use crate::domain::model::{
    CustomField, Document, EnvelopeDraft, EnvelopeRequest, EnvelopeSubmission, Recipient,
};
use crate::domain::ports::Authenticator;
use crate::utils::error::{DocuSignError, Result};
use crate::utils::validation::Validate;
use reqwest::Client;
use secrecy::ExposeSecret;
use std::time::Duration;
use url::{form_urlencoded, Url};

const USER_AGENT_VALUE: &str = concat!("docusign-envelopes/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT_VALUE)
        .build()
        .map_err(DocuSignError::ApiError)
}

/// Entry point for applications: holds the configuration and composes
/// envelope building with the JWT handshake.
pub struct DocuSignClient<A: Authenticator = JwtAuthenticator> {
    config: DocuSignConfig,
    authenticator: Option<A>,
    http: Client,
}

impl DocuSignClient<JwtAuthenticator> {
    /// An auth-only configuration is accepted; sending then fails with
    /// `ConfigurationMissing`.
    pub fn new(config: DocuSignConfig) -> Result<Self> {
        config.validate()?;
        let http = http_client(config.timeout())?;
        let authenticator = match JwtAuthenticator::from_config(&config, http.clone()) {
            Ok(authenticator) => Some(authenticator),
            Err(DocuSignError::ConfigurationMissing { field }) => {
                tracing::debug!("No impersonation credentials ({} missing); auth-only client", field);
                None
            }
            Err(e) => return Err(e),
        };
        Ok(Self {
            config,
            authenticator,
            http,
        })
    }
}

impl<A: Authenticator> DocuSignClient<A> {
    pub fn with_authenticator(config: DocuSignConfig, authenticator: A) -> Result<Self> {
        config.validate()?;
        let http = http_client(config.timeout())?;
        Ok(Self {
            config,
            authenticator: Some(authenticator),
            http,
        })
    }

    pub fn config(&self) -> &DocuSignConfig {
        &self.config
    }

    /// Builds the request body without touching the network.
    pub fn build_only(
        &self,
        recipients: &[Recipient],
        documents: &[Document],
        custom_fields: &[CustomField],
        options: &BuildOptions,
    ) -> Result<EnvelopeRequest> {
        build_envelope(recipients, documents, custom_fields, options)
    }

    /// Builds with `status = "sent"`, authenticates, and posts the envelope.
    ///
    /// Validation runs first, so a malformed envelope never triggers a
    /// token request.
    pub async fn send_envelope(
        &self,
        recipients: &[Recipient],
        documents: &[Document],
        custom_fields: &[CustomField],
        options: &BuildOptions,
    ) -> Result<EnvelopeSubmission> {
        let options = options.clone().send_immediately(true);
        let request = build_envelope(recipients, documents, custom_fields, &options)?;
        self.submit(request).await
    }

    pub async fn send_draft(
        &self,
        draft: &EnvelopeDraft,
        options: &BuildOptions,
    ) -> Result<EnvelopeSubmission> {
        let request = draft.build(&options.clone().send_immediately(true))?;
        self.submit(request).await
    }

    async fn submit(&self, request: EnvelopeRequest) -> Result<EnvelopeSubmission> {
        let session = self.authenticator()?.authenticate().await?;
        let url = format!("{}/envelopes", session.account_base_url());

        tracing::debug!("Submitting envelope to: {}", url);
        let response = self
            .http
            .post(&url)
            .bearer_auth(session.access_token.token.expose_secret())
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        tracing::debug!("Envelope submission response status: {}", status);
        let body = response.text().await?;
        if !status.is_success() {
            tracing::warn!("Envelope submission rejected with status {}", status);
            return Err(DocuSignError::EnvelopeSubmissionFailed {
                status: status.as_u16(),
                body,
            });
        }

        // 2xx 時信封已建立，回應無法解析也不可視為失敗
        let response: serde_json::Value = if body.trim().is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_str(&body).unwrap_or_else(|e| {
                tracing::warn!("Envelope response is not JSON ({}); keeping raw body", e);
                serde_json::Value::String(body.clone())
            })
        };
        tracing::info!(
            "Envelope submitted: {}",
            response
                .get("envelopeId")
                .and_then(|id| id.as_str())
                .unwrap_or("<no envelopeId>")
        );

        Ok(EnvelopeSubmission {
            request,
            response,
            status_code: status.as_u16(),
        })
    }

    /// Runs the handshake and returns the account-scoped API root.
    pub async fn test_connection(&self) -> Result<String> {
        let session = self.authenticator()?.authenticate().await?;
        Ok(session.account_base_url())
    }

    /// Consent URL for the one-time interactive grant.
    pub fn authorization_link(&self) -> Result<String> {
        let redirect_uri = self.config.redirect_uri.as_deref().ok_or_else(|| {
            DocuSignError::ConfigurationMissing {
                field: "redirect-uri".to_string(),
            }
        })?;

        let mut url = Url::parse(&format!("{}/oauth/auth", self.config.auth_base())).map_err(
            |e| DocuSignError::ConfigError {
                message: format!("invalid OAuth base URL: {}", e),
            },
        )?;
        let scope = SCOPE.replace(' ', "%20");
        let client_id: String = form_urlencoded::byte_serialize(self.config.client_id.as_bytes()).collect();
        let redirect: String = form_urlencoded::byte_serialize(redirect_uri.as_bytes()).collect();
        url.set_query(Some(&format!(
            "response_type=code&scope={}&client_id={}&redirect_uri={}",
            scope, client_id, redirect
        )));
        Ok(url.into())
    }

    fn authenticator(&self) -> Result<&A> {
        self.authenticator
            .as_ref()
            .ok_or_else(|| match self.config.impersonation() {
                Err(e) => e,
                Ok(_) => DocuSignError::ConfigurationMissing {
                    field: "impersonated-user-guid".to_string(),
                },
            })
    }
}
