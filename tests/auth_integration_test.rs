use anyhow::Result;
use docusign_envelopes::domain::ports::Authenticator;
use docusign_envelopes::utils::error::AuthStage;
use docusign_envelopes::{DocuSignClient, DocuSignConfig, DocuSignError, JwtAuthenticator};
use httpmock::prelude::*;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use secrecy::ExposeSecret;
use std::time::Duration;

const PRIVATE_KEY: &str = include_str!("fixtures/test_rsa_key.pem");
const PUBLIC_KEY: &str = include_str!("fixtures/test_rsa_key.pub.pem");

fn config_for(server: &MockServer) -> DocuSignConfig {
    DocuSignConfig::new("client-123", true)
        .with_impersonation("user-456", PRIVATE_KEY)
        .with_oauth_base_url(server.base_url())
}

fn authenticator_for(server: &MockServer) -> JwtAuthenticator {
    let http = docusign_envelopes::core::client::http_client(Duration::from_secs(5)).unwrap();
    JwtAuthenticator::from_config(&config_for(server), http).unwrap()
}

/// 完整的 JWT 授權流程：token -> userinfo -> account base URL
#[tokio::test]
async fn test_complete_handshake() -> Result<()> {
    let server = MockServer::start();

    let token_mock = server.mock(|when, then| {
        when.method(POST)
            .path("/oauth/token")
            .header("content-type", "application/x-www-form-urlencoded")
            .body_contains("grant_type=urn%3Aietf%3Aparams%3Aoauth%3Agrant-type%3Ajwt-bearer")
            .body_contains("assertion=");
        then.status(200).json_body(serde_json::json!({
            "access_token": "token-abc",
            "token_type": "Bearer",
            "expires_in": 3600
        }));
    });

    let userinfo_mock = server.mock(|when, then| {
        when.method(GET)
            .path("/oauth/userinfo")
            .header("authorization", "Bearer token-abc");
        then.status(200).json_body(serde_json::json!({
            "sub": "user-456",
            "accounts": [
                {"account_id": "acc-1", "is_default": true, "account_name": "Primary", "base_uri": "https://demo.docusign.net"},
                {"account_id": "acc-2", "is_default": false, "account_name": "Other", "base_uri": "https://eu.docusign.net"}
            ]
        }));
    });

    let session = authenticator_for(&server).authenticate().await?;

    token_mock.assert();
    userinfo_mock.assert();
    assert_eq!(session.access_token.token.expose_secret(), "token-abc");
    assert_eq!(session.account_id, "acc-1");
    assert_eq!(
        session.account_base_url(),
        "https://demo.docusign.net/restapi/v2/accounts/acc-1"
    );
    assert!(session.access_token.expires_at > chrono::Utc::now());

    Ok(())
}

#[tokio::test]
async fn test_assertion_sent_to_token_endpoint_is_valid() -> Result<()> {
    let server = MockServer::start();
    let authenticator = authenticator_for(&server);

    // 直接檢查送出前的 assertion 內容
    let jwt = authenticator.sign_assertion(chrono::Utc::now())?;
    let mut validation = Validation::new(Algorithm::RS256);
    validation.set_audience(&["account-d.docusign.com"]);
    validation.set_issuer(&["client-123"]);
    let claims = jsonwebtoken::decode::<serde_json::Value>(
        &jwt,
        &DecodingKey::from_rsa_pem(PUBLIC_KEY.as_bytes())?,
        &validation,
    )?
    .claims;

    assert_eq!(claims["sub"], "user-456");
    assert_eq!(claims["scope"], "signature impersonation");

    Ok(())
}

#[tokio::test]
async fn test_token_rejected() -> Result<()> {
    let server = MockServer::start();

    let token_mock = server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(400)
            .json_body(serde_json::json!({"error": "consent_required"}));
    });
    let userinfo_mock = server.mock(|when, then| {
        when.method(GET).path("/oauth/userinfo");
        then.status(200).json_body(serde_json::json!({"accounts": []}));
    });

    let result = authenticator_for(&server).authenticate().await;

    token_mock.assert();
    userinfo_mock.assert_hits(0);
    match result {
        Err(DocuSignError::AuthenticationFailed {
            stage,
            status,
            message,
        }) => {
            assert_eq!(stage, AuthStage::TokenExchange);
            assert_eq!(status, Some(400));
            assert!(message.contains("consent_required"));
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.account_id)),
    }

    Ok(())
}

#[tokio::test]
async fn test_token_response_without_access_token() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .json_body(serde_json::json!({"token_type": "Bearer"}));
    });

    let result = authenticator_for(&server).request_token().await;
    assert!(matches!(
        result,
        Err(DocuSignError::AuthenticationFailed {
            stage: AuthStage::TokenExchange,
            ..
        })
    ));

    Ok(())
}

#[tokio::test]
async fn test_token_lifetime_out_of_range() -> Result<()> {
    for expires_in in [serde_json::json!(i64::MAX), serde_json::json!(0), serde_json::json!(-60)] {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(POST).path("/oauth/token");
            then.status(200).json_body(serde_json::json!({
                "access_token": "token-abc",
                "expires_in": expires_in
            }));
        });

        let result = authenticator_for(&server).request_token().await;
        match result {
            Err(DocuSignError::AuthenticationFailed {
                stage,
                status,
                message,
            }) => {
                assert_eq!(stage, AuthStage::TokenExchange);
                assert_eq!(status, Some(200));
                assert!(message.contains("expires_in"));
            }
            other => panic!(
                "expires_in {}: unexpected result {:?}",
                expires_in,
                other.map(|t| t.expires_at)
            ),
        }
    }

    Ok(())
}

#[tokio::test]
async fn test_userinfo_without_accounts() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .json_body(serde_json::json!({"access_token": "token-abc"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/oauth/userinfo");
        then.status(200)
            .json_body(serde_json::json!({"sub": "user-456"}));
    });

    let result = authenticator_for(&server).authenticate().await;
    match result {
        Err(DocuSignError::AuthenticationFailed { stage, status, .. }) => {
            assert_eq!(stage, AuthStage::UserInfo);
            assert_eq!(status, Some(200));
        }
        other => panic!("unexpected result: {:?}", other.map(|s| s.account_id)),
    }

    Ok(())
}

#[tokio::test]
async fn test_userinfo_unauthorized() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .json_body(serde_json::json!({"access_token": "token-abc"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/oauth/userinfo");
        then.status(401).body("invalid token");
    });

    let result = authenticator_for(&server).authenticate().await;
    assert!(matches!(
        result,
        Err(DocuSignError::AuthenticationFailed {
            stage: AuthStage::UserInfo,
            status: Some(401),
            ..
        })
    ));

    Ok(())
}

#[tokio::test]
async fn test_connection_returns_account_base_url() -> Result<()> {
    let server = MockServer::start();

    server.mock(|when, then| {
        when.method(POST).path("/oauth/token");
        then.status(200)
            .json_body(serde_json::json!({"access_token": "token-abc"}));
    });
    server.mock(|when, then| {
        when.method(GET).path("/oauth/userinfo");
        then.status(200).json_body(serde_json::json!({
            "accounts": [{"account_id": "acc-9", "base_uri": "https://na4.docusign.net"}]
        }));
    });

    let client = DocuSignClient::new(config_for(&server))?;
    let base_url = client.test_connection().await?;
    assert_eq!(base_url, "https://na4.docusign.net/restapi/v2/accounts/acc-9");

    Ok(())
}
