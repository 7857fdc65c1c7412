//! Service-account bearer tokens for the Drive API.
//!
//! Signs an RS256 JWT with the account's private key and exchanges it for a
//! short-lived access token at Google's token endpoint. The token is cached
//! until shortly before expiry; the job never needs more than one refresh.

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_URI: &str = "https://oauth2.googleapis.com/token";
const DRIVE_READONLY_SCOPE: &str = "https://www.googleapis.com/auth/drive.readonly";
const GRANT_TYPE: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";

/// Slack subtracted from the reported expiry so a token is never used at the
/// edge of its lifetime.
const EXPIRY_SLACK_SECS: i64 = 60;

#[derive(Debug, Clone)]
pub struct ServiceAccount {
    pub client_id: String,
    pub client_email: String,
    /// PKCS#8 PEM. Environments commonly deliver this with literal `\n`
    /// escapes; [`ServiceAccount::new`] normalizes them.
    pub private_key: String,
    pub private_key_id: String,
}

impl ServiceAccount {
    pub fn new(
        client_id: String,
        client_email: String,
        private_key: String,
        private_key_id: String,
    ) -> Self {
        Self {
            client_id,
            client_email,
            private_key: private_key.replace("\\n", "\n"),
            private_key_id,
        }
    }
}

#[derive(Debug, Serialize)]
struct Claims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug)]
struct CachedToken {
    token: String,
    expires_at: i64,
}

pub struct TokenProvider {
    account: ServiceAccount,
    http: reqwest::Client,
    cached: Mutex<Option<CachedToken>>,
}

impl TokenProvider {
    pub fn new(account: ServiceAccount, http: reqwest::Client) -> Self {
        Self {
            account,
            http,
            cached: Mutex::new(None),
        }
    }

    /// Returns a valid bearer token, refreshing through the token endpoint
    /// when the cached one is absent or close to expiry.
    pub async fn bearer_token(&self) -> Result<String> {
        let mut cached = self.cached.lock().await;
        let now = chrono::Utc::now().timestamp();

        if let Some(token) = cached.as_ref() {
            if token.expires_at - EXPIRY_SLACK_SECS > now {
                return Ok(token.token.clone());
            }
        }

        debug!("requesting new drive access token");
        let assertion = self.sign_assertion(now)?;
        let response: TokenResponse = self
            .http
            .post(TOKEN_URI)
            .form(&[("grant_type", GRANT_TYPE), ("assertion", &assertion)])
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        let token = response.access_token;
        *cached = Some(CachedToken {
            token: token.clone(),
            expires_at: now + response.expires_in,
        });
        Ok(token)
    }

    fn sign_assertion(&self, now: i64) -> Result<String> {
        let claims = Claims {
            iss: &self.account.client_email,
            scope: DRIVE_READONLY_SCOPE,
            aud: TOKEN_URI,
            iat: now,
            exp: now + 3600,
        };

        let mut header = jsonwebtoken::Header::new(jsonwebtoken::Algorithm::RS256);
        header.kid = Some(self.account.private_key_id.clone());

        let key = jsonwebtoken::EncodingKey::from_rsa_pem(self.account.private_key.as_bytes())
            .map_err(|e| SyncError::Auth(format!("invalid service-account key: {e}")))?;

        jsonwebtoken::encode(&header, &claims, &key)
            .map_err(|e| SyncError::Auth(format!("failed to sign token assertion: {e}")))
    }
}
