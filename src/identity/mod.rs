//! Hosted identity provider client and username validation.
//!
//! The portal form collects a bare username; the account email is derived
//! by appending the configured domain. Provider error codes are classified
//! into the small set of messages the page shows, everything else falls
//! through as a generic provider error.

use anyhow::{Context, Result};
use regex::Regex;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const SIGN_IN_TIMEOUT: Duration = Duration::from_secs(10);

/// An authenticated identity as returned by the provider.
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct Identity {
    pub uid: String,
    pub email: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Enter just the username, without @{domain}")]
    UsernameWithDomain { domain: String },
    #[error("Username is not valid.")]
    InvalidUsername,
    #[error("Account not found.")]
    UserNotFound,
    #[error("Wrong password.")]
    WrongPassword,
    #[error("Too many attempts. Try again later.")]
    TooManyRequests,
    #[error("Error: {0}")]
    Provider(String),
    #[error("Network error. Please try again")]
    Network(#[source] reqwest::Error),
}

impl IdentityError {
    /// Validation errors are rejected before any network call and are not
    /// counted as failed attempts.
    #[must_use]
    pub const fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::UsernameWithDomain { .. } | Self::InvalidUsername
        )
    }
}

/// Bare usernames are restricted to `[A-Za-z0-9._-]`.
#[must_use]
pub fn valid_username(username: &str) -> bool {
    Regex::new(r"^[A-Za-z0-9._-]+$").is_ok_and(|regex| regex.is_match(username))
}

#[derive(Clone, Debug)]
pub struct IdentityClient {
    client: reqwest::Client,
    base_url: Url,
    api_key: SecretString,
    email_domain: String,
}

impl IdentityClient {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new(base_url: Url, api_key: SecretString, email_domain: String) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(SIGN_IN_TIMEOUT)
            .build()
            .context("Failed to build identity HTTP client")?;

        Ok(Self {
            client,
            base_url,
            api_key,
            email_domain,
        })
    }

    #[must_use]
    pub fn email_domain(&self) -> &str {
        &self.email_domain
    }

    /// Derive the account email for a bare username.
    ///
    /// # Errors
    /// Returns a validation error for usernames containing `@` or any
    /// character outside `[A-Za-z0-9._-]`.
    pub fn email_for(&self, username: &str) -> Result<String, IdentityError> {
        let username = username.trim();
        if username.contains('@') {
            return Err(IdentityError::UsernameWithDomain {
                domain: self.email_domain.clone(),
            });
        }
        if !valid_username(username) {
            return Err(IdentityError::InvalidUsername);
        }
        Ok(format!("{username}@{}", self.email_domain))
    }

    /// Authenticate `username`/`password` against the provider.
    ///
    /// # Errors
    /// Returns a classified [`IdentityError`] for validation failures,
    /// provider rejections, and transport failures.
    #[instrument(skip_all, fields(username = %username))]
    pub async fn sign_in(
        &self,
        username: &str,
        password: &str,
    ) -> Result<Identity, IdentityError> {
        let email = self.email_for(username)?;

        let mut url = self
            .base_url
            .join("v1/accounts:signIn")
            .map_err(|err| IdentityError::Provider(err.to_string()))?;
        url.query_pairs_mut()
            .append_pair("key", self.api_key.expose_secret());

        let response = self
            .client
            .post(url)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .map_err(IdentityError::Network)?;

        let status = response.status();
        if status.is_success() {
            let identity: Identity = response.json().await.map_err(IdentityError::Network)?;
            debug!(uid = %identity.uid, "Identity provider accepted sign-in");
            return Ok(identity);
        }

        let body: ErrorBody = response.json().await.unwrap_or_default();
        Err(classify(
            body.error.code.as_deref(),
            body.error.message.as_deref(),
            status.as_u16(),
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: ErrorDetail,
}

#[derive(Debug, Default, Deserialize)]
struct ErrorDetail {
    code: Option<String>,
    message: Option<String>,
}

/// Map a provider error code onto the page's message set.
///
/// Codes may arrive with or without an `auth/` prefix.
fn classify(code: Option<&str>, message: Option<&str>, status: u16) -> IdentityError {
    let code = code.map(|code| code.strip_prefix("auth/").unwrap_or(code));

    match code {
        Some("user-not-found") => IdentityError::UserNotFound,
        Some("wrong-password") => IdentityError::WrongPassword,
        Some("too-many-requests") => IdentityError::TooManyRequests,
        _ => {
            let detail = message
                .map(str::to_string)
                .or_else(|| code.map(str::to_string))
                .unwrap_or_else(|| format!("identity provider returned status {status}"));
            IdentityError::Provider(detail)
        }
    }
}
