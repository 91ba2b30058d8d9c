//! Request/response types for the portal endpoints.

use serde::{Deserialize, Serialize};

/// The URL-encoded login form, including the captive-portal client
/// parameters the access point appended to the page URL.
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
    #[serde(default)]
    pub csrf_token: String,
    #[serde(default)]
    pub gw_address: Option<String>,
    #[serde(default)]
    pub gw_port: Option<u16>,
    #[serde(default)]
    pub clientmac: Option<String>,
    #[serde(default)]
    pub clientip: Option<String>,
}

/// The single status line the page renders.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    pub success: bool,
    pub message: String,
}

impl LoginResponse {
    #[must_use]
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            success: true,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            message: message.into(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Token {
    pub token: String,
}
