//! Fire-and-forget authorization callback to the access point gateway.
//!
//! Once a client authenticates, the AP is told to open its MAC. The
//! gateway's answer carries no information the portal can act on, so the
//! status and body are ignored and failures only warn.

use anyhow::{Context, Result};
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

const CALLBACK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Clone, Debug)]
pub struct GatewayNotifier {
    client: reqwest::Client,
}

impl GatewayNotifier {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built.
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(CALLBACK_TIMEOUT)
            .build()
            .context("Failed to build gateway HTTP client")?;

        Ok(Self { client })
    }

    /// Build the AP's authorization URL.
    ///
    /// # Errors
    /// Returns an error for gateway addresses that do not form a valid URL.
    pub fn auth_url(gw_address: &str, gw_port: u16, client_mac: &str) -> Result<Url> {
        let mut url = Url::parse(&format!("http://{gw_address}:{gw_port}/portal/auth"))
            .with_context(|| format!("Invalid gateway address: {gw_address}:{gw_port}"))?;
        url.query_pairs_mut().append_pair("clientMac", client_mac);
        Ok(url)
    }

    /// Tell the gateway to authorize `client_mac`. Never fails the login.
    pub async fn authorize(&self, gw_address: &str, gw_port: u16, client_mac: &str) {
        let url = match Self::auth_url(gw_address, gw_port, client_mac) {
            Ok(url) => url,
            Err(err) => {
                warn!("Skipping gateway callback: {err:?}");
                return;
            }
        };

        match self.client.get(url.clone()).send().await {
            Ok(response) => debug!("Gateway answered {} for {url}", response.status()),
            Err(err) => warn!("Gateway callback failed for {url}: {err}"),
        }
    }
}
