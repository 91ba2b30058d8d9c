use crate::{
    gateway::GatewayNotifier,
    hours::OperationalHours,
    identity::IdentityClient,
    logbook::Logbook,
    portal::{self, state::PortalState},
    throttle::{FileStore, Throttle},
};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::{path::PathBuf, sync::Arc, time::Duration};
use tracing::debug;
use url::Url;

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub identity_url: String,
    pub identity_api_key: SecretString,
    pub email_domain: String,
    pub logbook_url: String,
    pub state_dir: PathBuf,
    pub hours_start: u8,
    pub hours_end: u8,
    pub sweep_interval_seconds: u64,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the configuration is invalid, the state directory
/// cannot be created, or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    let identity_url = Url::parse(&args.identity_url)
        .with_context(|| format!("Invalid identity provider URL: {}", args.identity_url))?;
    let logbook_url = Url::parse(&args.logbook_url)
        .with_context(|| format!("Invalid document store URL: {}", args.logbook_url))?;

    let hours = OperationalHours::new(args.hours_start, args.hours_end)?;

    let store = FileStore::new(&args.state_dir)?;
    let throttle = Throttle::new(Arc::new(store));
    debug!("Throttle state under {}", args.state_dir.display());

    let state = Arc::new(PortalState {
        hours,
        throttle,
        identity: IdentityClient::new(identity_url, args.identity_api_key, args.email_domain)?,
        logbook: Logbook::new(logbook_url)?,
        gateway: GatewayNotifier::new()?,
    });

    portal::new(
        args.port,
        state,
        Duration::from_secs(args.sweep_interval_seconds),
    )
    .await
}
