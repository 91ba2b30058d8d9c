//! Connection log writes to the remote document store.
//!
//! One document per successful login, keyed `{uid}-{epoch millis}` in the
//! `wifi_logs` collection.

use anyhow::{bail, Context, Result};
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, instrument};
use url::Url;

const WRITE_TIMEOUT: Duration = Duration::from_secs(10);
const COLLECTION: &str = "wifi_logs";

/// Fields stored for one authorized connection.
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct ConnectionRecord {
    pub uid: String,
    pub email: String,
    pub mac: Option<String>,
    pub ip: Option<String>,
    #[serde(rename = "loginTime")]
    pub login_time: String,
}

#[derive(Clone, Debug)]
pub struct Logbook {
    client: reqwest::Client,
    base_url: Url,
}

impl Logbook {
    /// # Errors
    /// Returns an error when the HTTP client cannot be built or the base
    /// URL cannot be used as a document root.
    pub fn new(mut base_url: Url) -> Result<Self> {
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }

        let client = reqwest::Client::builder()
            .user_agent(crate::APP_USER_AGENT)
            .timeout(WRITE_TIMEOUT)
            .build()
            .context("Failed to build logbook HTTP client")?;

        Ok(Self { client, base_url })
    }

    /// Document id for a record written at `now_ms`.
    #[must_use]
    pub fn document_id(uid: &str, now_ms: i64) -> String {
        format!("{uid}-{now_ms}")
    }

    /// Write one record. The attempt fails when the store rejects it; the
    /// caller decides what that means for the login.
    ///
    /// # Errors
    /// Returns an error on transport failure or a non-success status.
    #[instrument(skip_all, fields(uid = %record.uid))]
    pub async fn record(&self, record: &ConnectionRecord, now_ms: i64) -> Result<()> {
        let doc_id = Self::document_id(&record.uid, now_ms);
        let url = self
            .base_url
            .join(&format!("{COLLECTION}/{doc_id}"))
            .context("Failed to build document URL")?;

        let response = self
            .client
            .put(url)
            .json(record)
            .send()
            .await
            .context("Connection log write failed")?;

        let status = response.status();
        if !status.is_success() {
            bail!("Document store rejected {doc_id}: {status}");
        }

        debug!("Logged connection as {COLLECTION}/{doc_id}");
        Ok(())
    }
}
