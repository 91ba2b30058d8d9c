//! # Pordego (Captive Portal Authentication)
//!
//! `pordego` is the login service a Wi-Fi access point redirects
//! unauthenticated clients to. It authenticates captive clients against a
//! hosted identity provider, records each connection (identity, MAC, IP)
//! to a remote document store, and calls back into the AP's gateway to
//! open the client's network access.
//!
//! ## Attempt throttling
//!
//! Failed logins are tracked per client fingerprint (a weak digest of the
//! User-Agent, used only to namespace state). Five consecutive failures
//! trigger a lockout, escalating through 5 minutes, 10 minutes, and
//! finally 24 hours; repeated cycles stay pinned to the last stage. A
//! fixed 2-second rate limit spaces attempts independently of lockouts.
//! This is abuse damping for a login form, not a security boundary: state
//! lives in per-fingerprint files and a client can shed its history by
//! changing its fingerprint.
//!
//! ## Flow
//!
//! `POST /portal/login` → throttle gate → operational-hours gate → form
//! token shape check → identity sign-in → `wifi_logs` document write →
//! gateway authorization callback. Every error is terminal for that
//! attempt and surfaces as one `{success, message}` status line.

pub mod cli;
pub mod gateway;
pub mod hours;
pub mod identity;
pub mod logbook;
pub mod portal;
pub mod throttle;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_git_commit_hash_format() {
        if GIT_COMMIT_HASH == "unknown" {
            // Acceptable in non-git build environments
            return;
        }
        assert!(
            GIT_COMMIT_HASH.chars().all(|c| c.is_ascii_hexdigit()),
            "GIT_COMMIT_HASH should be a hex string, got: {GIT_COMMIT_HASH}"
        );
        assert!(
            GIT_COMMIT_HASH.len() >= 7,
            "GIT_COMMIT_HASH should be at least 7 characters long, got: {GIT_COMMIT_HASH}"
        );
    }

    #[test]
    fn test_app_user_agent_format() {
        assert!(APP_USER_AGENT.starts_with(env!("CARGO_PKG_NAME")));
        assert!(APP_USER_AGENT.contains(env!("CARGO_PKG_VERSION")));
    }
}
