//! Weak per-client identifier for namespacing throttle state.

use sha2::{Digest, Sha256};

/// Derive a stable hex fingerprint from the client's `User-Agent` string.
///
/// Namespacing only, never a security identifier: clients sharing a
/// User-Agent share a bucket, and a client that changes its User-Agent
/// starts fresh.
#[must_use]
pub fn fingerprint(user_agent: &str) -> String {
    let trimmed = user_agent.trim();
    let input = if trimmed.is_empty() { "unknown" } else { trimmed };

    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hasher.finalize();

    hex::encode(&digest[..16])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable() {
        let ua = "Mozilla/5.0 (X11; Linux x86_64) Gecko/20100101 Firefox/126.0";
        assert_eq!(fingerprint(ua), fingerprint(ua));
        assert_eq!(fingerprint(ua), fingerprint(&format!("  {ua}  ")));
    }

    #[test]
    fn fingerprint_is_hex_of_fixed_width() {
        let value = fingerprint("curl/8.5.0");
        assert_eq!(value.len(), 32);
        assert!(value.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn distinct_agents_get_distinct_buckets() {
        assert_ne!(fingerprint("curl/8.5.0"), fingerprint("curl/8.6.0"));
    }

    #[test]
    fn missing_agent_falls_back_to_a_shared_bucket() {
        assert_eq!(fingerprint(""), fingerprint("   "));
        assert_eq!(fingerprint(""), fingerprint("unknown"));
    }
}
