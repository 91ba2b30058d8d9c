use crate::cli::actions::{server, Action};
use anyhow::{Context, Result};
use secrecy::SecretString;
use std::path::PathBuf;

pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let required = |name: &str| -> Result<String> {
        matches
            .get_one::<String>(name)
            .cloned()
            .with_context(|| format!("missing required argument: --{name}"))
    };

    Ok(Action::Server(server::Args {
        port: matches.get_one::<u16>("port").copied().unwrap_or(8080),
        identity_url: required("identity-url")?,
        identity_api_key: SecretString::from(required("identity-api-key")?),
        email_domain: required("email-domain")?,
        logbook_url: required("logbook-url")?,
        state_dir: PathBuf::from(required("state-dir")?),
        hours_start: matches.get_one::<u8>("hours-start").copied().unwrap_or(7),
        hours_end: matches.get_one::<u8>("hours-end").copied().unwrap_or(18),
        sweep_interval_seconds: matches
            .get_one::<u64>("sweep-interval")
            .copied()
            .unwrap_or(60),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::commands;

    #[test]
    fn handler_builds_the_server_action() -> Result<()> {
        let matches = commands::new().get_matches_from(vec![
            "pordego",
            "--identity-url",
            "https://identity.tld",
            "--identity-api-key",
            "api-key",
            "--email-domain",
            "tivanbm.com",
            "--logbook-url",
            "https://store.tld/v1",
            "--port",
            "8443",
        ]);

        let Action::Server(args) = handler(&matches)?;
        assert_eq!(args.port, 8443);
        assert_eq!(args.identity_url, "https://identity.tld");
        assert_eq!(args.email_domain, "tivanbm.com");
        assert_eq!(args.state_dir, PathBuf::from("/var/lib/pordego"));
        assert_eq!(args.hours_start, 7);
        assert_eq!(args.hours_end, 18);
        assert_eq!(args.sweep_interval_seconds, 60);
        Ok(())
    }
}
