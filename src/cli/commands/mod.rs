use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};

pub fn validator_log_level() -> ValueParser {
    ValueParser::from(move |level: &str| -> std::result::Result<u8, String> {
        if let Ok(parsed) = level.parse::<u8>() {
            // Successfully parsed as a number
            if parsed <= 5 {
                return Ok(parsed);
            }
        }

        match level.to_lowercase().as_str() {
            "error" => Ok(0),
            "warn" => Ok(1),
            "info" => Ok(2),
            "debug" => Ok(3),
            "trace" => Ok(4),
            _ => Err("invalid log level".to_string()),
        }
    })
}

pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    Command::new("pordego")
        .about("Captive portal authentication for Wi-Fi access points")
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("PORDEGO_PORT")
                .value_parser(clap::value_parser!(u16)),
        )
        .arg(
            Arg::new("identity-url")
                .long("identity-url")
                .help("Identity provider base URL, example: https://identity.tld")
                .env("PORDEGO_IDENTITY_URL")
                .required(true),
        )
        .arg(
            Arg::new("identity-api-key")
                .long("identity-api-key")
                .help("Identity provider API key")
                .env("PORDEGO_IDENTITY_API_KEY")
                .required(true),
        )
        .arg(
            Arg::new("email-domain")
                .long("email-domain")
                .help("Domain appended to bare usernames, example: tivanbm.com")
                .env("PORDEGO_EMAIL_DOMAIN")
                .required(true),
        )
        .arg(
            Arg::new("logbook-url")
                .long("logbook-url")
                .help("Document store base URL for connection logs")
                .env("PORDEGO_LOGBOOK_URL")
                .required(true),
        )
        .arg(
            Arg::new("state-dir")
                .long("state-dir")
                .help("Directory holding per-client throttle state")
                .default_value("/var/lib/pordego")
                .env("PORDEGO_STATE_DIR"),
        )
        .arg(
            Arg::new("hours-start")
                .long("hours-start")
                .help("First hour of day (local) when logins are accepted")
                .default_value("7")
                .env("PORDEGO_HOURS_START")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("hours-end")
                .long("hours-end")
                .help("Hour of day (local) when logins stop being accepted")
                .default_value("18")
                .env("PORDEGO_HOURS_END")
                .value_parser(clap::value_parser!(u8)),
        )
        .arg(
            Arg::new("sweep-interval")
                .long("sweep-interval")
                .help("Seconds between expired-lockout sweeps")
                .default_value("60")
                .env("PORDEGO_SWEEP_INTERVAL")
                .value_parser(clap::value_parser!(u64)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("PORDEGO_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
