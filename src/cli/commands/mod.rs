use crate::guards::TriState;
use clap::{
    builder::{
        styling::{AnsiColor, Effects, Styles},
        ValueParser,
    },
    Arg, ColorChoice, Command,
};
use std::path::PathBuf;

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

pub fn validator_tri_state() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<TriState, String> {
        value.parse::<TriState>().map_err(|e| e.to_string())
    })
}

pub fn validator_verify_url() -> ValueParser {
    ValueParser::from(move |value: &str| -> std::result::Result<url::Url, String> {
        let url = url::Url::parse(value).map_err(|e| e.to_string())?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            scheme => Err(format!("unsupported scheme {scheme}")),
        }
    })
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let long_version: &'static str = Box::leak(
        format!("{} - {}", env!("CARGO_PKG_VERSION"), crate::GIT_COMMIT_HASH).into_boxed_str(),
    );

    Command::new("navguard")
        .about("Evaluate navigation guards against a route table")
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("routes")
                .short('r')
                .long("routes")
                .help("Route table (JSON)")
                .env("NAVGUARD_ROUTES")
                .required(true)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("to")
                .short('t')
                .long("to")
                .help("Name of the route being entered")
                .env("NAVGUARD_TO")
                .required(true),
        )
        .arg(
            Arg::new("from")
                .short('f')
                .long("from")
                .help("Name of the route being left")
                .env("NAVGUARD_FROM"),
        )
        .arg(
            Arg::new("guard")
                .short('g')
                .long("guard")
                .help("Guards to run")
                .env("NAVGUARD_GUARD")
                .default_value("all")
                .value_parser(["auth", "rights", "all"]),
        )
        .arg(
            Arg::new("session")
                .long("session")
                .help("Whether a session cookie is present: true, false or unknown")
                .env("NAVGUARD_SESSION")
                .default_value("unknown")
                .value_parser(validator_tri_state()),
        )
        .arg(
            Arg::new("authorized")
                .long("authorized")
                .help("Whether the session was already verified: true, false or unknown")
                .env("NAVGUARD_AUTHORIZED")
                .default_value("unknown")
                .value_parser(validator_tri_state()),
        )
        .arg(
            Arg::new("rights")
                .long("rights")
                .help("Rights table (JSON): component -> module -> action -> bool")
                .env("NAVGUARD_RIGHTS")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("redirect")
                .long("redirect")
                .help("Navigation target used when a guard denies")
                .env("NAVGUARD_REDIRECT")
                .default_value("login"),
        )
        .arg(
            Arg::new("verify-url")
                .long("verify-url")
                .help("Endpoint returning the current user, example: https://api.tld/v1/me")
                .env("NAVGUARD_VERIFY_URL")
                .value_parser(validator_verify_url()),
        )
        .arg(
            Arg::new("session-cookie")
                .long("session-cookie")
                .help("Cookie header sent to the verify endpoint")
                .env("NAVGUARD_SESSION_COOKIE")
                .hide_env_values(true)
                .requires("verify-url"),
        )
        .arg(
            Arg::new("timeout")
                .long("timeout")
                .help("Verify request timeout in seconds")
                .env("NAVGUARD_TIMEOUT")
                .default_value("10")
                .value_parser(clap::value_parser!(u64).range(1..=300)),
        )
        .arg(
            Arg::new("verbosity")
                .short('v')
                .long("verbose")
                .help("Verbosity level: ERROR, WARN, INFO, DEBUG, TRACE (default: ERROR)")
                .env("NAVGUARD_LOG_LEVEL")
                .global(true)
                .action(clap::ArgAction::Count)
                .value_parser(validator_log_level()),
        )
}
