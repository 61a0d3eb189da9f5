use crate::api::state::DEFAULT_SITE_URL;
use clap::{builder::ValueParser, Arg, Command};

#[must_use]
pub fn validator_cookie_prefix() -> ValueParser {
    ValueParser::from(move |prefix: &str| -> std::result::Result<String, String> {
        if !prefix.is_empty()
            && prefix
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            Ok(prefix.to_string())
        } else {
            Err("cookie prefix may only contain ASCII letters, digits, '-' and '_'".to_string())
        }
    })
}

pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("site-url")
                .long("site-url")
                .help("Public site URL, used for the email confirmation link")
                .default_value(DEFAULT_SITE_URL)
                .env("AUTHGATE_SITE_URL"),
        )
        .arg(
            Arg::new("session-ttl-seconds")
                .long("session-ttl-seconds")
                .help("Max-Age of the session cookies, in seconds")
                .default_value("34560000")
                .env("AUTHGATE_SESSION_TTL_SECONDS")
                .value_parser(clap::value_parser!(i64).range(1..)),
        )
        .arg(
            Arg::new("cookie-prefix")
                .long("cookie-prefix")
                .help("Prefix of the session cookie names")
                .default_value("authgate")
                .env("AUTHGATE_COOKIE_PREFIX")
                .value_parser(validator_cookie_prefix()),
        )
}
