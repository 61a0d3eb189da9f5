mod logging;
mod provider;
mod site;

pub use self::logging::validator_log_level;
pub use self::site::validator_cookie_prefix;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ColorChoice, Command,
};

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

    let command = Command::new("authgate")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .long_version(long_version)
        .color(ColorChoice::Auto)
        .styles(styles)
        .arg(
            Arg::new("port")
                .short('p')
                .long("port")
                .help("Port to listen on")
                .default_value("8080")
                .env("AUTHGATE_PORT")
                .value_parser(clap::value_parser!(u16)),
        );

    let command = provider::with_args(command);
    let command = site::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const ENV_VARS: [&str; 7] = [
        "AUTHGATE_PORT",
        "AUTHGATE_PROVIDER_URL",
        "AUTHGATE_PROVIDER_KEY",
        "AUTHGATE_SITE_URL",
        "AUTHGATE_SESSION_TTL_SECONDS",
        "AUTHGATE_COOKIE_PREFIX",
        "AUTHGATE_LOG_LEVEL",
    ];

    fn clean_env<F: FnOnce()>(f: F) {
        temp_env::with_vars(ENV_VARS.map(|name| (name, None::<String>)), f);
    }

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "authgate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_defaults() {
        clean_env(|| {
            let matches =
                new().get_matches_from(vec!["authgate", "--provider-url", "memory://"]);

            assert_eq!(matches.get_one::<u16>("port").copied(), Some(8080));
            assert_eq!(
                matches.get_one::<String>("site-url").cloned(),
                Some("http://localhost:3000".to_string())
            );
            assert_eq!(
                matches.get_one::<i64>("session-ttl-seconds").copied(),
                Some(34_560_000)
            );
            assert_eq!(
                matches.get_one::<String>("cookie-prefix").cloned(),
                Some("authgate".to_string())
            );
            assert_eq!(matches.get_one::<String>("provider-key"), None);
            assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(0));
        });
    }

    #[test]
    fn test_check_args() {
        clean_env(|| {
            let matches = new().get_matches_from(vec![
                "authgate",
                "--port",
                "9090",
                "--provider-url",
                "https://project.example.co",
                "--provider-key",
                "anon-key",
                "--site-url",
                "https://app.example.com",
                "--session-ttl-seconds",
                "3600",
                "--cookie-prefix",
                "sb-project",
            ]);

            assert_eq!(matches.get_one::<u16>("port").copied(), Some(9090));
            assert_eq!(
                matches.get_one::<String>("provider-url").cloned(),
                Some("https://project.example.co".to_string())
            );
            assert_eq!(
                matches.get_one::<String>("provider-key").cloned(),
                Some("anon-key".to_string())
            );
            assert_eq!(
                matches.get_one::<String>("site-url").cloned(),
                Some("https://app.example.com".to_string())
            );
            assert_eq!(
                matches.get_one::<i64>("session-ttl-seconds").copied(),
                Some(3600)
            );
            assert_eq!(
                matches.get_one::<String>("cookie-prefix").cloned(),
                Some("sb-project".to_string())
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("AUTHGATE_PORT", Some("443")),
                ("AUTHGATE_PROVIDER_URL", Some("https://project.example.co")),
                ("AUTHGATE_PROVIDER_KEY", Some("anon-key")),
                ("AUTHGATE_SITE_URL", Some("https://app.example.com")),
                ("AUTHGATE_SESSION_TTL_SECONDS", Some("60")),
                ("AUTHGATE_COOKIE_PREFIX", Some("app")),
                ("AUTHGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["authgate"]);
                assert_eq!(matches.get_one::<u16>("port").copied(), Some(443));
                assert_eq!(
                    matches.get_one::<String>("provider-url").cloned(),
                    Some("https://project.example.co".to_string())
                );
                assert_eq!(
                    matches.get_one::<String>("provider-key").cloned(),
                    Some("anon-key".to_string())
                );
                assert_eq!(
                    matches.get_one::<i64>("session-ttl-seconds").copied(),
                    Some(60)
                );
                assert_eq!(
                    matches.get_one::<String>("cookie-prefix").cloned(),
                    Some("app".to_string())
                );
                assert_eq!(matches.get_one::<u8>("verbosity").copied(), Some(2));
            },
        );
    }

    #[test]
    fn test_check_log_level_env() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars(
                [
                    ("AUTHGATE_LOG_LEVEL", Some(level)),
                    ("AUTHGATE_PROVIDER_URL", Some("memory://")),
                ],
                || {
                    let matches = new().get_matches_from(vec!["authgate"]);
                    assert_eq!(
                        matches.get_one::<u8>("verbosity").copied(),
                        Some(u8::try_from(index).unwrap())
                    );
                },
            );
        }
    }

    #[test]
    fn test_rejects_bad_values() {
        clean_env(|| {
            assert!(new().try_get_matches_from(vec!["authgate"]).is_err());
            assert!(new()
                .try_get_matches_from(vec![
                    "authgate",
                    "--provider-url",
                    "memory://",
                    "--cookie-prefix",
                    "bad prefix;"
                ])
                .is_err());
            assert!(new()
                .try_get_matches_from(vec![
                    "authgate",
                    "--provider-url",
                    "memory://",
                    "--session-ttl-seconds",
                    "0"
                ])
                .is_err());
            assert!(new()
                .try_get_matches_from(vec![
                    "authgate",
                    "--provider-url",
                    "memory://",
                    "--verbose",
                    "loud"
                ])
                .is_err());
        });
    }
}
