use crate::cli::{actions::Action, commands, dispatch::handler, telemetry};
use anyhow::Result;
use tracing::Level;

/// Map the `verbosity` count (or level name) to a tracing level.
#[must_use]
pub fn get_verbosity_level(matches: &clap::ArgMatches) -> Level {
    match matches.get_one::<u8>("verbosity").map_or(0, |&v| v) {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

/// Start the CLI
/// # Errors
/// Returns an error if telemetry cannot be initialized or the arguments are invalid
pub fn start() -> Result<Action> {
    let matches = commands::new().get_matches();

    telemetry::init(Some(get_verbosity_level(&matches)))?;

    let action = handler(&matches)?;

    Ok(action)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verbosity_levels() {
        let levels = [
            Level::ERROR,
            Level::WARN,
            Level::INFO,
            Level::DEBUG,
            Level::TRACE,
        ];
        for (count, level) in levels.iter().enumerate() {
            temp_env::with_vars([("AUTHGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec![
                    "authgate".to_string(),
                    "--provider-url".to_string(),
                    "memory://".to_string(),
                ];
                if count > 0 {
                    args.push(format!("-{}", "v".repeat(count)));
                }
                let matches = commands::new().get_matches_from(args);
                assert_eq!(get_verbosity_level(&matches), *level);
            });
        }
    }
}
