use crate::cli::actions::{
    server::{Args, ProviderTarget},
    Action,
};
use anyhow::{anyhow, Context, Result};
use url::Url;

/// # Errors
/// Returns an error if required arguments are missing or inconsistent.
pub fn handler(matches: &clap::ArgMatches) -> Result<Action> {
    let port = matches.get_one::<u16>("port").copied().unwrap_or(8080);

    let provider_url = matches
        .get_one::<String>("provider-url")
        .cloned()
        .context("missing required argument: --provider-url")?;
    let provider = ProviderTarget::parse(
        &provider_url,
        matches.get_one::<String>("provider-key").cloned(),
    )
    .context("invalid AUTHGATE_PROVIDER_URL")?;

    let site_url = matches
        .get_one::<String>("site-url")
        .cloned()
        .context("missing required argument: --site-url")?;
    let parsed = Url::parse(&site_url).context("invalid AUTHGATE_SITE_URL")?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(anyhow!("AUTHGATE_SITE_URL must be an http(s) URL"));
    }

    let session_ttl_seconds = matches
        .get_one::<i64>("session-ttl-seconds")
        .copied()
        .context("missing required argument: --session-ttl-seconds")?;
    let cookie_prefix = matches
        .get_one::<String>("cookie-prefix")
        .cloned()
        .context("missing required argument: --cookie-prefix")?;

    Ok(Action::Server(Args {
        port,
        provider,
        site_url,
        session_ttl_seconds,
        cookie_prefix,
    }))
}
