use crate::{
    api::{
        self,
        state::{AppState, AuthConfig},
    },
    provider::{GoTrueProvider, IdentityProvider, MemoryProvider},
};
use anyhow::{anyhow, Context, Result};
use secrecy::SecretString;
use std::sync::Arc;
use tracing::{info, warn};
use url::Url;

pub const MEMORY_SCHEME: &str = "memory";

/// Which identity provider the server talks to.
#[derive(Debug)]
pub enum ProviderTarget {
    Hosted { url: String, key: SecretString },
    /// In-process accounts, lost on restart.
    Memory,
}

impl ProviderTarget {
    /// # Errors
    /// Returns an error for unsupported schemes or a hosted URL without a key.
    pub fn parse(url: &str, key: Option<String>) -> Result<Self> {
        let parsed = Url::parse(url).with_context(|| format!("invalid provider URL: {url}"))?;
        match parsed.scheme() {
            MEMORY_SCHEME => Ok(Self::Memory),
            "http" | "https" => {
                let key = key
                    .filter(|key| !key.is_empty())
                    .ok_or_else(|| anyhow!("missing required argument: --provider-key"))?;
                Ok(Self::Hosted {
                    url: url.to_string(),
                    key: SecretString::from(key),
                })
            }
            scheme => Err(anyhow!("unsupported provider URL scheme: {scheme}")),
        }
    }

    fn build(self) -> Result<Arc<dyn IdentityProvider>> {
        match self {
            Self::Hosted { url, key } => {
                let provider = GoTrueProvider::new(&url, key)
                    .context("Failed to build identity provider client")?;
                Ok(Arc::new(provider))
            }
            Self::Memory => {
                warn!("Using the in-memory identity provider, accounts are not persisted");
                Ok(Arc::new(MemoryProvider::new().with_autoconfirm(true)))
            }
        }
    }
}

#[derive(Debug)]
pub struct Args {
    pub port: u16,
    pub provider: ProviderTarget,
    pub site_url: String,
    pub session_ttl_seconds: i64,
    pub cookie_prefix: String,
}

/// Execute the server action.
/// # Errors
/// Returns an error if the provider client cannot be built or the server fails to start.
pub async fn execute(args: Args) -> Result<()> {
    log_startup_args(&args);

    let provider = args.provider.build()?;
    let config = AuthConfig::new(args.site_url)
        .with_session_ttl_seconds(args.session_ttl_seconds)
        .with_cookie_prefix(args.cookie_prefix);

    api::new(args.port, Arc::new(AppState::new(config, provider))).await
}

fn log_startup_args(args: &Args) {
    let provider = match &args.provider {
        ProviderTarget::Hosted { url, .. } => url.clone(),
        ProviderTarget::Memory => format!("{MEMORY_SCHEME}://"),
    };
    let entries = [
        ("listen", format!("tcp:{}", args.port)),
        ("provider", provider),
        ("site_url", args.site_url.clone()),
        ("session_ttl_seconds", args.session_ttl_seconds.to_string()),
        ("cookie_prefix", args.cookie_prefix.clone()),
    ];

    let max_key_len = entries.iter().map(|(key, _)| key.len()).max().unwrap_or(0);
    let mut message = format!(
        "{} {} - {}\n\nStartup configuration:",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION"),
        short_commit(crate::GIT_COMMIT_HASH)
    );
    for (key, value) in entries {
        let padding = " ".repeat(max_key_len.saturating_sub(key.len()));
        let _ =
            std::fmt::Write::write_fmt(&mut message, format_args!("\n  {key}:{padding} {value}"));
    }
    info!("{message}");
}

fn short_commit(hash: &str) -> String {
    let trimmed = hash.trim();
    if trimmed.len() > 7 {
        trimmed[..7].to_string()
    } else {
        trimmed.to_string()
    }
}
