//! Shared application state and auth configuration.

use super::layout::LayoutCache;
use crate::provider::IdentityProvider;
use crate::toast::PageSessions;
use std::sync::Arc;

pub const DEFAULT_SITE_URL: &str = "http://localhost:3000";
const DEFAULT_SESSION_TTL_SECONDS: i64 = 400 * 24 * 60 * 60;
const DEFAULT_COOKIE_PREFIX: &str = "authgate";
const EMAIL_CONFIRM_PATH: &str = "/auth/confirm";

#[derive(Clone, Debug)]
pub struct AuthConfig {
    site_url: String,
    session_ttl_seconds: i64,
    cookie_prefix: String,
}

impl AuthConfig {
    #[must_use]
    pub fn new(site_url: String) -> Self {
        Self {
            site_url,
            session_ttl_seconds: DEFAULT_SESSION_TTL_SECONDS,
            cookie_prefix: DEFAULT_COOKIE_PREFIX.to_string(),
        }
    }

    #[must_use]
    pub fn with_session_ttl_seconds(mut self, seconds: i64) -> Self {
        self.session_ttl_seconds = seconds;
        self
    }

    #[must_use]
    pub fn with_cookie_prefix(mut self, prefix: String) -> Self {
        self.cookie_prefix = prefix;
        self
    }

    #[must_use]
    pub fn site_url(&self) -> &str {
        &self.site_url
    }

    #[must_use]
    pub fn session_ttl_seconds(&self) -> i64 {
        self.session_ttl_seconds
    }

    /// Callback the provider links to from confirmation emails.
    #[must_use]
    pub fn email_redirect_url(&self) -> String {
        format!(
            "{}{EMAIL_CONFIRM_PATH}",
            self.site_url.trim_end_matches('/')
        )
    }

    #[must_use]
    pub fn access_cookie_name(&self) -> String {
        format!("{}-access-token", self.cookie_prefix)
    }

    #[must_use]
    pub fn refresh_cookie_name(&self) -> String {
        format!("{}-refresh-token", self.cookie_prefix)
    }

    /// Only mark cookies secure when the site is served over HTTPS.
    #[must_use]
    pub fn session_cookie_secure(&self) -> bool {
        self.site_url.starts_with("https://")
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_URL.to_string())
    }
}

pub struct AppState {
    config: AuthConfig,
    provider: Arc<dyn IdentityProvider>,
    layout: LayoutCache,
    pages: PageSessions,
}

impl AppState {
    pub fn new(config: AuthConfig, provider: Arc<dyn IdentityProvider>) -> Self {
        Self {
            config,
            provider,
            layout: LayoutCache::default(),
            pages: PageSessions::default(),
        }
    }

    #[must_use]
    pub fn with_pages(mut self, pages: PageSessions) -> Self {
        self.pages = pages;
        self
    }

    #[must_use]
    pub fn config(&self) -> &AuthConfig {
        &self.config
    }

    #[must_use]
    pub fn provider(&self) -> &dyn IdentityProvider {
        self.provider.as_ref()
    }

    #[must_use]
    pub fn layout(&self) -> &LayoutCache {
        &self.layout
    }

    #[must_use]
    pub fn pages(&self) -> &PageSessions {
        &self.pages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryProvider;

    #[test]
    fn auth_config_defaults_and_overrides() {
        let config = AuthConfig::default();
        assert_eq!(config.site_url(), DEFAULT_SITE_URL);
        assert_eq!(
            config.email_redirect_url(),
            "http://localhost:3000/auth/confirm"
        );
        assert_eq!(config.access_cookie_name(), "authgate-access-token");
        assert_eq!(config.refresh_cookie_name(), "authgate-refresh-token");
        assert_eq!(config.session_ttl_seconds(), DEFAULT_SESSION_TTL_SECONDS);
        assert!(!config.session_cookie_secure());

        let config = AuthConfig::new("https://app.example.com/".to_string())
            .with_session_ttl_seconds(60)
            .with_cookie_prefix("sb".to_string());
        assert_eq!(
            config.email_redirect_url(),
            "https://app.example.com/auth/confirm"
        );
        assert_eq!(config.access_cookie_name(), "sb-access-token");
        assert_eq!(config.session_ttl_seconds(), 60);
        assert!(config.session_cookie_secure());
    }

    #[tokio::test]
    async fn app_state_starts_with_empty_pages_and_zero_revision() {
        let state = AppState::new(AuthConfig::default(), Arc::new(MemoryProvider::new()));
        assert!(state.pages().is_empty().await);
        assert_eq!(state.layout().revision(), 0);
    }
}
