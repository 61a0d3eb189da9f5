//! # Authgate (session gate for a hosted identity provider)
//!
//! `authgate` is the authentication surface of a web application. Credential
//! verification, session minting and email-confirmation dispatch all belong to
//! an external identity provider; this crate owns the glue around it.
//!
//! ## Session Gate
//!
//! Every request passes through the gate. It refreshes the session with the
//! provider, propagates any rewritten session cookies, and decides between
//! continuing, redirecting to `/login` (with `next` preserving the original
//! path), or redirecting a signed-in user away from `/login`.
//!
//! - **Public paths:** anything under `/login`, `/auth` or `/error`.
//! - **Fail closed:** a provider outage is treated exactly like "not signed in".
//!
//! ## Auth Actions
//!
//! `login` and `signup` validate raw form input, call the provider, and map its
//! errors into a small stable set of user-facing categories. They never fail:
//! every outcome is an [`api::auth::ActionResult`].
//!
//! ## Toasts
//!
//! The login page keeps a per-page-session list of transient messages that
//! expire after five seconds. See [`toast`].

pub mod api;
pub mod cli;
pub mod provider;
pub mod toast;

#[allow(clippy::doc_markdown, clippy::needless_raw_string_hashes)]
pub mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

pub const GIT_COMMIT_HASH: &str = match built_info::GIT_COMMIT_HASH {
    Some(hash) => hash,
    None => "unknown",
};

pub const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
