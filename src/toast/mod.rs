//! Transient notifications for a single page session.
//!
//! A [`Toaster`] owns an ordered list of toasts (append order is display
//! order). Every mutation is published on a `watch` channel so renderers can
//! subscribe instead of polling. Each toast removes itself after
//! [`TOAST_TTL`]; the timer only holds a weak reference, so dropping the last
//! handle to a toaster abandons its pending timers.

mod registry;

pub use registry::{PageSessions, PAGE_SESSION_COOKIE};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::watch;
use tracing::{debug, warn};
use utoipa::ToSchema;

pub const TOAST_TTL: Duration = Duration::from_millis(5000);

const ID_LENGTH: usize = 8;
const ID_ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ToastKind {
    Success,
    Error,
    #[default]
    Info,
}

impl ToastKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Error => "error",
            Self::Info => "info",
        }
    }
}

#[derive(ToSchema, Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: ToastKind,
}

#[derive(Debug)]
struct Inner {
    list: watch::Sender<Vec<Toast>>,
    ttl: Duration,
}

#[derive(Debug, Clone)]
pub struct Toaster {
    inner: Arc<Inner>,
}

impl Default for Toaster {
    fn default() -> Self {
        Self::new()
    }
}

impl Toaster {
    #[must_use]
    pub fn new() -> Self {
        Self::with_ttl(TOAST_TTL)
    }

    #[must_use]
    pub fn with_ttl(ttl: Duration) -> Self {
        let (list, _) = watch::channel(Vec::new());
        Self {
            inner: Arc::new(Inner { list, ttl }),
        }
    }

    /// Append a toast and schedule its removal. Returns the new toast's id.
    pub fn show_toast(&self, message: impl Into<String>, kind: ToastKind) -> String {
        let message = message.into();
        let mut id = String::new();
        self.inner.list.send_modify(|toasts| {
            id = unique_id(toasts);
            toasts.push(Toast {
                id: id.clone(),
                message,
                kind,
            });
        });
        debug!(toast_id = %id, kind = kind.as_str(), "toast shown");

        self.schedule_removal(&id);
        id
    }

    /// Shorthand for an informational toast.
    pub fn info(&self, message: impl Into<String>) -> String {
        self.show_toast(message, ToastKind::default())
    }

    /// Remove the toast with `id`. Unknown ids are ignored and subscribers
    /// are not woken. Returns whether a toast was removed.
    pub fn remove_toast(&self, id: &str) -> bool {
        remove_from(&self.inner, id)
    }

    /// Snapshot of the visible toasts in display order.
    #[must_use]
    pub fn toasts(&self) -> Vec<Toast> {
        self.inner.list.borrow().clone()
    }

    /// Receiver that observes every change to the list.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Vec<Toast>> {
        self.inner.list.subscribe()
    }

    fn schedule_removal(&self, id: &str) {
        let Ok(handle) = tokio::runtime::Handle::try_current() else {
            warn!(toast_id = %id, "no runtime available, toast will not expire on its own");
            return;
        };

        let inner: Weak<Inner> = Arc::downgrade(&self.inner);
        let ttl = self.inner.ttl;
        let id = id.to_string();
        handle.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = inner.upgrade() {
                remove_from(&inner, &id);
            }
        });
    }
}

fn remove_from(inner: &Inner, id: &str) -> bool {
    inner.list.send_if_modified(|toasts| {
        let before = toasts.len();
        toasts.retain(|toast| toast.id != id);
        toasts.len() != before
    })
}

/// Random base36 id that is not already used by a visible toast.
fn unique_id(toasts: &[Toast]) -> String {
    let mut rng = rand::thread_rng();
    loop {
        let id: String = (0..ID_LENGTH)
            .map(|_| char::from(ID_ALPHABET[rng.gen_range(0..ID_ALPHABET.len())]))
            .collect();
        if !toasts.iter().any(|toast| toast.id == id) {
            return id;
        }
    }
}
