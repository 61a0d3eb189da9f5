//! Toasters keyed by page session.
//!
//! A page session is identified by a ULID cookie scoped to the login page, so
//! toasts shown while handling a form post are still there when the browser
//! follows the redirect back to the page.

use super::Toaster;
use std::collections::HashMap;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use ulid::Ulid;

pub const PAGE_SESSION_COOKIE: &str = "authgate_page";

const DEFAULT_IDLE_TTL_SECONDS: u64 = 30 * 60;
const DEFAULT_MAX_ENTRIES: usize = 10_000;

struct PageEntry {
    toaster: Toaster,
    last_seen: Instant,
}

pub struct PageSessions {
    idle_ttl: Duration,
    max_entries: usize,
    entries: Mutex<HashMap<Ulid, PageEntry>>,
}

impl Default for PageSessions {
    fn default() -> Self {
        Self::new(Duration::from_secs(DEFAULT_IDLE_TTL_SECONDS))
    }
}

impl PageSessions {
    #[must_use]
    pub fn new(idle_ttl: Duration) -> Self {
        Self {
            idle_ttl,
            max_entries: DEFAULT_MAX_ENTRIES,
            entries: Mutex::new(HashMap::new()),
        }
    }

    /// Cap the number of live page sessions. Opening one past the cap evicts
    /// the least recently seen.
    #[must_use]
    pub fn with_max_entries(mut self, max_entries: usize) -> Self {
        self.max_entries = max_entries.max(1);
        self
    }

    /// Return the toaster for `id`, creating a fresh page session when the id
    /// is missing, malformed or expired.
    pub async fn open(&self, id: Option<&str>) -> (Ulid, Toaster) {
        let mut entries = self.entries.lock().await;
        entries.retain(|_, entry| entry.last_seen.elapsed() < self.idle_ttl);

        if let Some(id) = id.and_then(|raw| Ulid::from_string(raw).ok()) {
            if let Some(entry) = entries.get_mut(&id) {
                entry.last_seen = Instant::now();
                return (id, entry.toaster.clone());
            }
        }

        while entries.len() >= self.max_entries {
            let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_seen)
                .map(|(id, _)| *id)
            else {
                break;
            };
            entries.remove(&oldest);
        }

        let id = Ulid::new();
        let toaster = Toaster::new();
        entries.insert(
            id,
            PageEntry {
                toaster: toaster.clone(),
                last_seen: Instant::now(),
            },
        );
        (id, toaster)
    }

    /// Look up an existing page session without creating one.
    pub async fn get(&self, id: &str) -> Option<Toaster> {
        let id = Ulid::from_string(id).ok()?;
        let mut entries = self.entries.lock().await;
        let entry = entries.get_mut(&id)?;
        if entry.last_seen.elapsed() >= self.idle_ttl {
            entries.remove(&id);
            return None;
        }
        entry.last_seen = Instant::now();
        Some(entry.toaster.clone())
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.lock().await.is_empty()
    }
}
