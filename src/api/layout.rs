//! Revision tracking for the rendered root layout.
//!
//! Anything that changes who is signed in bumps the revision; pages fold it
//! into their `ETag`, so cached renderings from before the change no longer
//! validate.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Default)]
pub struct LayoutCache {
    revision: AtomicU64,
}

impl LayoutCache {
    /// Invalidate every cached rendering of the layout.
    pub fn revalidate(&self) -> u64 {
        let revision = self.revision.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(revision, "layout revalidated");
        revision
    }

    #[must_use]
    pub fn revision(&self) -> u64 {
        self.revision.load(Ordering::SeqCst)
    }

    /// Weak validator for a page rendered for `viewer`.
    #[must_use]
    pub fn etag(&self, viewer: Option<Uuid>) -> String {
        let viewer = viewer.map_or_else(|| "anon".to_string(), |id| id.simple().to_string());
        format!("W/\"layout-{}-{viewer}\"", self.revision())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn revalidate_changes_etag() {
        let cache = LayoutCache::default();
        let before = cache.etag(None);
        assert_eq!(before, "W/\"layout-0-anon\"");
        assert_eq!(cache.revalidate(), 1);
        assert_ne!(cache.etag(None), before);
    }

    #[test]
    fn etag_varies_by_viewer() {
        let cache = LayoutCache::default();
        let alice = cache.etag(Some(Uuid::new_v4()));
        let bob = cache.etag(Some(Uuid::new_v4()));
        assert_ne!(alice, bob);
        assert_ne!(alice, cache.etag(None));
    }
}
