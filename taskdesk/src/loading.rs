//! In-flight operation counter behind each holder's `is_loading` view.

use std::sync::atomic::{AtomicUsize, Ordering};

/// Counts outstanding operations. Loading while the count is non-zero, so
/// overlapping operations share one flag and it clears only when the last
/// of them finishes.
#[derive(Debug, Default)]
pub(crate) struct LoadingCounter(AtomicUsize);

impl LoadingCounter {
    /// Marks an operation as started until the returned guard drops.
    pub(crate) fn enter(&self) -> LoadingGuard<'_> {
        self.0.fetch_add(1, Ordering::SeqCst);
        LoadingGuard(&self.0)
    }

    pub(crate) fn is_loading(&self) -> bool {
        self.0.load(Ordering::SeqCst) > 0
    }
}

/// Ends one in-flight operation when dropped, including on early return.
#[derive(Debug)]
pub(crate) struct LoadingGuard<'a>(&'a AtomicUsize);

impl Drop for LoadingGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}
