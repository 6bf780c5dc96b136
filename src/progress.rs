//! Progress-callback trait for per-page scan events.
//!
//! Inject an [`Arc<dyn ScanProgressCallback>`] via
//! [`crate::config::ExtractionConfigBuilder::progress_callback`] to receive
//! events as the pipeline scans each page.
//!
//! # Why callbacks instead of channels?
//!
//! The callback approach is the least-invasive integration point: callers can
//! forward events to a terminal progress bar, a log file, or a job-status
//! record without the library knowing anything about how the host application
//! communicates. The trait is `Send + Sync` so a single callback can also be
//! shared with other threads of the host application, even though the
//! pipeline itself scans pages strictly in document order on one thread.

use std::sync::Arc;

/// Called by the pipeline as it scans each page.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait ScanProgressCallback: Send + Sync {
    /// Called once before any page is scanned.
    ///
    /// # Arguments
    /// * `total_pages` — number of pages that will be scanned
    fn on_scan_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page has been scanned.
    ///
    /// # Arguments
    /// * `page_num`      — 1-indexed page number
    /// * `total_pages`   — total pages being scanned
    /// * `lines_matched` — station lines matched on this page
    fn on_page_scanned(&self, page_num: usize, total_pages: usize, lines_matched: usize) {
        let _ = (page_num, total_pages, lines_matched);
    }

    /// Called when a scanned page yielded no text or rows at all.
    fn on_page_empty(&self, page_num: usize, total_pages: usize) {
        let _ = (page_num, total_pages);
    }

    /// Called once after all pages have been scanned.
    ///
    /// # Arguments
    /// * `total_pages`      — pages scanned
    /// * `stations_matched` — registry stations found in the document
    fn on_scan_complete(&self, total_pages: usize, stations_matched: usize) {
        let _ = (total_pages, stations_matched);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl ScanProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in
/// [`crate::config::ExtractionConfig`].
pub type ProgressCallback = Arc<dyn ScanProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingCallback {
        scanned: AtomicUsize,
        empty: AtomicUsize,
        final_matched: AtomicUsize,
    }

    impl ScanProgressCallback for TrackingCallback {
        fn on_page_scanned(&self, _page: usize, _total: usize, _matched: usize) {
            self.scanned.fetch_add(1, Ordering::SeqCst);
        }

        fn on_page_empty(&self, _page: usize, _total: usize) {
            self.empty.fetch_add(1, Ordering::SeqCst);
        }

        fn on_scan_complete(&self, _total: usize, stations_matched: usize) {
            self.final_matched.store(stations_matched, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_scan_start(5);
        cb.on_page_scanned(1, 5, 10);
        cb.on_page_empty(2, 5);
        cb.on_scan_complete(5, 28);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback {
            scanned: AtomicUsize::new(0),
            empty: AtomicUsize::new(0),
            final_matched: AtomicUsize::new(0),
        };

        tracker.on_scan_start(3);
        tracker.on_page_scanned(1, 3, 14);
        tracker.on_page_empty(2, 3);
        tracker.on_page_scanned(3, 3, 14);
        tracker.on_scan_complete(3, 28);

        assert_eq!(tracker.scanned.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.empty.load(Ordering::SeqCst), 1);
        assert_eq!(tracker.final_matched.load(Ordering::SeqCst), 28);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: Arc<dyn ScanProgressCallback> = Arc::new(NoopProgressCallback);
        cb.on_scan_start(10);
        cb.on_page_scanned(1, 10, 0);
    }
}
