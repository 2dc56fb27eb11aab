//! Progress tracking and callbacks for field estimation.
//!
//! Progress is reported once per output z-slice, before the slice is
//! evaluated.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::{Duration, Instant};

/// Progress information for one output slice.
#[derive(Debug, Clone)]
pub struct ProgressInfo {
    /// Slice about to be evaluated, counted from 1.
    pub slab: usize,
    /// Number of slices in the output grid.
    pub total_slabs: usize,
    /// Wall time since `start`.
    pub elapsed: Duration,
    /// Estimated remaining time, known once a slice has completed.
    pub estimated_remaining: Option<Duration>,
}

impl ProgressInfo {
    pub fn new(slab: usize, total_slabs: usize, elapsed: Duration) -> Self {
        Self {
            slab,
            total_slabs,
            elapsed,
            estimated_remaining: None,
        }
    }

    /// Extrapolate the remaining time from the slices completed so far.
    pub fn calculate_remaining(&mut self) {
        let completed = self.slab.saturating_sub(1);
        if completed > 0 {
            let per_slab = self.elapsed.as_secs_f64() / completed as f64;
            let remaining = self.total_slabs.saturating_sub(completed);
            self.estimated_remaining = Some(Duration::from_secs_f64(per_slab * remaining as f64));
        }
    }
}

/// Observer of a running field estimation.
pub trait ProgressCallback: Send + Sync {
    /// Called before each output slice is evaluated.
    fn on_progress(&self, info: &ProgressInfo);

    /// Called when estimation starts.
    fn on_start(&self) {}

    /// Called when estimation completes successfully.
    fn on_complete(&self, _elapsed: Duration) {}

    /// Called when estimation fails.
    fn on_error(&self, _error: &str) {}
}

/// Emits the per-slice "Calculating" line through `tracing`.
#[derive(Debug, Clone, Default)]
pub struct ConsoleProgressCallback;

impl ProgressCallback for ConsoleProgressCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        match info.estimated_remaining {
            Some(remaining) => tracing::info!(
                "Calculating {}/{} -- {:.3} min remaining",
                info.slab,
                info.total_slabs,
                remaining.as_secs_f64() / 60.0
            ),
            None => tracing::info!("Calculating {}/{}", info.slab, info.total_slabs),
        }
    }

    fn on_start(&self) {
        tracing::info!("Field estimation started");
    }

    fn on_complete(&self, elapsed: Duration) {
        tracing::info!("Field estimation completed in {:.2}s", elapsed.as_secs_f64());
    }

    fn on_error(&self, error: &str) {
        tracing::error!("Field estimation failed: {}", error);
    }
}

/// Keeps every report in memory; used to observe runs in tests.
#[derive(Debug, Clone, Default)]
pub struct HistoryCallback {
    history: Arc<Mutex<Vec<ProgressInfo>>>,
    errors: Arc<Mutex<Vec<String>>>,
}

impl HistoryCallback {
    pub fn new() -> Self {
        Self::default()
    }

    /// Slice reports in arrival order.
    pub fn history(&self) -> Vec<ProgressInfo> {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl ProgressCallback for HistoryCallback {
    fn on_progress(&self, info: &ProgressInfo) {
        self.history.lock().unwrap_or_else(PoisonError::into_inner).push(info.clone());
    }

    fn on_error(&self, error: &str) {
        self.errors.lock().unwrap_or_else(PoisonError::into_inner).push(error.to_string());
    }
}

/// Fans progress events out to any number of callbacks.
#[derive(Clone, Default)]
pub struct ProgressTracker {
    callbacks: Vec<Arc<dyn ProgressCallback>>,
    start_time: Arc<Mutex<Option<Instant>>>,
}

impl ProgressTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tracker that logs to the console.
    pub fn console() -> Self {
        let mut tracker = Self::new();
        tracker.add_callback(Arc::new(ConsoleProgressCallback));
        tracker
    }

    pub fn add_callback(&mut self, callback: Arc<dyn ProgressCallback>) {
        self.callbacks.push(callback);
    }

    fn elapsed(&self) -> Duration {
        let start_time = *self.start_time.lock().unwrap_or_else(PoisonError::into_inner);
        start_time.map(|t| t.elapsed()).unwrap_or(Duration::ZERO)
    }

    /// Reset the clock and notify `on_start`.
    pub fn start(&self) {
        *self.start_time.lock().unwrap_or_else(PoisonError::into_inner) = Some(Instant::now());
        for callback in &self.callbacks {
            callback.on_start();
        }
    }

    /// Report that slice `slab` (from 1) of `total_slabs` is about to be evaluated.
    pub fn update(&self, slab: usize, total_slabs: usize) {
        let mut info = ProgressInfo::new(slab, total_slabs, self.elapsed());
        info.calculate_remaining();

        for callback in &self.callbacks {
            callback.on_progress(&info);
        }
    }

    pub fn complete(&self) {
        let elapsed = self.elapsed();
        for callback in &self.callbacks {
            callback.on_complete(elapsed);
        }
    }

    pub fn error(&self, error: &str) {
        for callback in &self.callbacks {
            callback.on_error(error);
        }
    }
}
