//! Performance instrumentation for the engine hot paths.
//!
//! Hit testing, frame flushes and layout searches are the code that runs on
//! every pointer event, so they carry lightweight counters here.
//!
//! ## Usage
//!
//! Enable profiling with the `profiling` feature flag:
//! ```toml
//! [dependencies]
//! genboard = { features = ["profiling"] }
//! ```
//!
//! ```ignore
//! use genboard::profile_scope;
//!
//! fn hit_test() {
//!     profile_scope!("hit_test");
//!     // ... work ...
//! }
//! ```

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;
#[cfg(feature = "profiling")]
use tracing::trace;
use tracing::warn;

/// Target frame time for 60 FPS
pub const TARGET_FRAME_MS: f64 = 16.67;

/// Smoothing factor for the hit-test candidate average
const CANDIDATE_EMA_ALPHA: f64 = 0.1;

static PROFILING_ENABLED: AtomicBool = AtomicBool::new(cfg!(feature = "profiling"));

/// Profile a scope with the given name. Zero-cost when profiling is disabled.
#[macro_export]
macro_rules! profile_scope {
    ($name:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::for_profiling($name);
        #[cfg(not(feature = "profiling"))]
        let _ = $name;
    };
    ($name:expr, $threshold_ms:expr) => {
        #[cfg(feature = "profiling")]
        let _timer = $crate::perf::ScopedTimer::new($name, $threshold_ms);
        #[cfg(not(feature = "profiling"))]
        let _ = ($name, $threshold_ms);
    };
}

pub use profile_scope;

/// Enable or disable profiling at runtime.
/// Only affects builds with the `profiling` feature.
pub fn set_profiling_enabled(enabled: bool) {
    PROFILING_ENABLED.store(enabled, Ordering::Relaxed);
}

#[inline]
pub fn is_profiling_enabled() -> bool {
    PROFILING_ENABLED.load(Ordering::Relaxed)
}

/// A scoped timer that logs its duration on drop when it runs long.
pub struct ScopedTimer {
    name: &'static str,
    start: Instant,
    threshold_ms: f64,
}

impl ScopedTimer {
    pub fn new(name: &'static str, threshold_ms: f64) -> Self {
        Self {
            name,
            start: Instant::now(),
            threshold_ms,
        }
    }

    /// Timer with the one-frame threshold.
    pub fn with_default_threshold(name: &'static str) -> Self {
        Self::new(name, TARGET_FRAME_MS)
    }

    /// Timer for profiling builds (1ms threshold).
    pub fn for_profiling(name: &'static str) -> Self {
        Self::new(name, 1.0)
    }

    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl Drop for ScopedTimer {
    fn drop(&mut self) {
        let elapsed_ms = self.elapsed_ms();
        if elapsed_ms <= self.threshold_ms {
            return;
        }

        #[cfg(feature = "profiling")]
        if is_profiling_enabled() {
            trace!("[PERF] {}: {:.2}ms", self.name, elapsed_ms);
            return;
        }

        warn!(
            operation = self.name,
            elapsed_ms = format!("{:.2}", elapsed_ms),
            threshold_ms = format!("{:.2}", self.threshold_ms),
            "Slow operation"
        );
    }
}

/// Measure execution time of a closure and return both the result and elapsed time.
#[inline]
pub fn measure<T, F: FnOnce() -> T>(f: F) -> (T, f64) {
    let start = Instant::now();
    let result = f();
    (result, start.elapsed().as_secs_f64() * 1000.0)
}

/// Tracks how many candidates each hit test had to examine.
#[derive(Debug, Default, Clone)]
pub struct HitTestProfiler {
    /// Candidates examined by the last hit test
    pub items_tested: usize,
    pub last_test_ms: f64,
    avg_items: f64,
    test_count: u64,
}

impl HitTestProfiler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, items_tested: usize, elapsed_ms: f64) {
        self.items_tested = items_tested;
        self.last_test_ms = elapsed_ms;
        self.test_count += 1;
        self.avg_items =
            self.avg_items * (1.0 - CANDIDATE_EMA_ALPHA) + items_tested as f64 * CANDIDATE_EMA_ALPHA;
    }

    pub fn test_count(&self) -> u64 {
        self.test_count
    }

    pub fn average_candidates(&self) -> f64 {
        self.avg_items
    }

    /// Hit testing is a bottleneck when many candidates survive the index query.
    pub fn is_bottleneck(&self) -> bool {
        self.avg_items > 100.0 && self.last_test_ms > 1.0
    }
}

/// Counters for the frame-coalesced write path.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct FrameStats {
    /// Animation frames that flushed at least one write
    pub frames_flushed: u64,
    /// Individual bounds writes applied to the scene
    pub writes_applied: u64,
    /// Writes overwritten before they reached a frame
    pub writes_coalesced: u64,
}

impl FrameStats {
    /// Fraction of submitted writes that never hit the scene.
    pub fn coalesce_ratio(&self) -> f64 {
        let total = self.writes_applied + self.writes_coalesced;
        if total == 0 {
            0.0
        } else {
            self.writes_coalesced as f64 / total as f64
        }
    }
}
