//! Logging, counters and timers for the image intake pipeline
//!
//! - Structured logging with tracing, filtered by `RUST_LOG` or the
//!   configured level
//! - Process-wide counters and duration histograms
//! - A session id attached to every run for correlating logs

use chrono::{DateTime, Utc};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};
use std::time::{Duration, Instant};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use uuid::Uuid;

/// Counter names recorded by the pipeline
pub mod names {
    /// One per encode call during a quality search
    pub const REENCODE_ATTEMPTS: &str = "reencode.attempts";
    /// Searches that ended above the size threshold
    pub const REENCODE_THRESHOLD_NOT_MET: &str = "reencode.threshold_not_met";
    /// Files that could not be decoded
    pub const DECODE_FAILURE: &str = "decode.failure";
    /// Accepted uploads
    pub const UPLOAD_SUCCESS: &str = "upload.success";
    /// Failed uploads
    pub const UPLOAD_FAILURE: &str = "upload.failure";
    /// Duration of one quality search, in milliseconds
    pub const REENCODE_DURATION: &str = "reencode.duration_ms";
}

/// Global metrics registry
static METRICS: Lazy<MetricsRegistry> = Lazy::new(MetricsRegistry::new);

/// Global session ID for correlating logs
static SESSION_ID: Lazy<String> = Lazy::new(|| Uuid::new_v4().to_string());

/// Initialize logging with defaults
pub fn init() -> anyhow::Result<()> {
    init_with_config(&TelemetryConfig::default())
}

/// Initialize with custom configuration
///
/// `RUST_LOG` wins over `config.log_level` when set. Logs go to stderr so
/// that JSON reports on stdout stay parseable.
pub fn init_with_config(config: &TelemetryConfig) -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| anyhow::anyhow!("Invalid log filter '{}': {}", config.log_level, e))?;

    let base = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target);

    let result = if config.json {
        tracing_subscriber::registry()
            .with(filter)
            .with(base.json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(base.compact())
            .try_init()
    };
    result.map_err(|e| anyhow::anyhow!("Failed to set tracing subscriber: {}", e))?;

    tracing::debug!(
        session_id = %session_id(),
        version = env!("CARGO_PKG_VERSION"),
        "Telemetry initialized"
    );

    Ok(())
}

/// Get the current session ID
pub fn session_id() -> &'static str {
    &SESSION_ID
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelemetryConfig {
    /// Filter directive used when `RUST_LOG` is unset
    pub log_level: String,
    /// Emit JSON lines instead of the compact format
    pub json: bool,
    /// Include the module target in each line
    pub show_target: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json: false,
            show_target: false,
        }
    }
}

impl TelemetryConfig {
    /// Configuration with the given filter directive
    pub fn with_level(level: impl Into<String>) -> Self {
        Self {
            log_level: level.into(),
            ..Self::default()
        }
    }
}

/// Registry of named counters and duration histograms
pub struct MetricsRegistry {
    counters: RwLock<HashMap<String, AtomicU64>>,
    histograms: RwLock<HashMap<String, Vec<f64>>>,
    start_time: Instant,
}

impl MetricsRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            counters: RwLock::new(HashMap::new()),
            histograms: RwLock::new(HashMap::new()),
            start_time: Instant::now(),
        }
    }

    /// Increment a counter
    pub fn increment(&self, name: &str) {
        self.increment_by(name, 1);
    }

    /// Increment a counter by a specific amount
    pub fn increment_by(&self, name: &str, value: u64) {
        let counters = self.counters.read().unwrap_or_else(PoisonError::into_inner);
        if let Some(counter) = counters.get(name) {
            counter.fetch_add(value, Ordering::Relaxed);
        } else {
            drop(counters);
            let mut counters = self.counters.write().unwrap_or_else(PoisonError::into_inner);
            counters
                .entry(name.to_string())
                .or_insert_with(|| AtomicU64::new(0))
                .fetch_add(value, Ordering::Relaxed);
        }
    }

    /// Current value of a counter, zero when never incremented
    pub fn counter(&self, name: &str) -> u64 {
        self.counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .map_or(0, |c| c.load(Ordering::Relaxed))
    }

    /// Record a histogram value
    pub fn histogram(&self, name: &str, value: f64) {
        let mut histograms = self.histograms.write().unwrap_or_else(PoisonError::into_inner);
        histograms.entry(name.to_string()).or_default().push(value);
    }

    /// Get uptime in seconds
    pub fn uptime_secs(&self) -> u64 {
        self.start_time.elapsed().as_secs()
    }

    /// Point-in-time copy of every counter and histogram
    pub fn snapshot(&self) -> MetricsSnapshot {
        let counters = self
            .counters
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), v.load(Ordering::Relaxed)))
            .collect();

        let histograms = self
            .histograms
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), HistogramStats::from_values(v)))
            .collect();

        MetricsSnapshot {
            session_id: session_id().to_string(),
            captured_at: Utc::now(),
            uptime_secs: self.uptime_secs(),
            counters,
            histograms,
        }
    }
}

impl Default for MetricsRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Serializable copy of a registry
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub session_id: String,
    pub captured_at: DateTime<Utc>,
    pub uptime_secs: u64,
    pub counters: HashMap<String, u64>,
    pub histograms: HashMap<String, HistogramStats>,
}

/// Histogram statistics
#[derive(Debug, Clone, Serialize)]
pub struct HistogramStats {
    pub count: usize,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub p50: f64,
    pub p95: f64,
}

impl HistogramStats {
    fn from_values(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self {
                count: 0,
                min: 0.0,
                max: 0.0,
                mean: 0.0,
                p50: 0.0,
                p95: 0.0,
            };
        }

        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        let count = sorted.len();
        let sum: f64 = sorted.iter().sum();

        Self {
            count,
            min: sorted[0],
            max: sorted[count - 1],
            mean: sum / count as f64,
            p50: percentile(&sorted, 50.0),
            p95: percentile(&sorted, 95.0),
        }
    }
}

fn percentile(sorted: &[f64], p: f64) -> f64 {
    if sorted.is_empty() {
        return 0.0;
    }
    let idx = ((p / 100.0) * (sorted.len() - 1) as f64).round() as usize;
    sorted[idx.min(sorted.len() - 1)]
}

/// Get the global metrics registry
pub fn metrics() -> &'static MetricsRegistry {
    &METRICS
}

/// Timer for measuring operation duration
///
/// Records into the global registry once, on `stop` or on drop.
pub struct Timer {
    name: String,
    start: Instant,
    recorded: bool,
}

impl Timer {
    /// Start a new timer
    pub fn start(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            start: Instant::now(),
            recorded: false,
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(mut self) -> Duration {
        self.record()
    }

    fn record(&mut self) -> Duration {
        let duration = self.start.elapsed();
        if !self.recorded {
            self.recorded = true;
            metrics().histogram(&self.name, duration.as_secs_f64() * 1000.0);
            tracing::trace!(
                metric = %self.name,
                duration_ms = duration.as_millis(),
                "Timer completed"
            );
        }
        duration
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        self.record();
    }
}
