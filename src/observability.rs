//! Observability: tracing setup and run counters

use std::sync::atomic::{AtomicU64, Ordering};
use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Events go to stderr so that stdout carries only the resolved document.
/// `RUST_LOG` takes precedence over `default_level`.
pub fn init_tracing(default_level: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("zipline={default_level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

/// Counters for one or more preprocessing runs
#[derive(Debug, Default)]
pub struct Metrics {
    directives_dispatched: AtomicU64,
    directives_unknown: AtomicU64,
    remote_fetches: AtomicU64,
    local_fetches: AtomicU64,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn directive_dispatched(&self) {
        self.directives_dispatched.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "directives_dispatched", "Metric incremented");
    }

    pub fn directive_unknown(&self) {
        self.directives_unknown.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "directives_unknown", "Metric incremented");
    }

    pub fn remote_fetch(&self) {
        self.remote_fetches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "remote_fetches", "Metric incremented");
    }

    pub fn local_fetch(&self) {
        self.local_fetches.fetch_add(1, Ordering::Relaxed);
        tracing::trace!(counter = "local_fetches", "Metric incremented");
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            directives_dispatched: self.directives_dispatched.load(Ordering::Relaxed),
            directives_unknown: self.directives_unknown.load(Ordering::Relaxed),
            remote_fetches: self.remote_fetches.load(Ordering::Relaxed),
            local_fetches: self.local_fetches.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MetricsSnapshot {
    pub directives_dispatched: u64,
    pub directives_unknown: u64,
    pub remote_fetches: u64,
    pub local_fetches: u64,
}
