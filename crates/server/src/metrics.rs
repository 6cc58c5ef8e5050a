//! Lock-free server counters.
//!
//! Session runners and subscription loops bump these with relaxed atomics;
//! nothing on a tick path ever blocks on them. `/stats` reads a snapshot.

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering::Relaxed};
use std::time::{Duration, Instant};

pub struct Metrics {
    // Monotonic counters
    sessions_created: AtomicU64,
    sessions_closed: AtomicU64,
    generations_total: AtomicU64,
    tick_ns_sum: AtomicU64,
    tick_failures: AtomicU64,
    frames_pushed: AtomicU64,
    bytes_pushed: AtomicU64,

    // Tick duration histogram
    hist_under_100us: AtomicU64,
    hist_100us_1ms: AtomicU64,
    hist_1_10ms: AtomicU64,
    hist_10_100ms: AtomicU64,
    hist_over_100ms: AtomicU64,

    // Gauges
    subscribers: AtomicU64,

    started_at: Instant,
}

impl Metrics {
    pub fn new() -> Self {
        Self {
            sessions_created: AtomicU64::new(0),
            sessions_closed: AtomicU64::new(0),
            generations_total: AtomicU64::new(0),
            tick_ns_sum: AtomicU64::new(0),
            tick_failures: AtomicU64::new(0),
            frames_pushed: AtomicU64::new(0),
            bytes_pushed: AtomicU64::new(0),
            hist_under_100us: AtomicU64::new(0),
            hist_100us_1ms: AtomicU64::new(0),
            hist_1_10ms: AtomicU64::new(0),
            hist_10_100ms: AtomicU64::new(0),
            hist_over_100ms: AtomicU64::new(0),
            subscribers: AtomicU64::new(0),
            started_at: Instant::now(),
        }
    }

    pub fn session_created(&self) {
        self.sessions_created.fetch_add(1, Relaxed);
    }

    pub fn session_closed(&self) {
        self.sessions_closed.fetch_add(1, Relaxed);
    }

    /// Called after every successful generation step.
    pub fn record_tick(&self, duration: Duration) {
        self.generations_total.fetch_add(1, Relaxed);
        self.tick_ns_sum
            .fetch_add(duration.as_nanos() as u64, Relaxed);

        let us = duration.as_micros() as u64;
        match us {
            0..=99 => {
                self.hist_under_100us.fetch_add(1, Relaxed);
            }
            100..=999 => {
                self.hist_100us_1ms.fetch_add(1, Relaxed);
            }
            1_000..=9_999 => {
                self.hist_1_10ms.fetch_add(1, Relaxed);
            }
            10_000..=99_999 => {
                self.hist_10_100ms.fetch_add(1, Relaxed);
            }
            _ => {
                self.hist_over_100ms.fetch_add(1, Relaxed);
            }
        }
    }

    pub fn tick_failed(&self) {
        self.tick_failures.fetch_add(1, Relaxed);
    }

    pub fn subscriber_attached(&self) {
        self.subscribers.fetch_add(1, Relaxed);
    }

    pub fn subscriber_detached(&self) {
        self.subscribers.fetch_sub(1, Relaxed);
    }

    pub fn frame_pushed(&self, bytes: usize) {
        self.frames_pushed.fetch_add(1, Relaxed);
        self.bytes_pushed.fetch_add(bytes as u64, Relaxed);
    }

    /// Read all counters into a serializable snapshot.
    pub fn snapshot(&self, sessions_active: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            uptime_secs: self.started_at.elapsed().as_secs_f64(),
            sessions_active,
            sessions_created: self.sessions_created.load(Relaxed),
            sessions_closed: self.sessions_closed.load(Relaxed),
            generations_total: self.generations_total.load(Relaxed),
            tick_ns_sum: self.tick_ns_sum.load(Relaxed),
            tick_failures: self.tick_failures.load(Relaxed),
            subscribers: self.subscribers.load(Relaxed),
            frames_pushed: self.frames_pushed.load(Relaxed),
            bytes_pushed: self.bytes_pushed.load(Relaxed),
            hist: [
                self.hist_under_100us.load(Relaxed),
                self.hist_100us_1ms.load(Relaxed),
                self.hist_1_10ms.load(Relaxed),
                self.hist_10_100ms.load(Relaxed),
                self.hist_over_100ms.load(Relaxed),
            ],
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Point-in-time view of [`Metrics`]. Clients derive rates by diffing two.
#[derive(Clone, Debug, Serialize)]
pub struct MetricsSnapshot {
    pub uptime_secs: f64,
    pub sessions_active: u64,
    pub sessions_created: u64,
    pub sessions_closed: u64,
    pub generations_total: u64,
    pub tick_ns_sum: u64,
    pub tick_failures: u64,
    pub subscribers: u64,
    pub frames_pushed: u64,
    pub bytes_pushed: u64,
    /// `[<100μs, 100μs-1ms, 1-10ms, 10-100ms, >100ms]`
    pub hist: [u64; 5],
}
