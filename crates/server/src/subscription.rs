//! Per-subscriber push loop.
//!
//! A [`Subscription`] ticks on its own period, independent of the session's
//! runner. Each tick reads whatever snapshot is current, so a slow subscriber
//! skips generations and a fast one repeats them; generations it observes
//! never go backwards.
//!
//! Dropping the subscription is the disconnect signal. It affects nothing but
//! the subscriber count of its session.

use std::sync::Arc;
use std::time::Duration;

use life_engine::viewport::{self, Viewport};
use tokio::sync::watch;
use tokio::time::{Interval, MissedTickBehavior};
use uuid::Uuid;

use crate::metrics::Metrics;
use crate::session::{Session, Snapshot};

/// Length of the generation header in an encoded frame.
pub const FRAME_HEADER_LEN: usize = 8;

/// One pushed view: the generation it was taken from and `cols * rows` cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub generation: u64,
    pub bitmap: Vec<u8>,
}

impl Frame {
    /// Wire form: big-endian `u64` generation followed by the raw bitmap.
    pub fn encode(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(FRAME_HEADER_LEN + self.bitmap.len());
        out.extend_from_slice(&self.generation.to_be_bytes());
        out.extend_from_slice(&self.bitmap);
        out
    }

    pub fn decode(bytes: &[u8]) -> Option<Self> {
        let (header, bitmap) = bytes.split_first_chunk::<FRAME_HEADER_LEN>()?;
        Some(Self {
            generation: u64::from_be_bytes(*header),
            bitmap: bitmap.to_vec(),
        })
    }
}

pub struct Subscription {
    session: Arc<Session>,
    snapshot: watch::Receiver<Snapshot>,
    viewport: Viewport,
    ticker: Interval,
    metrics: Arc<Metrics>,
}

impl Subscription {
    pub(crate) fn new(
        session: Arc<Session>,
        viewport: Viewport,
        period: Duration,
        metrics: Arc<Metrics>,
    ) -> Self {
        session.attach();
        metrics.subscriber_attached();
        tracing::info!(
            "Subscribed to session {} at ({}, {}) {}x{}",
            session.id(),
            viewport.offset_x,
            viewport.offset_y,
            viewport.cols,
            viewport.rows
        );

        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        Self {
            snapshot: session.watch(),
            session,
            viewport,
            ticker,
            metrics,
        }
    }

    pub fn session_id(&self) -> Uuid {
        self.session.id()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    /// Wait for the next push tick and extract the current view.
    ///
    /// The first call returns immediately. Returns `None` once the session's
    /// runner has stopped. Cancel-safe.
    pub async fn next_frame(&mut self) -> Option<Frame> {
        self.ticker.tick().await;
        if self.snapshot.has_changed().is_err() {
            return None;
        }
        let Snapshot { generation, grid } = self.snapshot.borrow_and_update().clone();
        let bitmap = viewport::extract(&grid, &self.viewport);
        self.metrics.frame_pushed(bitmap.len());
        Some(Frame { generation, bitmap })
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.session.detach();
        self.metrics.subscriber_detached();
        tracing::info!("Unsubscribed from session {}", self.session.id());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn frame_wire_layout() {
        let frame = Frame {
            generation: 0x0102_0304_0506_0708,
            bitmap: vec![1, 0, 1],
        };
        let bytes = frame.encode();
        assert_eq!(bytes, vec![1, 2, 3, 4, 5, 6, 7, 8, 1, 0, 1]);
        assert_eq!(Frame::decode(&bytes), Some(frame));
    }

    #[test]
    fn decode_rejects_short_input() {
        assert_eq!(Frame::decode(&[0; 7]), None);
        assert_eq!(
            Frame::decode(&[0; 8]),
            Some(Frame {
                generation: 0,
                bitmap: vec![]
            })
        );
    }
}
