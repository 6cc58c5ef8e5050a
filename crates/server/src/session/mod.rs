//! Session registry.
//!
//! A session is one independently evolving grid. Creating a session seeds its
//! grid and starts its runner (see [`runner`]) before the call returns; from
//! then on the runner is the only writer of the session's state, and any
//! number of [`Subscription`]s read it.
//!
//! The store never evicts on its own unless an idle TTL is configured. With
//! the default config a session keeps ticking, watched or not, until it is
//! closed explicitly or the process exits.

pub mod runner;

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use dashmap::DashMap;
use life_engine::factory;
use life_engine::grid::Grid;
use life_engine::viewport::Viewport;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use uuid::Uuid;

use crate::config::SessionConfig;
use crate::error::SessionError;
use crate::metrics::Metrics;
use crate::subscription::Subscription;
use runner::StepFn;

/// The `(generation, grid)` pair, always published and read together.
#[derive(Clone, Debug)]
pub struct Snapshot {
    pub generation: u64,
    pub grid: Arc<Grid>,
}

/// Metadata visible to listings. Deliberately excludes generation and cells.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionInfo {
    pub id: Uuid,
    pub width: usize,
    pub height: usize,
}

/// Parameters for [`SessionStore::create_session`].
#[derive(Clone, Debug, Default)]
pub struct CreateSession {
    pub width: usize,
    pub height: usize,
    /// Falls back to [`SessionConfig::default_alive_ratio`].
    pub alive_ratio: Option<f64>,
    /// Seed for a reproducible initial grid.
    pub seed: Option<u64>,
}

/// One running simulation. Read-only from the outside; its runner is the
/// only writer.
pub struct Session {
    id: Uuid,
    width: usize,
    height: usize,
    snapshot: watch::Receiver<Snapshot>,
    stop: Mutex<Option<oneshot::Sender<()>>>,
    subscribers: AtomicUsize,
    last_active: Mutex<Instant>,
}

impl Session {
    fn new(
        id: Uuid,
        width: usize,
        height: usize,
        snapshot: watch::Receiver<Snapshot>,
        stop: oneshot::Sender<()>,
    ) -> Self {
        Self {
            id,
            width,
            height,
            snapshot,
            stop: Mutex::new(Some(stop)),
            subscribers: AtomicUsize::new(0),
            last_active: Mutex::new(Instant::now()),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn info(&self) -> SessionInfo {
        SessionInfo {
            id: self.id,
            width: self.width,
            height: self.height,
        }
    }

    /// Latest published state. Generation and grid always belong together.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.borrow().clone()
    }

    pub fn generation(&self) -> u64 {
        self.snapshot.borrow().generation
    }

    /// False once the runner has exited.
    pub fn is_running(&self) -> bool {
        self.snapshot.has_changed().is_ok()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.load(Ordering::Relaxed)
    }

    /// Signal the runner to stop. Returns false if it was already signalled.
    pub fn stop(&self) -> bool {
        let sender = self.stop.lock().expect("session stop lock poisoned").take();
        match sender {
            Some(tx) => {
                let _ = tx.send(());
                true
            }
            None => false,
        }
    }

    pub(crate) fn watch(&self) -> watch::Receiver<Snapshot> {
        self.snapshot.clone()
    }

    pub(crate) fn attach(&self) {
        self.subscribers.fetch_add(1, Ordering::Relaxed);
        self.touch();
    }

    pub(crate) fn detach(&self) {
        self.subscribers.fetch_sub(1, Ordering::Relaxed);
        self.touch();
    }

    fn touch(&self) {
        *self.last_active.lock().expect("session activity lock poisoned") = Instant::now();
    }

    /// How long the session has gone unwatched, or `None` while anyone watches.
    pub fn idle_for(&self, now: Instant) -> Option<Duration> {
        if self.subscriber_count() > 0 {
            return None;
        }
        let last = *self.last_active.lock().expect("session activity lock poisoned");
        Some(now.saturating_duration_since(last))
    }
}

/// Process-wide registry of live sessions, keyed by a random UUID.
pub struct SessionStore {
    sessions: DashMap<Uuid, Arc<Session>>,
    config: SessionConfig,
    metrics: Arc<Metrics>,
    step: StepFn,
}

impl SessionStore {
    pub fn new(config: SessionConfig, metrics: Arc<Metrics>) -> Self {
        Self::with_step(config, metrics, life_engine::life::step)
    }

    /// Use a custom generation function for every runner this store starts.
    pub fn with_step(config: SessionConfig, metrics: Arc<Metrics>, step: StepFn) -> Self {
        Self {
            sessions: DashMap::new(),
            config,
            metrics,
            step,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<Metrics> {
        &self.metrics
    }

    /// Validate the request, seed a grid, register the session and start it.
    ///
    /// On error the store is left untouched. Must be called from within a
    /// tokio runtime.
    pub fn create_session(&self, request: CreateSession) -> Result<SessionInfo, SessionError> {
        let CreateSession {
            width,
            height,
            alive_ratio,
            seed,
        } = request;
        if width == 0 || height == 0 {
            return Err(SessionError::invalid(format!(
                "width and height must be positive (got {width}x{height})"
            )));
        }
        let max = self.config.max_grid_cells;
        if width.checked_mul(height).is_none_or(|cells| cells > max) {
            return Err(SessionError::invalid(format!(
                "a {width}x{height} grid exceeds the limit of {max} cells"
            )));
        }

        let ratio = alive_ratio.unwrap_or(self.config.default_alive_ratio);
        let grid = match seed {
            Some(seed) => factory::seeded_grid(width, height, ratio, seed)?,
            None => factory::generate_initial_grid(width, height, ratio)?,
        };
        Ok(self.create_from_grid(grid))
    }

    /// Register a session that starts from an explicit grid.
    pub fn create_from_grid(&self, grid: Grid) -> SessionInfo {
        let id = Uuid::new_v4();
        let (width, height) = (grid.width(), grid.height());
        let (snapshot, stop) = runner::spawn(
            id,
            grid,
            self.config.tick_period,
            self.step,
            Arc::clone(&self.metrics),
        );
        let session = Arc::new(Session::new(id, width, height, snapshot, stop));
        let info = session.info();
        self.sessions.insert(id, session);
        self.metrics.session_created();
        tracing::info!("New session created: {} ({}x{})", id, width, height);
        info
    }

    /// Metadata for every registered session, in no particular order.
    pub fn list_sessions(&self) -> Vec<SessionInfo> {
        self.sessions.iter().map(|entry| entry.value().info()).collect()
    }

    pub fn get_session(&self, id: &str) -> Result<Arc<Session>, SessionError> {
        let uuid = parse_id(id)?;
        self.sessions
            .get(&uuid)
            .map(|entry| Arc::clone(entry.value()))
            .ok_or_else(|| SessionError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }

    /// Remove a session and stop its runner. Its subscriptions end on their
    /// next push tick.
    pub fn close_session(&self, id: &str) -> Result<(), SessionError> {
        let uuid = parse_id(id)?;
        let (_, session) = self
            .sessions
            .remove(&uuid)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        self.retire(&session, "closed");
        Ok(())
    }

    /// Close every session. Used on shutdown.
    pub fn close_all(&self) -> usize {
        let ids: Vec<Uuid> = self.sessions.iter().map(|entry| *entry.key()).collect();
        let mut closed = 0;
        for id in ids {
            if let Some((_, session)) = self.sessions.remove(&id) {
                self.retire(&session, "closed on shutdown");
                closed += 1;
            }
        }
        closed
    }

    /// Check that `id` names a live session and `viewport` is within limits,
    /// without attaching a subscriber.
    pub fn check_subscription(&self, id: &str, viewport: &Viewport) -> Result<(), SessionError> {
        self.get_session(id)?;
        self.check_viewport(viewport)
    }

    /// Subscribe to a session through `viewport`.
    pub fn subscribe(&self, id: &str, viewport: Viewport) -> Result<Subscription, SessionError> {
        let uuid = parse_id(id)?;
        let entry = self
            .sessions
            .get(&uuid)
            .ok_or_else(|| SessionError::NotFound(id.to_string()))?;
        self.check_viewport(&viewport)?;
        // Attach while the shard is read-locked so reap_idle's re-check sees it.
        Ok(Subscription::new(
            Arc::clone(entry.value()),
            viewport,
            self.config.push_period,
            Arc::clone(&self.metrics),
        ))
    }

    fn check_viewport(&self, viewport: &Viewport) -> Result<(), SessionError> {
        let max = self.config.max_viewport_cells;
        if viewport.cell_count().is_none_or(|cells| cells > max) {
            return Err(SessionError::invalid(format!(
                "a {}x{} viewport exceeds the limit of {max} cells",
                viewport.cols, viewport.rows
            )));
        }
        Ok(())
    }

    /// Close sessions nobody has watched for at least the configured TTL.
    pub fn reap_idle(&self, now: Instant) -> usize {
        let Some(ttl) = self.config.idle_ttl else {
            return 0;
        };
        let is_expired = |session: &Arc<Session>| session.idle_for(now).is_some_and(|idle| idle >= ttl);

        let candidates: Vec<Uuid> = self
            .sessions
            .iter()
            .filter(|entry| is_expired(entry.value()))
            .map(|entry| *entry.key())
            .collect();

        let mut reaped = 0;
        for id in candidates {
            // Re-check under the shard lock: a subscriber may have attached meanwhile.
            if let Some((_, session)) = self.sessions.remove_if(&id, |_, s| is_expired(s)) {
                self.retire(&session, "expired after idling");
                reaped += 1;
            }
        }
        reaped
    }

    /// Spawn the idle reaper. Returns `None` when no idle TTL is configured.
    pub fn spawn_reaper(self: &Arc<Self>) -> Option<JoinHandle<()>> {
        let ttl = self.config.idle_ttl?;
        let store = Arc::clone(self);
        let mut interval = tokio::time::interval(self.config.reap_interval);
        Some(tokio::spawn(async move {
            // The first tick fires immediately; nothing can be idle yet.
            interval.tick().await;
            tracing::info!("Idle reaper started (ttl {:?})", ttl);
            loop {
                interval.tick().await;
                let reaped = store.reap_idle(Instant::now());
                if reaped > 0 {
                    tracing::info!("Reaped {} idle sessions", reaped);
                }
            }
        }))
    }

    fn retire(&self, session: &Session, reason: &str) {
        session.stop();
        self.metrics.session_closed();
        tracing::info!(
            "Session {} {} at generation {}",
            session.id(),
            reason,
            session.generation()
        );
    }
}

fn parse_id(id: &str) -> Result<Uuid, SessionError> {
    Uuid::parse_str(id).map_err(|_| SessionError::NotFound(id.to_string()))
}
