//! HTTP/WebSocket surface over the session store.
//!
//! | Method | Path                          | Operation        |
//! |--------|-------------------------------|------------------|
//! | POST   | `/sessions`                   | create a session |
//! | GET    | `/sessions`                   | list sessions    |
//! | DELETE | `/sessions/:id`               | close a session  |
//! | GET    | `/sessions/:id/subscribe`     | WebSocket frames |
//! | GET    | `/stats`                      | metrics snapshot |
//! | GET    | `/healthz`                    | liveness         |

pub mod api;
pub mod listener;
pub mod stream;

use std::sync::Arc;

use axum::Router;
use axum::routing::{delete, get};

use crate::session::SessionStore;

pub fn router(store: Arc<SessionStore>) -> Router {
    Router::new()
        .route("/healthz", get(api::health))
        .route("/stats", get(api::stats))
        .route("/sessions", get(api::list_sessions).post(api::create_session))
        .route("/sessions/:id", delete(api::close_session))
        .route("/sessions/:id/subscribe", get(stream::subscribe))
        .with_state(store)
}
