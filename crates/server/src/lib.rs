pub mod config;
pub mod error;
pub mod metrics;
pub mod net;
pub mod session;
pub mod subscription;

pub use error::SessionError;
pub use session::{CreateSession, Session, SessionInfo, SessionStore, Snapshot};
pub use subscription::{Frame, Subscription};
