//! Lazily created, explicitly closed transport session.

use crate::client::transport::Transport;
use crate::error::{JenkinsError, Result};
use parking_lot::Mutex;
use std::sync::Arc;

type TransportFactory = Box<dyn Fn() -> Result<Arc<dyn Transport>> + Send + Sync>;

enum SessionState {
    Idle,
    Open(Arc<dyn Transport>),
    Closed,
}

/// Holds at most one transport per client.
///
/// The transport is built on first use, so the configuration is complete before
/// any connection is opened, and reused afterwards. `close` releases it; later
/// requests fail with [`JenkinsError::Closed`]. Closing a session that was never
/// opened is a no-op.
pub(crate) struct Session {
    state: Mutex<SessionState>,
    factory: TransportFactory,
}

impl Session {
    pub(crate) fn new(factory: TransportFactory) -> Self {
        Session {
            state: Mutex::new(SessionState::Idle),
            factory,
        }
    }

    /// The shared transport, creating it on first call.
    pub(crate) fn transport(&self) -> Result<Arc<dyn Transport>> {
        let mut state = self.state.lock();
        match &*state {
            SessionState::Open(transport) => Ok(Arc::clone(transport)),
            SessionState::Closed => Err(JenkinsError::Closed),
            SessionState::Idle => {
                let transport = (self.factory)()?;
                tracing::debug!("opened transport session");
                *state = SessionState::Open(Arc::clone(&transport));
                Ok(transport)
            }
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        matches!(*self.state.lock(), SessionState::Open(_))
    }

    /// Release the transport. Must not race with in-flight requests.
    pub(crate) async fn close(&self) {
        let previous = {
            let mut state = self.state.lock();
            match &*state {
                SessionState::Open(_) => std::mem::replace(&mut *state, SessionState::Closed),
                _ => return,
            }
        };

        if let SessionState::Open(transport) = previous {
            transport.close().await;
            tracing::debug!("closed transport session");
        }
    }
}
