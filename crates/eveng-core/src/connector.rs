// ── Connector ──
//
// Entry point for whatever drives reconciliation: opens the session once,
// hands out per-kind reconcilers over it, and logs out on close.

use std::sync::Arc;

use eveng_api::{Session, SessionConfig};
use tracing::{debug, info};

use crate::catalog::{self, CatalogEntry, StatusSnapshot};
use crate::error::CoreError;
use crate::reconcile::{Reconciler, Resource};

/// A logged-in connection to one EVE-NG server.
///
/// Cheap to clone; clones share the session.
#[derive(Debug, Clone)]
pub struct Connector {
    session: Arc<Session>,
}

impl Connector {
    /// Build the HTTP client and log in.
    pub async fn connect(config: &SessionConfig) -> Result<Self, CoreError> {
        let session = Session::connect(config).await?;
        info!(endpoint = %config.endpoint, username = %config.username, "connected");
        Ok(Self {
            session: Arc::new(session),
        })
    }

    /// Wrap a session that is already set up (and usually logged in).
    pub fn from_session(session: Arc<Session>) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// Reconciler for one resource kind.
    pub fn reconciler<R: Resource>(&self) -> Reconciler<'_, R> {
        Reconciler::new(&self.session)
    }

    pub async fn templates(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        catalog::templates(&self.session).await
    }

    pub async fn network_types(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        catalog::network_types(&self.session).await
    }

    pub async fn icons(&self) -> Result<Vec<CatalogEntry>, CoreError> {
        catalog::icons(&self.session).await
    }

    pub async fn status(&self) -> Result<StatusSnapshot, CoreError> {
        catalog::status(&self.session).await
    }

    /// Log out. The token is dropped even when the server call fails.
    pub async fn close(&self) -> Result<(), CoreError> {
        debug!("closing connector");
        self.session.logout().await?;
        Ok(())
    }
}
