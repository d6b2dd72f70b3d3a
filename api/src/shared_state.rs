use std::sync::Arc;

use planner_auth::session::SessionManager;
use planner_db::Pool;

use crate::{access::Access, audit::AuditSink, auth::SessionStore};

pub struct InnerState {
    pub production: bool,
    pub db: Pool,
    pub sessions: SessionManager<SessionStore>,
    pub audit: Arc<dyn AuditSink>,
}

impl InnerState {
    pub fn access(&self) -> Access<'_> {
        Access {
            db: &self.db,
            audit: self.audit.as_ref(),
        }
    }
}

pub type AppState = Arc<InnerState>;
