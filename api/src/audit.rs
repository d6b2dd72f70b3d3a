use async_trait::async_trait;
use planner_db::{activity_logs::ActivityRecord, Pool, PoolExt};
use tracing::{event, Level};

use crate::Error;

/// Where activity records go once an operation has committed.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: ActivityRecord) -> Result<(), Error>;
}

/// Writes records to the `activity_logs` table.
pub struct DbAuditSink {
    pub db: Pool,
}

#[async_trait]
impl AuditSink for DbAuditSink {
    async fn record(&self, record: ActivityRecord) -> Result<(), Error> {
        self.db
            .interact(move |conn| {
                planner_db::activity_logs::record(conn, &record)
                    .map(|_| ())
                    .map_err(Error::from)
            })
            .await
    }
}

/// Send a record to the sink. Failures are logged and otherwise ignored, since the
/// change being recorded has already been committed.
pub async fn emit(sink: &dyn AuditSink, record: ActivityRecord) {
    let action = record.action;
    let entity_kind = record.entity_kind;
    if let Err(e) = sink.record(record).await {
        event!(Level::WARN, error=%e, ?action, ?entity_kind, "Failed to write activity log");
    }
}
