//! Session lifetime tracking.

use crate::telemetry::event::SessionRecord;
use crate::telemetry::Telemetry;

/// A live identified session.
///
/// Created by [`Telemetry::start_session`] after the start record has
/// been delivered. Ending the session emits the correlated end record
/// with a computed duration; a handle that is never ended simply emits
/// nothing further, mirroring a page that never unloads.
pub struct SessionHandle {
    telemetry: Telemetry,
    record: SessionRecord,
}

impl SessionHandle {
    pub(crate) fn new(telemetry: Telemetry, record: SessionRecord) -> Self {
        Self { telemetry, record }
    }

    pub fn record(&self) -> &SessionRecord {
        &self.record
    }

    /// Emit the session end record and consume the handle.
    pub async fn end(self) {
        self.telemetry.end_session(self.record).await;
    }
}
