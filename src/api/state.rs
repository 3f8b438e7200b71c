use crate::detect::LogInsightEngine;
use crate::logs::LogRecord;
use std::sync::Arc;

/// Read-only state shared by every handler.
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LogInsightEngine>,
    /// The batch loaded at startup.
    pub records: Arc<Vec<LogRecord>>,
}

impl AppState {
    pub fn new(engine: LogInsightEngine, records: Vec<LogRecord>) -> Self {
        Self {
            engine: Arc::new(engine),
            records: Arc::new(records),
        }
    }
}
