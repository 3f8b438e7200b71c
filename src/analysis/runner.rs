//! Progress presentation for an analysis run.
//!
//! The analysis itself is synchronous and instant. Callers that want a
//! progress bar get a timed sequence of events (0, 10, ... 90 percent) and the
//! computation runs in one go once the sequence reaches its final step.
//! Cancelling before then means the computation never runs.

use crate::config::ProgressConfig;
use crate::detect::{AnalysisReport, LogInsightEngine};
use crate::logs::LogRecord;
use anyhow::{Context, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub enum ProgressEvent {
    Started { records: usize },
    Progress { percent: u8 },
    Completed(Box<AnalysisReport>),
    Cancelled { percent: u8 },
}

/// Handle to a running analysis.
pub struct AnalysisRun {
    events: mpsc::Receiver<ProgressEvent>,
    cancel: CancellationToken,
    handle: JoinHandle<Option<AnalysisReport>>,
}

impl AnalysisRun {
    /// Start the progress sequence on the current tokio runtime.
    pub fn spawn(
        engine: Arc<LogInsightEngine>,
        records: Arc<Vec<LogRecord>>,
        config: &ProgressConfig,
    ) -> Self {
        let (tx, rx) = mpsc::channel(16);
        let cancel = CancellationToken::new();
        let tick = config.tick();
        let step = config.step.clamp(1, 100);

        let token = cancel.clone();
        let handle = tokio::spawn(async move { step_through(engine, records, tx, token, tick, step).await });

        Self {
            events: rx,
            cancel,
            handle,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Next event, or `None` once the run has finished and all events were read.
    pub async fn next_event(&mut self) -> Option<ProgressEvent> {
        self.events.recv().await
    }

    /// Wait for the run, discarding any unread events.
    /// Returns `None` when the run was cancelled.
    pub async fn finish(self) -> Result<Option<AnalysisReport>> {
        drop(self.events);
        self.handle.await.context("analysis task panicked")
    }
}

async fn step_through(
    engine: Arc<LogInsightEngine>,
    records: Arc<Vec<LogRecord>>,
    tx: mpsc::Sender<ProgressEvent>,
    cancel: CancellationToken,
    tick: std::time::Duration,
    step: u8,
) -> Option<AnalysisReport> {
    // A closed receiver only means nobody is watching; the run continues.
    let _ = tx.send(ProgressEvent::Started { records: records.len() }).await;

    if records.is_empty() {
        let _ = tx.send(ProgressEvent::Progress { percent: 100 }).await;
        let report = engine.analyze(&records);
        let _ = tx.send(ProgressEvent::Completed(Box::new(report.clone()))).await;
        return Some(report);
    }

    let mut percent: u8 = 0;
    let _ = tx.send(ProgressEvent::Progress { percent }).await;
    let mut ticker = interval_at(Instant::now() + tick, tick);

    loop {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                info!(percent, "analysis cancelled");
                let _ = tx.send(ProgressEvent::Cancelled { percent }).await;
                return None;
            }
            _ = ticker.tick() => {}
        }

        if percent.saturating_add(step) >= 100 {
            let report = engine.analyze(&records);
            let _ = tx.send(ProgressEvent::Progress { percent: 100 }).await;
            let _ = tx.send(ProgressEvent::Completed(Box::new(report.clone()))).await;
            return Some(report);
        }

        percent += step;
        debug!(percent, "analysis progress");
        let _ = tx.send(ProgressEvent::Progress { percent }).await;
    }
}
