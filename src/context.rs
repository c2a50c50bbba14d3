//! Per-run correlation context
//!
//! Created once per repository run and passed by reference into every
//! phase, so log events from one run share a trace id without any
//! process-wide state.

use tracing::Span;
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct RunContext {
    trace_id: Uuid,
    repo_name: String,
}

impl RunContext {
    pub fn new(repo_name: impl Into<String>) -> Self {
        Self {
            trace_id: Uuid::new_v4(),
            repo_name: repo_name.into(),
        }
    }

    pub fn trace_id(&self) -> Uuid {
        self.trace_id
    }

    pub fn repo_name(&self) -> &str {
        &self.repo_name
    }

    /// Span covering one repository run. Phases enter it (or a child of it)
    /// so every event carries the trace id.
    pub fn span(&self) -> Span {
        tracing::info_span!("pack_run", trace_id = %self.trace_id, repo = %self.repo_name)
    }

    /// Child span for a single phase.
    pub fn phase(&self, name: &'static str) -> Span {
        tracing::info_span!("phase", trace_id = %self.trace_id, phase = name)
    }
}
