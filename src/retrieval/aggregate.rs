//! Session bookkeeping: consulted chapters and the final synthesis.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// What one retrieval session produced.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalResult {
    /// Synthesized context. Empty unless `finish_retrieval` was invoked
    /// with a usable summary.
    pub context: String,
    /// Chapter numbers consulted, in first-consulted order, deduplicated
    pub consulted_chapters: Vec<u32>,
    /// Model turns actually requested
    pub iterations: usize,
    /// Correlation id for logs; generated fresh per session, not persisted
    pub session_id: Uuid,
}

/// Mutable aggregator updated by the dispatcher as the loop proceeds.
///
/// Insert-if-absent semantics on the consulted set: a chapter queried five
/// times is still recorded once, in the position of its first consultation.
#[derive(Debug, Default)]
pub struct RetrievalLedger {
    consulted: Vec<u32>,
    summary: Option<String>,
}

impl RetrievalLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a chapter as consulted. Idempotent.
    pub fn record_chapter(&mut self, number: u32) {
        if !self.consulted.contains(&number) {
            self.consulted.push(number);
        }
    }

    pub fn consulted(&self) -> &[u32] {
        &self.consulted
    }

    /// Store the final synthesis. Only the dispatcher calls this, and only
    /// for a `finish_retrieval` whose arguments carried a summary.
    pub fn finish(&mut self, summary: String) {
        self.summary = Some(summary);
    }

    pub fn is_finished(&self) -> bool {
        self.summary.is_some()
    }

    /// Consume the ledger into the session's result.
    pub fn into_result(self, iterations: usize, session_id: Uuid) -> RetrievalResult {
        RetrievalResult {
            context: self.summary.unwrap_or_default(),
            consulted_chapters: self.consulted,
            iterations,
            session_id,
        }
    }
}
