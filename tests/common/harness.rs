//! Scripted collaborators for driving the retrieval loop without a model.

use std::collections::VecDeque;
use std::sync::{Mutex, Once};

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use lorecall::retrieval::ToolDefinition;
use lorecall::{AssistantTurn, Chapter, ChapterAnswerer, LorecallError, Message, TurnProvider};

/// Install a test subscriber once so `RUST_LOG=lorecall=debug` shows the
/// session spans when debugging a failing test.
pub fn init_tracing() {
    static INIT: Once = Once::new();
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A turn provider that replays a fixed script of responses.
///
/// Snapshots the message log it was shown on every call so tests can assert
/// on conversation structure (nudges, tool-result correlation) from outside.
pub struct ScriptedProvider {
    turns: Mutex<VecDeque<Result<AssistantTurn, LorecallError>>>,
    seen: Mutex<Vec<Vec<Message>>>,
}

impl ScriptedProvider {
    pub fn new(turns: Vec<Result<AssistantTurn, LorecallError>>) -> Self {
        Self {
            turns: Mutex::new(VecDeque::from(turns)),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Message logs observed per call, in call order.
    pub fn seen(&self) -> Vec<Vec<Message>> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl TurnProvider for ScriptedProvider {
    async fn next_turn(
        &self,
        messages: &[Message],
        _tools: &[ToolDefinition],
        _cancel: &CancellationToken,
    ) -> Result<AssistantTurn, LorecallError> {
        self.seen.lock().unwrap().push(messages.to_vec());
        self.turns
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LorecallError::provider("script exhausted")))
    }
}

/// An answerer that records what it was asked and returns canned answers.
#[derive(Default)]
pub struct RecordingAnswerer {
    pub asked: Mutex<Vec<(Vec<u32>, String)>>,
}

#[async_trait]
impl ChapterAnswerer for RecordingAnswerer {
    async fn answer_chapter(
        &self,
        chapter: &Chapter,
        question: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, LorecallError> {
        self.asked
            .lock()
            .unwrap()
            .push((vec![chapter.number], question.to_string()));
        Ok(format!("delegate answer for chapter {}", chapter.number))
    }

    async fn answer_range(
        &self,
        chapters: &[&Chapter],
        question: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, LorecallError> {
        let numbers: Vec<u32> = chapters.iter().map(|c| c.number).collect();
        self.asked
            .lock()
            .unwrap()
            .push((numbers.clone(), question.to_string()));
        Ok(format!("delegate answer for chapters {:?}", numbers))
    }
}

/// An answerer that always fails, to exercise the summary fallback.
pub struct FailingAnswerer;

#[async_trait]
impl ChapterAnswerer for FailingAnswerer {
    async fn answer_chapter(
        &self,
        _chapter: &Chapter,
        _question: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, LorecallError> {
        Err(LorecallError::Answerer("delegate model unavailable".into()))
    }

    async fn answer_range(
        &self,
        _chapters: &[&Chapter],
        _question: &str,
        _cancel: &CancellationToken,
    ) -> Result<String, LorecallError> {
        Err(LorecallError::Answerer("delegate model unavailable".into()))
    }
}
