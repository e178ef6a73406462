//! Collaborator seams: the model turn provider and the optional
//! chapter-answering delegates.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use crate::error::LorecallError;
use crate::models::{Chapter, Message, ToolCall};
use crate::retrieval::catalog::ToolDefinition;

/// One assistant turn as returned by a model provider.
#[derive(Debug, Clone, Default)]
pub struct AssistantTurn {
    /// Free-text content, if any
    pub content: Option<String>,
    /// Reasoning trace, if the provider surfaces one
    pub reasoning: Option<String>,
    /// Tool calls requested this turn, in request order
    pub tool_calls: Vec<ToolCall>,
    /// Provider-reported finish reason ("stop", "tool_calls", ...)
    pub finish_reason: Option<String>,
}

impl AssistantTurn {
    /// A plain text turn with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        Self {
            content: Some(content.into()),
            finish_reason: Some("stop".to_string()),
            ..Default::default()
        }
    }

    /// A tool-bearing turn.
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        Self {
            tool_calls,
            finish_reason: Some("tool_calls".to_string()),
            ..Default::default()
        }
    }
}

/// Produces the next assistant turn for an accumulated conversation.
///
/// Implementations wrap a chat-completion transport. The tool-choice policy
/// is always "auto": the catalog is declared on every request and the model
/// decides whether to call. Implementations must observe `cancel` promptly
/// (propagate it into the underlying request, not poll it afterwards) and
/// return [`LorecallError::Cancelled`] when it fires mid-flight.
#[async_trait]
pub trait TurnProvider: Send + Sync {
    async fn next_turn(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        cancel: &CancellationToken,
    ) -> Result<AssistantTurn, LorecallError>;
}

/// Optional delegate that answers chapter questions, typically by calling a
/// model over the chapter's full text. When absent (or failing), the
/// dispatcher falls back to stored chapter summaries.
#[async_trait]
pub trait ChapterAnswerer: Send + Sync {
    /// Answer a question about a single chapter.
    async fn answer_chapter(
        &self,
        chapter: &Chapter,
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<String, LorecallError>;

    /// Answer a question about a contiguous run of chapters.
    async fn answer_range(
        &self,
        chapters: &[&Chapter],
        question: &str,
        cancel: &CancellationToken,
    ) -> Result<String, LorecallError>;
}
