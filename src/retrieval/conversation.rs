//! The session's append-only conversation log.

use crate::models::{Message, Role, ToolCall};

/// Ordered, append-only log of turns within one retrieval session.
///
/// Corrections happen by appending new messages, never by mutating past
/// ones. Tool results are appended through [`Conversation::push_tool_result`]
/// so that every tool message carries the id of the call it answers; the
/// controller appends them in request order, which keeps the log alternating
/// the way function-calling providers require.
#[derive(Debug, Default)]
pub struct Conversation {
    messages: Vec<Message>,
}

impl Conversation {
    /// Seed a conversation with the system instruction and initial prompt.
    pub fn seeded(system: impl Into<String>, initial: impl Into<String>) -> Self {
        Self {
            messages: vec![Message::system(system), Message::user(initial)],
        }
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// Append an assistant turn.
    pub fn push_assistant(
        &mut self,
        content: Option<String>,
        tool_calls: Vec<ToolCall>,
        reasoning: Option<String>,
    ) {
        self.messages
            .push(Message::assistant(content, tool_calls, reasoning));
    }

    /// Append a corrective user message (the no-tool-call nudge).
    pub fn push_user(&mut self, content: impl Into<String>) {
        self.messages.push(Message::user(content));
    }

    /// Append a tool result correlated to its requesting call.
    pub fn push_tool_result(&mut self, tool_call_id: &str, payload: impl Into<String>) {
        self.messages.push(Message::tool(tool_call_id, payload));
    }

    /// Ids of the calls requested by the last assistant message, in request
    /// order. Empty when the last message is not a tool-bearing assistant
    /// turn.
    pub fn pending_call_ids(&self) -> Vec<&str> {
        match self.messages.last() {
            Some(msg) if msg.role == Role::Assistant => {
                msg.tool_calls.iter().map(|c| c.id.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}
