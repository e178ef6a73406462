//! The iteration controller: a bounded state machine driving the
//! tool-calling conversation.
//!
//! Each session walks `Idle → Requesting → {ExecutingTools, Retrying,
//! Completing, Aborting, Exhausted} → Terminated`. The loop is bounded two
//! ways: a hard cap on model turns and a cap on consecutive turns without
//! tool calls, so a model that refuses to cooperate can only waste a couple
//! of requests. Termination is never an error from the caller's point of
//! view — the session always yields a [`RetrievalResult`], possibly with an
//! empty context.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn, Instrument};
use uuid::Uuid;

use crate::error::LorecallError;
use crate::models::{RetrievalContext, ToolCall};
use crate::retrieval::aggregate::{RetrievalLedger, RetrievalResult};
use crate::retrieval::catalog::tool_definitions;
use crate::retrieval::conversation::Conversation;
use crate::retrieval::dispatch::ToolDispatcher;
use crate::retrieval::prompt::PromptRenderer;
use crate::retrieval::provider::{ChapterAnswerer, TurnProvider};

/// Bounds for one retrieval session.
#[derive(Debug, Clone)]
pub struct RetrievalConfig {
    /// Maximum model turns per session
    pub max_iterations: usize,
    /// Consecutive turns without tool calls before giving up
    pub no_tool_call_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            no_tool_call_limit: 2,
        }
    }
}

/// Controller states. Terminal states are mutually exclusive and are never
/// re-entered.
enum Phase {
    Idle,
    Requesting,
    ExecutingTools(Vec<ToolCall>),
    Retrying,
    Completing,
    Aborting,
    Exhausted,
    Terminated,
}

/// The agentic retrieval orchestrator.
///
/// One call to [`retrieve`](ContextRetriever::retrieve) is one session:
/// fresh conversation, fresh consulted-chapter set, nothing shared between
/// calls. The retriever itself is cheap to clone and safe to share.
#[derive(Clone)]
pub struct ContextRetriever {
    provider: Arc<dyn TurnProvider>,
    renderer: Arc<dyn PromptRenderer>,
    answerer: Option<Arc<dyn ChapterAnswerer>>,
    config: RetrievalConfig,
}

impl ContextRetriever {
    pub fn new(provider: Arc<dyn TurnProvider>, renderer: Arc<dyn PromptRenderer>) -> Self {
        Self {
            provider,
            renderer,
            answerer: None,
            config: RetrievalConfig::default(),
        }
    }

    /// Attach a chapter-answering delegate. Without one, chapter queries
    /// answer from stored summaries.
    pub fn with_answerer(mut self, answerer: Arc<dyn ChapterAnswerer>) -> Self {
        self.answerer = Some(answerer);
        self
    }

    pub fn with_config(mut self, config: RetrievalConfig) -> Self {
        self.config = config;
        self
    }

    /// Run one retrieval session for `ctx.question`.
    ///
    /// Always returns a result: cancellation, provider failure and
    /// uncooperative models all degrade to a partial (possibly empty)
    /// context rather than an error.
    pub async fn retrieve(
        &self,
        ctx: &RetrievalContext,
        cancel: CancellationToken,
    ) -> RetrievalResult {
        let session_id = Uuid::new_v4();
        let span = tracing::info_span!("retrieval_session", %session_id);
        self.run_session(ctx, cancel, session_id)
            .instrument(span)
            .await
    }

    async fn run_session(
        &self,
        ctx: &RetrievalContext,
        cancel: CancellationToken,
        session_id: Uuid,
    ) -> RetrievalResult {
        let tools = tool_definitions();
        let dispatcher = ToolDispatcher::new(ctx, self.answerer.as_deref());
        let mut conversation = Conversation::default();
        let mut ledger = RetrievalLedger::new();
        let mut iterations = 0usize;
        let mut no_tool_streak = 0usize;
        let mut phase = Phase::Idle;

        loop {
            phase = match phase {
                Phase::Idle => {
                    conversation = Conversation::seeded(
                        self.renderer.system_instruction(ctx),
                        self.renderer.initial_prompt(ctx),
                    );
                    debug!(
                        chapters = ctx.chapters.len(),
                        entries = ctx.entries.len(),
                        "session seeded"
                    );
                    Phase::Requesting
                }

                Phase::Requesting => {
                    if cancel.is_cancelled() {
                        info!(iterations, "cancelled before model turn");
                        Phase::Aborting
                    } else if iterations >= self.config.max_iterations {
                        warn!(iterations, "iteration limit reached");
                        Phase::Exhausted
                    } else {
                        iterations += 1;
                        debug!(iteration = iterations, "requesting model turn");
                        match self
                            .provider
                            .next_turn(conversation.messages(), &tools, &cancel)
                            .await
                        {
                            Ok(turn) => {
                                conversation.push_assistant(
                                    turn.content,
                                    turn.tool_calls.clone(),
                                    turn.reasoning,
                                );
                                if turn.tool_calls.is_empty() {
                                    no_tool_streak += 1;
                                    if no_tool_streak >= self.config.no_tool_call_limit {
                                        warn!(
                                            streak = no_tool_streak,
                                            "model stopped calling tools"
                                        );
                                        Phase::Exhausted
                                    } else {
                                        Phase::Retrying
                                    }
                                } else {
                                    no_tool_streak = 0;
                                    Phase::ExecutingTools(turn.tool_calls)
                                }
                            }
                            Err(LorecallError::Cancelled) => {
                                info!(iterations, "cancelled during model turn");
                                Phase::Aborting
                            }
                            Err(err) => {
                                error!(error = %err, "turn provider failed, aborting session");
                                Phase::Aborting
                            }
                        }
                    }
                }

                Phase::ExecutingTools(calls) => {
                    // Sequential, in request order: later calls may assume
                    // earlier side effects (the consulted set) are visible.
                    let mut finished = false;
                    for call in &calls {
                        let outcome = dispatcher.dispatch(call, &mut ledger, &cancel).await;
                        finished |= outcome.finished;
                        conversation.push_tool_result(&call.id, outcome.payload.to_string());
                    }
                    if finished {
                        Phase::Completing
                    } else {
                        Phase::Requesting
                    }
                }

                Phase::Retrying => {
                    debug!("no tool calls in turn, nudging model");
                    conversation.push_user(self.renderer.nudge());
                    Phase::Requesting
                }

                Phase::Completing => {
                    info!(
                        iterations,
                        consulted = ledger.consulted().len(),
                        "retrieval complete"
                    );
                    Phase::Terminated
                }

                Phase::Aborting => Phase::Terminated,

                Phase::Exhausted => {
                    info!(
                        iterations,
                        consulted = ledger.consulted().len(),
                        "retrieval exhausted without finishing"
                    );
                    Phase::Terminated
                }

                Phase::Terminated => break,
            };
        }

        ledger.into_result(iterations, session_id)
    }
}
