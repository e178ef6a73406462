//! Maps requested tool calls onto the read-only retrieval context.
//!
//! Argument payloads are healed before use and every outcome is a structured
//! JSON payload the model can parse on its next turn. Nothing in here fails
//! the session: unknown tools, missing chapters and unusable arguments all
//! come back as error payloads.

use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::models::{Chapter, EntryType, RetrievalContext, ToolCall};
use crate::retrieval::aggregate::RetrievalLedger;
use crate::retrieval::catalog::ToolName;
use crate::retrieval::provider::ChapterAnswerer;
use crate::utils::heal_json;

/// Widest span a single `query_chapters` call may cover: `start + 2`, three
/// chapters inclusive. Bounds the cost of one range query.
pub const MAX_RANGE_SPAN: u32 = 2;

/// Outcome of dispatching one tool call.
#[derive(Debug)]
pub struct DispatchOutcome {
    /// Structured payload appended to the conversation as the tool result
    pub payload: Value,
    /// True when this call was a successful `finish_retrieval`
    pub finished: bool,
}

impl DispatchOutcome {
    fn ok(payload: Value) -> Self {
        Self {
            payload,
            finished: false,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            payload: json!({ "error": message.into() }),
            finished: false,
        }
    }
}

/// Executes tool calls against the session's read-only context.
pub struct ToolDispatcher<'a> {
    ctx: &'a RetrievalContext,
    answerer: Option<&'a dyn ChapterAnswerer>,
}

impl<'a> ToolDispatcher<'a> {
    pub fn new(ctx: &'a RetrievalContext, answerer: Option<&'a dyn ChapterAnswerer>) -> Self {
        Self { ctx, answerer }
    }

    /// Execute one call, recording consulted chapters into `ledger`.
    pub async fn dispatch(
        &self,
        call: &ToolCall,
        ledger: &mut RetrievalLedger,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let Some(tool) = ToolName::parse(&call.name) else {
            warn!(tool = %call.name, "model requested a tool outside the catalog");
            return DispatchOutcome::error(format!(
                "unknown tool '{}'; available tools: list_chapters, query_chapter, \
                 query_chapters, list_entries, finish_retrieval",
                call.name
            ));
        };

        let args = heal_json(&call.arguments);
        debug!(tool = %tool, call_id = %call.id, "dispatching tool call");

        match tool {
            ToolName::ListChapters => self.list_chapters(),
            ToolName::QueryChapter => self.query_chapter(&args, ledger, cancel).await,
            ToolName::QueryChapters => self.query_chapters(&args, ledger, cancel).await,
            ToolName::ListEntries => self.list_entries(&args),
            ToolName::FinishRetrieval => finish_retrieval(&args, ledger),
        }
    }

    fn list_chapters(&self) -> DispatchOutcome {
        let chapters = serde_json::to_value(&self.ctx.chapters).unwrap_or_else(|_| json!([]));
        DispatchOutcome::ok(chapters)
    }

    async fn query_chapter(
        &self,
        args: &Value,
        ledger: &mut RetrievalLedger,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let Some(number) = read_u32(args, "chapter_number") else {
            return DispatchOutcome::error("query_chapter requires a numeric 'chapter_number'");
        };
        let question = read_str(args, "question");

        let Some(chapter) = self.ctx.chapter(number) else {
            return DispatchOutcome::error(format!("chapter {} not found", number));
        };

        ledger.record_chapter(number);
        let answer = self.answer_single(chapter, question, cancel).await;

        DispatchOutcome::ok(json!({
            "chapter_number": number,
            "title": chapter.title,
            "answer": answer,
        }))
    }

    async fn query_chapters(
        &self,
        args: &Value,
        ledger: &mut RetrievalLedger,
        cancel: &CancellationToken,
    ) -> DispatchOutcome {
        let (Some(start), Some(end)) = (
            read_u32(args, "start_chapter"),
            read_u32(args, "end_chapter"),
        ) else {
            return DispatchOutcome::error(
                "query_chapters requires numeric 'start_chapter' and 'end_chapter'",
            );
        };
        if end < start {
            return DispatchOutcome::error(format!(
                "invalid range: end_chapter {} is before start_chapter {}",
                end, start
            ));
        }
        let question = read_str(args, "question");

        let clamped_end = end.min(start.saturating_add(MAX_RANGE_SPAN));
        if clamped_end != end {
            debug!(start, requested_end = end, clamped_end, "chapter range clamped");
        }

        let chapters: Vec<&Chapter> = (start..=clamped_end)
            .filter_map(|n| self.ctx.chapter(n))
            .collect();
        if chapters.is_empty() {
            return DispatchOutcome::error(format!(
                "no chapters found in range {}-{}",
                start, clamped_end
            ));
        }

        for chapter in &chapters {
            ledger.record_chapter(chapter.number);
        }
        let answer = self.answer_range(&chapters, question, cancel).await;

        DispatchOutcome::ok(json!({
            "start_chapter": start,
            "end_chapter": clamped_end,
            "chapters_consulted": chapters.iter().map(|c| c.number).collect::<Vec<_>>(),
            "answer": answer,
        }))
    }

    fn list_entries(&self, args: &Value) -> DispatchOutcome {
        let filter = match args.get("type").and_then(|v| v.as_str()) {
            Some(raw) => match EntryType::parse(raw) {
                Some(ty) => Some(ty),
                None => {
                    return DispatchOutcome::error(format!(
                        "unknown entry type '{}'; expected one of: character, location, \
                         item, faction, concept, event",
                        raw
                    ));
                }
            },
            None => None,
        };

        let entries: Vec<Value> = self
            .ctx
            .entries
            .iter()
            .filter(|e| filter.is_none_or(|ty| e.entry_type == ty))
            .map(|e| serde_json::to_value(e).unwrap_or_else(|_| json!({})))
            .collect();
        DispatchOutcome::ok(Value::Array(entries))
    }

    /// Answer via the delegate when available; fall back to the stored
    /// summary when the delegate is absent or fails.
    async fn answer_single(
        &self,
        chapter: &Chapter,
        question: &str,
        cancel: &CancellationToken,
    ) -> String {
        if let Some(answerer) = self.answerer {
            match answerer.answer_chapter(chapter, question, cancel).await {
                Ok(answer) => return answer,
                Err(err) => {
                    warn!(chapter = chapter.number, error = %err,
                        "chapter answerer failed, falling back to summary");
                }
            }
        }
        chapter.summary.clone()
    }

    async fn answer_range(
        &self,
        chapters: &[&Chapter],
        question: &str,
        cancel: &CancellationToken,
    ) -> String {
        if let Some(answerer) = self.answerer {
            match answerer.answer_range(chapters, question, cancel).await {
                Ok(answer) => return answer,
                Err(err) => {
                    warn!(error = %err, "range answerer failed, falling back to summaries");
                }
            }
        }
        chapters
            .iter()
            .map(|c| format!("Chapter {} ({}): {}", c.number, c.title, c.summary))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

fn finish_retrieval(args: &Value, ledger: &mut RetrievalLedger) -> DispatchOutcome {
    let Some(summary) = args.get("summary").and_then(|v| v.as_str()) else {
        return DispatchOutcome::error("finish_retrieval requires a 'summary' string");
    };
    ledger.finish(summary.to_string());
    // Acknowledgment only; the summary itself lives in the ledger.
    DispatchOutcome {
        payload: json!({ "status": "retrieval complete" }),
        finished: true,
    }
}

/// Read a numeric field, tolerating models that send numbers as strings.
fn read_u32(args: &Value, key: &str) -> Option<u32> {
    match args.get(key) {
        Some(Value::Number(n)) => n.as_u64().and_then(|v| u32::try_from(v).ok()),
        Some(Value::String(s)) => s.trim().parse().ok(),
        _ => None,
    }
}

fn read_str<'v>(args: &'v Value, key: &str) -> &'v str {
    args.get(key).and_then(|v| v.as_str()).unwrap_or_default()
}
