//! Prompt rendering for the retrieval conversation.

use crate::models::RetrievalContext;

/// Renders the fixed texts of a session: the system instruction, the initial
/// user prompt, and the corrective nudge for turns without tool calls.
///
/// Implementations do template substitution only; control logic belongs to
/// the controller. The host application can swap in its own renderer to
/// match its prompt templates.
pub trait PromptRenderer: Send + Sync {
    fn system_instruction(&self, ctx: &RetrievalContext) -> String;
    fn initial_prompt(&self, ctx: &RetrievalContext) -> String;
    fn nudge(&self) -> String;
}

/// Default renderer with built-in templates.
#[derive(Debug, Clone, Copy, Default)]
pub struct TemplatePromptRenderer;

impl PromptRenderer for TemplatePromptRenderer {
    fn system_instruction(&self, ctx: &RetrievalContext) -> String {
        let mut frame = String::new();
        if !ctx.frame.mode.is_empty() {
            frame.push_str(&format!("\nNarration mode: {}.", ctx.frame.mode));
        }
        if !ctx.frame.pov.is_empty() {
            frame.push_str(&format!(" Point of view: {}.", ctx.frame.pov));
        }
        if !ctx.frame.tense.is_empty() {
            frame.push_str(&format!(" Tense: {}.", ctx.frame.tense));
        }
        format!(
            "You are a story archivist. A narrative question needs context from \
             earlier chapters. Use the provided tools to look up past chapters and \
             lorebook entries, then call finish_retrieval with a concise synthesis \
             of everything relevant. The story has {} past chapters and {} lorebook \
             entries.{}\nOnly facts retrieved through tools may appear in the \
             synthesis. When nothing relevant exists, finish with an empty summary \
             rather than inventing history.",
            ctx.chapters.len(),
            ctx.entries.len(),
            frame,
        )
    }

    fn initial_prompt(&self, ctx: &RetrievalContext) -> String {
        let mut prompt = format!(
            "Question needing historical context:\n{}\n",
            ctx.question.trim()
        );
        if !ctx.recent_entries.is_empty() {
            prompt.push_str("\nRecent narrative (newest last):\n");
            for entry in &ctx.recent_entries {
                prompt.push_str("- ");
                prompt.push_str(entry.trim());
                prompt.push('\n');
            }
        }
        prompt.push_str(
            "\nDecide which past chapters or entries to consult, query them, and \
             finish with a synthesis.",
        );
        prompt
    }

    fn nudge(&self) -> String {
        "You responded without calling a tool. Either call one of the provided \
         tools to gather more context, or call finish_retrieval with your \
         synthesis so far."
            .to_string()
    }
}
