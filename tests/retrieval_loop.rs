//! Controller behavior: termination, bounds, cancellation, partial results.

mod common;

use std::sync::Arc;

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tokio_util::sync::CancellationToken;

use common::{init_tracing, sample_context, ScriptedProvider};
use lorecall::{
    AssistantTurn, ContextRetriever, LorecallError, RetrievalConfig, Role, TemplatePromptRenderer,
    ToolCall,
};

fn query_call(id: &str, chapter: u32) -> ToolCall {
    ToolCall::new(
        id,
        "query_chapter",
        format!(r#"{{"chapter_number": {}, "question": "Q"}}"#, chapter),
    )
}

fn finish_call(id: &str, summary: &str) -> ToolCall {
    ToolCall::new(
        id,
        "finish_retrieval",
        serde_json::json!({ "summary": summary }).to_string(),
    )
}

fn retriever(provider: Arc<ScriptedProvider>) -> ContextRetriever {
    ContextRetriever::new(provider, Arc::new(TemplatePromptRenderer))
}

#[tokio::test]
async fn finish_summary_surfaces_verbatim() {
    init_tracing();
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(AssistantTurn::tools(vec![query_call("c1", 2)])),
        Ok(AssistantTurn::tools(vec![finish_call(
            "c2",
            "The keeper vanished in chapter 2.",
        )])),
    ]));
    let result = retriever(provider.clone())
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;

    assert_eq!(result.context, "The keeper vanished in chapter 2.");
    assert_eq!(result.consulted_chapters, vec![2]);
    assert_eq!(result.iterations, 2);
}

#[tokio::test]
async fn iterations_never_exceed_configured_maximum() {
    // A model that calls tools forever.
    let script: Vec<_> = (0..20)
        .map(|i| Ok(AssistantTurn::tools(vec![query_call(&format!("c{}", i), 1)])))
        .collect();
    let provider = Arc::new(ScriptedProvider::new(script));
    let result = retriever(provider)
        .with_config(RetrievalConfig {
            max_iterations: 3,
            ..Default::default()
        })
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;

    assert_eq!(result.iterations, 3);
    assert_eq!(result.context, "");
    // Chapter 1 queried three times, consulted once.
    assert_eq!(result.consulted_chapters, vec![1]);
}

#[tokio::test]
async fn two_text_turns_exhaust_the_session() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(AssistantTurn::text("I think the answer is...")),
        Ok(AssistantTurn::text("Let me reason about this.")),
    ]));
    let result = retriever(provider.clone())
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;

    assert_eq!(result.iterations, 2);
    assert_eq!(result.context, "");
    assert!(result.consulted_chapters.is_empty());

    // The first refusal earns a corrective nudge, visible to the second call.
    let seen = provider.seen();
    assert_eq!(seen.len(), 2);
    let last = seen[1].last().expect("second call saw messages");
    assert_eq!(last.role, Role::User);
    assert!(last
        .content
        .as_deref()
        .unwrap_or_default()
        .contains("without calling a tool"));
}

#[tokio::test]
async fn tool_turn_resets_the_no_tool_counter() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(AssistantTurn::text("thinking")),
        Ok(AssistantTurn::tools(vec![query_call("c1", 4)])),
        Ok(AssistantTurn::text("thinking again")),
        Ok(AssistantTurn::text("still thinking")),
    ]));
    let result = retriever(provider)
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;

    // The session survives the first refusal because the tool turn reset
    // the counter; only the second consecutive pair exhausts it.
    assert_eq!(result.iterations, 4);
    assert_eq!(result.consulted_chapters, vec![4]);
    assert_eq!(result.context, "");
}

#[tokio::test]
async fn pre_set_cancellation_terminates_without_a_turn() {
    let provider = Arc::new(ScriptedProvider::new(vec![Ok(AssistantTurn::tools(
        vec![finish_call("c1", "should never be reached")],
    ))]));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = retriever(provider.clone())
        .retrieve(&sample_context(10), cancel)
        .await;

    assert_eq!(result.iterations, 0);
    assert_eq!(result.context, "");
    assert!(result.consulted_chapters.is_empty());
    assert!(provider.seen().is_empty());
}

#[tokio::test]
async fn cancellation_mid_session_preserves_partial_state() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(AssistantTurn::tools(vec![query_call("c1", 7)])),
        Err(LorecallError::Cancelled),
    ]));
    let result = retriever(provider)
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;

    assert_eq!(result.iterations, 2);
    assert_eq!(result.consulted_chapters, vec![7]);
    assert_eq!(result.context, "");
}

#[tokio::test]
async fn provider_failure_degrades_to_partial_result() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(AssistantTurn::tools(vec![query_call("c1", 5)])),
        Err(LorecallError::provider("upstream 502")),
    ]));
    let result = retriever(provider)
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;

    assert_eq!(result.iterations, 2);
    assert_eq!(result.consulted_chapters, vec![5]);
    assert_eq!(result.context, "");
}

#[tokio::test]
async fn tool_results_follow_their_requesting_calls_in_order() {
    let provider = Arc::new(ScriptedProvider::new(vec![
        Ok(AssistantTurn::tools(vec![
            query_call("first", 1),
            query_call("second", 2),
        ])),
        Ok(AssistantTurn::tools(vec![finish_call("c3", "done")])),
    ]));
    let result = retriever(provider.clone())
        .retrieve(&sample_context(10), CancellationToken::new())
        .await;
    assert_eq!(result.context, "done");

    let seen = provider.seen();
    let second_call_log = &seen[1];
    // system, user, assistant, tool(first), tool(second)
    assert_eq!(second_call_log.len(), 5);
    assert_eq!(second_call_log[2].role, Role::Assistant);
    assert_eq!(second_call_log[3].tool_call_id.as_deref(), Some("first"));
    assert_eq!(second_call_log[4].tool_call_id.as_deref(), Some("second"));
}

#[tokio::test]
async fn fresh_session_ids_per_call() {
    let ctx = sample_context(3);
    let make = || {
        Arc::new(ScriptedProvider::new(vec![Ok(AssistantTurn::tools(
            vec![finish_call("c1", "s")],
        ))]))
    };
    let a = retriever(make()).retrieve(&ctx, CancellationToken::new()).await;
    let b = retriever(make()).retrieve(&ctx, CancellationToken::new()).await;
    assert_ne!(a.session_id, b.session_id);
}

proptest! {
    /// For any sequence of tool-calling turns, the consulted set stays
    /// duplicate-free and the iteration bound holds.
    #[test]
    fn consulted_set_dedupes_and_iterations_stay_bounded(
        turns in prop::collection::vec(
            prop::collection::vec(1u32..=30, 1..4),
            1..12,
        )
    ) {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("runtime");
        rt.block_on(async {
            let script: Vec<_> = turns
                .iter()
                .enumerate()
                .map(|(i, chapters)| {
                    let calls = chapters
                        .iter()
                        .enumerate()
                        .map(|(j, &n)| query_call(&format!("c{}_{}", i, j), n))
                        .collect();
                    Ok(AssistantTurn::tools(calls))
                })
                .collect();
            let provider = Arc::new(ScriptedProvider::new(script));
            let result = retriever(provider)
                .with_config(RetrievalConfig { max_iterations: 8, ..Default::default() })
                .retrieve(&sample_context(30), CancellationToken::new())
                .await;

            prop_assert!(result.iterations <= 8);
            let mut deduped = result.consulted_chapters.clone();
            deduped.sort_unstable();
            deduped.dedup();
            prop_assert_eq!(deduped.len(), result.consulted_chapters.len());
            Ok(())
        })?;
    }
}
