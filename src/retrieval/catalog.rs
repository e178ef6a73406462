//! The fixed capability surface the model is allowed to invoke.
//!
//! Five tools, versioned alongside the protocol. Dispatch happens over the
//! [`ToolName`] enum so an unlisted tool name is a compile-time-visible
//! change, never an open-ended string lookup.

use serde::Serialize;
use serde_json::{json, Value};

/// Catalog version sent with the protocol. Bump when tool names or
/// parameter contracts change.
pub const CATALOG_VERSION: &str = "1";

/// The five callable capabilities.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolName {
    ListChapters,
    QueryChapter,
    QueryChapters,
    ListEntries,
    FinishRetrieval,
}

impl ToolName {
    pub const ALL: [ToolName; 5] = [
        ToolName::ListChapters,
        ToolName::QueryChapter,
        ToolName::QueryChapters,
        ToolName::ListEntries,
        ToolName::FinishRetrieval,
    ];

    /// Wire name as declared to the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::ListChapters => "list_chapters",
            ToolName::QueryChapter => "query_chapter",
            ToolName::QueryChapters => "query_chapters",
            ToolName::ListEntries => "list_entries",
            ToolName::FinishRetrieval => "finish_retrieval",
        }
    }

    /// Resolve a requested function name. `None` means the model asked for
    /// something outside the declared surface.
    pub fn parse(name: &str) -> Option<Self> {
        match name {
            "list_chapters" => Some(ToolName::ListChapters),
            "query_chapter" => Some(ToolName::QueryChapter),
            "query_chapters" => Some(ToolName::QueryChapters),
            "list_entries" => Some(ToolName::ListEntries),
            "finish_retrieval" => Some(ToolName::FinishRetrieval),
            _ => None,
        }
    }
}

impl std::fmt::Display for ToolName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A tool declaration in function-calling wire shape:
/// `{"type": "function", "function": {name, description, parameters}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ToolDefinition {
    #[serde(rename = "type")]
    pub kind: &'static str,
    pub function: FunctionSpec,
}

/// The function half of a [`ToolDefinition`].
#[derive(Debug, Clone, Serialize)]
pub struct FunctionSpec {
    pub name: &'static str,
    pub description: &'static str,
    pub parameters: Value,
}

fn tool(name: ToolName, description: &'static str, parameters: Value) -> ToolDefinition {
    ToolDefinition {
        kind: "function",
        function: FunctionSpec {
            name: name.as_str(),
            description,
            parameters,
        },
    }
}

/// Build the full catalog sent with every model turn.
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool(
            ToolName::ListChapters,
            "List every past chapter with its number, title, summary, characters, \
             locations and plot threads. Use this first to see what history exists.",
            json!({
                "type": "object",
                "properties": {},
                "required": []
            }),
        ),
        tool(
            ToolName::QueryChapter,
            "Ask a question about a single past chapter and get an answer grounded \
             in that chapter's content.",
            json!({
                "type": "object",
                "properties": {
                    "chapter_number": {
                        "type": "number",
                        "description": "The chapter to query"
                    },
                    "question": {
                        "type": "string",
                        "description": "What you want to know about this chapter"
                    }
                },
                "required": ["chapter_number", "question"]
            }),
        ),
        tool(
            ToolName::QueryChapters,
            "Ask a question about a contiguous range of past chapters. The range is \
             capped at three chapters per call; query again for more.",
            json!({
                "type": "object",
                "properties": {
                    "start_chapter": {
                        "type": "number",
                        "description": "First chapter of the range (inclusive)"
                    },
                    "end_chapter": {
                        "type": "number",
                        "description": "Last chapter of the range (inclusive)"
                    },
                    "question": {
                        "type": "string",
                        "description": "What you want to know about these chapters"
                    }
                },
                "required": ["start_chapter", "end_chapter", "question"]
            }),
        ),
        tool(
            ToolName::ListEntries,
            "List lorebook entries (characters, locations, items, factions, \
             concepts, events), optionally filtered by type.",
            json!({
                "type": "object",
                "properties": {
                    "type": {
                        "type": "string",
                        "enum": ["character", "location", "item", "faction", "concept", "event"],
                        "description": "Only return entries of this type"
                    }
                },
                "required": []
            }),
        ),
        tool(
            ToolName::FinishRetrieval,
            "Finish the retrieval session. Call this exactly once, when you have \
             gathered enough context, with a synthesis of everything relevant.",
            json!({
                "type": "object",
                "properties": {
                    "summary": {
                        "type": "string",
                        "description": "The synthesized context relevant to the question"
                    }
                },
                "required": ["summary"]
            }),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_declares_exactly_five_tools() {
        let defs = tool_definitions();
        assert_eq!(defs.len(), 5);
        let names: Vec<&str> = defs.iter().map(|d| d.function.name).collect();
        assert_eq!(
            names,
            vec![
                "list_chapters",
                "query_chapter",
                "query_chapters",
                "list_entries",
                "finish_retrieval"
            ]
        );
    }

    #[test]
    fn test_every_declared_name_parses_back() {
        for def in tool_definitions() {
            assert!(ToolName::parse(def.function.name).is_some());
        }
        assert_eq!(ToolName::parse("delete_chapter"), None);
    }

    #[test]
    fn test_wire_shape_matches_function_calling_protocol() {
        let defs = tool_definitions();
        let wire = serde_json::to_value(&defs[1]).expect("serializable");
        assert_eq!(wire["type"], "function");
        assert_eq!(wire["function"]["name"], "query_chapter");
        assert_eq!(
            wire["function"]["parameters"]["required"],
            serde_json::json!(["chapter_number", "question"])
        );
    }

    #[test]
    fn test_finish_requires_summary() {
        let defs = tool_definitions();
        let finish = defs
            .iter()
            .find(|d| d.function.name == "finish_retrieval")
            .expect("finish tool declared");
        assert_eq!(
            finish.function.parameters["required"],
            serde_json::json!(["summary"])
        );
    }
}
