pub mod aggregate;
pub mod catalog;
pub mod controller;
pub mod conversation;
pub mod dispatch;
pub mod prompt;
pub mod provider;

pub use aggregate::{RetrievalLedger, RetrievalResult};
pub use catalog::{tool_definitions, FunctionSpec, ToolDefinition, ToolName, CATALOG_VERSION};
pub use controller::{ContextRetriever, RetrievalConfig};
pub use conversation::Conversation;
pub use dispatch::{DispatchOutcome, ToolDispatcher, MAX_RANGE_SPAN};
pub use prompt::{PromptRenderer, TemplatePromptRenderer};
pub use provider::{AssistantTurn, ChapterAnswerer, TurnProvider};
