pub mod error;
pub mod models;
pub mod retrieval;
pub mod utils;

pub use error::LorecallError;
pub use models::{Chapter, Entry, EntryType, Message, RetrievalContext, Role, StoryFrame, ToolCall};
pub use retrieval::{
    AssistantTurn, ChapterAnswerer, ContextRetriever, PromptRenderer, RetrievalConfig,
    RetrievalResult, TemplatePromptRenderer, TurnProvider,
};
