pub mod chapter;
pub mod context;
pub mod entry;
pub mod message;

pub use chapter::Chapter;
pub use context::{RetrievalContext, StoryFrame};
pub use entry::{Entry, EntryType};
pub use message::{Message, Role, ToolCall};
