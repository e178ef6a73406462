use serde::{Deserialize, Serialize};

/// A completed chapter of the story, as summarized by the host application.
///
/// Chapters are immutable for the duration of a retrieval session and owned
/// by the calling context; the orchestrator only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Chapter {
    /// Chapter number (unique, monotonically increasing)
    pub number: u32,
    pub title: String,
    /// Prose summary of the chapter's events
    pub summary: String,
    /// Names of characters appearing in the chapter
    #[serde(default)]
    pub characters: Vec<String>,
    /// Names of locations visited in the chapter
    #[serde(default)]
    pub locations: Vec<String>,
    /// Plot-thread labels active in the chapter
    #[serde(default)]
    pub plot_threads: Vec<String>,
}

impl Chapter {
    /// Create a chapter with just a number, title and summary.
    ///
    /// Character/location/thread sets start empty; callers fill them in
    /// when their chapter records carry that metadata.
    pub fn new(number: u32, title: impl Into<String>, summary: impl Into<String>) -> Self {
        Self {
            number,
            title: title.into(),
            summary: summary.into(),
            characters: Vec::new(),
            locations: Vec::new(),
            plot_threads: Vec::new(),
        }
    }
}
