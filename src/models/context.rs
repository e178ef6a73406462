use serde::{Deserialize, Serialize};

use crate::models::{Chapter, Entry};

/// Narration settings used only for prompt rendering.
///
/// Free-form strings because the host application owns the vocabulary
/// (e.g. mode "adventure" vs "story", POV "second", tense "present").
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoryFrame {
    #[serde(default)]
    pub mode: String,
    #[serde(default)]
    pub pov: String,
    #[serde(default)]
    pub tense: String,
}

/// Read-only bundle handed to the orchestrator at session start.
///
/// Never mutated by the orchestrator; may be shared across concurrent
/// sessions since all access is by reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalContext {
    /// The question needing historical context
    pub question: String,
    /// Recent narrative entries, oldest first, already rendered to text
    #[serde(default)]
    pub recent_entries: Vec<String>,
    /// All completed chapters of the story
    #[serde(default)]
    pub chapters: Vec<Chapter>,
    /// All lorebook entries
    #[serde(default)]
    pub entries: Vec<Entry>,
    /// Narration settings for prompt rendering
    #[serde(default)]
    pub frame: StoryFrame,
}

impl RetrievalContext {
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            recent_entries: Vec::new(),
            chapters: Vec::new(),
            entries: Vec::new(),
            frame: StoryFrame::default(),
        }
    }

    /// Look up a chapter by number.
    pub fn chapter(&self, number: u32) -> Option<&Chapter> {
        self.chapters.iter().find(|c| c.number == number)
    }
}
