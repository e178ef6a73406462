use serde::{Deserialize, Serialize};

/// Kind of a lorebook entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    Character,
    Location,
    Item,
    Faction,
    Concept,
    Event,
}

impl EntryType {
    /// Wire name as sent to and received from the model.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Character => "character",
            EntryType::Location => "location",
            EntryType::Item => "item",
            EntryType::Faction => "faction",
            EntryType::Concept => "concept",
            EntryType::Event => "event",
        }
    }

    /// Parse a wire name back into a type. Returns `None` for anything
    /// outside the six known kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "character" => Some(EntryType::Character),
            "location" => Some(EntryType::Location),
            "item" => Some(EntryType::Item),
            "faction" => Some(EntryType::Faction),
            "concept" => Some(EntryType::Concept),
            "event" => Some(EntryType::Event),
            _ => None,
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A lorebook entry — an immutable snapshot supplied by the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entry {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub entry_type: EntryType,
    pub description: String,
    #[serde(default)]
    pub aliases: Vec<String>,
}
