//! Builders for retrieval contexts used across integration tests.

use lorecall::{Chapter, Entry, EntryType, RetrievalContext};

/// A story corpus with chapters numbered `1..=chapter_count` and a small
/// mixed lorebook.
pub fn sample_context(chapter_count: u32) -> RetrievalContext {
    let mut ctx = RetrievalContext::new("What does the crew know about the lighthouse keeper?");
    for n in 1..=chapter_count {
        let mut chapter = Chapter::new(
            n,
            format!("Chapter {}", n),
            format!("Summary of chapter {}: the crew sails on.", n),
        );
        chapter.characters = vec!["Mara".into(), "The Keeper".into()];
        chapter.locations = vec!["Grey Gull".into()];
        chapter.plot_threads = vec!["the missing log".into()];
        ctx.chapters.push(chapter);
    }
    ctx.entries = vec![
        entry("e1", "Mara", EntryType::Character),
        entry("e2", "Grey Gull", EntryType::Location),
        entry("e3", "The Lighthouse", EntryType::Location),
        entry("e4", "Brass Sextant", EntryType::Item),
        entry("e5", "Harbor Guild", EntryType::Faction),
    ];
    ctx.recent_entries = vec![
        "The crew anchors near the lighthouse.".into(),
        "Mara studies the keeper's log.".into(),
    ];
    ctx
}

pub fn entry(id: &str, name: &str, entry_type: EntryType) -> Entry {
    Entry {
        id: id.to_string(),
        name: name.to_string(),
        entry_type,
        description: format!("{} description", name),
        aliases: Vec::new(),
    }
}
