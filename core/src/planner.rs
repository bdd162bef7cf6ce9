//! Groups each chat's messages by year and records which transcripts
//! contributed to each year, ahead of media resolution and dependency
//! comparison.

use crate::chat_data::{Chat, ChatData, OutputFile};
use crate::file_id::FileId;
use std::collections::BTreeSet;

/// Recompute `output_files` for every chat in `data` from its messages.
/// Any pre-existing `output_files` are discarded and rebuilt from scratch —
/// the dependency checker is responsible for diffing against the old
/// generation, not this component.
pub fn plan(data: &mut ChatData, css_dependency: FileId) {
    for chat in data.chats.values_mut() {
        plan_chat(chat, &css_dependency);
    }
}

fn plan_chat(chat: &mut Chat, css_dependency: &FileId) {
    let mut by_year: std::collections::BTreeMap<i32, BTreeSet<FileId>> = std::collections::BTreeMap::new();
    for msg in &chat.messages {
        by_year
            .entry(msg.year)
            .or_default()
            .insert(msg.input_file_id.clone());
    }

    chat.output_files.clear();
    for (year, chat_dependencies) in by_year {
        let mut output_file = OutputFile::new(year, css_dependency.clone());
        output_file.chat_dependencies = chat_dependencies;
        chat.output_files.insert(year, output_file);
    }
}
