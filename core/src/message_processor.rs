//! Merges historical and freshly parsed chats into one ordered, deduplicated
//! transcript per conversation.

use crate::chat_data::{Chat, ChatData, ChatName, Message};
use crate::file_id::FileId;
use crate::parser::parse_transcript;
use crate::vfs::{FileHandle, Vfs};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

struct Contribution {
    file_id: FileId,
    mtime: f64,
    handle: Arc<FileHandle>,
    messages: Vec<Message>,
}

/// Build the new `ChatData.chats` by combining `previous` with everything
/// the VFS's `_chat.txt` handles parse to. `previous` also seeds the set of
/// file ids the processor must not re-parse (history wins on an id match).
pub fn process(vfs: &Vfs, previous: &ChatData) -> ChatData {
    let mut contributions: HashMap<ChatName, Vec<Contribution>> = HashMap::new();
    let mut already_contributed: HashSet<FileId> = HashSet::new();

    for (name, chat) in &previous.chats {
        let mut by_file: HashMap<FileId, Vec<Message>> = HashMap::new();
        for msg in &chat.messages {
            by_file.entry(msg.input_file_id.clone()).or_default().push(msg.clone());
        }
        for (file_id, messages) in by_file {
            let handle = vfs
                .by_id(&file_id)
                .unwrap_or_else(|| Arc::new(FileHandle::new("", 0, 0.0).nonexistent()));
            already_contributed.insert(file_id.clone());
            contributions.entry(name.clone()).or_default().push(Contribution {
                file_id,
                mtime: handle.mtime,
                handle,
                messages,
            });
        }
    }

    let mut chat_txt_handles: Vec<Arc<FileHandle>> = vfs
        .all_handles()
        .filter(|h| h.exists && h.basename() == "_chat.txt")
        .cloned()
        .collect();
    chat_txt_handles.sort_by(|a, b| a.path.cmp(&b.path));

    for handle in chat_txt_handles {
        let id = handle.id();
        if already_contributed.contains(&id) {
            continue;
        }
        let text = match vfs.read_to_string(&handle) {
            Ok(t) => t,
            Err(err) => {
                tracing::warn!(path = %handle.path, %err, "could not read transcript");
                continue;
            }
        };
        let chat = match parse_transcript(&text, id.clone()) {
            Ok(chat) => chat,
            Err(err) => {
                tracing::error!(path = %handle.path, %err, "could not parse transcript");
                continue;
            }
        };
        contributions
            .entry(chat.chat_name.clone())
            .or_default()
            .push(Contribution {
                file_id: id,
                mtime: handle.mtime,
                handle,
                messages: chat.messages,
            });
    }

    let mut new_data = ChatData::new();
    new_data.run_timestamp = previous.run_timestamp.clone();

    for (name, mut contribs) in contributions {
        contribs.sort_by(|a, b| a.mtime.partial_cmp(&b.mtime).unwrap_or(std::cmp::Ordering::Equal));

        let mut chat = Chat::new(name.clone());
        let mut seen: HashSet<(String, String, String)> = HashSet::new();

        for contrib in &contribs {
            new_data
                .input_files
                .insert(contrib.file_id.clone(), (*contrib.handle).clone());
            for msg in &contrib.messages {
                let key = (msg.timestamp.clone(), msg.sender.clone(), msg.content.clone());
                if seen.insert(key) {
                    chat.messages.push(msg.clone());
                }
            }
        }

        new_data.chats.insert(name, chat);
    }

    new_data
}
