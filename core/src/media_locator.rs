//! Resolves media references left on messages into VFS file ids.

use crate::chat_data::ChatData;
use crate::file_id::FileId;
use crate::vfs::Vfs;
use std::path::Path;

/// For every message with a `media_name`, resolve it against `vfs` and
/// record the result (possibly `None`) into the owning year's
/// `media_dependencies`. Resolved handles are added to `data.input_files`.
pub fn locate(data: &mut ChatData, vfs: &Vfs) {
    for chat in data.chats.values_mut() {
        for msg in &chat.messages {
            let Some(media_name) = &msg.media_name else {
                continue;
            };
            let resolved = resolve(vfs, &msg.input_file_id, media_name);
            if let Some(handle) = &resolved {
                data.input_files.entry(handle.id()).or_insert_with(|| (**handle).clone());
            }
            if let Some(output_file) = chat.output_files.get_mut(&msg.year) {
                output_file
                    .media_dependencies
                    .insert(media_name.clone(), resolved.map(|h| h.id()));
            }
        }
    }
}

/// Two-tier resolution: prefer a file alongside the transcript, otherwise
/// fall back to the (deterministically, path-sorted) first VFS handle
/// sharing that basename.
fn resolve(vfs: &Vfs, input_file_id: &FileId, media_name: &str) -> Option<std::sync::Arc<crate::vfs::FileHandle>> {
    if let Some(transcript) = vfs.by_id(input_file_id) {
        let dir = Path::new(&transcript.path).parent();
        let candidate = match dir {
            Some(dir) if !dir.as_os_str().is_empty() => format!("{}/{}", dir.display(), media_name),
            _ => media_name.to_string(),
        };
        if let Some(handle) = vfs.by_path(&candidate) {
            return Some(handle);
        }
    }
    vfs.by_name(media_name).into_iter().next()
}
