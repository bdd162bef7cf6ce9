//! Walks an input tree into a populated [`Vfs`], recognizing WhatsApp-style
//! ZIP archives and carrying forward historical file records.

use crate::chat_data::ChatData;
use crate::vfs::{FileHandle, Vfs};
use crate::zip_utils::{is_chat_archive, list_zip_entries};
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Walk `input_root`, index every plain file and every member of every
/// chat-archive ZIP found, then carry forward any handle in `previous` that
/// the walk didn't rediscover (marked `exists=false`).
pub fn scan(input_root: &Path, previous: &ChatData) -> Vfs {
    let mut vfs = Vfs::new(input_root);

    let mut entries: Vec<PathBuf> = WalkDir::new(input_root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .map(|e| e.path().to_path_buf())
        .collect();
    entries.sort();

    let zip_results: Vec<(PathBuf, bool)> = entries
        .par_iter()
        .filter(|p| p.extension().map(|e| e == "zip").unwrap_or(false))
        .map(|p| (p.clone(), is_chat_archive(p)))
        .collect();
    let chat_zips: std::collections::HashSet<PathBuf> = zip_results
        .into_iter()
        .filter(|(_, is_chat)| *is_chat)
        .map(|(p, _)| p)
        .collect();

    for path in &entries {
        let Ok(relative) = path.strip_prefix(input_root) else {
            continue;
        };
        let rel_str = relative.to_string_lossy().replace('\\', "/");

        if chat_zips.contains(path) {
            let Ok(metadata) = path.metadata() else {
                tracing::warn!(path = %rel_str, "could not stat zip archive");
                continue;
            };
            let mtime = mtime_secs(&metadata);
            let zip_handle = vfs.add(FileHandle::new(rel_str.clone(), metadata.len(), mtime));
            let zip_id = zip_handle.id();

            for entry in list_zip_entries(path) {
                vfs.add(
                    FileHandle::new(entry.name, entry.size, entry.mtime).with_parent_zip(zip_id.clone()),
                );
            }
        } else if path.extension().map(|e| e == "zip").unwrap_or(false) {
            // Not a chat archive: index as an opaque blob, members not expanded.
            let Ok(metadata) = path.metadata() else {
                continue;
            };
            vfs.add(FileHandle::new(rel_str, metadata.len(), mtime_secs(&metadata)));
        } else {
            let Ok(metadata) = path.metadata() else {
                tracing::warn!(path = %rel_str, "could not stat file");
                continue;
            };
            vfs.add(FileHandle::new(rel_str, metadata.len(), mtime_secs(&metadata)));
        }
    }

    for handle in previous.input_files.values() {
        if vfs.by_id(&handle.id()).is_none() {
            vfs.add(handle.clone().as_nonexistent());
        }
    }

    vfs
}

fn mtime_secs(metadata: &std::fs::Metadata) -> f64 {
    metadata
        .modified()
        .ok()
        .and_then(|t| t.duration_since(std::time::UNIX_EPOCH).ok())
        .map(|d| d.as_secs_f64())
        .unwrap_or(0.0)
}
