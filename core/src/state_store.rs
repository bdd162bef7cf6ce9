//! Atomic load/save of the persisted `ChatData` JSON.
//!
//! Mirrors the teacher's vault-metadata write pattern (write new, rotate old
//! to backup, rename into place) so a crash between steps never leaves the
//! output directory without a readable `chat-data.json`.

use crate::chat_data::ChatData;
use std::path::{Path, PathBuf};

const STATE_FILE: &str = "chat-data.json";
const BACKUP_FILE: &str = "chat-data-BACKUP.json";
const NEW_FILE: &str = "chat-data-NEW.json";

/// Load `chat-data.json` from `output_root`. A missing file is not an
/// error (first run); a corrupt file is logged and treated as empty so the
/// BACKUP copy remains available for forensic recovery.
pub fn load(output_root: &Path) -> ChatData {
    let path = output_root.join(STATE_FILE);
    match std::fs::read_to_string(&path) {
        Ok(contents) => match ChatData::from_json(&contents) {
            Ok(data) => data,
            Err(err) => {
                tracing::error!(path = %path.display(), %err, "corrupt state file, proceeding as empty");
                ChatData::new()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => ChatData::new(),
        Err(err) => {
            tracing::error!(path = %path.display(), %err, "could not read state file, proceeding as empty");
            ChatData::new()
        }
    }
}

/// Atomically replace `chat-data.json` with `data`'s serialization.
pub fn save(output_root: &Path, data: &ChatData) -> std::io::Result<()> {
    let new_path: PathBuf = output_root.join(NEW_FILE);
    let state_path = output_root.join(STATE_FILE);
    let backup_path = output_root.join(BACKUP_FILE);

    let json = data
        .to_json()
        .map_err(|err| std::io::Error::new(std::io::ErrorKind::InvalidData, err))?;
    std::fs::write(&new_path, json)?;

    if state_path.exists() {
        if backup_path.exists() {
            std::fs::remove_file(&backup_path)?;
        }
        std::fs::rename(&state_path, &backup_path)?;
    }
    std::fs::rename(&new_path, &state_path)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_missing_file_yields_empty_state() {
        let dir = tempfile::tempdir().unwrap();
        let data = load(dir.path());
        assert!(data.chats.is_empty());
    }

    #[test]
    fn save_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let mut data = ChatData::new();
        data.run_timestamp = "2024-01-01".to_string();
        save(dir.path(), &data).unwrap();

        let loaded = load(dir.path());
        assert_eq!(loaded.run_timestamp, "2024-01-01");
        assert!(!dir.path().join(BACKUP_FILE).exists());
    }

    #[test]
    fn second_save_rotates_previous_generation_to_backup() {
        let dir = tempfile::tempdir().unwrap();
        let mut first = ChatData::new();
        first.run_timestamp = "gen1".to_string();
        save(dir.path(), &first).unwrap();
        let first_json = std::fs::read_to_string(dir.path().join(STATE_FILE)).unwrap();

        let mut second = ChatData::new();
        second.run_timestamp = "gen2".to_string();
        save(dir.path(), &second).unwrap();

        let backup_json = std::fs::read_to_string(dir.path().join(BACKUP_FILE)).unwrap();
        assert_eq!(backup_json, first_json);
        let current = load(dir.path());
        assert_eq!(current.run_timestamp, "gen2");
    }

    #[test]
    fn corrupt_state_file_is_treated_as_empty() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(STATE_FILE), "not json").unwrap();
        let data = load(dir.path());
        assert!(data.chats.is_empty());
    }
}
