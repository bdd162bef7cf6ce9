//! The persisted aggregate: chats, their messages and per-year output
//! files, plus the file registry every handle referenced from them lives
//! in.

use crate::file_id::FileId;
use crate::vfs::FileHandle;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

#[derive(Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChatName(pub String);

impl ChatName {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Message {
    pub timestamp: String,
    pub sender: String,
    pub content: String,
    pub year: i32,
    pub input_file_id: FileId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_name: Option<String>,
}

/// On-disk shape of a [`Message`]. Accepts both the current format
/// (`input_file_id` as a plain FileID string) and the legacy format, where
/// an `input_file` field held either a bare path string or a structured
/// handle. Legacy path-only references synthesize a handle with size 0,
/// mtime 0, `exists = false` (§6, "Legacy state compatibility").
#[derive(Deserialize)]
struct MessageJson {
    timestamp: String,
    sender: String,
    content: String,
    year: i32,
    #[serde(default)]
    input_file_id: Option<String>,
    #[serde(default)]
    input_file: Option<serde_json::Value>,
    #[serde(default)]
    media_name: Option<String>,
}

impl<'de> Deserialize<'de> for Message {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = MessageJson::deserialize(deserializer)?;
        let input_file_id = if let Some(id) = raw.input_file_id {
            FileId::from(id)
        } else if let Some(legacy) = raw.input_file {
            legacy_input_file_id(&legacy)
        } else {
            FileId::create(0.0, 0, "")
        };
        Ok(Message {
            timestamp: raw.timestamp,
            sender: raw.sender,
            content: raw.content,
            year: raw.year,
            input_file_id,
            media_name: raw.media_name,
        })
    }
}

/// Legacy `input_file` was either a bare path string or a structured
/// `{path, size, modification_timestamp, ...}` record. Either way it
/// synthesizes a historical handle (size 0, mtime 0 when only a path is
/// known).
fn legacy_input_file_id(value: &serde_json::Value) -> FileId {
    if let Some(path) = value.as_str() {
        return FileId::create(0.0, 0, path);
    }
    let path = value.get("path").and_then(|v| v.as_str()).unwrap_or("");
    let size = value.get("size").and_then(|v| v.as_u64()).unwrap_or(0);
    let mtime = value
        .get("modification_timestamp")
        .and_then(|v| v.as_f64())
        .unwrap_or(0.0);
    FileId::create(mtime, size, path)
}

/// Tracks what a single `<chat>/<year>.html` page depends on, so the
/// dependency checker can decide whether it needs to be re-emitted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OutputFile {
    pub year: i32,
    #[serde(rename = "generate")]
    pub regenerate: bool,
    #[serde(default)]
    pub media_dependencies: BTreeMap<String, Option<FileId>>,
    #[serde(default)]
    pub chat_dependencies: BTreeSet<FileId>,
    pub css_dependency: Option<FileId>,
}

impl OutputFile {
    pub fn new(year: i32, css_dependency: FileId) -> Self {
        Self {
            year,
            regenerate: false,
            media_dependencies: BTreeMap::new(),
            chat_dependencies: BTreeSet::new(),
            css_dependency: Some(css_dependency),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Chat {
    #[serde(skip)]
    pub chat_name: ChatName,
    pub messages: Vec<Message>,
    #[serde(default)]
    pub output_files: BTreeMap<i32, OutputFile>,
}

impl Chat {
    pub fn new(chat_name: ChatName) -> Self {
        Self {
            chat_name,
            messages: Vec::new(),
            output_files: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ChatData {
    pub chats: BTreeMap<ChatName, Chat>,
    pub input_files: HashMap<FileId, FileHandle>,
    pub run_timestamp: String,
}

impl ChatData {
    pub fn new() -> Self {
        Self::default()
    }
}

// --- JSON schema (serde) ---
//
// `{ "chats": { <name>: ChatJson }, "input_files": { <id>: FileHandleJson },
//   "timestamp": string }`. Pretty-printed with sorted keys by the state
// store; `BTreeMap` gives us the sorted-key property for free on
// serialization.

#[derive(Serialize, Deserialize)]
struct ChatDataJson {
    chats: BTreeMap<String, Chat>,
    input_files: BTreeMap<String, FileHandleJson>,
    timestamp: String,
}

/// `FileHandle` as stored on disk. Older state files may instead carry a
/// bare path string for `input_file` fields on individual messages — see
/// [`LegacyInputFile`] — but the `input_files` map itself always uses the
/// structured shape.
#[derive(Serialize, Deserialize)]
struct FileHandleJson {
    path: String,
    size: u64,
    #[serde(rename = "modification_timestamp")]
    mtime: f64,
    #[serde(default)]
    parent_zip: Option<String>,
    #[serde(default = "default_true")]
    exists: bool,
}

fn default_true() -> bool {
    true
}

fn handle_to_json(h: &FileHandle) -> FileHandleJson {
    FileHandleJson {
        path: h.path.clone(),
        size: h.size,
        mtime: h.mtime,
        parent_zip: h.parent_zip.as_ref().map(|id| id.as_str().to_string()),
        exists: h.exists,
    }
}

fn handle_from_json(j: FileHandleJson) -> FileHandle {
    FileHandle {
        path: j.path,
        size: j.size,
        mtime: j.mtime,
        parent_zip: j.parent_zip.map(FileId::from),
        exists: j.exists,
    }
}

impl ChatData {
    pub fn to_json(&self) -> serde_json::Result<String> {
        let chats = self
            .chats
            .iter()
            .map(|(name, chat)| (name.0.clone(), chat.clone()))
            .collect();
        let input_files = self
            .input_files
            .iter()
            .map(|(id, handle)| (id.as_str().to_string(), handle_to_json(handle)))
            .collect();
        let doc = ChatDataJson {
            chats,
            input_files,
            timestamp: self.run_timestamp.clone(),
        };
        serde_json::to_string_pretty(&doc)
    }

    pub fn from_json(data: &str) -> serde_json::Result<Self> {
        let doc: ChatDataJson = serde_json::from_str(data)?;
        let input_files = doc
            .input_files
            .into_iter()
            .map(|(id, handle)| (FileId::from(id), handle_from_json(handle)))
            .collect();
        let chats = doc
            .chats
            .into_iter()
            .map(|(name, mut chat)| {
                chat.chat_name = ChatName::new(name.clone());
                (ChatName::new(name), chat)
            })
            .collect();
        Ok(Self {
            chats,
            input_files,
            run_timestamp: doc.timestamp,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ChatData {
        let mut data = ChatData::new();
        data.run_timestamp = "2024-01-01 00:00:00".to_string();
        let handle = FileHandle::new("Space Rocket/_chat.txt", 120, 1000.0);
        let id = handle.id();
        data.input_files.insert(id.clone(), handle);

        let mut chat = Chat::new(ChatName::new("Space Rocket"));
        chat.messages.push(Message {
            timestamp: "12.3.2022 klo 14.08.18".to_string(),
            sender: "Space Rocket".to_string(),
            content: "Test chat".to_string(),
            year: 2022,
            input_file_id: id.clone(),
            media_name: None,
        });
        let mut output_file = OutputFile::new(2022, id.clone());
        output_file.chat_dependencies.insert(id);
        chat.output_files.insert(2022, output_file);
        data.chats.insert(ChatName::new("Space Rocket"), chat);
        data
    }

    #[test]
    fn round_trips_through_json() {
        let data = sample();
        let json = data.to_json().unwrap();
        let parsed = ChatData::from_json(&json).unwrap();

        assert_eq!(parsed.run_timestamp, data.run_timestamp);
        assert_eq!(parsed.chats.len(), 1);
        let chat = &parsed.chats[&ChatName::new("Space Rocket")];
        assert_eq!(chat.chat_name, ChatName::new("Space Rocket"));
        assert_eq!(chat.messages.len(), 1);
        assert_eq!(chat.messages[0].content, "Test chat");
        assert_eq!(parsed.input_files.len(), 1);
    }

    #[test]
    fn legacy_input_file_string_synthesizes_historical_handle() {
        let json = r#"{
            "timestamp": "x",
            "sender": "Bob",
            "content": "hi",
            "year": 2019,
            "input_file": "old/_chat.txt"
        }"#;
        let msg: Message = serde_json::from_str(json).unwrap();
        assert_eq!(msg.input_file_id, FileId::create(0.0, 0, "old/_chat.txt"));
    }

    #[test]
    fn json_is_sorted_and_pretty() {
        let data = sample();
        let json = data.to_json().unwrap();
        assert!(json.contains("\n  "));
        let b_idx = json.find("\"chats\"").unwrap();
        let i_idx = json.find("\"input_files\"").unwrap();
        assert!(b_idx < i_idx, "keys must be sorted alphabetically");
    }
}
