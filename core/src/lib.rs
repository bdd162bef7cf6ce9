//! chatarchive-core
//!
//! Turns messenger-style chat exports (plain-text transcripts, optionally
//! bundled in ZIP archives, with adjacent media) into a self-contained,
//! incrementally-regenerated static HTML archive.

pub mod chat_data;
pub mod config;
pub mod dep_checker;
pub mod error;
pub mod file_id;
pub mod html;
pub mod media_locator;
pub mod message_processor;
pub mod parser;
pub mod pipeline;
pub mod planner;
pub mod state_store;
pub mod vfs;
pub mod vfs_scanner;
pub mod zip_utils;

pub use chat_data::{Chat, ChatData, ChatName, Message, OutputFile};
pub use config::Config;
pub use error::PipelineError;
pub use file_id::FileId;
pub use pipeline::run;
pub use vfs::{FileHandle, Vfs};
