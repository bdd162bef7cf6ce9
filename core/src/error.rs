//! Typed errors for conditions that abort a run before any state is mutated.
//!
//! Everything else (malformed archives, unparseable transcripts, missing
//! media, corrupt state) is best-effort: it is logged via `tracing` and the
//! run continues. Only the variants here are fatal.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("input directory does not exist or is not a directory: {0}")]
    InputNotFound(PathBuf),

    #[error("cannot create output directory {path}: {source}")]
    OutputUnwritable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config file {path}: {source}")]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}
