//! Ties the whole dataflow together: Scanner → Processor → Planner →
//! Media Locator → Dep Checker → Emitter → State Writer.

use crate::error::PipelineError;
use crate::{dep_checker, html, media_locator, message_processor, planner, state_store, vfs_scanner};
use std::path::Path;

/// Run one full archive build. `now_timestamp` is stamped onto the new
/// state for display; the caller supplies it rather than the pipeline
/// reading the clock, keeping this function a pure function of its inputs.
pub fn run(input_root: &Path, output_root: &Path, now_timestamp: &str) -> Result<(), PipelineError> {
    if !input_root.is_dir() {
        return Err(PipelineError::InputNotFound(input_root.to_path_buf()));
    }
    std::fs::create_dir_all(output_root).map_err(|source| PipelineError::OutputUnwritable {
        path: output_root.to_path_buf(),
        source,
    })?;

    let previous = state_store::load(output_root);
    let vfs = vfs_scanner::scan(input_root, &previous);

    let mut data = message_processor::process(&vfs, &previous);
    data.run_timestamp = now_timestamp.to_string();

    planner::plan(&mut data, html::css_file_id());
    media_locator::locate(&mut data, &vfs);
    dep_checker::check(&mut data, &previous);

    if let Err(err) = html::emit(&data, &vfs, output_root) {
        tracing::error!(%err, "failed to emit html archive");
    }

    if let Err(err) = state_store::save(output_root, &data) {
        tracing::error!(%err, "failed to persist state");
    }

    Ok(())
}
