//! JSON output helpers for tools.
//!
//! - `write_json_file`: pretty-print a serializable value to disk.
//! - `write_json_output`: same, but refuses to replace an existing file
//!   unless `clobber` is set.
use serde::Serialize;
use std::fs;
use std::path::Path;

pub fn write_json_file<T: Serialize>(path: &Path, value: &T) -> Result<(), String> {
    ensure_parent_dir(path)?;
    let json = serde_json::to_string_pretty(value)
        .map_err(|e| format!("Failed to serialize JSON for {}: {e}", path.display()))?;
    fs::write(path, json).map_err(|e| format!("Failed to write JSON {}: {e}", path.display()))
}

pub fn write_json_output<T: Serialize>(path: &Path, value: &T, clobber: bool) -> Result<(), String> {
    if !clobber && path.exists() {
        return Err(format!(
            "Output {} already exists (set output.clobber to overwrite)",
            path.display()
        ));
    }
    write_json_file(path, value)
}

fn ensure_parent_dir(path: &Path) -> Result<(), String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .map_err(|e| format!("Failed to create {}: {e}", parent.display()))?;
        }
    }
    Ok(())
}
