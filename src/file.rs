// src/file.rs

use std::{
    fmt, fs,
    path::{Path, PathBuf},
};

use crate::config::consts::CALENDAR_EXT;
use crate::core::sanitize::sanitize_group_filename;

/// What happened to an output file.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileStatus {
    Added,
    Changed,
    Unchanged,
}

impl fmt::Display for FileStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FileStatus::Added => "added",
            FileStatus::Changed => "changed",
            FileStatus::Unchanged => "unchanged",
        })
    }
}

pub fn ensure_directory(dir: &Path) -> Result<(), Box<dyn std::error::Error>> {
    if dir.exists() && !dir.is_dir() {
        return Err(format!("Path exists but is not a directory: {}", dir.display()).into());
    }
    if !dir.exists() { fs::create_dir_all(dir)?; }
    Ok(())
}

/// `<dir>/<sanitized group>.ics`
pub fn calendar_path(dir: &Path, group: &str) -> PathBuf {
    dir.join(join!(&sanitize_group_filename(group), ".", CALENDAR_EXT))
}

/// Write `contents` unless the file already holds exactly that text.
pub fn write_if_changed(path: &Path, contents: &str) -> Result<FileStatus, Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            ensure_directory(parent)?;
        }
    }
    let status = match fs::read_to_string(path) {
        Ok(old) if old == contents => return Ok(FileStatus::Unchanged),
        Ok(_) => FileStatus::Changed,
        Err(_) if path.exists() => FileStatus::Changed,
        Err(_) => FileStatus::Added,
    };
    fs::write(path, contents)?;
    Ok(status)
}
