// src/groups.rs

use std::{error::Error, fs, path::{Path, PathBuf}};

use crate::config::consts::NEW_MARKER;
use crate::config::options::{GroupSelector, RunOptions};

/// Parse a group list: one id per line, `#` comments, ` [NEW]` markers
/// stripped, duplicates dropped in first-seen order.
pub fn parse_list(text: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.split('#').next().unwrap_or("");
        let id = line.replace(NEW_MARKER.trim(), "");
        let id = id.trim();
        if id.is_empty() {
            continue;
        }
        push_unique!(out, s!(id));
    }
    out
}

pub fn load(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let text = fs::read_to_string(path)
        .map_err(|e| format!("Could not read group list {}: {e}", path.display()))?;
    Ok(parse_list(&text))
}

/// Merge freshly discovered ids into an existing list. Known ids keep their
/// order and lose any old ` [NEW]` marker; newcomers follow, marked.
/// Returns the list lines and the number of newcomers.
pub fn merge_ids(existing: &[String], fresh: &[String]) -> (Vec<String>, usize) {
    let mut known: Vec<String> = Vec::with_capacity(existing.len() + fresh.len());
    for id in existing.iter().map(|i| i.replace(NEW_MARKER.trim(), "")) {
        let id = id.trim();
        if !id.is_empty() {
            push_unique!(known, s!(id));
        }
    }
    let mut lines = known.clone();
    let mut added = 0;
    for id in fresh.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
        if push_unique!(known, s!(id)) {
            lines.push(join!(id, NEW_MARKER));
            added += 1;
        }
    }
    (lines, added)
}

/// List file for the selected faculty: `<groups_dir>/<faculty>.txt`.
pub fn faculty_list_path(opts: &RunOptions) -> PathBuf {
    opts.groups_dir.join(join!(&opts.layout.id, ".txt"))
}

/// Group ids for a run, in list order.
pub fn resolve(opts: &RunOptions) -> Result<Vec<String>, Box<dyn Error>> {
    match &opts.groups {
        GroupSelector::FacultyList => load(&faculty_list_path(opts)),
        GroupSelector::File(path) => load(path),
        GroupSelector::Ids(ids) => {
            let mut out: Vec<String> = Vec::with_capacity(ids.len());
            for id in ids.iter().map(|i| i.trim()).filter(|i| !i.is_empty()) {
                push_unique!(out, s!(id));
            }
            Ok(out)
        }
    }
}
