// src/runner.rs
use std::error::Error;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::Local;

use crate::{
    calendar::{self, SaveSummary},
    config::options::RunOptions,
    fetch::{fetcher_for, PageFetcher},
    file::ensure_directory,
    groups,
    lessons::{parse_documents, ParseContext},
    progress::Progress,
    roster::{build_employee_index, merge_staff, roster_for, EmployeeRoster, JsonRoster},
    scrape::collect_documents,
    specs::{dates::YearRule, employees::parse_staff_page, groups::parse_group_page},
};

/// What one batch produced.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub groups: usize,
    pub lessons: usize,
    pub saved: SaveSummary,
    /// Per-group problems that did not stop the batch.
    pub warnings: Vec<String>,
}

/// Top-level batch: roster → group list → pages → lessons → calendars.
/// Only setup problems (no group list, unusable output directory) are
/// errors; anything that goes wrong for a single group becomes a warning.
pub fn run(
    opts: &RunOptions,
    progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, Box<dyn Error>> {
    let fetcher: Arc<dyn PageFetcher> = Arc::from(fetcher_for(&opts.source)?);
    run_with(opts, fetcher, progress)
}

/// `run` with the page source supplied by the caller.
pub fn run_with(
    opts: &RunOptions,
    fetcher: Arc<dyn PageFetcher>,
    mut progress: Option<&mut dyn Progress>,
) -> Result<RunSummary, Box<dyn Error>> {
    let mut summary = RunSummary::default();

    let employees = match roster_for(&opts.roster).load() {
        Ok(v) => v,
        Err(e) => {
            let msg = format!("Employee roster unavailable ({e}); lecturer codes resolve from page legends only");
            logw!("{msg}");
            summary.warnings.push(msg);
            Vec::new()
        }
    };
    let index = build_employee_index(&employees);
    logf!("roster: {} employees, {} index keys", employees.len(), index.variants.len());

    let ids = groups::resolve(opts)?;
    summary.groups = ids.len();
    if ids.is_empty() {
        if let Some(p) = progress.as_deref_mut() {
            p.log("No groups to process.");
        }
        return Ok(summary);
    }

    let docs = collect_documents(fetcher, &opts.layout, &ids, opts.worker_count(),
        progress.as_deref_mut().map(|p| p as &mut dyn Progress));

    let year_hint = YearRule::academic_for(Local::now().date_naive());
    let ctx = ParseContext {
        match_mode: opts.match_mode,
        name_mode: opts.name_mode,
        ..ParseContext::new(&opts.layout, &index, year_hint)
    };
    let schedules = parse_documents(&docs, &ctx);

    for (group, html) in &docs {
        let count = schedules.get(group).map_or(0, Vec::len);
        summary.lessons += count;
        let problem = match (html, count) {
            (None, _) => Some("page could not be fetched"),
            (Some(_), 0) => Some("no lessons found"),
            _ => None,
        };
        if let Some(problem) = problem {
            summary.warnings.push(format!("{group}: {problem}"));
        }
    }

    let out_dir = opts.faculty_out_dir();
    summary.saved = calendar::save_all(&out_dir, &schedules)?;
    for (group, err) in &summary.saved.failed {
        summary.warnings.push(format!("{group}: write failed: {err}"));
    }

    if let Some(p) = progress.as_deref_mut() {
        let s = &summary.saved;
        p.log(&format!(
            "{} calendars in {} (added {}, changed {}, unchanged {}), {} warnings",
            s.saved(), out_dir.display(), s.added.len(), s.changed.len(), s.unchanged.len(),
            summary.warnings.len()
        ));
    }
    Ok(summary)
}

/// Merge a saved staff-directory page into the JSON roster at `roster`.
/// Returns (roster size, newcomers).
pub fn import_staff(page: &Path, roster: &Path) -> Result<(usize, usize), Box<dyn Error>> {
    let html = std::fs::read_to_string(page)
        .map_err(|e| format!("Could not read staff page {}: {e}", page.display()))?;
    let fresh = parse_staff_page(&html);
    if fresh.is_empty() {
        return Err(format!("No staff entries found in {}", page.display()).into());
    }

    let store = JsonRoster::new(roster);
    let existing = if roster.exists() { store.load()? } else { Vec::new() };
    let (merged, added) = merge_staff(&existing, &fresh);
    store.save(&merged)?;
    logf!("staff import: {} entries, {added} new", merged.len());
    Ok((merged.len(), added))
}

/// Merge the groups linked from a saved faculty index page into
/// `<groups_dir>/<faculty>.txt`. Returns (list path, list size, newcomers).
pub fn import_groups(page: &Path, opts: &RunOptions) -> Result<(PathBuf, usize, usize), Box<dyn Error>> {
    let html = std::fs::read_to_string(page)
        .map_err(|e| format!("Could not read group page {}: {e}", page.display()))?;
    let fresh = parse_group_page(&html);
    if fresh.is_empty() {
        return Err(format!("No group links found in {}", page.display()).into());
    }

    let path = groups::faculty_list_path(opts);
    let existing = if path.exists() { groups::load(&path)? } else { Vec::new() };
    let (lines, added) = groups::merge_ids(&existing, &fresh);
    ensure_directory(&opts.groups_dir)?;
    std::fs::write(&path, join!(&lines.join("\n"), "\n"))?;
    logf!("group import ({}): {} groups, {added} new", opts.layout.id, lines.len());
    Ok((path, lines.len(), added))
}
