// src/config/file.rs
//
// `key = value` settings file. Unknown keys are ignored, `#` starts a comment.
use std::{error::Error, fs, io, path::{Path, PathBuf}};

use super::layout::PeFallback;
use super::options::{GroupSelector, MatchMode, NameMode, PageSource, RunOptions};

/// Options from `path`; defaults when the file is missing or unreadable.
pub fn load(path: &Path) -> RunOptions {
    let mut opts = RunOptions::default();
    apply(&read(path), &mut opts);
    opts
}

/// `load` with `faculty` standing in for the file's own `faculty` key. The
/// file's other keys still land on top of that faculty's layout.
pub fn load_for_faculty(path: &Path, faculty: &str) -> Result<RunOptions, Box<dyn Error>> {
    let mut opts = RunOptions::default();
    opts.set_faculty(faculty)?;
    apply_settings(&read(path), &mut opts);
    Ok(opts)
}

fn read(path: &Path) -> String {
    if !path.exists() {
        return String::new();
    }
    fs::read_to_string(path).unwrap_or_else(|e| {
        logw!("Config {}: {e}", path.display());
        String::new()
    })
}

fn entries(text: &str) -> impl Iterator<Item = (&str, &str)> {
    text.lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with('#'))
        .filter_map(|l| l.split_once('='))
        .map(|(k, v)| (k.trim(), v.trim()))
}

/// Apply settings from `text` on top of `opts`. `faculty` is applied before
/// everything else, wherever it appears, so it never resets `workers`,
/// `schedule_url` or `pe_fallback` given in the same file.
pub fn apply(text: &str, opts: &mut RunOptions) {
    for (_, val) in entries(text).filter(|(key, _)| *key == "faculty") {
        if let Err(e) = opts.set_faculty(val) {
            logw!("Config: {e}");
        }
    }
    apply_settings(text, opts);
}

fn apply_settings(text: &str, opts: &mut RunOptions) {
    for (key, val) in entries(text) {
        match key {
            "groups" => opts.groups = GroupSelector::File(PathBuf::from(val)),
            "group_ids" => {
                let ids: Vec<String> = val.split(',')
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect();
                if !ids.is_empty() {
                    opts.groups = GroupSelector::Ids(ids);
                }
            }
            "groups_dir" => opts.groups_dir = PathBuf::from(val),
            "roster" => opts.roster = PathBuf::from(val),
            "pages" => opts.source = PageSource::Dir(PathBuf::from(val)),
            "out" => opts.out_dir = PathBuf::from(val),
            "workers" => {
                if let Ok(n) = val.parse::<usize>() { opts.workers = n; }
            }
            "names" => {
                if let Some(m) = NameMode::parse(val) { opts.name_mode = m; }
            }
            "match" => {
                if let Some(m) = MatchMode::parse(val) { opts.match_mode = m; }
            }
            "schedule_url" => opts.layout.schedule_url = val.to_string(),
            "pe_fallback" => {
                opts.layout.pe_fallback = if val.is_empty() || val == "-" {
                    PeFallback::LeaveUnresolved
                } else {
                    PeFallback::Substitute(val.to_string())
                };
            }
            _ => {}
        }
    }
}

pub fn save(path: &Path, opts: &RunOptions) -> io::Result<()> {
    let mut s = String::new();
    s.push_str(&format!("faculty={}\n", opts.layout.id));
    match &opts.groups {
        GroupSelector::FacultyList => {}
        GroupSelector::File(p) => s.push_str(&format!("groups={}\n", p.display())),
        GroupSelector::Ids(ids) => s.push_str(&format!("group_ids={}\n", ids.join(","))),
    }
    s.push_str(&format!("groups_dir={}\n", opts.groups_dir.display()));
    s.push_str(&format!("roster={}\n", opts.roster.display()));
    if let PageSource::Dir(p) = &opts.source {
        s.push_str(&format!("pages={}\n", p.display()));
    }
    s.push_str(&format!("out={}\n", opts.out_dir.display()));
    s.push_str(&format!("workers={}\n", opts.workers));
    s.push_str(&format!("names={}\n", opts.name_mode.as_str()));
    s.push_str(&format!("match={}\n", opts.match_mode.as_str()));
    if let PeFallback::Substitute(code) = &opts.layout.pe_fallback {
        s.push_str(&format!("pe_fallback={code}\n"));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() { fs::create_dir_all(parent)?; }
    }
    fs::write(path, s)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn applies_known_keys_and_skips_noise() {
        let mut o = RunOptions::default();
        apply(
            "# comment\nfaculty = wel\nworkers=3\nnames=short\nmatch=subsequence\n\
             group_ids=G1, G2\npe_fallback=Czaj\nbogus=1\nno equals sign\n",
            &mut o,
        );
        assert_eq!(o.layout.id, "wel");
        assert_eq!(o.workers, 3);
        assert_eq!(o.name_mode, NameMode::Short);
        assert_eq!(o.match_mode, MatchMode::Subsequence);
        assert_eq!(o.groups, GroupSelector::Ids(vec![s!("G1"), s!("G2")]));
        assert_eq!(o.layout.pe_fallback, PeFallback::Substitute(s!("Czaj")));
    }

    #[test]
    fn faculty_key_does_not_reset_earlier_keys() {
        let mut o = RunOptions::default();
        apply("workers=3\npe_fallback=Czaj\nschedule_url=http://localhost/{group}.htm\nfaculty=wel\n", &mut o);
        assert_eq!(o.layout.id, "wel");
        assert_eq!(o.workers, 3);
        assert_eq!(o.layout.pe_fallback, PeFallback::Substitute(s!("Czaj")));
        assert_eq!(o.layout.url_for("G"), "http://localhost/G.htm");
    }

    #[test]
    fn save_then_load_keeps_settings() {
        let dir = std::env::temp_dir().join("watcal_cfg_unit");
        let _ = fs::remove_dir_all(&dir);
        let path = dir.join("watcal.conf");

        let mut o = RunOptions::default();
        o.set_faculty("ioe").unwrap();
        o.workers = 5;
        o.source = PageSource::Dir(PathBuf::from("pages"));
        save(&path, &o).unwrap();

        let back = load(&path);
        assert_eq!(back.layout.id, "ioe");
        assert_eq!(back.workers, 5);
        assert_eq!(back.source, PageSource::Dir(PathBuf::from("pages")));
    }
}
