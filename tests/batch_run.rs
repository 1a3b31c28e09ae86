// tests/batch_run.rs
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;

use watcal::config::file as config_file;
use watcal::config::layout::PeFallback;
use watcal::config::options::{GroupSelector, MatchMode, NameMode, PageSource, RunOptions};
use watcal::fetch::DirFetcher;
use watcal::file::calendar_path;
use watcal::progress::Progress;
use watcal::roster::{EmployeeRoster, JsonRoster};
use watcal::runner::{import_groups, import_staff, run, run_with};

fn tmp_dir(name: &str) -> PathBuf {
    let mut p = std::env::temp_dir();
    p.push(format!("watcal_e2e_{}", name));
    let _ = fs::remove_dir_all(&p);
    fs::create_dir_all(&p).unwrap();
    p
}

/// Saved pages dir with one real page under the group's name.
fn pages_dir(name: &str) -> PathBuf {
    let dir = tmp_dir(name);
    fs::copy("tests/fixtures/wtc_WCY24IX1N1.htm", dir.join("WCY24IX1N1.htm")).unwrap();
    fs::write(dir.join("EMPTY1.html"), "<html><body><p>Brak planu</p></body></html>").unwrap();
    dir
}

fn options(pages: &PathBuf, out: &PathBuf) -> RunOptions {
    RunOptions {
        groups: GroupSelector::Ids(vec!["WCY24IX1N1".into(), "MISSING".into(), "EMPTY1".into()]),
        roster: PathBuf::from("tests/fixtures/employees.json"),
        source: PageSource::Dir(pages.clone()),
        out_dir: out.clone(),
        workers: 2,
        ..Default::default()
    }
}

#[derive(Default)]
struct Recorder {
    total: usize,
    done: Vec<String>,
    failed: Vec<String>,
    finished: bool,
}

impl Progress for Recorder {
    fn begin(&mut self, total: usize) { self.total = total; }
    fn item_done(&mut self, group: &str) { self.done.push(group.to_string()); }
    fn item_failed(&mut self, group: &str, _reason: &str) { self.failed.push(group.to_string()); }
    fn finish(&mut self) { self.finished = true; }
}

#[test]
fn batch_continues_past_bad_groups() {
    let pages = pages_dir("batch_pages");
    let out = tmp_dir("batch_out");
    let opts = options(&pages, &out);

    let mut rec = Recorder::default();
    let summary = run(&opts, Some(&mut rec)).unwrap();

    assert_eq!(summary.groups, 3);
    assert_eq!(summary.lessons, 6);
    assert_eq!(summary.saved.added, vec!["WCY24IX1N1"]);
    assert_eq!(summary.saved.skipped.len(), 2);
    assert!(summary.warnings.iter().any(|w| w.starts_with("MISSING:")));
    assert!(summary.warnings.iter().any(|w| w.starts_with("EMPTY1:")));

    assert_eq!(rec.total, 3);
    assert_eq!(rec.failed, vec!["MISSING"]);
    assert_eq!(rec.done.len(), 2);
    assert!(rec.finished);

    let ics = fs::read_to_string(calendar_path(&out.join("wtc"), "WCY24IX1N1")).unwrap();
    assert!(ics.starts_with("BEGIN:VCALENDAR\nVERSION:2.0\n"));
    assert_eq!(ics.matches("BEGIN:VEVENT").count(), 6);
    assert!(ics.contains("SUMMARY:ALG (w)"));
    assert!(ics.contains("DTSTART:20250303T070000Z"));
    assert!(ics.contains("Prowadzący: dr Jan Kowalski"));
    assert!(!calendar_path(&out.join("wtc"), "MISSING").exists());
}

#[test]
fn second_run_leaves_files_alone() {
    let pages = pages_dir("rerun_pages");
    let out = tmp_dir("rerun_out");
    let opts = options(&pages, &out);

    let fetcher = Arc::new(DirFetcher::new(&pages));
    let first = run_with(&opts, fetcher.clone(), None).unwrap();
    assert_eq!(first.saved.added.len(), 1);

    let second = run_with(&opts, fetcher, None).unwrap();
    assert!(second.saved.added.is_empty());
    assert_eq!(second.saved.unchanged, vec!["WCY24IX1N1"]);
}

#[test]
fn missing_roster_is_only_a_warning() {
    let pages = pages_dir("noroster_pages");
    let out = tmp_dir("noroster_out");
    let mut opts = options(&pages, &out);
    opts.roster = PathBuf::from("/nonexistent/watcal/employees.json");
    opts.name_mode = NameMode::Full;

    let summary = run(&opts, None).unwrap();
    assert_eq!(summary.saved.added.len(), 1);
    assert!(summary.warnings.iter().any(|w| w.contains("roster")));

    // without a roster JKw has nothing to match and stays as written
    let ics = fs::read_to_string(calendar_path(&out.join("wtc"), "WCY24IX1N1")).unwrap();
    assert!(ics.contains("Prowadzący: JKw"));
}

#[test]
fn group_list_file_is_required() {
    let out = tmp_dir("nolist_out");
    let opts = RunOptions {
        groups: GroupSelector::File(PathBuf::from("/nonexistent/watcal/groups.txt")),
        source: PageSource::Dir(out.clone()),
        out_dir: out,
        ..Default::default()
    };
    assert!(run(&opts, None).is_err());
}

#[test]
fn faculty_group_list_from_groups_dir() {
    let pages = pages_dir("list_pages");
    let out = tmp_dir("list_out");
    let groups_dir = tmp_dir("list_groups");
    fs::write(groups_dir.join("wtc.txt"), "# wtc\nWCY24IX1N1\nWCY24IX1N1 [NEW]\n").unwrap();

    let mut opts = options(&pages, &out);
    opts.groups = GroupSelector::FacultyList;
    opts.groups_dir = groups_dir;

    let summary = run(&opts, None).unwrap();
    assert_eq!(summary.groups, 1);
    assert!(summary.warnings.is_empty(), "{:?}", summary.warnings);
}

#[test]
fn staff_import_merges_and_marks_newcomers() {
    let dir = tmp_dir("staff");
    let roster = dir.join("employees.json");
    fs::copy("tests/fixtures/employees.json", &roster).unwrap();

    let (total, added) = import_staff(&PathBuf::from("tests/fixtures/staff.html"), &roster).unwrap();
    // Kowalski, Nowak, Lis already there; Trzciński is new
    assert_eq!((total, added), (4, 1));

    let text = fs::read_to_string(&roster).unwrap();
    assert!(text.contains("Piotr Trzciński [NEW]"));
    assert!(!text.contains("Ewa Lis [NEW]"));

    let loaded = JsonRoster::new(&roster).load().unwrap();
    assert!(loaded.iter().any(|e| e.degree == "dr inż." && e.name == "Piotr Trzciński"));
}

#[test]
fn group_import_merges_into_faculty_list() {
    let groups_dir = tmp_dir("group_import");
    fs::write(groups_dir.join("wtc.txt"), "# wtc\nWCY24IX1N2\nOLD1 [NEW]\n").unwrap();
    let opts = RunOptions { groups_dir: groups_dir.clone(), ..Default::default() };

    let page = PathBuf::from("tests/fixtures/wtc_index.htm");
    let (path, total, added) = import_groups(&page, &opts).unwrap();
    assert_eq!(path, groups_dir.join("wtc.txt"));
    assert_eq!((total, added), (5, 3));

    let text = fs::read_to_string(&path).unwrap();
    assert_eq!(
        text,
        "WCY24IX1N2\nOLD1\nWCY24IX1N1 [NEW]\nWCY24IY1S1 [NEW]\nWCY24KX1N1 [NEW]\n"
    );
    assert!(!text.contains("ARCHIWUM"));

    // importing the same page again finds nothing new
    let (_, total, added) = import_groups(&page, &opts).unwrap();
    assert_eq!((total, added), (5, 0));
    assert!(!fs::read_to_string(&path).unwrap().contains("[NEW]"));

    let empty = tmp_dir("group_import_empty").join("none.htm");
    fs::write(&empty, "<p>brak</p>").unwrap();
    assert!(import_groups(&empty, &opts).is_err());
}

#[test]
fn config_file_round_trip() {
    let dir = tmp_dir("config");
    let path = dir.join("watcal.conf");

    let mut opts = RunOptions::default();
    opts.set_faculty("wim").unwrap();
    opts.groups = GroupSelector::Ids(vec!["A".into(), "B".into()]);
    opts.source = PageSource::Dir(dir.join("pages"));
    opts.workers = 4;
    opts.name_mode = NameMode::Short;
    opts.match_mode = MatchMode::Subsequence;
    opts.layout.pe_fallback = PeFallback::Substitute("Czaj".into());
    config_file::save(&path, &opts).unwrap();

    let back = config_file::load(&path);
    assert_eq!(back, opts);
}
