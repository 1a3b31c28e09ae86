// src/roster.rs
//
// Employee roster: loading (JSON or plain text), title handling and the
// variant index the lecturer resolver searches.

use std::{collections::BTreeMap, error::Error, fs, path::{Path, PathBuf}};

use serde::{Deserialize, Serialize};

use crate::config::consts::NEW_MARKER;
use crate::core::sanitize::{fold_key, normalize_ws};

#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Employee {
    pub degree: String,
    pub name: String,
}

impl Employee {
    /// `"<degree> <name>"`
    pub fn full(&self) -> String {
        normalize_ws(&join!(&self.degree, " ", &self.name))
    }
}

/// Source of the employee list.
pub trait EmployeeRoster {
    fn load(&self) -> Result<Vec<Employee>, Box<dyn Error>>;
}

/* ---------------- titles ---------------- */

const TITLE_WORDS: &[&str] = &[
    "prof", "dr", "hab", "mgr", "inz", "lic", "doc", "st", "ml", "sr", "gen", "plk", "pplk",
    "mjr", "kpt", "por", "ppor", "chor", "schor", "mlchor", "sierz", "ssierz", "kpr", "plut",
    "kmdr", "kmdrpor", "kpor", "wat",
];

fn is_title_word(word: &str) -> bool {
    let w = word.trim_matches(|c: char| c == '.' || c == ',');
    if w.is_empty() {
        return !word.is_empty();
    }
    let key = fold_key(w);
    if TITLE_WORDS.contains(&key.as_str()) {
        return true;
    }
    // institute acronyms such as WAT, WCY
    w.chars().count() >= 2 && w.chars().all(|c| c.is_uppercase())
}

/// Split a full line into (titles, name): `dr inż. Jan Kowalski` →
/// (`dr inż.`, `Jan Kowalski`). A trailing `, prof. WAT` is a title too.
pub fn split_title(line: &str) -> (String, String) {
    let line = normalize_ws(line);
    let (head, tail) = match line.split_once(',') {
        Some((h, t)) if t.split_whitespace().all(is_title_word) => (s!(h), s!(t.trim())),
        _ => (line.clone(), s!()),
    };
    let words: Vec<&str> = head.split_whitespace().collect();
    let k = words.iter().take_while(|w| is_title_word(w)).count();
    let mut degree = words[..k].join(" ");
    if !tail.is_empty() {
        degree = if degree.is_empty() { tail } else { join!(&degree, ", ", &tail) };
    }
    (degree, words[k..].join(" "))
}

/// Name without titles; the line itself when nothing is left.
pub fn short_name(line: &str) -> String {
    let (_, name) = split_title(line);
    if name.is_empty() { normalize_ws(line) } else { name }
}

pub fn has_title(line: &str) -> bool {
    !split_title(line).0.is_empty()
}

/* ---------------- stores ---------------- */

#[derive(Default, Serialize, Deserialize)]
struct RosterFile {
    #[serde(default)]
    employees: Vec<StoredEmployee>,
}

#[derive(Default, Serialize, Deserialize)]
struct StoredEmployee {
    #[serde(default)]
    degree: Option<String>,
    #[serde(default)]
    name: Option<String>,
}

/// `{"employees": [{"degree": "...", "name": "..."}]}`
pub struct JsonRoster {
    pub path: PathBuf,
}

impl JsonRoster {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn parse(text: &str) -> Result<Vec<Employee>, Box<dyn Error>> {
        let file: RosterFile = serde_json::from_str(text)?;
        Ok(file
            .employees
            .into_iter()
            .filter_map(|e| {
                let degree = normalize_ws(e.degree.as_deref()?);
                let name = normalize_ws(&e.name?.replace(NEW_MARKER, ""));
                (!degree.is_empty() && !name.is_empty()).then_some(Employee { degree, name })
            })
            .collect())
    }

    /// Write `employees` as given; `[NEW]` markers are kept.
    pub fn save(&self, employees: &[Employee]) -> Result<(), Box<dyn Error>> {
        let file = RosterFile {
            employees: employees
                .iter()
                .map(|e| StoredEmployee { degree: Some(e.degree.clone()), name: Some(e.name.clone()) })
                .collect(),
        };
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        fs::write(&self.path, serde_json::to_string_pretty(&file)?)?;
        Ok(())
    }
}

impl EmployeeRoster for JsonRoster {
    fn load(&self) -> Result<Vec<Employee>, Box<dyn Error>> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| format!("Roster {}: {e}", self.path.display()))?;
        Self::parse(&text)
    }
}

/// One employee per line (`dr inż. Jan Kowalski`), `#` comments.
pub struct TextRoster {
    pub path: PathBuf,
}

impl TextRoster {
    pub fn parse(text: &str) -> Vec<Employee> {
        text.lines()
            .map(|l| l.replace(NEW_MARKER, ""))
            .map(|l| normalize_ws(&l))
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .filter_map(|l| {
                let (degree, name) = split_title(&l);
                (!name.is_empty()).then_some(Employee { degree, name })
            })
            .collect()
    }
}

impl EmployeeRoster for TextRoster {
    fn load(&self) -> Result<Vec<Employee>, Box<dyn Error>> {
        let text = fs::read_to_string(&self.path)
            .map_err(|e| format!("Roster {}: {e}", self.path.display()))?;
        Ok(Self::parse(&text))
    }
}

/// Pick the store by extension: `.json` → JSON, anything else → text.
pub fn roster_for(path: &Path) -> Box<dyn EmployeeRoster> {
    let is_json = path
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("json"));
    if is_json {
        Box::new(JsonRoster::new(path))
    } else {
        Box::new(TextRoster { path: path.to_path_buf() })
    }
}

/// Merge freshly scraped staff into `existing`. Old `[NEW]` markers are
/// cleared, newcomers get one. Sorted by (degree, name). Returns the merged
/// list and the number of newcomers.
pub fn merge_staff(existing: &[Employee], fresh: &[Employee]) -> (Vec<Employee>, usize) {
    let clean = |e: &Employee| Employee {
        degree: normalize_ws(&e.degree),
        name: normalize_ws(&e.name.replace(NEW_MARKER, "")),
    };
    let mut all: BTreeMap<Employee, bool> = existing.iter().map(|e| (clean(e), false)).collect();
    let mut added = 0;
    for e in fresh.iter().map(clean) {
        if e.degree.is_empty() || e.name.is_empty() {
            continue;
        }
        if !all.contains_key(&e) {
            all.insert(e, true);
            added += 1;
        }
    }
    let merged = all
        .into_iter()
        .map(|(mut e, is_new)| {
            if is_new {
                e.name.push_str(NEW_MARKER);
            }
            e
        })
        .collect();
    (merged, added)
}

/* ---------------- index ---------------- */

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EmployeeRecord {
    /// `"<degree> <name>"`
    pub full: String,
    /// Name only.
    pub short: String,
    /// Folded (lowercase ASCII letters) surname and first name.
    pub surname: String,
    pub first: String,
}

/// Roster lookups for one run. Built once, never changed afterwards.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct EmployeeIndex {
    /// Folded short code → full name; first roster entry wins.
    pub variants: BTreeMap<String, String>,
    pub records: Vec<EmployeeRecord>,
}

impl EmployeeIndex {
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn lookup(&self, key: &str) -> Option<&str> {
        self.variants.get(key).map(String::as_str)
    }

    /// Roster record whose full or short form is `name`.
    pub fn record_for(&self, name: &str) -> Option<&EmployeeRecord> {
        self.records.iter().find(|r| r.full == name || r.short == name)
    }
}

fn prefix(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((i, _)) => &s[..i],
        None => s,
    }
}

fn variants(surname: &str, first: &str) -> Vec<String> {
    let f0 = prefix(first, 1);
    let f2 = prefix(first, 2);
    let mut out = vec![
        s!(surname),
        s!(prefix(surname, 3)),
        s!(prefix(surname, 4)),
        s!(prefix(surname, 5)),
    ];
    if !f0.is_empty() {
        for n in [2, 3] {
            out.push(join!(prefix(surname, n), f0));
            out.push(join!(prefix(surname, n), f2));
            out.push(join!(f0, prefix(surname, n)));
        }
        out.push(join!(f0, prefix(surname, 4)));
        out.push(join!(f0, surname));
    }
    out.retain(|v| v.len() >= 2);
    out
}

pub fn build_employee_index(roster: &[Employee]) -> EmployeeIndex {
    let mut index = EmployeeIndex::default();
    for e in roster {
        let name = normalize_ws(&e.name.replace(NEW_MARKER, ""));
        let words: Vec<&str> = name.split_whitespace().collect();
        let (Some(first), Some(last)) = (words.first(), words.last()) else { continue };
        let surname = fold_key(last);
        let first = if words.len() > 1 { fold_key(first) } else { s!() };
        if surname.is_empty() {
            continue;
        }
        let full = normalize_ws(&join!(&e.degree, " ", &name));
        for v in variants(&surname, &first) {
            index.variants.entry(v).or_insert_with(|| full.clone());
        }
        index.records.push(EmployeeRecord { full, short: name, surname, first });
    }
    logd!("employee index: {} records, {} variants", index.records.len(), index.variants.len());
    index
}

#[cfg(test)]
mod tests {
    use super::*;

    fn emp(degree: &str, name: &str) -> Employee {
        Employee { degree: s!(degree), name: s!(name) }
    }

    #[test]
    fn titles_split_off() {
        assert_eq!(split_title("dr inż. Jan Kowalski"), (s!("dr inż."), s!("Jan Kowalski")));
        assert_eq!(
            split_title("dr hab. inż. Jan Kowalski, prof. WAT"),
            (s!("dr hab. inż., prof. WAT"), s!("Jan Kowalski"))
        );
        assert_eq!(short_name("ppłk Adam Nowak"), "Adam Nowak");
        assert!(!has_title("Adam Nowak"));
    }

    #[test]
    fn json_roster_strips_markers_and_skips_partial_rows() {
        let text = r#"{"employees":[
            {"degree":"dr","name":"Jan Kowalski [NEW]"},
            {"degree":"","name":"Bez Stopnia"},
            {"name":"Brak Pola"},
            {"degree":"mgr","name":"Ewa Lis","is_new":false}
        ]}"#;
        let got = JsonRoster::parse(text).unwrap();
        assert_eq!(got, vec![emp("dr", "Jan Kowalski"), emp("mgr", "Ewa Lis")]);
        assert!(JsonRoster::parse("not json").is_err());
    }

    #[test]
    fn text_roster_lines() {
        let got = TextRoster::parse("# staff\ndr inż. Jan Kowalski\n\nkpt. Adam Nowak [NEW]\n");
        assert_eq!(got, vec![emp("dr inż.", "Jan Kowalski"), emp("kpt.", "Adam Nowak")]);
    }

    #[test]
    fn variants_first_seen_wins() {
        let idx = build_employee_index(&[emp("dr", "Jan Kowalski"), emp("mgr", "Józef Kowalczyk")]);
        assert_eq!(idx.lookup("kowalski"), Some("dr Jan Kowalski"));
        assert_eq!(idx.lookup("kow"), Some("dr Jan Kowalski"));
        assert_eq!(idx.lookup("kowalc"), None);
        assert_eq!(idx.lookup("kowalczyk"), Some("mgr Józef Kowalczyk"));
        assert_eq!(idx.lookup("jkowa"), Some("dr Jan Kowalski"));
        assert_eq!(idx.lookup("kowj"), Some("dr Jan Kowalski"));
        assert_eq!(idx.records[1].surname, "kowalczyk");
        assert_eq!(idx.records[1].first, "jozef");
    }

    #[test]
    fn staff_merge_marks_newcomers() {
        let old = vec![emp("dr", "Jan Kowalski [NEW]")];
        let fresh = vec![emp("dr", "Jan Kowalski"), emp("mgr", "Ewa Lis")];
        let (merged, added) = merge_staff(&old, &fresh);
        assert_eq!(added, 1);
        assert_eq!(merged, vec![emp("dr", "Jan Kowalski"), emp("mgr", "Ewa Lis [NEW]")]);
    }
}
