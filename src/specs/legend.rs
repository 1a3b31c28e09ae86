// src/specs/legend.rs
//
// Subject / lecturer legend of a timetable page. Four heuristics, run in a
// fixed order, each adding (abbreviation, full text) pairs; the first pair
// seen for an abbreviation wins. Lecturer lines next to an entry are attached
// to it, and every lecturer line lands in the document-wide pool.

use std::collections::{BTreeMap, BTreeSet};

use once_cell::sync::Lazy;
use regex::Regex;

use crate::core::html::strip_tags;
use crate::core::sanitize::{normalize_ws, strip_diacritics};
use crate::model::LegendEntry;
use crate::tables::TYPE_SUFFIXES;

use super::grid::{Document, GridScan};

static RANK: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(prof|dr|hab|mgr|inz|pplk|plk|mjr|kpt|por|ppor|chor|sierz|kpr)\.?\b")
        .unwrap()
});
static LECTURER_SPLIT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\s*(?:;|/|,|\s+i\s+|\s+oraz\s+|•)\s*").unwrap());
static LEADING_BULLET: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[•\-–]\s*").unwrap());
static NAME_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{Lu}\p{Ll}+(?:-\p{Lu}\p{Ll}+)?$").unwrap());
static DASH_LINE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\p{L}[\p{L}\p{N}_.]{0,14})\s*[-–:]\s*(\p{L}.{2,})$").unwrap()
});
static SPACED_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\S{1,15})\s{2,}(\p{Lu}.{3,})$").unwrap());

const SHORT_MAX: usize = 15;
const CODE_MAX: usize = 6;

/// Everything a document's legend says, read-only once built.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Legend {
    pub subjects: BTreeMap<String, String>,
    pub subject_lecturers: BTreeMap<String, Vec<String>>,
    /// Lecturer code → lecturer line, from legend rows that spell codes out.
    pub lecturer_codes: BTreeMap<String, String>,
    pub all_lecturers: Vec<String>,
    pub entries: Vec<LegendEntry>,
}

impl Legend {
    /// Full subject name, or the abbreviation itself.
    pub fn full_name<'a>(&'a self, abbr: &'a str) -> &'a str {
        self.subjects.get(abbr).map(String::as_str).unwrap_or(abbr)
    }

    /// Lecturers listed under `subject`, empty if none.
    pub fn subject_pool(&self, subject: &str) -> &[String] {
        self.subject_lecturers.get(subject).map(Vec::as_slice).unwrap_or(&[])
    }
}

/// Text carries an academic or military rank.
pub fn is_lecturer_text(t: &str) -> bool {
    RANK.is_match(&strip_diacritics(t))
}

fn name_words(t: &str) -> usize {
    t.split_whitespace()
        .filter(|w| !is_lecturer_text(w) && NAME_WORD.is_match(w.trim_end_matches(['.', ','])))
        .count()
}

/// Split a lecturer list into single names. Pieces without a name word
/// (`prof. WAT`) stay glued to the previous name.
pub fn split_lecturers(t: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for part in LECTURER_SPLIT.split(t) {
        let piece = normalize_ws(&LEADING_BULLET.replace(normalize_ws(part).as_str(), ""));
        if piece.is_empty() {
            continue;
        }
        match out.last_mut() {
            Some(prev) if name_words(&piece) == 0 => {
                prev.push_str(", ");
                prev.push_str(&piece);
            }
            _ => out.push(piece),
        }
    }
    out
}

/// `Kw` + `dr Jan Kowalski`: a short code spelled out as a lecturer line.
fn is_code_pair(abbr: &str, full: &str) -> bool {
    abbr.chars().count() <= CODE_MAX
        && is_lecturer_text(full)
        && name_words(full) >= 2
        && split_lecturers(full).len() == 1
}

#[derive(Default)]
struct Builder {
    entries: Vec<LegendEntry>,
    codes: BTreeMap<String, String>,
    pool: Vec<String>,
    last: Option<usize>,
}

impl Builder {
    fn add_entry(&mut self, abbr: &str, full: &str) {
        let (abbr, full) = (abbr.trim(), normalize_ws(full));
        if abbr.is_empty() || full.is_empty() {
            return;
        }
        if let Some(i) = self
            .entries
            .iter()
            .position(|e| e.abbreviation == abbr && e.full_text == full)
        {
            self.last = Some(i);
            return;
        }
        self.entries.push(LegendEntry {
            abbreviation: s!(abbr),
            full_text: full,
            lecturers: Vec::new(),
        });
        self.last = Some(self.entries.len() - 1);
    }

    fn add_code(&mut self, code: &str, full: &str) {
        let full = normalize_ws(full);
        self.codes.entry(s!(code.trim())).or_insert_with(|| full.clone());
        push_unique!(self.pool, full);
    }

    /// Attach to the current entry (if any) and pool the names.
    fn attach(&mut self, text: &str) {
        for name in split_lecturers(text) {
            if let Some(e) = self.last.and_then(|i| self.entries.get_mut(i)) {
                push_unique!(e.lecturers, name.clone());
            }
            push_unique!(self.pool, name);
        }
    }

    /// Left/right pair from any heuristic.
    fn pair(&mut self, abbr: &str, full: &str) {
        if is_code_pair(abbr, full) {
            self.add_code(abbr, full);
            self.attach(full);
        } else if is_lecturer_text(full) {
            self.attach(full);
        } else {
            self.add_entry(abbr, full);
        }
    }
}

fn mergewith_cells(doc: &Document, b: &mut Builder) {
    for cell in &doc.cells {
        let full = cell.mergewith.as_deref().map(strip_tags).filter(|f| !f.is_empty());
        let abbr = cell.text.as_str();
        match full {
            Some(full) if !abbr.is_empty() => b.pair(abbr, &full),
            _ if b.last.is_some() && is_lecturer_text(&cell.text) => b.attach(&cell.text),
            _ => {}
        }
    }
}

fn two_cell_rows(doc: &Document, scan: &GridScan, b: &mut Builder) {
    b.last = None;
    for (ti, table) in doc.tables.iter().enumerate() {
        for (ri, row) in table.rows.iter().enumerate() {
            if scan.table == Some(ti) && scan.schedule_rows.contains(&ri) {
                continue;
            }
            let texts: Vec<&str> = row
                .cells
                .iter()
                .map(|c| c.text.as_str())
                .filter(|t| !t.is_empty())
                .collect();
            match texts.as_slice() {
                [left, right] => {
                    let short = left.chars().count() <= SHORT_MAX && !left.contains(char::is_whitespace);
                    let longer = right.chars().count() > left.chars().count() + 3 && right.contains(' ');
                    if short && longer {
                        b.pair(left, right);
                    } else if b.last.is_some() && is_lecturer_text(right) {
                        b.attach(right);
                    }
                }
                [only] if b.last.is_some() && is_lecturer_text(only) => b.attach(only),
                _ => {}
            }
        }
    }
}

fn text_lines(doc: &Document, re: &Regex, b: &mut Builder) {
    b.last = None;
    for line in &doc.lines {
        if let Some(c) = re.captures(line) {
            b.pair(&c[1], &c[2]);
        } else if is_lecturer_text(line) {
            b.attach(line);
        } else {
            b.last = None;
        }
    }
}

/// Build the legend of `doc`. Rows that `scan` used as timetable rows are
/// not read as legend rows.
pub fn extract(doc: &Document, scan: &GridScan) -> Legend {
    let mut b = Builder::default();
    mergewith_cells(doc, &mut b);
    two_cell_rows(doc, scan, &mut b);
    text_lines(doc, &DASH_LINE, &mut b);
    text_lines(doc, &SPACED_LINE, &mut b);

    // Lecturer lines anywhere on the page.
    for line in &doc.lines {
        if !is_lecturer_text(line) {
            continue;
        }
        for name in split_lecturers(line) {
            if is_lecturer_text(&name) {
                push_unique!(b.pool, name);
            }
        }
    }

    let mut legend = Legend { entries: b.entries, lecturer_codes: b.codes, ..Default::default() };
    let mut seen_subjects = BTreeSet::new();
    for e in &legend.entries {
        legend.subjects.entry(e.abbreviation.clone()).or_insert_with(|| e.full_text.clone());
        seen_subjects.insert(e.abbreviation.clone());
        if !e.lecturers.is_empty() {
            let list = legend.subject_lecturers.entry(e.abbreviation.clone()).or_default();
            for l in &e.lecturers {
                push_unique!(list, l.clone());
            }
        }
    }
    // `ALGw` also answers for `ALG`, never overriding a real `ALG` row.
    for e in &legend.entries {
        let abbr = &e.abbreviation;
        let Some(last) = abbr.chars().last() else { continue };
        if abbr.chars().count() <= 3 || !TYPE_SUFFIXES.contains(&last) {
            continue;
        }
        let core = &abbr[..abbr.len() - last.len_utf8()];
        if seen_subjects.contains(core) {
            continue;
        }
        legend.subjects.entry(s!(core)).or_insert_with(|| e.full_text.clone());
        if !e.lecturers.is_empty() {
            let list = legend.subject_lecturers.entry(s!(core)).or_default();
            for l in &e.lecturers {
                push_unique!(list, l.clone());
            }
        }
    }
    legend.all_lecturers = b.pool;
    logd!(
        "legend: {} subjects, {} codes, {} lecturers",
        legend.subjects.len(),
        legend.lecturer_codes.len(),
        legend.all_lecturers.len()
    );
    legend
}
