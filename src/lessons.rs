// src/lessons.rs
//
// One document → the group's lesson list: grid scan, legend, lecturer
// resolution, numbering and lecturer propagation. Pure: same input, same
// output.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::consts::PROPAGATE_MAX;
use crate::config::layout::{FacultyLayout, PeFallback};
use crate::config::options::{MatchMode, NameMode};
use crate::model::{Lesson, RawCellEntry, ScheduleCollection};
use crate::resolver::{format_names, Resolver};
use crate::roster::EmployeeIndex;
use crate::specs::dates::YearRule;
use crate::specs::grid::{self, Document};
use crate::specs::legend::{self, Legend};
use crate::tables::{type_core, type_label};

/// Everything a parse needs besides the HTML.
#[derive(Clone, Copy, Debug)]
pub struct ParseContext<'a> {
    pub group: &'a str,
    pub layout: &'a FacultyLayout,
    pub index: &'a EmployeeIndex,
    pub match_mode: MatchMode,
    pub name_mode: NameMode,
    /// Used when the page names no year.
    pub year_hint: YearRule,
}

impl<'a> ParseContext<'a> {
    pub fn new(layout: &'a FacultyLayout, index: &'a EmployeeIndex, year_hint: YearRule) -> Self {
        Self {
            group: "",
            layout,
            index,
            match_mode: MatchMode::default(),
            name_mode: NameMode::default(),
            year_hint,
        }
    }

    pub fn for_group(&self, group: &'a str) -> Self {
        Self { group, ..*self }
    }
}

fn build_lesson(e: &RawCellEntry, legend: &Legend, resolver: &Resolver, ctx: &ParseContext) -> Lesson {
    let mut lecturers = resolver.resolve(&e.subject, &e.lecturer_code);
    if e.lecturer_code.trim().is_empty() && ctx.layout.is_pe(&e.subject) {
        if let PeFallback::Substitute(code) = &ctx.layout.pe_fallback {
            lecturers = resolver.resolve(&e.subject, code);
        }
    }
    let subject_display = match &e.percent {
        Some(p) => join!(p, " ", &e.subject),
        None => e.subject.clone(),
    };
    Lesson {
        group: s!(ctx.group),
        date: e.date,
        start: e.date.and_time(e.slot.start),
        end: e.date.and_time(e.slot.end),
        subject: e.subject.clone(),
        subject_display,
        full_subject_name: s!(legend.full_name(&e.subject)),
        type_symbol: e.type_symbol.clone(),
        type_label: type_label(&e.type_symbol),
        room: e.room.clone(),
        lecturers,
        lesson_number: s!(),
    }
}

/// (subject, type) with the type reduced to its symbol, so `w` and `(w)`
/// are one series. Unknown type tokens are kept as written.
fn series_key(l: &Lesson) -> (String, String) {
    let kind = type_core(&l.type_symbol).map_or_else(|| l.type_symbol.trim().to_string(), str::to_string);
    (l.subject.clone(), kind)
}

/// `"k/total"` per (subject, type), in scan order.
pub fn number_lessons(lessons: &mut [Lesson]) {
    let mut totals: BTreeMap<(String, String), usize> = BTreeMap::new();
    for l in lessons.iter() {
        *totals.entry(series_key(l)).or_default() += 1;
    }
    let mut seen: BTreeMap<(String, String), usize> = BTreeMap::new();
    for l in lessons.iter_mut() {
        let key = series_key(l);
        let k = seen.entry(key.clone()).or_default();
        *k += 1;
        let total = totals.get(&key).copied().unwrap_or(*k);
        l.lesson_number = format!("{k}/{total}");
    }
}

/// Fill empty lecturer lists from lessons of the same subject and type,
/// else the same subject, but only from pools of at most three names.
pub fn propagate_lecturers(lessons: &mut [Lesson]) {
    let mut by_kind: BTreeMap<(String, String), BTreeSet<String>> = BTreeMap::new();
    let mut by_subject: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
    for l in lessons.iter().filter(|l| !l.lecturers.is_empty()) {
        let kind = by_kind.entry(series_key(l)).or_default();
        let subj = by_subject.entry(l.subject.clone()).or_default();
        for name in &l.lecturers {
            kind.insert(name.clone());
            subj.insert(name.clone());
        }
    }
    for l in lessons.iter_mut().filter(|l| l.lecturers.is_empty()) {
        let pool = by_kind
            .get(&series_key(l))
            .or_else(|| by_subject.get(&l.subject));
        if let Some(pool) = pool.filter(|p| p.len() <= PROPAGATE_MAX) {
            l.lecturers = pool.iter().cloned().collect();
        }
    }
}

/// Lessons of one group's page. No document, no table or nothing
/// recognisable all give an empty list.
pub fn parse_document(html: Option<&str>, ctx: &ParseContext) -> Vec<Lesson> {
    let Some(html) = html.filter(|h| !h.trim().is_empty()) else { return Vec::new() };

    let doc = Document::parse(html);
    let scan = grid::scan(&doc, ctx.layout, ctx.year_hint);
    if scan.entries.is_empty() {
        return Vec::new();
    }
    let legend = legend::extract(&doc, &scan);
    let resolver = Resolver::new(ctx.index, &legend, ctx.match_mode);

    let mut lessons: Vec<Lesson> = scan
        .entries
        .iter()
        .map(|e| build_lesson(e, &legend, &resolver, ctx))
        .collect();
    number_lessons(&mut lessons);
    propagate_lecturers(&mut lessons);
    for l in &mut lessons {
        l.lecturers = format_names(&l.lecturers, ctx.name_mode);
    }
    logd!("{}: {} lessons", ctx.group, lessons.len());
    lessons
}

/// Parse every group's document.
pub fn parse_documents(docs: &BTreeMap<String, Option<String>>, ctx: &ParseContext) -> ScheduleCollection {
    docs.iter()
        .map(|(group, html)| {
            let lessons = parse_document(html.as_deref(), &ctx.for_group(group));
            (group.clone(), lessons)
        })
        .collect()
}
