// src/resolver.rs
//
// Lecturer codes → names. Each code goes through the chain below and stops
// at the first hit; a code nothing recognises is kept verbatim.
//
//   0. the page's code legend (`Kw - dr Jan Kowalski`)
//   1. roster variant index
//   2. variant index with the code cut to 5, 4, 3 letters
//   3. surname prefix + first initial (`KowJ`, `JKw`, `KwJ`)
//   4. letter matching against the subject's legend lecturers, else every
//      lecturer on the page, else the whole roster

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::options::{MatchMode, NameMode};
use crate::core::sanitize::fold_key;
use crate::roster::{has_title, short_name, EmployeeIndex, EmployeeRecord};
use crate::specs::legend::Legend;

static CODE_SPLIT: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s/,;]+").unwrap());
static PREFIX_INITIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\p{L}{2,3}\p{Lu}$").unwrap());

/// Code letters appear in `hay` in order.
fn is_subsequence(code: &str, hay: &str) -> bool {
    let mut rest = hay.chars();
    code.chars().all(|c| rest.any(|h| h == c))
}

/// Every distinct letter of `code` appears somewhere in `hay`.
fn contains_letters(code: &str, hay: &str) -> bool {
    code.chars().all(|c| hay.contains(c))
}

/// Uppercase-led segments: `JKw` → `J`, `Kw`.
fn segments(code: &str) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for c in code.chars() {
        if c.is_uppercase() || out.is_empty() {
            out.push(String::new());
        }
        if let Some(last) = out.last_mut() {
            last.push(c);
        }
    }
    out
}

/// Abbreviation starts the surname and its letters follow in order.
fn abbreviates(abbr: &str, surname: &str) -> bool {
    let abbr = fold_key(abbr);
    match abbr.chars().next() {
        Some(c) => surname.starts_with(c) && is_subsequence(&abbr, surname),
        None => false,
    }
}

pub struct Resolver<'a> {
    index: &'a EmployeeIndex,
    legend: &'a Legend,
    mode: MatchMode,
}

impl<'a> Resolver<'a> {
    pub fn new(index: &'a EmployeeIndex, legend: &'a Legend, mode: MatchMode) -> Self {
        Self { index, legend, mode }
    }

    fn by_variant(&self, key: &str) -> Option<String> {
        if let Some(full) = self.index.lookup(key) {
            return Some(s!(full));
        }
        let n = key.chars().count();
        [5usize, 4, 3]
            .into_iter()
            .filter(|&cut| cut < n)
            .find_map(|cut| {
                let short: String = key.chars().take(cut).collect();
                self.index.lookup(&short).map(str::to_string)
            })
    }

    fn find_record(&self, pick: impl Fn(&EmployeeRecord) -> bool) -> Option<String> {
        self.index.records.iter().find(|r| pick(r)).map(|r| r.full.clone())
    }

    fn by_prefix_initial(&self, code: &str) -> Option<String> {
        if PREFIX_INITIAL.is_match(code) {
            let key = fold_key(code);
            if key.len() >= 3 {
                let (prefix, initial) = key.split_at(key.len() - 1);
                let hit = self.find_record(|r| {
                    r.surname.starts_with(prefix) && r.first.starts_with(initial)
                });
                if hit.is_some() {
                    return hit;
                }
            }
        }
        let segs = segments(code);
        let [a, b] = segs.as_slice() else { return None };
        let initial = |s: &str| fold_key(s).chars().count() == 1;
        if initial(a) {
            let i = fold_key(a);
            let hit = self.find_record(|r| r.first.starts_with(&i) && abbreviates(b, &r.surname));
            if hit.is_some() {
                return hit;
            }
        }
        if initial(b) {
            let i = fold_key(b);
            return self.find_record(|r| r.first.starts_with(&i) && abbreviates(a, &r.surname));
        }
        None
    }

    fn letters_match(&self, key: &str, name: &str) -> bool {
        match self.mode {
            MatchMode::Containment => contains_letters(key, &fold_key(name)),
            MatchMode::Subsequence => {
                let short = short_name(name);
                let words: Vec<String> = short.split_whitespace().map(fold_key).collect();
                let starts_word = key
                    .chars()
                    .next()
                    .is_some_and(|c| words.iter().any(|w| w.starts_with(c)));
                starts_word && is_subsequence(key, &words.concat())
            }
        }
    }

    fn by_letters(&self, key: &str, pool: &[String], used: &[String]) -> Option<String> {
        pool.iter()
            .filter(|name| !used.contains(name))
            .find(|name| self.letters_match(key, name))
            .cloned()
    }

    fn candidates(&self, subject: &str) -> Vec<String> {
        let pool = self.legend.subject_pool(subject);
        if !pool.is_empty() {
            return pool.to_vec();
        }
        if !self.legend.all_lecturers.is_empty() {
            return self.legend.all_lecturers.clone();
        }
        self.index.records.iter().map(|r| r.full.clone()).collect()
    }

    fn resolve_one(&self, code: &str, pool: &[String], used: &[String]) -> String {
        if let Some(full) = self.legend.lecturer_codes.get(code) {
            return full.clone();
        }
        let key = fold_key(code);
        if key.is_empty() {
            return s!(code);
        }
        if let Some(full) = self.by_variant(&key) {
            return full;
        }
        if let Some(full) = self.by_prefix_initial(code) {
            return full;
        }
        if let Some(full) = self.by_letters(&key, pool, used) {
            return full;
        }
        s!(code)
    }

    /// Names for the lecturer code string of one `subject` lesson, in code
    /// order, without duplicates. Never fails; unknown codes come back as is.
    pub fn resolve(&self, subject: &str, code: &str) -> Vec<String> {
        let codes: Vec<&str> = CODE_SPLIT.split(code.trim()).filter(|c| !c.is_empty()).collect();
        if codes.is_empty() {
            let pool = self.legend.subject_pool(subject);
            return if pool.len() == 1 { pool.to_vec() } else { Vec::new() };
        }
        let pool = self.candidates(subject);
        let mut out: Vec<String> = Vec::new();
        for c in codes {
            let name = self.resolve_one(c, &pool, &out);
            if name != c {
                logd!("lecturer {c} -> {name}");
            }
            push_unique!(out, name);
        }
        out
    }
}

/// Apply the name display mode to one lesson's lecturer list.
pub fn format_names(names: &[String], mode: NameMode) -> Vec<String> {
    let short = match mode {
        NameMode::Full => false,
        NameMode::Short => true,
        NameMode::Auto => names.iter().any(|n| !has_title(n)),
    };
    if !short {
        return names.to_vec();
    }
    let mut out = Vec::with_capacity(names.len());
    for n in names {
        push_unique!(out, short_name(n));
    }
    out
}
