// src/tables.rs
//
// Static layout tables shared by every faculty: day aliases, roman months,
// block times and lesson type symbols. Pure data plus lookups.

use chrono::{NaiveTime, Weekday};

pub const DAY_ALIASES: &[(&str, Weekday)] = &[
    ("pon.", Weekday::Mon),
    ("wt.", Weekday::Tue),
    ("śr.", Weekday::Wed),
    ("sr.", Weekday::Wed),
    ("czw.", Weekday::Thu),
    ("pt.", Weekday::Fri),
    ("sob.", Weekday::Sat),
    ("niedz.", Weekday::Sun),
];

pub const ROMAN_MONTHS: &[(&str, u32)] = &[
    ("I", 1), ("II", 2), ("III", 3), ("IV", 4), ("V", 5), ("VI", 6),
    ("VII", 7), ("VIII", 8), ("IX", 9), ("X", 10), ("XI", 11), ("XII", 12),
];

/// (label, alias, start, end) as (h, m) pairs.
const BLOCKS: &[(&str, &str, (u32, u32), (u32, u32))] = &[
    ("1-2", "block1", (8, 0), (9, 35)),
    ("3-4", "block2", (9, 50), (11, 25)),
    ("5-6", "block3", (11, 40), (13, 15)),
    ("7-8", "block4", (13, 30), (15, 5)),
    ("9-10", "block5", (16, 0), (17, 35)),
    ("11-12", "block6", (17, 50), (19, 25)),
    ("13-14", "block7", (19, 40), (21, 15)),
];

/// Core type symbol → human label.
pub const TYPE_LABELS: &[(&str, &str)] = &[
    ("w", "Lecture"),
    ("W", "Lecture"),
    ("ć", "Exercises"),
    ("c", "Exercises"),
    ("L", "Laboratory"),
    ("lab", "Laboratory"),
    ("S", "Seminar"),
    ("E", "Exam"),
    ("Ep", "Retake exam"),
];

/// Single-letter suffixes that mark a typed legend abbreviation (`ALGw`).
pub const TYPE_SUFFIXES: &[char] = &['c', 'w', 'L', 'S', 'E', 'l', 'C'];

/// Subject that marks a cancelled class.
pub const CANCELLED_SUBJECT: &str = "SK";

/// A named period with fixed wall-clock bounds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlockTimeSlot {
    pub label: &'static str,
    pub start: NaiveTime,
    pub end: NaiveTime,
}

/// Lowercased, trimmed day cell → weekday.
pub fn day_alias(cell: &str) -> Option<Weekday> {
    let key = cell.trim().to_lowercase();
    DAY_ALIASES.iter().find(|(a, _)| *a == key).map(|(_, d)| *d)
}

pub fn roman_month(token: &str) -> Option<u32> {
    ROMAN_MONTHS.iter().find(|(r, _)| *r == token).map(|(_, m)| *m)
}

pub fn block_time(label: &str) -> Option<BlockTimeSlot> {
    let label = label.trim();
    BLOCKS
        .iter()
        .find(|(l, alias, _, _)| *l == label || *alias == label)
        .and_then(|&(l, _, (sh, sm), (eh, em))| {
            Some(BlockTimeSlot {
                label: l,
                start: NaiveTime::from_hms_opt(sh, sm, 0)?,
                end: NaiveTime::from_hms_opt(eh, em, 0)?,
            })
        })
}

/// `w` and `(w)` both resolve to the core form `w`.
pub fn type_core(token: &str) -> Option<&'static str> {
    let t = token.trim();
    let core = t
        .strip_prefix('(')
        .and_then(|x| x.strip_suffix(')'))
        .unwrap_or(t);
    TYPE_LABELS.iter().find(|(sym, _)| *sym == core).map(|(sym, _)| *sym)
}

pub fn is_type_symbol(token: &str) -> bool {
    type_core(token).is_some()
}

/// Label for a type token as written; unknown tokens label themselves, empty → `-`.
pub fn type_label(token: &str) -> String {
    let t = token.trim();
    if t.is_empty() {
        return s!("-");
    }
    match type_core(t) {
        Some(core) => TYPE_LABELS
            .iter()
            .find(|(sym, _)| *sym == core)
            .map(|(_, label)| s!(*label))
            .unwrap_or_else(|| s!(t)),
        None => s!(t),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn day_aliases_are_case_and_space_tolerant() {
        assert_eq!(day_alias(" Pon. "), Some(Weekday::Mon));
        assert_eq!(day_alias("śr."), Some(Weekday::Wed));
        assert_eq!(day_alias("pon"), None);
    }

    #[test]
    fn both_block_families_share_times() {
        let a = block_time("1-2").unwrap();
        let b = block_time("block1").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.start, NaiveTime::from_hms_opt(8, 0, 0).unwrap());
        assert_eq!(a.end, NaiveTime::from_hms_opt(9, 35, 0).unwrap());
        assert!(block_time("15-16").is_none());
    }

    #[test]
    fn type_symbols_with_and_without_parens() {
        assert_eq!(type_label("(w)"), "Lecture");
        assert_eq!(type_label("ć"), "Exercises");
        assert_eq!(type_label("(xyz)"), "(xyz)");
        assert_eq!(type_label(""), "-");
        assert!(is_type_symbol("(lab)"));
        assert!(!is_type_symbol("ALG"));
    }
}
