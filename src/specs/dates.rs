// src/specs/dates.rs
//
// Date header tokens (`03 III`) and the year they belong to.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::tables::roman_month;

static DATE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(\d{2})\s+([IVX]{1,4})$").unwrap());
static ACADEMIC_YEAR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(20\d{2})\s*/\s*(20\d{2})\b").unwrap());
static BARE_YEAR: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b(20\d{2})\b").unwrap());

/// Which calendar year a month falls in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum YearRule {
    /// Academic year starting in the autumn of this year:
    /// September..December stay in it, January..August roll into the next.
    Academic(i32),
    /// Every month in this year.
    Calendar(i32),
}

impl YearRule {
    pub fn year_for(&self, month: u32) -> i32 {
        match *self {
            YearRule::Academic(autumn) if month >= 9 => autumn,
            YearRule::Academic(autumn) => autumn + 1,
            YearRule::Calendar(y) => y,
        }
    }

    /// Academic year that `today` belongs to.
    pub fn academic_for(today: NaiveDate) -> Self {
        let y = today.year();
        YearRule::Academic(if today.month() >= 9 { y } else { y - 1 })
    }
}

/// Best-effort: `YYYY/YYYY` first, then a bare year, then `fallback`.
pub fn infer_year(text: &str, fallback: YearRule) -> YearRule {
    if let Some(c) = ACADEMIC_YEAR.captures(text) {
        if let Ok(autumn) = c[1].parse::<i32>() {
            return YearRule::Academic(autumn);
        }
    }
    if let Some(m) = BARE_YEAR.find(text) {
        if let Ok(y) = m.as_str().parse::<i32>() {
            return YearRule::Calendar(y);
        }
    }
    fallback
}

/// `"03 III"` → March 3rd of the rule's year. Anything else, including
/// impossible dates, is `None`.
pub fn parse_date_token(token: &str, rule: YearRule) -> Option<NaiveDate> {
    let token = token.replace('\u{a0}', " ");
    let c = DATE_TOKEN.captures(token.trim())?;
    let day: u32 = c[1].parse().ok()?;
    let month = roman_month(&c[2])?;
    NaiveDate::from_ymd_opt(rule.year_for(month), month, day)
}
