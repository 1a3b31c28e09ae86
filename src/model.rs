// src/model.rs
use std::collections::BTreeMap;

use chrono::{NaiveDate, NaiveDateTime, Weekday};

use crate::tables::BlockTimeSlot;

/// One grid cell after token classification, placed on a date and block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RawCellEntry {
    pub day: Weekday,
    pub date: NaiveDate,
    pub slot: BlockTimeSlot,
    pub subject: String,
    /// Display-only prefix such as `50%`.
    pub percent: Option<String>,
    pub type_symbol: String,
    pub room: String,
    /// Raw lecturer code(s), space-joined; may be empty.
    pub lecturer_code: String,
}

/// A legend row: abbreviation, its expansion and the lecturers listed with it.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LegendEntry {
    pub abbreviation: String,
    pub full_text: String,
    pub lecturers: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lesson {
    pub group: String,
    pub date: NaiveDate,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub subject: String,
    /// `subject` with its percent prefix, if the cell had one.
    pub subject_display: String,
    pub full_subject_name: String,
    pub type_symbol: String,
    pub type_label: String,
    pub room: String,
    pub lecturers: Vec<String>,
    /// `"k/total"` within the group's (subject, type) series.
    pub lesson_number: String,
}

impl Lesson {
    /// `SUMMARY` text: subject and type symbol.
    pub fn title(&self) -> String {
        join!(&self.subject_display, " ", &self.type_symbol).trim().to_string()
    }
}

/// Group id → lessons in scan order.
pub type ScheduleCollection = BTreeMap<String, Vec<Lesson>>;
