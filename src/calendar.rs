// src/calendar.rs
//
// Lessons → iCalendar text, one file per group. Times on the pages are
// Warsaw wall-clock times; events are written in UTC.

use std::path::{Path, PathBuf};

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::config::consts::PRODID;
use crate::file::{calendar_path, ensure_directory, write_if_changed, FileStatus};
use crate::model::{Lesson, ScheduleCollection};

const UTC_STAMP: &str = "%Y%m%dT%H%M%SZ";

/// Day of the last Sunday in `month`.
fn last_sunday(year: i32, month: u32) -> Option<NaiveDate> {
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let last = NaiveDate::from_ymd_opt(ny, nm, 1)?.pred_opt()?;
    let back = last.weekday().num_days_from_sunday();
    last.checked_sub_signed(Duration::days(back as i64))
}

/// UTC offset of a Warsaw local time: +2h from the last Sunday of March
/// 02:00 up to the last Sunday of October 03:00, +1h otherwise.
pub fn warsaw_offset(local: NaiveDateTime) -> Duration {
    let y = local.year();
    let at = |month, h| {
        let t = NaiveTime::from_hms_opt(h, 0, 0)?;
        last_sunday(y, month).map(|d| d.and_time(t))
    };
    match (at(3, 2), at(10, 3)) {
        (Some(start), Some(end)) if start <= local && local < end => Duration::hours(2),
        _ => Duration::hours(1),
    }
}

pub fn to_utc_stamp(local: NaiveDateTime) -> String {
    (local - warsaw_offset(local)).format(UTC_STAMP).to_string()
}

fn description(l: &Lesson) -> String {
    let mut parts: Vec<String> = Vec::with_capacity(4);
    if !l.full_subject_name.is_empty() {
        parts.push(l.full_subject_name.clone());
    }
    if !l.type_label.is_empty() {
        parts.push(join!("Rodzaj zajęć: ", &l.type_label));
    }
    if !l.lesson_number.is_empty() {
        parts.push(join!("Numer zajęć: ", &l.lesson_number));
    }
    if !l.lecturers.is_empty() {
        parts.push(join!("Prowadzący: ", &l.lecturers.join("; ")));
    }
    // property values carry a literal `\n`, not a line break
    parts.join("\\n")
}

/// Whole calendar for one group.
pub fn generate_ics(group: &str, lessons: &[Lesson]) -> String {
    let mut lines: Vec<String> = vec![
        s!("BEGIN:VCALENDAR"),
        s!("VERSION:2.0"),
        join!("PRODID:", PRODID),
        s!("CALSCALE:GREGORIAN"),
        join!("X-WR-CALNAME:", group),
    ];
    for l in lessons {
        lines.push(s!("BEGIN:VEVENT"));
        lines.push(join!("DTSTART:", &to_utc_stamp(l.start)));
        lines.push(join!("DTEND:", &to_utc_stamp(l.end)));
        lines.push(join!("SUMMARY:", &l.title()));
        lines.push(join!("LOCATION:", &l.room));
        lines.push(join!("DESCRIPTION:", &description(l)));
        lines.push(s!("END:VEVENT"));
    }
    lines.push(s!("END:VCALENDAR"));
    lines.join("\n")
}

pub fn save_calendar(dir: &Path, group: &str, lessons: &[Lesson]) -> Result<FileStatus, Box<dyn std::error::Error>> {
    let path = calendar_path(dir, group);
    write_if_changed(&path, &generate_ics(group, lessons))
}

/// Per-status group lists of one `save_all` call.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SaveSummary {
    pub dir: PathBuf,
    pub added: Vec<String>,
    pub changed: Vec<String>,
    pub unchanged: Vec<String>,
    /// Groups with no lessons; no file written.
    pub skipped: Vec<String>,
    /// (group, error) for writes that failed.
    pub failed: Vec<(String, String)>,
}

impl SaveSummary {
    pub fn saved(&self) -> usize {
        self.added.len() + self.changed.len() + self.unchanged.len()
    }
}

/// Write every group with lessons. A failed write is recorded and the rest
/// continue; only an unusable output directory is an error.
pub fn save_all(dir: &Path, schedules: &ScheduleCollection) -> Result<SaveSummary, Box<dyn std::error::Error>> {
    ensure_directory(dir)?;
    let mut summary = SaveSummary { dir: dir.to_path_buf(), ..Default::default() };

    for (group, lessons) in schedules {
        if lessons.is_empty() {
            logw!("No lessons found for {group}, skipping");
            summary.skipped.push(group.clone());
            continue;
        }
        match save_calendar(dir, group, lessons) {
            Ok(status) => {
                logf!("Saved {group}: {status}");
                match status {
                    FileStatus::Added => summary.added.push(group.clone()),
                    FileStatus::Changed => summary.changed.push(group.clone()),
                    FileStatus::Unchanged => summary.unchanged.push(group.clone()),
                }
            }
            Err(e) => {
                loge!("Could not save {group}: {e}");
                summary.failed.push((group.clone(), e.to_string()));
            }
        }
    }
    logf!(
        "Calendars: {} saved (added {}, changed {}, unchanged {})",
        summary.saved(), summary.added.len(), summary.changed.len(), summary.unchanged.len()
    );
    Ok(summary)
}
