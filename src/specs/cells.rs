// src/specs/cells.rs
//
// Token classification for the text lines of one grid cell.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::config::layout::{FacultyLayout, TokenOrder};
use crate::tables::{is_type_symbol, CANCELLED_SUBJECT};

static SUBJECT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-ZĄĆĘŁŃÓŚŹŻ][A-ZĄĆĘŁŃÓŚŹŻ0-9-]{1,7}$").unwrap());
static ROOM: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2,3}(?:\s*\d{2})?[A-Za-z]?$").unwrap());
static LECTURER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-ZĄĆĘŁŃÓŚŹŻ][A-Za-zĄĆĘŁŃÓŚŹŻąćęłńóśźż]{1,}$").unwrap()
});
static CODE_SEP: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\s/,;]+").unwrap());

/// Fields read from one cell, before dates and names are attached.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CellTokens {
    pub subject: String,
    pub percent: Option<String>,
    pub type_symbol: String,
    pub room: String,
    pub lecturer_code: String,
}

fn is_percent(t: &str) -> bool {
    t.contains('%')
}

/// One code, or several joined by `/`, `,` or `;` (`Kw/Nw`), kept verbatim.
fn is_lecturer_codes(t: &str) -> bool {
    if LECTURER.is_match(t) {
        return true;
    }
    if !t.contains(['/', ',', ';']) {
        return false;
    }
    let mut pieces = CODE_SEP.split(t).filter(|p| !p.is_empty()).peekable();
    pieces.peek().is_some() && pieces.all(|p| LECTURER.is_match(p))
}

/// A line that fits some role as a whole.
fn has_role(t: &str) -> bool {
    is_percent(t)
        || SUBJECT.is_match(t)
        || is_type_symbol(t)
        || ROOM.is_match(t)
        || is_lecturer_codes(t)
}

/// Lines with no role are split on whitespace (`"24 Trzc"` → `24`, `Trzc`).
fn expand(lines: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(lines.len());
    for l in lines {
        if has_role(l) {
            out.push(l.clone());
        } else {
            out.extend(l.split_whitespace().map(str::to_string));
        }
    }
    out
}

fn take_percent(lines: &mut Vec<String>) -> Option<String> {
    if lines.first().is_some_and(|l| is_percent(l)) {
        Some(lines.remove(0))
    } else {
        None
    }
}

fn classified(lines: &[String]) -> Option<CellTokens> {
    let mut lines = expand(lines);
    let percent = take_percent(&mut lines);
    let at = lines.iter().position(|l| SUBJECT.is_match(l))?;

    let mut t = CellTokens { subject: lines[at].clone(), percent, ..Default::default() };
    let mut codes: Vec<&str> = Vec::new();
    for line in &lines[at + 1..] {
        if t.type_symbol.is_empty() && is_type_symbol(line) {
            t.type_symbol = line.clone();
        } else if t.room.is_empty() && ROOM.is_match(line) {
            t.room = line.split_whitespace().collect();
        } else if is_lecturer_codes(line) {
            codes.push(line);
        }
    }
    t.lecturer_code = codes.join(" ");
    Some(t)
}

fn positional(lines: &[String], with_room: bool) -> Option<CellTokens> {
    let mut lines = if lines.len() == 1 { expand(lines) } else { lines.to_vec() };
    let percent = take_percent(&mut lines);
    let at = |i: usize| lines.get(i).cloned().unwrap_or_default();

    let subject = at(0);
    if subject.is_empty() {
        return None;
    }
    let (room, lecturer_code) = if with_room { (at(2), at(3)) } else { (s!(), at(2)) };
    Some(CellTokens { subject, percent, type_symbol: at(1), room, lecturer_code })
}

fn by_order(lines: &[String], order: TokenOrder) -> Option<CellTokens> {
    match order {
        TokenOrder::Classified => classified(lines),
        TokenOrder::Positional => positional(lines, true),
        TokenOrder::PositionalNoRoom => positional(lines, false),
    }
}

/// Classify `lines` under the layout's token order, switching to the PE
/// order for PE subjects. Empty cells and cancelled classes give `None`.
pub fn classify(lines: &[String], layout: &FacultyLayout) -> Option<CellTokens> {
    let lines: Vec<String> = lines
        .iter()
        .map(|l| l.trim())
        .filter(|l| !l.is_empty() && *l != "-")
        .map(str::to_string)
        .collect();
    if lines.is_empty() {
        return None;
    }

    let mut tokens = by_order(&lines, layout.token_order)?;
    if layout.is_pe(&tokens.subject) && layout.pe_order != layout.token_order {
        tokens = by_order(&lines, layout.pe_order)?;
    }
    if tokens.subject.trim().eq_ignore_ascii_case(CANCELLED_SUBJECT) {
        return None;
    }
    Some(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(v: &[&str]) -> Vec<String> {
        v.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn classified_single_line_is_split() {
        let l = FacultyLayout::wel();
        let t = classify(&lines(&["ALG (w) 105 Kw"]), &l).unwrap();
        assert_eq!(t.subject, "ALG");
        assert_eq!(t.type_symbol, "(w)");
        assert_eq!(t.room, "105");
        assert_eq!(t.lecturer_code, "Kw");
    }

    #[test]
    fn classified_with_percent_and_mixed_room_line() {
        let l = FacultyLayout::wel();
        let t = classify(&lines(&["50%", "FIZ", "L", "24 Trzc"]), &l).unwrap();
        assert_eq!(t.percent.as_deref(), Some("50%"));
        assert_eq!((t.subject.as_str(), t.type_symbol.as_str()), ("FIZ", "L"));
        assert_eq!((t.room.as_str(), t.lecturer_code.as_str()), ("24", "Trzc"));
    }

    #[test]
    fn joined_lecturer_codes_stay_whole() {
        let l = FacultyLayout::wel();
        let t = classify(&lines(&["FIZ", "L", "24", "Kw/Nw"]), &l).unwrap();
        assert_eq!(t.lecturer_code, "Kw/Nw");
        let t = classify(&lines(&["FIZ", "L", "24", "Kw; Nw"]), &l).unwrap();
        assert_eq!(t.lecturer_code, "Kw; Nw");
        let t = classify(&lines(&["ALG (w) 105 Kw,Nw"]), &l).unwrap();
        assert_eq!((t.room.as_str(), t.lecturer_code.as_str()), ("105", "Kw,Nw"));

        // a room number in the list disqualifies it
        assert!(!is_lecturer_codes("24/Kw"));
        assert!(!is_lecturer_codes("/;"));
    }

    #[test]
    fn positional_and_pe_orders() {
        let l = FacultyLayout::wtc();
        let t = classify(&lines(&["ANM", "ć", "112", "Nw"]), &l).unwrap();
        assert_eq!((t.room.as_str(), t.lecturer_code.as_str()), ("112", "Nw"));

        let t = classify(&lines(&["WF", "ć", "Czaj"]), &l).unwrap();
        assert_eq!(t.room, "");
        assert_eq!(t.lecturer_code, "Czaj");
    }

    #[test]
    fn cancelled_and_empty_cells_are_dropped() {
        let l = FacultyLayout::wel();
        assert!(classify(&lines(&["SK"]), &l).is_none());
        assert!(classify(&lines(&["-", " "]), &l).is_none());
        assert!(classify(&lines(&["sk", "w"]), &FacultyLayout::wtc()).is_none());
    }
}
