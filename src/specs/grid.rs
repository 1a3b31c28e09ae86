// src/specs/grid.rs
//
// Timetable grid: table model of one document and the row scanner that turns
// it into dated, timed cell entries.
//
// Scanner states: SCANNING until a day header row is seen, then IN_DAY with
// the header's date columns until the next header. Merged cells are carried
// over rows in `active` when the layout tracks spans.

use std::collections::BTreeSet;

use chrono::{NaiveDate, Weekday};

use crate::config::layout::{FacultyLayout, LabelCell};
use crate::core::html::{
    attr_ci, direct_children_ci, inner_html, next_element_ci, opener, tag_close, to_lower,
};
use crate::core::vischars::{visible_lines, visible_text};
use crate::model::RawCellEntry;
use crate::tables::{block_time, day_alias, BlockTimeSlot};

use super::cells::{classify, CellTokens};
use super::dates::{infer_year, parse_date_token, YearRule};

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridCell {
    /// Visible text lines; empty lines and lone dashes dropped.
    pub lines: Vec<String>,
    /// Whole cell text on one line.
    pub text: String,
    pub colspan: usize,
    pub rowspan: usize,
    pub mergewith: Option<String>,
}

impl GridCell {
    fn from_block(block: &str, name: &str) -> Self {
        let open = opener(block);
        let inner = inner_html(block, name);
        let span = |attr: &str| {
            attr_ci(open, attr)
                .and_then(|v| v.trim().parse::<usize>().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(1)
        };
        Self {
            lines: visible_lines(inner).into_iter().filter(|l| l != "-").collect(),
            text: visible_text(inner).trim().to_string(),
            colspan: span("colspan"),
            rowspan: span("rowspan"),
            mergewith: attr_ci(open, "mergewith"),
        }
    }

    pub fn is_blank(&self) -> bool {
        self.text.is_empty() || self.text == "-"
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct GridRow {
    pub cells: Vec<GridCell>,
}

/// Rows of one `<table>`, not including rows of nested tables.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TableGrid {
    pub rows: Vec<GridRow>,
}

impl TableGrid {
    fn from_span(doc: &str, lc: &str, start: usize, end: usize) -> Self {
        let body = tag_close(lc, start).min(end);
        let rows = direct_children_ci(lc, body, end, &["tr"])
            .into_iter()
            .map(|(rs, re, _)| {
                let open_end = tag_close(lc, rs).min(re);
                let cells = direct_children_ci(lc, open_end, re, &["td", "th"])
                    .into_iter()
                    .map(|(cs, ce, k)| GridCell::from_block(&doc[cs..ce], ["td", "th"][k]))
                    .collect();
                GridRow { cells }
            })
            .collect();
        Self { rows }
    }

    fn has_day_row(&self) -> bool {
        self.rows
            .iter()
            .any(|r| r.cells.first().is_some_and(|c| day_alias(&c.text).is_some()))
    }
}

/// One HTML document, split into what the grid scanner and the legend
/// extractor need. Built once per document.
#[derive(Clone, Debug, Default)]
pub struct Document {
    /// Every table in document order, nested ones included.
    pub tables: Vec<TableGrid>,
    /// Every `<td>` in document order.
    pub cells: Vec<GridCell>,
    /// Visible text, one text node per line.
    pub lines: Vec<String>,
    /// Visible text on one line (year inference).
    pub text: String,
}

impl Document {
    pub fn parse(html: &str) -> Self {
        let lc = to_lower(html);

        let mut tables = Vec::new();
        let mut pos = 0;
        while let Some((start, end)) = next_element_ci(&lc, "table", pos) {
            tables.push(TableGrid::from_span(html, &lc, start, end));
            pos = start + 1;
        }

        let mut cells = Vec::new();
        let mut pos = 0;
        while let Some((start, end)) = next_element_ci(&lc, "td", pos) {
            cells.push(GridCell::from_block(&html[start..end], "td"));
            pos = start + 1;
        }

        Self {
            tables,
            cells,
            lines: visible_lines(html),
            text: visible_text(html),
        }
    }

    /// The timetable: first table with a day-alias row, else the first table.
    pub fn schedule_table(&self) -> Option<usize> {
        if self.tables.is_empty() {
            return None;
        }
        Some(self.tables.iter().position(TableGrid::has_day_row).unwrap_or(0))
    }
}

/// Result of scanning the schedule table.
#[derive(Clone, Debug, Default)]
pub struct GridScan {
    pub table: Option<usize>,
    /// Header and block rows of `table`.
    pub schedule_rows: BTreeSet<usize>,
    pub entries: Vec<RawCellEntry>,
}

enum State {
    Scanning,
    InDay { day: Weekday, dates: Vec<Option<NaiveDate>> },
}

fn header_dates(
    row: &GridRow,
    layout: &FacultyLayout,
    rule: YearRule,
) -> Option<(Weekday, Vec<Option<NaiveDate>>)> {
    let day = day_alias(&row.cells.first()?.text)?;
    if row.cells.len() <= layout.date_offset {
        return None;
    }
    if layout.header_blank_label {
        let blank = match layout.label_cell {
            LabelCell::Fixed(i) => row.cells.get(i).is_none_or(|c| c.text.is_empty()),
            LabelCell::FirstOrSecond => true,
        };
        if !blank {
            return None;
        }
    }
    let mut dates: Vec<Option<NaiveDate>> = row.cells[layout.date_offset..]
        .iter()
        .map(|c| parse_date_token(&c.text, rule))
        .collect();
    let last = dates.iter().rposition(Option::is_some)?;
    dates.truncate(last + 1);
    Some((day, dates))
}

fn block_label(row: &GridRow, layout: &FacultyLayout) -> Option<(BlockTimeSlot, usize)> {
    let at = |i: usize| row.cells.get(i).and_then(|c| block_time(&c.text)).map(|s| (s, i));
    match layout.label_cell {
        LabelCell::Fixed(i) => at(i),
        LabelCell::FirstOrSecond => at(0).or_else(|| at(1)),
    }
}

fn entry(day: Weekday, date: NaiveDate, slot: BlockTimeSlot, t: CellTokens) -> RawCellEntry {
    RawCellEntry {
        day,
        date,
        slot,
        subject: t.subject,
        percent: t.percent,
        type_symbol: t.type_symbol,
        room: t.room,
        lecturer_code: t.lecturer_code,
    }
}

/// Scan the schedule table of `doc`. Unknown rows are skipped; no table
/// means no entries.
pub fn scan(doc: &Document, layout: &FacultyLayout, fallback: YearRule) -> GridScan {
    let mut out = GridScan::default();
    let Some(ti) = doc.schedule_table() else { return out };
    out.table = Some(ti);

    let rule = infer_year(&doc.text, fallback);
    let mut state = State::Scanning;
    // date column → (cached lines, remaining rows)
    let mut active: Vec<Option<(Vec<String>, usize)>> = Vec::new();

    for (ri, row) in doc.tables[ti].rows.iter().enumerate() {
        if row.cells.is_empty() {
            continue;
        }
        if let Some((day, dates)) = header_dates(row, layout, rule) {
            active = vec![None; dates.len()];
            state = State::InDay { day, dates };
            out.schedule_rows.insert(ri);
            continue;
        }
        let State::InDay { day, dates } = &state else { continue };
        let Some((slot, label_idx)) = block_label(row, layout) else { continue };
        out.schedule_rows.insert(ri);

        let mut emit = |col: usize, lines: &[String]| {
            let Some(Some(date)) = dates.get(col) else { return };
            if let Some(t) = classify(lines, layout) {
                out.entries.push(entry(*day, *date, slot, t));
            }
        };

        let data = &row.cells[(label_idx + 1).min(row.cells.len())..];
        if !layout.track_spans {
            for (col, cell) in data.iter().enumerate().take(dates.len()) {
                emit(col, &cell.lines);
            }
            continue;
        }

        let mut col = 0;
        let mut cells = data.iter();
        while col < dates.len() {
            if let Some((lines, remaining)) = active[col].take() {
                if remaining > 1 {
                    active[col] = Some((lines.clone(), remaining - 1));
                }
                emit(col, &lines);
                col += 1;
                continue;
            }
            let Some(cell) = cells.next() else {
                col += 1;
                continue;
            };
            for _ in 0..cell.colspan {
                if col >= dates.len() {
                    break;
                }
                if cell.rowspan > 1 && !cell.lines.is_empty() {
                    active[col] = Some((cell.lines.clone(), cell.rowspan - 1));
                }
                emit(col, &cell.lines);
                col += 1;
            }
        }
    }
    logd!("grid: {} entries from table {ti}", out.entries.len());
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    const WEL: &str = r#"<html><body><p>Rozkład 2024/2025</p><table>
        <tr><td>pon.</td><td></td><td>03 III</td><td>10 III</td></tr>
        <tr><td>1-2</td><td colspan="2">ALG<br>(w)<br>105<br>Kw</td></tr>
        <tr><td>3-4</td><td rowspan=2>FIZ<br>L<br>24<br>Nw</td><td>-</td></tr>
        <tr><td>5-6</td><td>SK</td></tr>
        </table></body></html>"#;

    #[test]
    fn picks_table_with_day_rows() {
        let doc = Document::parse(
            "<table><tr><td>x</td></tr></table><table><tr><td>pon.</td></tr></table>",
        );
        assert_eq!(doc.tables.len(), 2);
        assert_eq!(doc.schedule_table(), Some(1));
    }

    #[test]
    fn colspan_and_rowspan_are_replicated() {
        let doc = Document::parse(WEL);
        let scan = scan(&doc, &FacultyLayout::wel(), YearRule::Calendar(2000));
        let got: Vec<_> = scan
            .entries
            .iter()
            .map(|e| (e.subject.as_str(), e.date.to_string(), e.slot.label))
            .collect();
        assert_eq!(
            got,
            vec![
                ("ALG", s!("2025-03-03"), "1-2"),
                ("ALG", s!("2025-03-10"), "1-2"),
                ("FIZ", s!("2025-03-03"), "3-4"),
                ("FIZ", s!("2025-03-03"), "5-6"),
            ]
        );
        assert_eq!(scan.schedule_rows.len(), 4);
    }

    fn entries_of(html: &str) -> Vec<(String, String, &'static str)> {
        let doc = Document::parse(html);
        scan(&doc, &FacultyLayout::wel(), YearRule::Calendar(2000))
            .entries
            .iter()
            .map(|e| (e.subject.clone(), e.date.format("%m-%d").to_string(), e.slot.label))
            .collect()
    }

    fn row(subject: &str, date: &str, block: &'static str) -> (String, String, &'static str) {
        (s!(subject), s!(date), block)
    }

    #[test]
    fn day_header_ends_pending_rowspan() {
        let html = r#"<p>Rozkład 2024/2025</p><table>
            <tr><td>pon.</td><td></td><td>03 III</td><td>10 III</td></tr>
            <tr><td>1-2</td><td rowspan="3">FIZ<br>L<br>24<br>Nw</td><td>ALG<br>(w)<br>105<br>Kw</td></tr>
            <tr><td>3-4</td><td>-</td></tr>
            <tr><td>wt.</td><td></td><td>04 III</td><td>11 III</td></tr>
            <tr><td>1-2</td><td>ANM<br>ć<br>112<br>Kw</td><td>-</td></tr>
            </table>"#;
        assert_eq!(
            entries_of(html),
            vec![
                row("FIZ", "03-03", "1-2"),
                row("ALG", "03-10", "1-2"),
                row("FIZ", "03-03", "3-4"),
                row("ANM", "03-04", "1-2"),
            ]
        );
    }

    #[test]
    fn cell_spanning_columns_and_rows_fills_the_block() {
        let html = r#"<p>Rozkład 2024/2025</p><table>
            <tr><td>pon.</td><td></td><td>03 III</td><td>10 III</td><td>17 III</td></tr>
            <tr><td>1-2</td><td colspan=2 rowspan=2>ALG<br>(w)<br>105<br>Kw</td><td>ANM<br>ć<br>112<br>Nw</td></tr>
            <tr><td>3-4</td><td>FIZ<br>L<br>24<br>Nw</td></tr>
            </table>"#;
        assert_eq!(
            entries_of(html),
            vec![
                row("ALG", "03-03", "1-2"),
                row("ALG", "03-10", "1-2"),
                row("ANM", "03-17", "1-2"),
                row("ALG", "03-03", "3-4"),
                row("ALG", "03-10", "3-4"),
                row("FIZ", "03-17", "3-4"),
            ]
        );
    }

    #[test]
    fn positional_rows_with_unknown_labels_are_skipped() {
        let html = r#"<table>
            <tr><td>wt.</td><td></td><td>04 III</td><td>xx</td></tr>
            <tr><td>wt.</td><td>1-2</td><td>ANM</td><td>ANM</td></tr>
            <tr><td>wt.</td><td>przerwa</td><td>ANM</td></tr>
            </table>"#;
        let doc = Document::parse(html);
        let scan = scan(&doc, &FacultyLayout::wtc(), YearRule::Academic(2024));
        assert_eq!(scan.entries.len(), 1);
        assert_eq!(scan.entries[0].day, Weekday::Tue);
    }

    #[test]
    fn no_table_no_entries() {
        let doc = Document::parse("<p>nic</p>");
        let scan = scan(&doc, &FacultyLayout::wel(), YearRule::Calendar(2025));
        assert!(scan.table.is_none());
        assert!(scan.entries.is_empty());
    }
}
