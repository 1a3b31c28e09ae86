// src/specs/mod.rs
//! # Page "specs"
//!
//! Everything that knows how a faculty timetable page (or the staff directory)
//! is laid out lives here. Specs only read HTML: they never fetch, cache or
//! write files.
//!
//! ## What lives here
//! - `grid` – the table model of one document and the day/block row scanner
//!   (date header rows, block-time rows, merged cells).
//! - `cells` – token classification inside one grid cell (subject, type symbol,
//!   room, lecturer code), in the order the faculty layout asks for.
//! - `dates` – `03 III` date tokens and year inference from page text.
//! - `legend` – abbreviation and lecturer legends printed around the grid.
//! - `employees` – the USOS staff directory page (degree + name panels).
//! - `groups` – a faculty index page linking the per-group timetables.
//!
//! ## Typical call chain
//! ```text
//! lessons::parse_document → grid::Document::parse → grid::scan
//!                         ↘ legend::extract      ↘ resolver / numbering
//! ```
//!
//! ## Conventions
//! - Case-insensitive, offset-preserving tag scanning via `core::html`; no
//!   whole-document regexes over markup.
//! - Malformed input degrades to "nothing found", never to an error.
//! - Results depend only on the document text (and the caller's year hint),
//!   so two parses of the same page are identical.
pub mod cells;
pub mod dates;
pub mod employees;
pub mod grid;
pub mod groups;
pub mod legend;
