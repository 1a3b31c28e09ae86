// src/config/mod.rs
pub mod consts;
pub mod file;
pub mod layout;
pub mod options;

pub use layout::{FacultyLayout, LabelCell, PeFallback, TokenOrder};
pub use options::{GroupSelector, MatchMode, NameMode, PageSource, RunOptions};
