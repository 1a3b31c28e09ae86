// src/config/options.rs
use std::path::PathBuf;

use super::consts::*;
use super::layout::FacultyLayout;

/// How a lecturer code is matched against a candidate name once the
/// roster-based steps give up.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MatchMode {
    /// Every distinct letter of the code occurs somewhere in the name.
    #[default]
    Containment,
    /// Letters of the code occur in order, the first one starting a name word.
    Subsequence,
}

impl MatchMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "containment" | "contains" => Some(Self::Containment),
            "subsequence" | "strict" => Some(Self::Subsequence),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Containment => "containment",
            Self::Subsequence => "subsequence",
        }
    }
}

/// Formatting of resolved lecturer names.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum NameMode {
    /// Name with academic title.
    Full,
    /// Name only.
    Short,
    /// Short if any resolved entry lacks a title, else full.
    #[default]
    Auto,
}

impl NameMode {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "full" | "always_full" => Some(Self::Full),
            "short" | "always_short" => Some(Self::Short),
            "auto" => Some(Self::Auto),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::Short => "short",
            Self::Auto => "auto",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupSelector {
    /// `<groups_dir>/<faculty>.txt`
    FacultyList,
    File(PathBuf),
    Ids(Vec<String>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum PageSource {
    Http,
    /// Offline: `<dir>/<group>.htm[l]`
    Dir(PathBuf),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunOptions {
    pub layout: FacultyLayout,
    pub groups: GroupSelector,
    pub groups_dir: PathBuf,
    pub roster: PathBuf,
    pub source: PageSource,
    pub out_dir: PathBuf,
    pub workers: usize,
    pub match_mode: MatchMode,
    pub name_mode: NameMode,
}

impl Default for RunOptions {
    fn default() -> Self {
        let layout = FacultyLayout::default();
        let workers = layout.workers;
        Self {
            layout,
            groups: GroupSelector::FacultyList,
            groups_dir: PathBuf::from(GROUPS_DIR),
            roster: PathBuf::from(EMPLOYEES_FILE),
            source: PageSource::Http,
            out_dir: PathBuf::from(DEFAULT_OUT_DIR),
            workers,
            match_mode: MatchMode::default(),
            name_mode: NameMode::default(),
        }
    }
}

impl RunOptions {
    /// Output directory for the selected faculty: `<out_dir>/<faculty>`.
    pub fn faculty_out_dir(&self) -> PathBuf {
        self.out_dir.join(&self.layout.id)
    }

    pub fn set_faculty(&mut self, id: &str) -> Result<(), Box<dyn std::error::Error>> {
        let layout = FacultyLayout::by_id(id).ok_or_else(|| format!("Unknown faculty: {id}"))?;
        self.workers = layout.workers;
        self.layout = layout;
        Ok(())
    }

    /// Effective worker count, clamped to 1..=MAX_WORKERS.
    pub fn worker_count(&self) -> usize {
        self.workers.clamp(1, MAX_WORKERS)
    }
}
