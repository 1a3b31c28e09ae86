// src/cli.rs
use std::path::PathBuf;

use crate::config::{
    consts::CONFIG_FILE,
    file as config_file,
    layout::{FacultyLayout, PeFallback},
    options::{GroupSelector, MatchMode, NameMode, PageSource, RunOptions},
};
use crate::progress::{ConsoleProgress, Progress};

pub const HELP: &str = include_str!("cli_help.txt");

#[derive(Debug)]
pub enum Command {
    Run { opts: RunOptions, quiet: bool },
    ImportStaff { page: PathBuf, roster: PathBuf },
    ImportGroups { page: PathBuf, opts: RunOptions },
    SaveConfig { path: PathBuf, opts: RunOptions },
    ListFaculties,
    Help,
}

/// Parsed command line: what to do, plus the log path if one was given.
#[derive(Debug)]
pub struct Invocation {
    pub command: Command,
    pub log: Option<PathBuf>,
}

/// Value of the last occurrence of any of `names`.
fn flag_value(args: &[String], names: &[&str]) -> Option<String> {
    args.iter()
        .rposition(|a| names.contains(&a.as_str()))
        .and_then(|i| args.get(i + 1))
        .cloned()
}

/// `--config` and `--faculty` are read before any other flag: the layout is
/// picked first, the file lands on it, and flags always win over the file.
fn base_options(args: &[String]) -> Result<RunOptions, Box<dyn std::error::Error>> {
    let path = match flag_value(args, &["--config"]).map(PathBuf::from) {
        Some(path) if !path.exists() => return Err(format!("Config file not found: {}", path.display()).into()),
        Some(path) => path,
        None => PathBuf::from(CONFIG_FILE),
    };
    match flag_value(args, &["-f", "--faculty"]) {
        Some(id) => config_file::load_for_faculty(&path, &id),
        None => Ok(config_file::load(&path)),
    }
}

pub fn parse_args(args: Vec<String>) -> Result<Invocation, Box<dyn std::error::Error>> {
    let mut opts = base_options(&args)?;
    let mut log = None;
    let mut quiet = false;
    let mut ids: Vec<String> = Vec::new();
    let mut import: Option<PathBuf> = None;
    let mut import_groups: Option<PathBuf> = None;
    let mut save_to: Option<PathBuf> = None;

    let mut args = args.into_iter();
    while let Some(a) = args.next() {
        match a.as_str()
        {
            "-f" | "--faculty" => { args.next().ok_or("Missing value for --faculty")?; } // already applied
            "-g" | "--groups" => opts.groups = GroupSelector::File(PathBuf::from(args.next().ok_or("Missing group list path")?)),
            "--group" => ids.push(args.next().ok_or("Missing value for --group")?),
            "--roster" => opts.roster = PathBuf::from(args.next().ok_or("Missing roster path")?),
            "--pages" => opts.source = PageSource::Dir(PathBuf::from(args.next().ok_or("Missing pages directory")?)),
            "-o" | "--out" => opts.out_dir = PathBuf::from(args.next().ok_or("Missing output directory")?),
            "-w" | "--workers" => {
                let v: usize = args.next().ok_or("Missing value for --workers")?.parse()?;
                if v == 0 { return Err("--workers must be at least 1".into()); }
                opts.workers = v; }
            "--names" => {
                let v = args.next().ok_or("Missing value for --names")?;
                opts.name_mode = NameMode::parse(&v).ok_or_else(|| format!("Unknown name mode: {v}"))?; }
            "--match" => {
                let v = args.next().ok_or("Missing value for --match")?;
                opts.match_mode = MatchMode::parse(&v).ok_or_else(|| format!("Unknown match mode: {v}"))?; }
            "--pe-fallback" => {
                let v = args.next().ok_or("Missing value for --pe-fallback")?;
                opts.layout.pe_fallback = match v.trim() {
                    "" | "-" => PeFallback::LeaveUnresolved,
                    code => PeFallback::Substitute(s!(code)),
                }; }
            "--config" => { args.next(); }          // already applied
            "--save-config" => save_to = Some(PathBuf::from(args.next().ok_or("Missing config path")?)),
            "--log" => log = Some(PathBuf::from(args.next().ok_or("Missing log path")?)),
            "--import-staff" => import = Some(PathBuf::from(args.next().ok_or("Missing staff page path")?)),
            "--import-groups" => import_groups = Some(PathBuf::from(args.next().ok_or("Missing group page path")?)),
            "--list-faculties" => return Ok(Invocation { command: Command::ListFaculties, log }),
            "-q" | "--quiet" => quiet = true,
            "-h" | "--help" => return Ok(Invocation { command: Command::Help, log }),
            _ => return Err(format!("Unknown arg: {}", a).into()),
        }
    }

    if !ids.is_empty() {
        opts.groups = GroupSelector::Ids(ids);
    }
    let command = match (import, import_groups, save_to) {
        (Some(page), _, _) => Command::ImportStaff { page, roster: opts.roster.clone() },
        (None, Some(page), _) => Command::ImportGroups { page, opts },
        (None, None, Some(path)) => Command::SaveConfig { path, opts },
        (None, None, None) => Command::Run { opts, quiet },
    };
    Ok(Invocation { command, log })
}

fn list_faculties() {
    for l in FacultyLayout::all() {
        println!("{}\t{}\t{}", l.id, l.name, l.schedule_url);
    }
}

pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let inv = parse_args(std::env::args().skip(1).collect())?;
    if let Some(path) = &inv.log {
        crate::log::set_log_path(path);
    }

    match inv.command {
        Command::Help => print!("{HELP}"),
        Command::ListFaculties => list_faculties(),
        Command::SaveConfig { path, opts } => {
            config_file::save(&path, &opts)?;
            println!("Wrote {}", path.display());
        }
        Command::ImportStaff { page, roster } => {
            let (total, added) = crate::runner::import_staff(&page, &roster)?;
            println!("{}: {total} employees ({added} new)", roster.display());
        }
        Command::ImportGroups { page, opts } => {
            let (path, total, added) = crate::runner::import_groups(&page, &opts)?;
            println!("{}: {total} groups ({added} new)", path.display());
        }
        Command::Run { opts, quiet } => {
            let mut console = ConsoleProgress::new();
            let progress: Option<&mut dyn Progress> = if quiet { None } else { Some(&mut console) };
            let summary = crate::runner::run(&opts, progress)?;
            for w in &summary.warnings {
                eprintln!("warning: {w}");
            }
            println!(
                "{} groups, {} lessons, {} calendars in {}",
                summary.groups, summary.lessons, summary.saved.saved(), summary.saved.dir.display()
            );
        }
    }
    Ok(())
}
