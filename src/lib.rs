// src/lib.rs

#[macro_use]
pub mod macros;
#[macro_use]
pub mod log;

pub mod cli;
pub mod config;
pub mod core;
pub mod specs;

pub mod calendar;
pub mod fetch;
pub mod file;
pub mod groups;
pub mod lessons;
pub mod model;
pub mod progress;
pub mod resolver;
pub mod roster;
pub mod runner;
pub mod scrape;
pub mod tables;
