// src/config/consts.rs

// Local data
pub const GROUPS_DIR: &str = "db/groups";
pub const EMPLOYEES_FILE: &str = "db/employees.json";
pub const NEW_MARKER: &str = " [NEW]";

// Output
pub const DEFAULT_OUT_DIR: &str = "calendars";
pub const CALENDAR_EXT: &str = "ics";
pub const PRODID: &str = "-//watcal//EN";

// Logging / config
pub const LOG_FILE: &str = ".watcal/debug.log";
pub const CONFIG_FILE: &str = "watcal.conf";

// Default faculty
pub const DEFAULT_FACULTY: &str = "wtc";

// Fetch
pub const FETCH_ATTEMPTS: usize = 3;
pub const RETRY_PAUSE_MS: u64 = 2_000;
pub const PAGE_TIMEOUT_MS: u64 = 15_000;

// Concurrency
pub const WORKERS: usize = 8;
pub const MAX_WORKERS: usize = 32;
pub const REQUEST_PAUSE_MS: u64 = 75; // be polite
pub const JITTER_MS: u64 = 50; // extra 0..50 ms

// Lecturer propagation never copies a larger pool
pub const PROPAGATE_MAX: usize = 3;
