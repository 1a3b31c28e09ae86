// src/progress.rs
/// Lightweight progress reporting used by the batch run (fetch/parse/save).
/// Frontends implement this to surface status to users.
pub trait Progress {
    /// Called at the start with the number of groups.
    fn begin(&mut self, _total: usize) {}

    /// Free-form status line for human eyes.
    fn log(&mut self, _msg: &str) {}

    /// One group's page arrived.
    fn item_done(&mut self, _group: &str) {}

    /// One group could not be fetched.
    fn item_failed(&mut self, _group: &str, _reason: &str) {}

    /// Called at the end, successful or not.
    fn finish(&mut self) {}
}

/// A no-op progress sink.
pub struct NullProgress;
impl Progress for NullProgress {}

/// Plain stderr lines with a running counter.
#[derive(Default)]
pub struct ConsoleProgress {
    total: usize,
    done: usize,
    failed: usize,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::default()
    }

    fn tick(&mut self) -> String {
        self.done += 1;
        format!("[{}/{}]", self.done, self.total)
    }
}

impl Progress for ConsoleProgress {
    fn begin(&mut self, total: usize) {
        self.total = total;
        self.done = 0;
        self.failed = 0;
    }

    fn log(&mut self, msg: &str) {
        eprintln!("{msg}");
    }

    fn item_done(&mut self, group: &str) {
        let at = self.tick();
        eprintln!("{at} {group}");
    }

    fn item_failed(&mut self, group: &str, reason: &str) {
        self.failed += 1;
        let at = self.tick();
        eprintln!("{at} {group}: {reason}");
    }

    fn finish(&mut self) {
        if self.failed > 0 {
            eprintln!("{} of {} groups could not be fetched", self.failed, self.total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn console_counts_failures() {
        let mut p = ConsoleProgress::new();
        p.begin(3);
        p.item_done("A");
        p.item_failed("B", "timeout");
        p.item_done("C");
        p.finish();
        assert_eq!((p.done, p.failed, p.total), (3, 1, 3));
    }
}
