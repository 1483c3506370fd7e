pub mod ceiling;
pub mod error;
pub mod page;
pub mod signal;

pub use ceiling::Ceiling;
pub use error::Error;
pub use page::{page_size, LeakingPages, PageSource};
pub use signal::TermFlag;

use std::io::Write;
use std::thread;
use std::time::Duration;

pub const MSG_DONE: &str = "done hogging";
pub const MSG_TERMINATED: &str = "exit: SIGTERM";

/// Pauses of the hog loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Intervals {
    /// Pause between the startup message and the first allocation.
    pub startup: Duration,
    /// Pause between two checks once the ceiling is reached.
    pub idle: Duration,
    /// Throttle once per this number of iterations, 0 means never.
    pub throttle_every: u64,
    /// Length of a throttle pause.
    pub throttle_pause: Duration,
}

impl Default for Intervals {
    fn default() -> Self {
        Self {
            startup: Duration::from_secs(2),
            idle: Duration::from_secs(2),
            throttle_every: 1000,
            throttle_pause: Duration::from_millis(1),
        }
    }
}

/// Why the hog loop returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Termination was requested, `exit: SIGTERM` is written.
    Terminated,
}

impl Outcome {
    pub fn exit_code(&self) -> i32 {
        match self {
            Outcome::Terminated => 0,
        }
    }
}

/// Grows memory up to a ceiling, page by page, until termination is requested.
pub struct HogLoop<S: PageSource = LeakingPages> {
    ceiling: Ceiling,
    term: TermFlag,
    source: S,
    page_size: usize,
    intervals: Intervals,
    hogged: i64,
    iterations: u64,
}

impl HogLoop<LeakingPages> {
    pub fn new(ceiling: Ceiling, term: TermFlag) -> Self {
        Self::with_source(ceiling, term, LeakingPages)
    }
}

impl<S: PageSource> HogLoop<S> {
    /// Create hog loop over a custom page source.
    ///
    /// # Arguments
    ///
    /// * `ceiling`: byte count after which the loop stops allocating
    /// * `term`: termination flag, checked before every iteration
    /// * `source`: where page-sized blocks come from
    pub fn with_source(ceiling: Ceiling, term: TermFlag, source: S) -> Self {
        Self {
            ceiling,
            term,
            source,
            page_size: page_size(),
            intervals: Intervals::default(),
            hogged: 0,
            iterations: 0,
        }
    }

    pub fn with_page_size(self, page_size: usize) -> Self {
        Self { page_size, ..self }
    }

    pub fn with_intervals(self, intervals: Intervals) -> Self {
        Self { intervals, ..self }
    }

    /// Bytes accounted so far, failed allocations included.
    pub fn hogged(&self) -> i64 {
        self.hogged
    }

    /// Allocation attempts made so far.
    pub fn iterations(&self) -> u64 {
        self.iterations
    }

    /// Write the startup line and wait for the startup pause.
    pub fn announce(&self, out: &mut impl Write) -> Result<(), Error> {
        writeln!(out, "hog up to {}", self.ceiling)?;
        out.flush()?;

        log::debug!(
            target: "memhog",
            "page size {}, timings {:?}",
            self.page_size,
            self.intervals
        );

        thread::sleep(self.intervals.startup);
        Ok(())
    }

    /// Run the hog loop until termination is requested.
    pub fn run(&mut self, out: &mut impl Write) -> Result<Outcome, Error> {
        loop {
            if self.term.is_set() {
                log::debug!(
                    target: "memhog",
                    "termination observed after {} iterations, {} bytes hogged",
                    self.iterations,
                    self.hogged
                );
                writeln!(out, "{MSG_TERMINATED}")?;
                out.flush()?;
                return Ok(Outcome::Terminated);
            }

            if self.ceiling.exceeded_by(self.hogged) {
                writeln!(out, "{MSG_DONE}")?;
                out.flush()?;
                thread::sleep(self.intervals.idle);
                continue;
            }

            self.step();
        }
    }

    fn step(&mut self) {
        if !self.source.grab(self.page_size) {
            log::debug!(
                target: "memhog",
                "allocation failed at iteration {}",
                self.iterations
            );
        }
        let page = i64::try_from(self.page_size).unwrap_or(i64::MAX);
        self.hogged = self.hogged.saturating_add(page);

        self.iterations = self.iterations.wrapping_add(1);
        let every = self.intervals.throttle_every;
        if every != 0 && self.iterations % every == 0 {
            log::trace!(target: "memhog", "throttle at {} bytes", self.hogged);
            thread::sleep(self.intervals.throttle_pause);
        }
    }
}
