use clap::Parser;
use memhog::hog::{Ceiling, Error, HogLoop, Intervals, TermFlag};
use std::io;
use std::io::Write;
use std::process::exit;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(
    about,
    long_about = None,
    disable_help_flag = true,
    disable_version_flag = true
)]
struct Args {
    /// Stop allocating once this many bytes are hogged (base-10, default: unbounded).
    /// Everything after the first value is ignored, timing flags go before it.
    #[arg(
        value_name = "HOG_MAX",
        num_args = 0..,
        trailing_var_arg = true,
        allow_hyphen_values = true
    )]
    hog_max: Vec<String>,

    /// Pause before the first allocation
    #[arg(long, env = "MEMHOG_STARTUP_DELAY_MS", default_value_t = 2000)]
    startup_delay_ms: u64,

    /// Pause between checks once the ceiling is reached
    #[arg(long, env = "MEMHOG_IDLE_MS", default_value_t = 2000)]
    idle_ms: u64,

    /// Throttle once per this number of allocations, 0 disables throttling
    #[arg(long, env = "MEMHOG_THROTTLE_EVERY", default_value_t = 1000)]
    throttle_every: u64,

    /// Length of a throttle pause
    #[arg(long, env = "MEMHOG_THROTTLE_PAUSE_MS", default_value_t = 1)]
    throttle_pause_ms: u64,
}

impl Args {
    fn hog_max(&self) -> Option<&str> {
        self.hog_max.first().map(String::as_str)
    }

    fn intervals(&self) -> Intervals {
        Intervals {
            startup: Duration::from_millis(self.startup_delay_ms),
            idle: Duration::from_millis(self.idle_ms),
            throttle_every: self.throttle_every,
            throttle_pause: Duration::from_millis(self.throttle_pause_ms),
        }
    }
}

fn main() {
    // handler goes first, a SIGTERM arriving during startup must not kill the fixture
    let term = match TermFlag::install() {
        Ok(term) => term,
        Err(e) => {
            eprintln!("{e}");
            exit(e.exit_code());
        }
    };

    memhog::log::init();
    let args = Args::parse();

    match run(&args, term) {
        Ok(code) => exit(code),
        Err(e) => {
            eprintln!("{e:#}");
            if let Some(err) = e.downcast_ref::<Error>() {
                exit(err.exit_code());
            }
            exit(1);
        }
    }
}

fn run(args: &Args, term: TermFlag) -> anyhow::Result<i32> {
    let mut stdout = io::stdout().lock();

    let ceiling = match Ceiling::from_arg(args.hog_max()) {
        Ok(ceiling) => ceiling,
        Err(e @ Error::InvalidCeiling(_)) => {
            writeln!(stdout, "{e}")?;
            stdout.flush()?;
            return Ok(e.exit_code());
        }
        Err(e) => return Err(e.into()),
    };

    let mut hog = HogLoop::new(ceiling, term).with_intervals(args.intervals());
    hog.announce(&mut stdout)?;
    let outcome = hog.run(&mut stdout)?;

    Ok(outcome.exit_code())
}
