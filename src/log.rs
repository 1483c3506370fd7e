use env_logger::{Env, Target};

/// Environment variable with `env_logger` filter directives.
pub const FILTER_ENV: &str = "RUST_LOG";

/// Install diagnostic logger.
///
/// Logs always go to stderr, stdout is reserved for the lifecycle lines parent process
/// waits for. Nothing is logged unless [`FILTER_ENV`] is set.
pub fn init() {
    let env = Env::default().filter_or(FILTER_ENV, "off");
    let _ = env_logger::Builder::from_env(env)
        .target(Target::Stderr)
        .format_timestamp_millis()
        .try_init();
}
