//! Memory hogging fixture for integration tests of memory pressure handling.
//!
//! The fixture grows its resident memory page by page up to a ceiling, idles there
//! and exits cleanly on SIGTERM, reporting every lifecycle step on stdout.

pub mod hog;
pub mod log;
