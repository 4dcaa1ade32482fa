/// wordvault - offline dictionary server with typo-tolerant lookups.
///
/// Core library providing term resolution (normalization transforms,
/// spelling correction, similarity fallback), dictionary storage and the
/// HTTP surface that serves definition pages.

pub mod config;
pub mod core;
pub mod logging;
pub mod server;
pub mod storage;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
