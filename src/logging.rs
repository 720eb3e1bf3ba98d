//! Process-wide logging setup
//!
//! Initialized once at startup and flushed on shutdown. `RUST_LOG` overrides
//! the default `info` level; HTTP client internals are capped at `warn`.

use env_logger::{Builder, Env};
use log::LevelFilter;
use std::io::Write;

/// Crates whose debug output drowns the collector's own lines
const QUIET_TARGETS: &[&str] = &["reqwest", "hyper", "hyper_util", "rustls"];

/// Installs the global logger
///
/// Lines look like `2024-05-01 12:00:00,123 INFO     message`.
pub fn init() {
    let mut builder = Builder::from_env(Env::default().default_filter_or("info"));
    for target in QUIET_TARGETS {
        builder.filter_module(target, LevelFilter::Warn);
    }
    // RUST_LOG is parsed last so explicit settings still win
    if let Ok(filters) = std::env::var("RUST_LOG") {
        builder.parse_filters(&filters);
    }

    builder
        .format(|buf, record| {
            writeln!(
                buf,
                "{} {:<8} {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S,%3f"),
                record.level(),
                record.args()
            )
        })
        .init();
}

/// Flushes buffered log output before the process exits
pub fn flush() {
    log::logger().flush();
}
