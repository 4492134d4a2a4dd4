//! The `logger` module configures `env_logger` for ShareStake binaries and tests.
//!
//! The installed logger can be replaced at any time, so a test harness may
//! call [`setup_with_default`] repeatedly with different filters.

use std::sync::{OnceLock, RwLock};

static LOGGER: OnceLock<RwLock<env_logger::Logger>> = OnceLock::new();

struct LoggerShim {}

impl log::Log for LoggerShim {
    fn enabled(&self, metadata: &log::Metadata) -> bool {
        with_logger(|logger| logger.enabled(metadata))
    }

    fn log(&self, record: &log::Record) {
        with_logger(|logger| logger.log(record));
    }

    fn flush(&self) {}
}

fn with_logger<R>(f: impl FnOnce(&env_logger::Logger) -> R) -> R {
    let lock = LOGGER.get_or_init(|| RwLock::new(env_logger::Builder::new().build()));
    let guard = lock.read().unwrap_or_else(|poisoned| poisoned.into_inner());
    f(&guard)
}

fn replace_logger(logger: env_logger::Logger) {
    log::set_max_level(logger.filter());
    let lock = LOGGER.get_or_init(|| RwLock::new(env_logger::Builder::new().build()));
    *lock.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = logger;
    // Fails harmlessly once the shim is installed.
    let _ = log::set_boxed_logger(Box::new(LoggerShim {}));
}

/// Configures logging with a specific filter overriding RUST_LOG.  _RUST_LOG is
/// used instead so that a filter can still be applied from the environment.
pub fn setup_with(filter: &str) {
    let logger =
        env_logger::Builder::from_env(env_logger::Env::new().filter_or("_RUST_LOG", filter))
            .format_timestamp_nanos()
            .build();
    replace_logger(logger);
}

/// Configures logging with a default filter if RUST_LOG is not set.
pub fn setup_with_default(filter: &str) {
    let logger = env_logger::Builder::from_env(env_logger::Env::new().default_filter_or(filter))
        .format_timestamp_nanos()
        .build();
    replace_logger(logger);
}

/// Configures logging for `cargo test`: output is captured per test and the
/// filter defaults to `info`.
pub fn setup_for_tests() {
    let logger = env_logger::Builder::from_env(env_logger::Env::new().default_filter_or("info"))
        .is_test(true)
        .build();
    replace_logger(logger);
}

/// Configures logging with the default filter "error" if RUST_LOG is not set.
pub fn setup() {
    setup_with_default("error");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_setup_is_repeatable() {
        setup_with("debug");
        if std::env::var_os("_RUST_LOG").is_none() {
            assert_eq!(log::max_level(), log::LevelFilter::Debug);
        }
        setup_with_default("warn");
        setup_for_tests();
        log::info!("logger re-initialised");
    }
}
