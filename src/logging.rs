/// Logging setup and the development-build debug macro
///
/// Library code reports through the `log` facade: warnings for trains that
/// drop out of a batch, debug output for walk and estimation details. The
/// binary installs `env_logger` through [`init`].
///
/// The `debug_log!` macro forwards to `log::debug!` in debug builds or when
/// the `console_logging` feature is enabled. In production release builds it
/// compiles to nothing, so it is safe to use inside per-station loops.
///
/// # Examples
///
/// ```ignore
/// rail_diagram::debug_log!("Walking from {} ({} flags)", "1000", 2);
/// ```
#[macro_export]
macro_rules! debug_log {
    ($($arg:tt)+) => {
        #[cfg(any(debug_assertions, feature = "console_logging"))]
        {
            log::debug!($($arg)+);
        }
    };
}

/// Install `env_logger`, honouring `RUST_LOG` when set
///
/// `verbose` lowers the default filter from `warn` to `debug`.
pub fn init(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp(None)
        .init();
}
