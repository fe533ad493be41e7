//! Logging initialization and utilities

/// Initialize the logging system
///
/// Uses env_logger with default filter level of `info`.
/// Override with RUST_LOG environment variable.
///
/// # Example
/// ```
/// fractvox::core::logging::init();
/// log::info!("Model build started");
/// ```
pub fn init() {
    let _ = env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info")
    )
    .format_timestamp_millis()
    .try_init();
}

/// Human-readable on/off for dielectric smoothing log lines.
pub fn smoothing_label(averaging: bool) -> &'static str {
    if averaging { "on" } else { "off" }
}

/// Human-readable seed for log lines.
pub fn seed_label(seed: Option<u64>) -> String {
    match seed {
        Some(s) => s.to_string(),
        None => "unseeded".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_twice_is_harmless() {
        init();
        init();
        log::info!("logging initialised");
    }

    #[test]
    fn test_labels() {
        assert_eq!(smoothing_label(true), "on");
        assert_eq!(smoothing_label(false), "off");
        assert_eq!(seed_label(Some(7)), "7");
        assert_eq!(seed_label(None), "unseeded");
    }
}
