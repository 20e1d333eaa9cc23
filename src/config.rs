//! Application-level constants and logging defaults.

/// Application-level constants
pub const APP_NAME: &str = "Carebrief";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Default tracing filter when RUST_LOG is not set.
///
/// Pipeline modules log at info; reqwest internals stay quiet.
pub fn default_log_filter() -> &'static str {
    "carebrief=info,reqwest=warn"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_carebrief() {
        assert_eq!(APP_NAME, "Carebrief");
    }

    #[test]
    fn default_filter_covers_crate() {
        assert!(default_log_filter().starts_with("carebrief="));
    }
}
