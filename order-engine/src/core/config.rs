/// Engine configuration
///
/// # Environment variables
///
/// All knobs can be overridden through environment variables:
///
/// | Variable | Default | Meaning |
/// |----------|---------|---------|
/// | ORDER_DB_PATH | orders.redb | Path of the embedded order database |
/// | GRACE_WINDOW_SECS | 60 | Cancellation grace window |
/// | TIMER_RETRY_BASE_SECS | 1 | First retry delay after a failed timer fire |
/// | TIMER_RETRY_MAX_SECS | 30 | Retry delay ceiling |
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Path of the embedded order database
    pub db_path: String,
    /// How long a cancellation request stays pending before auto-reverting
    pub grace_window_secs: u64,
    /// First retry delay when a timer fire hits a transient storage failure
    pub timer_retry_base_secs: u64,
    /// Ceiling for the exponential retry backoff
    pub timer_retry_max_secs: u64,
}

impl EngineConfig {
    /// Load configuration from environment variables, falling back to defaults
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            db_path: std::env::var("ORDER_DB_PATH").unwrap_or(defaults.db_path),
            grace_window_secs: std::env::var("GRACE_WINDOW_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.grace_window_secs),
            timer_retry_base_secs: std::env::var("TIMER_RETRY_BASE_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timer_retry_base_secs),
            timer_retry_max_secs: std::env::var("TIMER_RETRY_MAX_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.timer_retry_max_secs),
        }
    }

    /// Grace window in milliseconds, for deadline arithmetic
    pub fn grace_window_millis(&self) -> i64 {
        (self.grace_window_secs as i64) * 1000
    }
}

/// Literal defaults; `from_env` is the explicit environment entry point
impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            db_path: "orders.redb".to_string(),
            grace_window_secs: 60,
            timer_retry_base_secs: 1,
            timer_retry_max_secs: 30,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_values_are_literal() {
        let config = EngineConfig::default();
        assert_eq!(config.db_path, "orders.redb");
        assert_eq!(config.grace_window_secs, 60);
        assert_eq!(config.grace_window_millis(), 60_000);
        assert_eq!(config.timer_retry_base_secs, 1);
        assert_eq!(config.timer_retry_max_secs, 30);
    }
}
