//! Configuration validation.
//!
//! Turns the `[limits]`, `[strategy]` and `[logging]` sections into typed
//! settings, rejecting values that would make a run meaningless.

use crate::domain::error::KuriError;
use crate::domain::limits::RuntimeLimits;
use crate::domain::signal::RiskDefaults;
use crate::ports::config_port::ConfigPort;
use std::time::Duration;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

fn invalid(section: &str, key: &str, reason: String) -> KuriError {
    KuriError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason,
    }
}

/// A present key must parse as a positive number; an absent key takes `default`.
fn positive_number(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: f64,
) -> Result<f64, KuriError> {
    let Some(raw) = config.get_string(section, key) else {
        return Ok(default);
    };
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| invalid(section, key, format!("{} must be a number, got '{}'", key, raw)))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid(section, key, format!("{} must be positive", key)));
    }
    Ok(value)
}

fn positive_integer(
    config: &dyn ConfigPort,
    section: &str,
    key: &str,
    default: u64,
) -> Result<u64, KuriError> {
    let value = positive_number(config, section, key, default as f64)?;
    if value.fract() != 0.0 {
        return Err(invalid(section, key, format!("{} must be a whole number", key)));
    }
    Ok(value as u64)
}

pub fn limits_from_config(config: &dyn ConfigPort) -> Result<RuntimeLimits, KuriError> {
    let defaults = RuntimeLimits::default();
    let max_series_length = positive_integer(
        config,
        "limits",
        "max_series_length",
        defaults.max_series_length as u64,
    )?;
    let max_operations = positive_integer(config, "limits", "max_operations", defaults.max_operations)?;
    let max_execution_ms = positive_integer(
        config,
        "limits",
        "max_execution_ms",
        defaults.max_execution_time.as_millis() as u64,
    )?;
    Ok(RuntimeLimits {
        max_series_length: max_series_length as usize,
        max_operations,
        max_execution_time: Duration::from_millis(max_execution_ms),
    })
}

pub fn risk_from_config(config: &dyn ConfigPort) -> Result<RiskDefaults, KuriError> {
    let defaults = RiskDefaults::default();
    Ok(RiskDefaults {
        stop_loss_pct: positive_number(config, "strategy", "stop_loss_pct", defaults.stop_loss_pct)?,
        take_profit_pct: positive_number(
            config,
            "strategy",
            "take_profit_pct",
            defaults.take_profit_pct,
        )?,
    })
}

/// The configured log level, lower-cased, if one is set.
pub fn log_level_from_config(config: &dyn ConfigPort) -> Result<Option<String>, KuriError> {
    let Some(level) = config.get_string("logging", "level") else {
        return Ok(None);
    };
    let level = level.trim().to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        return Err(invalid(
            "logging",
            "level",
            format!("level must be one of {}, got '{}'", LOG_LEVELS.join("|"), level),
        ));
    }
    Ok(Some(level))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    struct MockConfig {
        values: HashMap<(String, String), String>,
    }

    impl MockConfig {
        fn new(pairs: &[(&str, &str, &str)]) -> Self {
            let values = pairs
                .iter()
                .map(|(s, k, v)| ((s.to_string(), k.to_string()), v.to_string()))
                .collect();
            Self { values }
        }
    }

    impl ConfigPort for MockConfig {
        fn get_string(&self, section: &str, key: &str) -> Option<String> {
            self.values
                .get(&(section.to_string(), key.to_string()))
                .cloned()
        }
    }

    fn assert_invalid(result: Result<impl std::fmt::Debug, KuriError>, expected_key: &str) {
        match result {
            Err(KuriError::ConfigInvalid { key, .. }) => assert_eq!(key, expected_key),
            other => panic!("expected ConfigInvalid for {}, got {:?}", expected_key, other),
        }
    }

    #[test]
    fn empty_config_gives_defaults() {
        let config = MockConfig::new(&[]);
        assert_eq!(limits_from_config(&config).unwrap(), RuntimeLimits::default());
        assert_eq!(risk_from_config(&config).unwrap(), RiskDefaults::default());
        assert_eq!(log_level_from_config(&config).unwrap(), None);
    }

    #[test]
    fn reads_limits() {
        let config = MockConfig::new(&[
            ("limits", "max_series_length", "500"),
            ("limits", "max_operations", "1000"),
            ("limits", "max_execution_ms", "250"),
        ]);
        let limits = limits_from_config(&config).unwrap();
        assert_eq!(limits.max_series_length, 500);
        assert_eq!(limits.max_operations, 1000);
        assert_eq!(limits.max_execution_time, Duration::from_millis(250));
    }

    #[test]
    fn zero_limit_rejected() {
        let config = MockConfig::new(&[("limits", "max_operations", "0")]);
        assert_invalid(limits_from_config(&config), "max_operations");
    }

    #[test]
    fn non_numeric_limit_rejected() {
        let config = MockConfig::new(&[("limits", "max_series_length", "lots")]);
        assert_invalid(limits_from_config(&config), "max_series_length");
    }

    #[test]
    fn fractional_limit_rejected() {
        let config = MockConfig::new(&[("limits", "max_execution_ms", "1.5")]);
        assert_invalid(limits_from_config(&config), "max_execution_ms");
    }

    #[test]
    fn reads_risk_defaults() {
        let config = MockConfig::new(&[
            ("strategy", "stop_loss_pct", "1.5"),
            ("strategy", "take_profit_pct", "3"),
        ]);
        let risk = risk_from_config(&config).unwrap();
        assert_eq!(risk.stop_loss_pct, 1.5);
        assert_eq!(risk.take_profit_pct, 3.0);
    }

    #[test]
    fn negative_stop_loss_rejected() {
        let config = MockConfig::new(&[("strategy", "stop_loss_pct", "-2")]);
        assert_invalid(risk_from_config(&config), "stop_loss_pct");
    }

    #[test]
    fn log_level_validated() {
        let config = MockConfig::new(&[("logging", "level", "DEBUG")]);
        assert_eq!(log_level_from_config(&config).unwrap(), Some("debug".to_string()));
        let config = MockConfig::new(&[("logging", "level", "loud")]);
        assert_invalid(log_level_from_config(&config), "level");
    }
}
