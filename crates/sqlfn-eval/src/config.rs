//! Evaluator configuration.

use std::sync::OnceLock;

use serde::{Deserialize, Serialize};
use sqlfn_error::{Result, SqlFnError};
use tracing::{info, warn};

/// Environment variable overriding [`EvalConfig::parallel_threshold`].
///
/// Accepts a row count, or `"disabled"` / `"max"` to turn parallel
/// evaluation off.
pub const PARALLEL_THRESHOLD_ENV: &str = "SQLFN_PARALLEL_THRESHOLD";

/// Default row count at which evaluation switches to rayon.
pub const DEFAULT_PARALLEL_THRESHOLD: usize = 4096;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalConfig {
    /// Abort the whole query on the first per-row error. When false, row
    /// domain errors are collected into the result set instead.
    pub strict_batch: bool,
    /// Tables with at least this many rows are evaluated in parallel.
    /// `usize::MAX` disables parallelism.
    pub parallel_threshold: usize,
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self {
            strict_batch: false,
            parallel_threshold: DEFAULT_PARALLEL_THRESHOLD,
        }
    }
}

impl EvalConfig {
    /// Strict configuration: any row error fails the query.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            strict_batch: true,
            ..Self::default()
        }
    }

    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| SqlFnError::InvalidConfig {
            detail: e.to_string(),
        })?;
        info!(
            strict_batch = config.strict_batch,
            parallel_threshold = config.parallel_threshold,
            "evaluator config loaded"
        );
        Ok(config)
    }

    /// Apply [`PARALLEL_THRESHOLD_ENV`] if it is set.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|var| std::env::var(var).ok())
    }

    /// Apply overrides read through `lookup`, which maps a variable name to
    /// its value. [`EvalConfig::with_env_overrides`] uses the process
    /// environment.
    #[must_use]
    pub fn with_overrides_from(self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        match lookup(PARALLEL_THRESHOLD_ENV) {
            Some(raw) => self.with_threshold_override(&raw),
            None => self,
        }
    }

    /// Defaults plus environment overrides, read once per process.
    pub fn global() -> &'static Self {
        static GLOBAL: OnceLock<EvalConfig> = OnceLock::new();
        GLOBAL.get_or_init(|| Self::default().with_env_overrides())
    }

    /// Apply a raw threshold override. Unparseable values leave the config
    /// unchanged.
    #[must_use]
    pub fn with_threshold_override(mut self, raw: &str) -> Self {
        match parse_threshold_override(raw) {
            Some(threshold) => {
                info!(
                    var = PARALLEL_THRESHOLD_ENV,
                    threshold, "parallel threshold overridden"
                );
                self.parallel_threshold = threshold;
            }
            None => {
                warn!(
                    var = PARALLEL_THRESHOLD_ENV,
                    value = raw,
                    "ignoring unparseable parallel threshold"
                );
            }
        }
        self
    }

    /// Whether a scan over `rows` rows should run on the rayon pool.
    pub const fn should_parallelize(&self, rows: usize) -> bool {
        self.parallel_threshold != usize::MAX && rows >= self.parallel_threshold
    }
}

fn parse_threshold_override(raw: &str) -> Option<usize> {
    let raw = raw.trim().to_ascii_lowercase();
    if raw == "max" || raw == "disabled" {
        return Some(usize::MAX);
    }
    raw.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let c = EvalConfig::default();
        assert!(!c.strict_batch);
        assert_eq!(c.parallel_threshold, 4096);
        assert!(EvalConfig::strict().strict_batch);
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let c = EvalConfig::from_json_str(r#"{"strict_batch": true}"#).unwrap();
        assert!(c.strict_batch);
        assert_eq!(c.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);

        let c = EvalConfig::from_json_str("{}").unwrap();
        assert_eq!(c, EvalConfig::default());
    }

    #[test]
    fn malformed_json_is_invalid_config() {
        let err = EvalConfig::from_json_str("{strict_batch").unwrap_err();
        assert!(matches!(err, SqlFnError::InvalidConfig { .. }));
        let err = EvalConfig::from_json_str(r#"{"parallel_threshold": "lots"}"#).unwrap_err();
        assert!(matches!(err, SqlFnError::InvalidConfig { .. }));
    }

    #[test]
    fn json_round_trip() {
        let c = EvalConfig {
            strict_batch: true,
            parallel_threshold: 17,
        };
        let json = serde_json::to_string(&c).unwrap();
        assert_eq!(EvalConfig::from_json_str(&json).unwrap(), c);
    }

    #[test]
    fn threshold_override_values() {
        assert_eq!(parse_threshold_override("5000"), Some(5000));
        assert_eq!(parse_threshold_override(" 12 "), Some(12));
        assert_eq!(parse_threshold_override("MAX"), Some(usize::MAX));
        assert_eq!(parse_threshold_override("disabled"), Some(usize::MAX));
        assert_eq!(parse_threshold_override("soon"), None);
        assert_eq!(parse_threshold_override("-1"), None);
    }

    #[test]
    fn override_applies_or_is_ignored() {
        let c = EvalConfig::default().with_threshold_override("8");
        assert_eq!(c.parallel_threshold, 8);
        let c = c.with_threshold_override("garbage");
        assert_eq!(c.parallel_threshold, 8);
        let c = c.with_threshold_override("disabled");
        assert!(!c.should_parallelize(usize::MAX));
    }

    #[test]
    fn should_parallelize_at_threshold() {
        let c = EvalConfig {
            parallel_threshold: 10,
            ..EvalConfig::default()
        };
        assert!(!c.should_parallelize(9));
        assert!(c.should_parallelize(10));
        assert!(c.should_parallelize(11));
    }

    #[test]
    fn overrides_read_parallel_threshold_variable() {
        let env = |value: &'static str| {
            move |var: &str| (var == PARALLEL_THRESHOLD_ENV).then(|| value.to_owned())
        };
        let c = EvalConfig::default().with_overrides_from(env("128"));
        assert_eq!(c.parallel_threshold, 128);
        let c = EvalConfig::default().with_overrides_from(env("disabled"));
        assert_eq!(c.parallel_threshold, usize::MAX);
        let c = EvalConfig::default().with_overrides_from(env("lots"));
        assert_eq!(c.parallel_threshold, DEFAULT_PARALLEL_THRESHOLD);
        let c = EvalConfig::strict().with_overrides_from(|_| None);
        assert_eq!(c, EvalConfig::strict());
    }

    #[test]
    fn env_overrides_match_process_environment() {
        let expected = match std::env::var(PARALLEL_THRESHOLD_ENV) {
            Ok(raw) => EvalConfig::default().with_threshold_override(&raw),
            Err(_) => EvalConfig::default(),
        };
        assert_eq!(EvalConfig::default().with_env_overrides(), expected);
        assert_eq!(EvalConfig::global(), &expected);
    }
}
