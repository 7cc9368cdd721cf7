use std::str::FromStr;

use tracing::Level;

use crate::error::config::ConfigError;

pub const FAIL_ON_UNEXPECTED_LOGS_VAR: &str = "BULLETPROVE_FAIL_ON_UNEXPECTED_LOGS";
pub const UNEXPECTED_LOG_LEVEL_VAR: &str = "BULLETPROVE_UNEXPECTED_LOG_LEVEL";
pub const CAPTURE_LEVEL_VAR: &str = "BULLETPROVE_CAPTURE_LEVEL";

/// Serialises unit tests that modify the `BULLETPROVE_*` variables.
#[cfg(test)]
pub(crate) static ENV_LOCK: std::sync::Mutex<()> = std::sync::Mutex::new(());

/// Framework configuration shared by every server built from the same builder.
#[derive(Debug, Clone)]
pub struct Config {
    /// Whether ending a session fails when unexpected log events were captured.
    pub fail_on_unexpected_logs: bool,

    /// Events at this level or more severe are rejected by the default global filter.
    pub unexpected_log_level: Level,

    /// Most verbose level captured from the server under test.
    pub capture_level: Level,
}

impl Config {
    /// Load configuration from the environment, falling back to defaults for unset variables.
    ///
    /// A `.env` file in the working directory is loaded first when present.
    ///
    /// # Returns
    /// - `Ok(Config)` - Configuration with environment overrides applied
    /// - `Err(ConfigError::InvalidEnvValue)` - A variable was set to an unparsable value
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        Ok(Self {
            fail_on_unexpected_logs: parse_var(FAIL_ON_UNEXPECTED_LOGS_VAR)?
                .unwrap_or(defaults.fail_on_unexpected_logs),
            unexpected_log_level: parse_var(UNEXPECTED_LOG_LEVEL_VAR)?
                .unwrap_or(defaults.unexpected_log_level),
            capture_level: parse_var(CAPTURE_LEVEL_VAR)?.unwrap_or(defaults.capture_level),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            fail_on_unexpected_logs: true,
            unexpected_log_level: Level::WARN,
            capture_level: Level::TRACE,
        }
    }
}

fn parse_var<T>(var: &str) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(var) {
        Ok(value) => value
            .trim()
            .parse::<T>()
            .map(Some)
            .map_err(|e| ConfigError::InvalidEnvValue {
                var: var.to_string(),
                reason: e.to_string(),
            }),
        Err(std::env::VarError::NotPresent) => Ok(None),
        Err(e) => Err(ConfigError::InvalidEnvValue {
            var: var.to_string(),
            reason: e.to_string(),
        }),
    }
}
