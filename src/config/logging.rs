//! `[logging]` section

use serde::{Deserialize, Serialize};
use std::fmt;

/// Crate whose events the configured level applies to; others stay at warn
const CRATE_TARGET: &str = "faqrank";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines on stderr
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

/// Ordered from least to most verbose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    const ALL: [LogLevel; 5] = [
        LogLevel::Error,
        LogLevel::Warn,
        LogLevel::Info,
        LogLevel::Debug,
        LogLevel::Trace,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }

    /// Each `-v` moves one step toward trace
    pub fn raised(self, steps: u8) -> Self {
        let index = self as usize + steps as usize;
        Self::ALL[index.min(Self::ALL.len() - 1)]
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub format: LogFormat,
    pub level: LogLevel,
}

impl LoggingConfig {
    /// `EnvFilter` directive for this config plus `verbose` extra steps
    pub fn filter_directive(&self, verbose: u8) -> String {
        format!("warn,{}={}", CRATE_TARGET, self.level.raised(verbose))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raised_saturates() {
        assert_eq!(LogLevel::Info.raised(0), LogLevel::Info);
        assert_eq!(LogLevel::Warn.raised(2), LogLevel::Debug);
        assert_eq!(LogLevel::Info.raised(9), LogLevel::Trace);
    }

    #[test]
    fn test_filter_directive() {
        let config = LoggingConfig::default();
        assert_eq!(config.filter_directive(0), "warn,faqrank=info");
        assert_eq!(config.filter_directive(1), "warn,faqrank=debug");
    }

    #[test]
    fn test_partial_section() {
        let config: LoggingConfig = toml::from_str("format = \"json\"").unwrap();
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.level, LogLevel::Info);
    }
}
