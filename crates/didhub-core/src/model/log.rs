use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::OffsetDateTime;
use uuid::Uuid;

use super::ParseVariantError;

/// A discrete system event.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct LogEntry {
    pub id: Uuid,
    pub level: LogLevel,
    pub message: String,
    pub data: Option<Value>,
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp: OffsetDateTime,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewLogEntry {
    pub level: LogLevel,
    pub message: String,
    pub data: Option<Value>,
}

impl NewLogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>, data: Option<Value>) -> Self {
        Self {
            level,
            message: message.into(),
            data,
        }
    }

    /// Stamps the input with a fresh id and the current time.
    pub fn into_entry(self) -> LogEntry {
        LogEntry {
            id: Uuid::new_v4(),
            level: self.level,
            message: self.message,
            data: self.data,
            timestamp: OffsetDateTime::now_utc(),
        }
    }
}

/// Severity of a [LogEntry]. Only used for display and filtering.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogLevel {
    Info,
    Debug,
    Success,
    Error,
}

impl LogLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Info => "INFO",
            LogLevel::Debug => "DEBUG",
            LogLevel::Success => "SUCCESS",
            LogLevel::Error => "ERROR",
        }
    }
}

impl Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LogLevel {
    type Err = ParseVariantError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INFO" => Ok(LogLevel::Info),
            "DEBUG" => Ok(LogLevel::Debug),
            "SUCCESS" => Ok(LogLevel::Success),
            "ERROR" => Ok(LogLevel::Error),
            other => Err(ParseVariantError::new("log level", other)),
        }
    }
}
