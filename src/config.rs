// ⚙️ Run configuration

use crate::error::{Result, SyncError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const DEFAULT_BATCH_SIZE: usize = 5;

/// When the periodic flush counter is reset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FlushCadence {
    /// One counter across every entity kind. A cadence flush only touches
    /// the kind being processed when the counter hits a multiple of the
    /// batch size; earlier kinds may wait for the final flush.
    #[default]
    Shared,
    /// The counter restarts at every entity kind.
    PerKind,
}

impl FlushCadence {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlushCadence::Shared => "shared",
            FlushCadence::PerKind => "per-kind",
        }
    }
}

impl fmt::Display for FlushCadence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlushCadence {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "shared" => Ok(FlushCadence::Shared),
            "per-kind" | "per_kind" => Ok(FlushCadence::PerKind),
            other => Err(SyncError::InvalidConfig(format!(
                "unknown flush cadence `{}` (expected shared or per-kind)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Records routed between two cadence flushes.
    pub batch_size: usize,
    pub cadence: FlushCadence,
}

impl SyncConfig {
    pub fn new(batch_size: usize) -> Self {
        SyncConfig {
            batch_size,
            cadence: FlushCadence::Shared,
        }
    }

    pub fn with_cadence(mut self, cadence: FlushCadence) -> Self {
        self.cadence = cadence;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.batch_size == 0 {
            return Err(SyncError::InvalidConfig(
                "batch_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_SIZE)
    }
}
