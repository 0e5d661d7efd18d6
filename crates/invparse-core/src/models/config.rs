//! Configuration structures for the extraction pipeline.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{InvparseError, Result};

/// Main configuration for invparse.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct InvparseConfig {
    /// Field extraction configuration.
    pub extraction: ExtractionConfig,

    /// Output configuration.
    pub output: OutputConfig,
}

/// Invoice field extraction configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    /// Number of leading lines considered as vendor candidates.
    pub vendor_scan_lines: usize,

    /// Number of leading lines entering the scored vendor fallback.
    pub vendor_score_lines: usize,

    /// Vendor name used when no heuristic matches.
    pub fallback_vendor: String,

    /// Keep an upstream vendor guess when it passes the trust gate.
    pub trust_external_vendor: bool,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            vendor_scan_lines: 20,
            vendor_score_lines: 12,
            fallback_vendor: "Unknown Vendor".to_string(),
            trust_external_vendor: true,
        }
    }
}

/// Output configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Currency assigned to invoices (the text is never inspected for it).
    pub default_currency: String,

    /// Pretty-print JSON output.
    pub pretty_json: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            pretty_json: false,
        }
    }
}

impl InvparseConfig {
    /// Load configuration from a JSON file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to a JSON file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject settings the extractors cannot work with.
    pub fn validate(&self) -> Result<()> {
        let extraction = &self.extraction;

        if extraction.vendor_scan_lines == 0 {
            return Err(InvparseError::Config(
                "extraction.vendor_scan_lines must be at least 1".to_string(),
            ));
        }
        if extraction.vendor_score_lines == 0 {
            return Err(InvparseError::Config(
                "extraction.vendor_score_lines must be at least 1".to_string(),
            ));
        }
        if extraction.fallback_vendor.trim().is_empty() {
            return Err(InvparseError::Config(
                "extraction.fallback_vendor must not be empty".to_string(),
            ));
        }
        if self.output.default_currency.trim().is_empty() {
            return Err(InvparseError::Config(
                "output.default_currency must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
