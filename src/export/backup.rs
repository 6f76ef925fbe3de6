//! JSON backup document
//!
//! `{ exportDate, formatVersion, trades }`. Import is all-or-nothing: the
//! ledger is only replaced once the whole document has parsed and every
//! trade has validated.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::trade::{ImportError, LedgerSnapshot, TradeLedger};

/// Current backup format version
pub const FORMAT_VERSION: &str = "1.0";

/// Serialized ledger backup
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub export_date: DateTime<Utc>,
    pub format_version: String,
    pub trades: LedgerSnapshot,
}

impl BackupDocument {
    /// Snapshot a ledger
    pub fn from_ledger(ledger: &TradeLedger) -> Self {
        Self {
            export_date: Utc::now(),
            format_version: FORMAT_VERSION.to_string(),
            trades: ledger.export_snapshot(),
        }
    }
}

/// Serialize a ledger to pretty JSON
pub fn export_json(ledger: &TradeLedger) -> Result<String> {
    serde_json::to_string_pretty(&BackupDocument::from_ledger(ledger))
        .context("failed to serialize ledger backup")
}

/// Parse a backup document, checking the `trades` key and format version
pub fn parse_backup(json: &str) -> Result<BackupDocument, ImportError> {
    let value: serde_json::Value = serde_json::from_str(json)?;
    if value.get("trades").is_none() {
        return Err(ImportError::MissingTrades);
    }

    let version = value
        .get("formatVersion")
        .and_then(|v| v.as_str())
        .unwrap_or(FORMAT_VERSION);
    if !is_supported_version(version) {
        return Err(ImportError::UnsupportedVersion(version.to_string()));
    }

    Ok(serde_json::from_value(value)?)
}

/// Replace the ledger contents with a backup; returns the trade count
pub fn import_json(ledger: &mut TradeLedger, json: &str) -> Result<usize, ImportError> {
    let document = parse_backup(json)?;
    ledger.import_snapshot(document.trades)
}

/// Write a ledger backup to `path`
pub fn save(ledger: &TradeLedger, path: &Path) -> Result<()> {
    let json = export_json(ledger)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write backup {}", path.display()))?;
    tracing::debug!(path = %path.display(), trades = ledger.len(), "Backup written");
    Ok(())
}

/// Load a ledger backup from `path`; a missing file yields an empty ledger
pub fn load(path: &Path) -> Result<TradeLedger> {
    let mut ledger = TradeLedger::new();
    if !path.exists() {
        tracing::debug!(path = %path.display(), "No backup found, starting empty");
        return Ok(ledger);
    }

    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read backup {}", path.display()))?;
    import_json(&mut ledger, &json)
        .with_context(|| format!("Failed to import backup {}", path.display()))?;
    Ok(ledger)
}

fn is_supported_version(version: &str) -> bool {
    let supported_major = FORMAT_VERSION.split('.').next();
    version.split('.').next() == supported_major
}
