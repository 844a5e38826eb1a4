//! Fee Report
//!
//! Writes the final fee records as an indented JSON array and logs a
//! summary of USD totals per destination and per type.

use crate::types::{FeeDest, FeeRecord, FeeType};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use tracing::info;

/// Write `fees` to `path`, creating parent directories
pub fn write_report<P: AsRef<Path>>(path: P, fees: &[FeeRecord]) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create report directory: {:?}", parent))?;
    }

    let json = serde_json::to_string_pretty(fees).context("Failed to serialize fee records")?;
    fs::write(path, json).with_context(|| format!("Failed to write report: {:?}", path))?;

    info!("Wrote {} fee records to {:?}", fees.len(), path);
    Ok(())
}

/// USD totals over a set of fee records
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeeSummary {
    pub records: usize,
    pub total_usd: f64,
    pub by_dest: BTreeMap<FeeDest, f64>,
    pub by_type: BTreeMap<FeeType, f64>,
    pub first_timestamp: Option<u64>,
    pub last_timestamp: Option<u64>,
}

impl FeeSummary {
    pub fn from_records(fees: &[FeeRecord]) -> Self {
        let mut summary = Self::default();
        for fee in fees {
            summary.records += 1;
            summary.total_usd += fee.amount_usd;
            *summary.by_dest.entry(fee.fee_dest).or_default() += fee.amount_usd;
            *summary.by_type.entry(fee.fee_type).or_default() += fee.amount_usd;
            summary.first_timestamp = Some(
                summary
                    .first_timestamp
                    .map_or(fee.timestamp, |t| t.min(fee.timestamp)),
            );
            summary.last_timestamp = Some(
                summary
                    .last_timestamp
                    .map_or(fee.timestamp, |t| t.max(fee.timestamp)),
            );
        }
        summary
    }

    /// `YYYY-MM-DD → YYYY-MM-DD` span of the records, if any
    pub fn date_range(&self) -> Option<String> {
        let day = |ts: u64| {
            DateTime::<Utc>::from_timestamp(ts as i64, 0)
                .map(|dt| dt.format("%Y-%m-%d").to_string())
        };
        Some(format!(
            "{} → {}",
            day(self.first_timestamp?)?,
            day(self.last_timestamp?)?
        ))
    }

    pub fn log(&self) {
        info!(
            "{} fee records, ${:.2} total ({})",
            self.records,
            self.total_usd,
            self.date_range().unwrap_or_else(|| "no records".to_string())
        );
        for (dest, usd) in &self.by_dest {
            info!("  {:<12} ${:.2}", dest.to_string(), usd);
        }
        for (fee_type, usd) in &self.by_type {
            info!("  {:<12} ${:.2}", fee_type.to_string(), usd);
        }
    }
}
