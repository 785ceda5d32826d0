//! CSV entry manifest ingest.
//!
//! Each row is one entry. Consecutive rows that share their batch columns
//! form one batch. Rows are streamed one at a time; invalid rows are logged at
//! warn level, recorded in the [`IngestReport`] and skipped.

use crate::amount::Amount;
use crate::builder::{BatchHandle, FileBuilder};
use crate::clock::Clock;
use crate::config::{AddendaConfig, BatchConfig, EntryConfig};
use crate::error::{AchError, Result};
use csv::{ReaderBuilder, Trim};
use log::{debug, warn};
use serde::Deserialize;
use std::io::Read;

/// One manifest row.
///
/// `amount` is in decimal major units (`12.34`).
#[derive(Debug, Clone, Deserialize)]
pub struct EntryRow {
    pub company_name: String,
    pub company_identification: String,
    pub company_entry_description: String,
    #[serde(default)]
    pub standard_entry_class_code: Option<String>,
    #[serde(default)]
    pub effective_entry_date: Option<String>,
    #[serde(default)]
    pub service_class_code: Option<String>,
    pub transaction_code: String,
    pub rdfi_routing: String,
    pub rdfi_account_number: String,
    pub amount: String,
    pub individual_name: String,
    #[serde(default)]
    pub individual_identification_number: Option<String>,
    #[serde(default)]
    pub payment_related_information: Option<String>,
}

impl EntryRow {
    /// The batch this row belongs to.
    pub fn batch_config(&self) -> BatchConfig {
        BatchConfig {
            company_name: self.company_name.clone(),
            company_identification: self.company_identification.clone(),
            company_entry_description: self.company_entry_description.clone(),
            standard_entry_class_code: self.standard_entry_class_code.clone(),
            effective_entry_date: self.effective_entry_date.clone(),
            service_class_code: self.service_class_code.clone(),
            ..Default::default()
        }
    }

    /// Converts the row into an entry, turning the decimal amount into cents.
    pub fn entry_config(&self) -> std::result::Result<EntryConfig, String> {
        let amount: Amount = self
            .amount
            .parse()
            .map_err(|e| format!("amount {:?}: {}", self.amount, e))?;

        let mut entry = EntryConfig::new(
            &self.transaction_code,
            &self.rdfi_routing,
            &self.rdfi_account_number,
            amount.cents(),
            &self.individual_name,
        );
        entry.individual_identification_number = self.individual_identification_number.clone();
        if let Some(info) = self
            .payment_related_information
            .as_ref()
            .filter(|info| !info.is_empty())
        {
            entry = entry.with_addenda(AddendaConfig::new(info.as_str()));
        }
        Ok(entry)
    }
}

/// A manifest row that did not make it into the file.
#[derive(Debug)]
pub struct SkippedRow {
    /// 1-indexed line number, counting the header row.
    pub row: usize,
    pub reason: String,
}

/// Outcome of [`ingest_csv`].
#[derive(Debug, Default)]
pub struct IngestReport {
    pub batches: usize,
    pub entries: usize,
    pub skipped: Vec<SkippedRow>,
}

impl IngestReport {
    fn skip(&mut self, row: usize, reason: impl ToString) {
        let reason = reason.to_string();
        warn!("Row {}: {}", row, reason);
        self.skipped.push(SkippedRow { row, reason });
    }
}

/// Batch currently receiving rows; `None` handle means its config was invalid.
struct OpenBatch {
    config: BatchConfig,
    handle: Option<BatchHandle>,
}

/// Streams manifest rows from `reader` into `builder`.
///
/// Only I/O failures on the reader and a closed builder abort the ingest.
pub fn ingest_csv<R: Read, C: Clock>(
    builder: &mut FileBuilder<C>,
    reader: R,
) -> Result<IngestReport> {
    let mut csv_reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(reader);

    let mut report = IngestReport::default();
    let mut current: Option<OpenBatch> = None;

    for (row_idx, result) in csv_reader.deserialize::<EntryRow>().enumerate() {
        let row_num = row_idx + 2; // 1-indexed, accounting for header row

        let row = match result {
            Ok(row) => row,
            Err(e) if e.is_io_error() => return Err(e.into()),
            Err(e) => {
                report.skip(row_num, format!("CSV parse error: {}", e));
                continue;
            }
        };

        let batch_config = row.batch_config();
        let same_batch = current
            .as_ref()
            .is_some_and(|open| open.config == batch_config);
        if !same_batch {
            let handle = match builder.add_batch(&batch_config) {
                Ok(handle) => {
                    report.batches += 1;
                    debug!("Row {}: opened batch for {}", row_num, batch_config.company_name);
                    Some(handle)
                }
                Err(AchError::Config(e)) => {
                    report.skip(row_num, e);
                    None
                }
                Err(e) => return Err(e),
            };
            current = Some(OpenBatch {
                config: batch_config,
                handle,
            });
        }

        let handle = match current.as_ref().and_then(|open| open.handle) {
            Some(handle) => handle,
            None => {
                if same_batch {
                    report.skip(row_num, "batch configuration is invalid");
                }
                continue;
            }
        };

        let entry = match row.entry_config() {
            Ok(entry) => entry,
            Err(reason) => {
                report.skip(row_num, reason);
                continue;
            }
        };

        match builder.add_entries_and_addendas(handle, vec![entry]) {
            Ok(()) => report.entries += 1,
            Err(AchError::SequenceState(e)) => return Err(e.into()),
            Err(e) => report.skip(row_num, e),
        }
    }

    Ok(report)
}
