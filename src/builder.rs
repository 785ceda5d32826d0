//! The file-building session.
//!
//! A [`FileBuilder`] moves through three states:
//!
//! - `Open`: batches and entries may be added
//! - `Sealed`: symbolic dates are pinned and every control record is computed
//! - `Rendered`: the text has been produced and is cached
//!
//! Rendering an `Open` file seals it first. Any mutation after `Open` fails
//! with [`SequenceStateError::FileClosed`].
//!
//! Counts, sums and block counts are checked against their control fields as
//! batches and entries are added, so sealing a file that accepted every add
//! cannot overflow.

use crate::aggregate::{self, ControlTotals};
use crate::assembler;
use crate::batch::{Batch, Entry};
use crate::clock::{Clock, SystemClock};
use crate::config::{BatchConfig, BuildOptions, EntryConfig, FileConfig};
use crate::error::{
    AchError, AssemblyError, ConfigValidationError, Result, SequenceStateError,
};
use crate::field::{FieldError, FieldType, ValidationMode};
use crate::record::{FieldValues, Record, RecordKind};
use crate::schema::{BATCH_CONTROL, FILE_CONTROL, FILE_HEADER};
use crate::sequence::{odfi_from_origin, Sequencer, ODFI_DIGITS};
use crate::view::FileView;
use log::{debug, info, warn};
use std::fmt;

/// Lifecycle of a [`FileBuilder`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FileState {
    Open,
    Sealed,
    Rendered,
}

impl fmt::Display for FileState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileState::Open => f.write_str("open"),
            FileState::Sealed => f.write_str("sealed"),
            FileState::Rendered => f.write_str("rendered"),
        }
    }
}

/// Refers to a batch added with [`FileBuilder::add_batch`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BatchHandle(usize);

impl BatchHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// An entry rejected by [`FileBuilder::add_entries_lenient`].
pub type Rejected = (EntryConfig, AchError);

/// Builds one ACH file.
///
/// # Example
///
/// ```
/// use ach_builder::{BatchConfig, EntryConfig, FileBuilder, FileConfig};
///
/// let config = FileConfig::new("012345678", "1234567890", "YOUR BANK", "YOUR COMPANY");
/// let mut file = FileBuilder::new(&config).unwrap();
/// let batch = file
///     .add_batch(&BatchConfig::new("YOUR COMPANY", "1234567890", "PAYROLL"))
///     .unwrap();
/// file.add_entries_and_addendas(
///     batch,
///     vec![EntryConfig::new(22, "123456789", "65656565", 300, "Janey Test")],
/// )
/// .unwrap();
///
/// let text = file.render().unwrap();
/// assert!(text.lines().all(|line| line.len() == 94));
/// assert_eq!(text.lines().count(), 10);
/// ```
#[derive(Debug)]
pub struct FileBuilder<C: Clock = SystemClock> {
    header: Record,
    control: Record,
    batches: Vec<Batch>,
    batch_numbers: Sequencer,
    odfi: String,
    blocking_factor: usize,
    options: BuildOptions,
    clock: C,
    state: FileState,
    running: ControlTotals,
    lines: usize,
    totals: Option<ControlTotals>,
    rendered: Option<String>,
}

impl FileBuilder<SystemClock> {
    /// Opens a file with default options and the system clock.
    pub fn new(config: &FileConfig) -> Result<Self> {
        Self::with_options(config, BuildOptions::default())
    }

    pub fn with_options(config: &FileConfig, options: BuildOptions) -> Result<Self> {
        FileBuilder::with_clock(config, options, SystemClock)
    }
}

impl<C: Clock> FileBuilder<C> {
    /// Opens a file whose symbolic dates resolve against `clock` at seal time.
    pub fn with_clock(config: &FileConfig, options: BuildOptions, clock: C) -> Result<Self> {
        let kind = RecordKind::FileHeader;
        let header = Record::build(&FILE_HEADER, &config.header_values(), options.mode)?;

        let blocking_raw = header.text("blocking_factor").unwrap_or_default();
        let blocking_factor = blocking_raw
            .parse::<usize>()
            .ok()
            .filter(|factor| (1..=99).contains(factor))
            .ok_or_else(|| ConfigValidationError::InvalidValue {
                record: kind,
                field: "blocking_factor",
                value: blocking_raw.to_string(),
                reason: FieldError::OutOfRange { min: 1, max: 99 },
            })?;

        let odfi = match &config.odfi_identification {
            Some(raw) => FieldType::Integer
                .validate(raw, ODFI_DIGITS, ValidationMode::Strict)
                .ok()
                .and_then(|value| value.text().map(|digits| format!("{:0>8}", digits)))
                .ok_or_else(|| ConfigValidationError::InvalidValue {
                    record: kind,
                    field: "odfi_identification",
                    value: raw.clone(),
                    reason: FieldError::NotNumeric,
                })?,
            None => {
                let origin = header.text("origin_routing").unwrap_or_default();
                odfi_from_origin(origin).ok_or_else(|| ConfigValidationError::InvalidValue {
                    record: kind,
                    field: "origin_routing",
                    value: origin.to_string(),
                    reason: FieldError::InvalidOrigin,
                })?
            }
        };

        let control = Record::build(&FILE_CONTROL, &FieldValues::new(), options.mode)?;

        debug!(
            "Opened file for {} with ODFI {} and blocking factor {}",
            config.destination_name, odfi, blocking_factor
        );
        Ok(FileBuilder {
            header,
            control,
            batches: Vec::new(),
            batch_numbers: Sequencer::batches(),
            odfi,
            blocking_factor,
            options,
            clock,
            state: FileState::Open,
            running: ControlTotals::default(),
            lines: assembler::record_line_count(&[]),
            totals: None,
            rendered: None,
        })
    }

    fn ensure_open(&self) -> Result<()> {
        if self.state != FileState::Open {
            return Err(SequenceStateError::FileClosed { state: self.state }.into());
        }
        Ok(())
    }

    fn batch_ref(&self, handle: BatchHandle) -> Result<&Batch> {
        self.batches
            .get(handle.0)
            .ok_or_else(|| SequenceStateError::UnknownBatch { index: handle.0 }.into())
    }

    fn batch_mut(&mut self, handle: BatchHandle) -> Result<&mut Batch> {
        self.batches
            .get_mut(handle.0)
            .ok_or_else(|| SequenceStateError::UnknownBatch { index: handle.0 }.into())
    }

    /// Fails if a file of `lines` records needs more blocks than the file
    /// control can count.
    fn ensure_block_count(&self, lines: usize) -> Result<()> {
        let blocks = assembler::block_count(lines, self.blocking_factor);
        aggregate::ensure_fits(&FILE_CONTROL, "block_count", blocks as u64)?;
        Ok(())
    }

    /// Adds a batch and assigns the next batch number.
    pub fn add_batch(&mut self, config: &BatchConfig) -> Result<BatchHandle> {
        self.ensure_open()?;

        let mut numbers = self.batch_numbers.clone();
        let number = numbers.next()?;
        aggregate::ensure_fits(&FILE_CONTROL, "batch_count", u64::from(number))?;
        let lines = self.lines + 2;
        self.ensure_block_count(lines)?;
        let batch = Batch::new(config, number, &self.odfi, self.options.mode)?;

        debug!(
            "Batch {}: {} {} for {}",
            number,
            batch.service_class(),
            batch.standard_entry_class(),
            config.company_name
        );
        self.batch_numbers = numbers;
        self.lines = lines;
        self.batches.push(batch);
        Ok(BatchHandle(self.batches.len() - 1))
    }

    /// Adds entries, each with its addendas, to a batch.
    ///
    /// Every entry is validated before any is added; one bad entry rejects
    /// the whole call and leaves the batch unchanged. So does a set of
    /// entries whose counts or sums would overflow the batch or file control.
    pub fn add_entries_and_addendas(
        &mut self,
        handle: BatchHandle,
        entries: Vec<EntryConfig>,
    ) -> Result<()> {
        self.ensure_open()?;
        let mode = self.options.mode;
        let service_class = self.batch_ref(handle)?.service_class();

        let prepared = entries
            .iter()
            .map(|config| Entry::prepare(config, service_class, mode))
            .collect::<Result<Vec<_>>>()?;
        let running = self.running.admit(&prepared, &FILE_CONTROL)?;
        let lines = self.lines + prepared.iter().map(Entry::line_count).sum::<usize>();
        self.ensure_block_count(lines)?;

        let count = prepared.len();
        let batch = self.batch_mut(handle)?;
        batch.add_entries(prepared)?;
        debug!("Batch {}: added {} entries", batch.number(), count);

        self.running = running;
        self.lines = lines;
        Ok(())
    }

    /// Adds the valid entries and hands back the invalid ones with their
    /// errors.
    pub fn add_entries_lenient(
        &mut self,
        handle: BatchHandle,
        entries: Vec<EntryConfig>,
    ) -> Result<Vec<Rejected>> {
        self.ensure_open()?;
        let mode = self.options.mode;
        let batch = self.batch_ref(handle)?;
        let (number, service_class) = (batch.number(), batch.service_class());

        let mut batch_totals = batch.totals();
        let mut running = self.running;
        let mut lines = self.lines;
        let mut prepared = Vec::with_capacity(entries.len());
        let mut rejected = Vec::new();
        for config in entries {
            let admitted = Entry::prepare(&config, service_class, mode).and_then(|entry| {
                let next_batch = batch_totals.admit([&entry], &BATCH_CONTROL)?;
                let next_running = running.admit([&entry], &FILE_CONTROL)?;
                let next_lines = lines + entry.line_count();
                self.ensure_block_count(next_lines)?;
                Ok((entry, next_batch, next_running, next_lines))
            });
            match admitted {
                Ok((entry, next_batch, next_running, next_lines)) => {
                    batch_totals = next_batch;
                    running = next_running;
                    lines = next_lines;
                    prepared.push(entry);
                }
                Err(e) => {
                    warn!("Batch {}: skipping entry: {}", number, e);
                    rejected.push((config, e));
                }
            }
        }
        self.batch_mut(handle)?.add_entries(prepared)?;

        self.running = running;
        self.lines = lines;
        Ok(rejected)
    }

    /// Pins symbolic dates to one clock reading and computes every control
    /// record.
    ///
    /// Works on copies and commits only once every record is complete; a
    /// failed seal leaves the file `Open` and unchanged.
    pub fn seal(&mut self) -> Result<()> {
        self.ensure_open()?;

        let now = self.clock.now();
        let mut header = self.header.clone();
        header.resolve(now);
        let mut batches = self.batches.clone();
        let mut totals = ControlTotals::default();
        for batch in &mut batches {
            batch.resolve(now);
            totals = totals.combine(batch.aggregate()?, &FILE_CONTROL)?;
        }

        let lines = assembler::record_line_count(&batches);
        let blocks = assembler::block_count(lines, self.blocking_factor);

        let mut control = self.control.clone();
        control.fill("batch_count", self.batch_numbers.last())?;
        control.fill("block_count", blocks)?;
        control.fill("entry_and_addenda_count", totals.entry_addenda_count)?;
        control.fill("entry_hash", totals.entry_hash)?;
        control.fill("total_debit_amount", totals.total_debit.cents())?;
        control.fill("total_credit_amount", totals.total_credit.cents())?;

        info!("Sealed file: {} batches, {}", batches.len(), totals);
        self.header = header;
        self.batches = batches;
        self.control = control;
        self.totals = Some(totals);
        self.state = FileState::Sealed;
        Ok(())
    }

    /// Produces the file text, sealing first if needed.
    ///
    /// Repeated calls return identical text.
    pub fn render(&mut self) -> Result<String> {
        if self.state == FileState::Open {
            self.seal()?;
        }
        if let Some(text) = &self.rendered {
            return Ok(text.clone());
        }

        let text = assembler::assemble(
            &self.header,
            &self.batches,
            &self.control,
            self.blocking_factor,
            self.options.line_ending,
        )?;
        info!("Rendered {} lines", text.lines().count());

        self.state = FileState::Rendered;
        self.rendered = Some(text.clone());
        Ok(text)
    }

    /// The sealed file as nested records, `None` while still `Open`.
    pub fn view(&self) -> Option<FileView<'_>> {
        if self.state == FileState::Open {
            return None;
        }
        Some(FileView::new(&self.header, &self.batches, &self.control))
    }

    /// Renders the file as JSON: every record maps its field names to their
    /// values. Seals first if needed; the state stays `Sealed` or `Rendered`.
    pub fn to_json(&mut self) -> Result<String> {
        if self.state == FileState::Open {
            self.seal()?;
        }
        let view = self.view().ok_or(AssemblyError::FileNotSealed)?;
        Ok(serde_json::to_string_pretty(&view)?)
    }

    pub fn state(&self) -> FileState {
        self.state
    }

    /// File-wide totals, available once sealed.
    pub fn file_totals(&self) -> Option<ControlTotals> {
        self.totals
    }

    pub fn batch(&self, handle: BatchHandle) -> Option<&Batch> {
        self.batches.get(handle.0)
    }

    pub fn batches(&self) -> &[Batch] {
        &self.batches
    }

    pub fn odfi(&self) -> &str {
        &self.odfi
    }

    pub fn blocking_factor(&self) -> usize {
        self.blocking_factor
    }

    pub fn options(&self) -> BuildOptions {
        self.options
    }
}
