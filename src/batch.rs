//! Batches, entries and addendas.
//!
//! A [`Batch`] owns its entries and each [`Entry`] owns its addendas. Entries
//! are prepared (built and validated) before they touch the batch, so a bad
//! entry never leaves a batch half-updated.

use crate::aggregate::ControlTotals;
use crate::amount::Amount;
use crate::codes::{ServiceClassCode, StandardEntryClassCode, TransactionCode};
use crate::config::{AddendaConfig, BatchConfig, EntryConfig};
use crate::error::{ConfigValidationError, Result, SequenceStateError};
use crate::field::{FieldError, ValidationMode};
use crate::record::{Record, RecordKind};
use crate::schema::{ADDENDA, BATCH_CONTROL, BATCH_HEADER, ENTRY_DETAIL};
use crate::sequence::{Sequencer, TraceNumber, MAX_ADDENDA_SEQUENCE, ODFI_DIGITS};
use chrono::NaiveDateTime;
use log::{debug, info};

fn invalid(
    record: RecordKind,
    field: &'static str,
    value: &str,
    reason: FieldError,
) -> ConfigValidationError {
    ConfigValidationError::InvalidValue {
        record,
        field,
        value: value.to_string(),
        reason,
    }
}

/// Free-text addenda record following an entry.
#[derive(Debug, Clone)]
pub struct Addenda {
    record: Record,
}

impl Addenda {
    fn prepare(config: &AddendaConfig, mode: ValidationMode) -> Result<Self> {
        let record = Record::build(&ADDENDA, &config.addenda_values(), mode)?;
        Ok(Addenda { record })
    }

    fn assign(&mut self, sequence: u32, entry_sequence: u32) -> Result<()> {
        self.record.fill("addenda_sequence_number", sequence)?;
        self.record
            .fill("entry_detail_sequence_number", entry_sequence)?;
        Ok(())
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn payment_related_information(&self) -> Option<&str> {
        self.record.text("payment_related_information")
    }
}

/// One debit or credit instruction and its addendas.
#[derive(Debug, Clone)]
pub struct Entry {
    record: Record,
    code: TransactionCode,
    amount: Amount,
    routing_prefix: u64,
    trace: Option<TraceNumber>,
    addendas: Vec<Addenda>,
}

impl Entry {
    /// Builds and validates an entry for a batch of `service_class`.
    ///
    /// Sequence fields stay pending until the entry joins a batch.
    pub fn prepare(
        config: &EntryConfig,
        service_class: ServiceClassCode,
        mode: ValidationMode,
    ) -> Result<Self> {
        let kind = RecordKind::EntryDetail;
        let record = Record::build(&ENTRY_DETAIL, &config.entry_values(), mode)?;

        let code: TransactionCode = record
            .text("transaction_code")
            .unwrap_or_default()
            .parse()
            .map_err(|reason| invalid(kind, "transaction_code", &config.transaction_code, reason))?;
        if !service_class.permits(code) {
            return Err(invalid(
                kind,
                "transaction_code",
                &config.transaction_code,
                FieldError::ServiceClassMismatch(service_class.code()),
            )
            .into());
        }

        let amount = record
            .text("amount")
            .unwrap_or_default()
            .parse::<u64>()
            .map(Amount::from_cents)
            .map_err(|_| invalid(kind, "amount", &config.amount, FieldError::NotNumeric))?;

        let routing = record.text("rdfi_routing").unwrap_or_default();
        let routing_prefix = routing
            .get(..ODFI_DIGITS)
            .and_then(|prefix| prefix.parse::<u64>().ok())
            .ok_or_else(|| {
                invalid(kind, "rdfi_routing", &config.rdfi_routing, FieldError::InvalidRouting)
            })?;

        if config.addendas.len() > MAX_ADDENDA_SEQUENCE as usize {
            return Err(SequenceStateError::SequenceExhausted {
                counter: "addenda sequence number",
                limit: u64::from(MAX_ADDENDA_SEQUENCE),
            }
            .into());
        }
        let addendas = config
            .addendas
            .iter()
            .map(|addenda| Addenda::prepare(addenda, mode))
            .collect::<Result<Vec<_>>>()?;

        Ok(Entry {
            record,
            code,
            amount,
            routing_prefix,
            trace: None,
            addendas,
        })
    }

    /// Fills the trace number, addenda indicator and addenda sequences.
    fn assign(&mut self, trace: TraceNumber) -> Result<()> {
        let indicator = u8::from(!self.addendas.is_empty());
        self.record.fill("addenda_record_indicator", indicator)?;
        self.record.fill("trace_odfi_identifier", trace.odfi())?;
        self.record.fill("trace_sequence_number", trace.sequence())?;

        let mut sequences = Sequencer::addendas();
        for addenda in &mut self.addendas {
            addenda.assign(sequences.next()?, trace.sequence())?;
        }

        self.trace = Some(trace);
        Ok(())
    }

    pub fn record(&self) -> &Record {
        &self.record
    }

    pub fn transaction_code(&self) -> TransactionCode {
        self.code
    }

    pub fn amount(&self) -> Amount {
        self.amount
    }

    /// First eight digits of the receiving routing number.
    pub fn routing_prefix(&self) -> u64 {
        self.routing_prefix
    }

    /// Assigned once the entry joins a batch.
    pub fn trace(&self) -> Option<&TraceNumber> {
        self.trace.as_ref()
    }

    pub fn addendas(&self) -> &[Addenda] {
        &self.addendas
    }

    /// The entry line plus one line per addenda.
    pub fn line_count(&self) -> usize {
        1 + self.addendas.len()
    }
}

/// A batch header, its entries and the batch control computed at aggregation.
#[derive(Debug, Clone)]
pub struct Batch {
    number: u32,
    service_class: ServiceClassCode,
    entry_class: StandardEntryClassCode,
    odfi: String,
    header: Record,
    entries: Vec<Entry>,
    control: Record,
    traces: Sequencer,
    totals: ControlTotals,
    aggregated: bool,
}

impl Batch {
    /// Validates the batch configuration and assigns `number`.
    pub fn new(
        config: &BatchConfig,
        number: u32,
        odfi: &str,
        mode: ValidationMode,
    ) -> Result<Self> {
        let kind = RecordKind::BatchHeader;
        let mut header = Record::build(&BATCH_HEADER, &config.header_values(), mode)?;

        let service_class_raw = header.text("service_class_code").unwrap_or_default();
        let service_class: ServiceClassCode = service_class_raw
            .parse()
            .map_err(|reason| invalid(kind, "service_class_code", service_class_raw, reason))?;
        let entry_class_raw = header.text("standard_entry_class_code").unwrap_or_default();
        let entry_class: StandardEntryClassCode = entry_class_raw
            .parse()
            .map_err(|reason| invalid(kind, "standard_entry_class_code", entry_class_raw, reason))?;

        header.fill("odfi_identification", odfi)?;
        header.fill("batch_number", number)?;
        let control = Record::build(&BATCH_CONTROL, &config.control_values(), mode)?;

        Ok(Batch {
            number,
            service_class,
            entry_class,
            odfi: odfi.to_string(),
            header,
            entries: Vec::new(),
            control,
            traces: Sequencer::traces(),
            totals: ControlTotals::default(),
            aggregated: false,
        })
    }

    /// Appends prepared entries in order, assigning their trace numbers.
    ///
    /// Either every entry is added or none is. Entries that would push a
    /// count or sum past its batch control field are refused.
    pub fn add_entries(&mut self, mut entries: Vec<Entry>) -> Result<()> {
        if self.aggregated {
            return Err(SequenceStateError::BatchSealed {
                batch_number: self.number,
            }
            .into());
        }

        let totals = self.totals.admit(&entries, &BATCH_CONTROL)?;
        let mut traces = self.traces.clone();
        for entry in &mut entries {
            let trace = TraceNumber::new(self.odfi.as_str(), traces.next()?);
            debug!("Batch {}: entry {}", self.number, trace);
            entry.assign(trace)?;
        }

        self.traces = traces;
        self.totals = totals;
        self.entries.extend(entries);
        Ok(())
    }

    /// Computes the batch control record. Runs once; the batch then accepts
    /// no more entries.
    pub fn aggregate(&mut self) -> Result<ControlTotals> {
        if self.aggregated {
            return Err(SequenceStateError::AlreadyAggregated {
                batch_number: self.number,
            }
            .into());
        }

        let totals = self.totals;
        let company_identification = self
            .header
            .text("company_identification")
            .unwrap_or_default();

        let mut control = self.control.clone();
        control.fill("service_class_code", self.service_class.code())?;
        control.fill("entry_and_addenda_count", totals.entry_addenda_count)?;
        control.fill("entry_hash", totals.entry_hash)?;
        control.fill("total_debit_amount", totals.total_debit.cents())?;
        control.fill("total_credit_amount", totals.total_credit.cents())?;
        control.fill("company_identification", company_identification)?;
        control.fill("odfi_identification", self.odfi.as_str())?;
        control.fill("batch_number", self.number)?;

        info!("Batch {}: {}", self.number, totals);
        self.control = control;
        self.aggregated = true;
        Ok(totals)
    }

    /// Pins symbolic header dates to `now`.
    pub fn resolve(&mut self, now: NaiveDateTime) {
        self.header.resolve(now);
    }

    /// Running totals over the entries added so far.
    pub fn totals(&self) -> ControlTotals {
        self.totals
    }

    pub fn is_aggregated(&self) -> bool {
        self.aggregated
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn service_class(&self) -> ServiceClassCode {
        self.service_class
    }

    pub fn standard_entry_class(&self) -> StandardEntryClassCode {
        self.entry_class
    }

    pub fn header(&self) -> &Record {
        &self.header
    }

    pub fn control(&self) -> &Record {
        &self.control
    }

    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Header, entries, addendas and control.
    pub fn line_count(&self) -> usize {
        2 + self.entries.iter().map(Entry::line_count).sum::<usize>()
    }
}
