//! # ACH Builder
//!
//! Builds NACHA ACH payment files: fixed-width 94-character records grouped
//! into batches, with computed control totals and filler padding to whole
//! blocks.
//!
//! ## Design Principles
//!
//! - **Validate on entry**: every value is checked when its record is built,
//!   never at render time
//! - **Two-phase build**: computed fields are filled exactly once, at seal
//! - **Injected clock**: `today`/`tomorrow` resolve against a [`Clock`], so
//!   output is deterministic under test
//! - **Integer money**: amounts are minor units, parsed through `rust_decimal`
//! - **Two renderings**: the fixed-width file, or a JSON view of the same
//!   records via `serde_json`
//!
//! ## Example
//!
//! ```
//! use ach_builder::{
//!     AddendaConfig, BatchConfig, BuildOptions, EntryConfig, FileBuilder, FileConfig,
//!     FixedClock,
//! };
//!
//! let config = FileConfig::new("123456780", "123456780", "YOUR BANK", "YOUR COMPANY");
//! let clock = FixedClock::at(2014, 9, 2, 1, 23).unwrap();
//! let mut file = FileBuilder::with_clock(&config, BuildOptions::default(), clock).unwrap();
//!
//! let batch = file
//!     .add_batch(&BatchConfig::new("YOUR COMPANY", "1234567890", "PAYROLL"))
//!     .unwrap();
//! file.add_entries_and_addendas(
//!     batch,
//!     vec![EntryConfig::new(22, "123456780", "11232132", 1000, "ALICE WANDERDUST")
//!         .with_addenda(AddendaConfig::new("HERE IS SOME ADDITIONAL INFORMATION"))],
//! )
//! .unwrap();
//!
//! print!("{}", file.render().unwrap());
//! ```

pub mod aggregate;
pub mod amount;
pub mod assembler;
pub mod batch;
pub mod builder;
pub mod clock;
pub mod codes;
pub mod config;
pub mod error;
pub mod field;
pub mod ingest;
pub mod record;
pub mod schema;
pub mod sequence;
pub mod view;

pub use aggregate::ControlTotals;
pub use amount::{Amount, AmountError};
pub use assembler::LineEnding;
pub use batch::{Addenda, Batch, Entry};
pub use builder::{BatchHandle, FileBuilder, FileState, Rejected};
pub use clock::{Clock, DateInput, FixedClock, SystemClock, TimeInput};
pub use codes::{ServiceClassCode, StandardEntryClassCode, TransactionCode};
pub use config::{AddendaConfig, BatchConfig, BuildOptions, EntryConfig, FileConfig};
pub use error::{AchError, AssemblyError, ConfigValidationError, Result, SequenceStateError};
pub use field::{FieldError, FieldType, FieldValue, ValidationMode};
pub use ingest::{ingest_csv, EntryRow, IngestReport, SkippedRow};
pub use record::{FieldDef, FieldDefault, FieldValues, Record, RecordKind, RecordSchema};
pub use sequence::TraceNumber;
pub use view::{BatchView, FileView, TransactionView};
