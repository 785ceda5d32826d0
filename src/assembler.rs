//! File Assembler: orders rendered records and pads the file to whole blocks.

use crate::batch::Batch;
use crate::error::AssemblyError;
use crate::field::FieldError;
use crate::record::Record;
use crate::schema::filler_line;
use std::fmt;
use std::str::FromStr;

/// Terminator written after every line, the last one included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LineEnding {
    #[default]
    Lf,
    CrLf,
}

impl LineEnding {
    pub fn as_str(&self) -> &'static str {
        match self {
            LineEnding::Lf => "\n",
            LineEnding::CrLf => "\r\n",
        }
    }
}

impl FromStr for LineEnding {
    type Err = FieldError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lf" => Ok(LineEnding::Lf),
            "crlf" => Ok(LineEnding::CrLf),
            _ => Err(FieldError::UnknownCode("lf, crlf")),
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LineEnding::Lf => f.write_str("lf"),
            LineEnding::CrLf => f.write_str("crlf"),
        }
    }
}

/// Physical blocks needed for `lines` records.
pub fn block_count(lines: usize, blocking_factor: usize) -> usize {
    lines.div_ceil(blocking_factor)
}

/// Filler lines needed to round `lines` up to a whole block.
pub fn filler_count(lines: usize, blocking_factor: usize) -> usize {
    (blocking_factor - lines % blocking_factor) % blocking_factor
}

/// Records before any filler: file header and control plus every batch line.
pub fn record_line_count(batches: &[Batch]) -> usize {
    2 + batches.iter().map(Batch::line_count).sum::<usize>()
}

/// Renders a sealed file.
///
/// Order: file header; per batch its header, each entry followed by its
/// addendas, its control; file control; filler.
pub fn assemble(
    header: &Record,
    batches: &[Batch],
    control: &Record,
    blocking_factor: usize,
    line_ending: LineEnding,
) -> std::result::Result<String, AssemblyError> {
    if !control.is_complete() {
        return Err(AssemblyError::FileNotSealed);
    }
    if let Some(batch) = batches.iter().find(|b| !b.is_aggregated()) {
        return Err(AssemblyError::BatchNotAggregated {
            batch_number: batch.number(),
        });
    }

    let mut lines = Vec::with_capacity(record_line_count(batches) + blocking_factor);
    lines.push(header.render()?);
    for batch in batches {
        lines.push(batch.header().render()?);
        for entry in batch.entries() {
            lines.push(entry.record().render()?);
            for addenda in entry.addendas() {
                lines.push(addenda.record().render()?);
            }
        }
        lines.push(batch.control().render()?);
    }
    lines.push(control.render()?);

    let filler = filler_line();
    for _ in 0..filler_count(lines.len(), blocking_factor) {
        lines.push(filler.clone());
    }

    let terminator = line_ending.as_str();
    let mut text = String::with_capacity(lines.len() * (filler.len() + terminator.len()));
    for line in &lines {
        text.push_str(line);
        text.push_str(terminator);
    }
    Ok(text)
}
