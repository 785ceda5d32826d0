//! Sequencing & Trace Assignment.
//!
//! Batch numbers, trace sequences and addenda sequences are all bounded
//! counters that start at 1 and never reuse a value. Callers advance a clone
//! and commit it only once the whole operation succeeded, so a rejected call
//! consumes no numbers.

use crate::error::SequenceStateError;
use std::fmt;

/// Largest batch number that fits the 7-digit field.
pub const MAX_BATCH_NUMBER: u32 = 9_999_999;

/// Largest trace sequence that fits the 7-digit field.
pub const MAX_TRACE_SEQUENCE: u32 = 9_999_999;

/// Largest addenda sequence that fits the 4-digit field.
pub const MAX_ADDENDA_SEQUENCE: u32 = 9_999;

/// Digits of the originating institution identifier.
pub const ODFI_DIGITS: usize = 8;

/// A bounded, strictly increasing counter starting at 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequencer {
    name: &'static str,
    last: u32,
    limit: u32,
}

impl Sequencer {
    pub fn new(name: &'static str, limit: u32) -> Self {
        Sequencer {
            name,
            last: 0,
            limit,
        }
    }

    pub fn batches() -> Self {
        Self::new("batch number", MAX_BATCH_NUMBER)
    }

    pub fn traces() -> Self {
        Self::new("trace sequence number", MAX_TRACE_SEQUENCE)
    }

    pub fn addendas() -> Self {
        Self::new("addenda sequence number", MAX_ADDENDA_SEQUENCE)
    }

    /// Issues the next value.
    pub fn next(&mut self) -> Result<u32, SequenceStateError> {
        if self.last >= self.limit {
            return Err(SequenceStateError::SequenceExhausted {
                counter: self.name,
                limit: u64::from(self.limit),
            });
        }
        self.last += 1;
        Ok(self.last)
    }

    /// Most recently issued value, 0 before the first.
    pub fn last(&self) -> u32 {
        self.last
    }
}

/// Entry trace number: ODFI identifier followed by a 7-digit sequence.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TraceNumber {
    odfi: String,
    sequence: u32,
}

impl TraceNumber {
    pub fn new(odfi: impl Into<String>, sequence: u32) -> Self {
        TraceNumber {
            odfi: odfi.into(),
            sequence,
        }
    }

    pub fn odfi(&self) -> &str {
        &self.odfi
    }

    pub fn sequence(&self) -> u32 {
        self.sequence
    }
}

impl fmt::Display for TraceNumber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:0>8}{:07}", self.odfi, self.sequence)
    }
}

/// First eight digits of an immediate origin, ignoring its padding blank.
///
/// Returns `None` when the origin holds fewer than eight digits.
pub fn odfi_from_origin(origin: &str) -> Option<String> {
    let digits = origin.trim();
    if digits.len() < ODFI_DIGITS || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    Some(digits[..ODFI_DIGITS].to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencer_starts_at_one_and_increments() {
        let mut seq = Sequencer::batches();
        assert_eq!(seq.last(), 0);
        assert_eq!(seq.next().unwrap(), 1);
        assert_eq!(seq.next().unwrap(), 2);
        assert_eq!(seq.last(), 2);
    }

    #[test]
    fn test_sequencer_exhaustion() {
        let mut seq = Sequencer::new("widget", 2);
        seq.next().unwrap();
        seq.next().unwrap();
        assert_eq!(
            seq.next(),
            Err(SequenceStateError::SequenceExhausted {
                counter: "widget",
                limit: 2
            })
        );
        assert_eq!(seq.last(), 2);
    }

    #[test]
    fn test_uncommitted_clone_leaves_source_untouched() {
        let seq = Sequencer::traces();
        let mut draft = seq.clone();
        draft.next().unwrap();
        assert_eq!(seq.last(), 0);
    }

    #[test]
    fn test_trace_number_display() {
        let trace = TraceNumber::new("12345678", 1);
        assert_eq!(trace.to_string(), "123456780000001");
        assert_eq!(TraceNumber::new("2345678", 42).to_string(), "023456780000042");
    }

    #[test]
    fn test_odfi_from_origin() {
        assert_eq!(odfi_from_origin("1234567890").as_deref(), Some("12345678"));
        assert_eq!(odfi_from_origin(" 123456780").as_deref(), Some("12345678"));
        assert_eq!(odfi_from_origin("1234567"), None);
        assert_eq!(odfi_from_origin("12345678A"), None);
    }
}
