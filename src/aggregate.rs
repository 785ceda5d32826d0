//! Aggregation Engine: the four control quantities shared by batch and file
//! control records.
//!
//! Totals are checked against the widths of the control record they end up
//! in as entries are admitted, so an oversized batch or file is refused when
//! the entry is added rather than when the file is rendered.

use crate::amount::Amount;
use crate::batch::Entry;
use crate::codes::TransactionCode;
use crate::error::ConfigValidationError;
use crate::field::FieldError;
use crate::record::RecordSchema;

/// Entry hashes keep only their low ten digits.
pub const ENTRY_HASH_MODULUS: u64 = 10_000_000_000;

/// Digits in `u64::MAX`; any sum that overflows has at least this many.
const U64_DIGITS: usize = 20;

fn digits(value: u64) -> usize {
    value.checked_ilog10().map_or(1, |log| log as usize + 1)
}

fn overflow(
    schema: &RecordSchema,
    field: &'static str,
    value: String,
    digits: usize,
) -> ConfigValidationError {
    let width = schema.field(field).map_or(0, |def| def.width);
    ConfigValidationError::InvalidValue {
        record: schema.kind,
        field,
        value,
        reason: FieldError::Overflow { digits, width },
    }
}

/// Fails if `value` has more digits than `field` of `schema` can hold.
pub fn ensure_fits(
    schema: &RecordSchema,
    field: &'static str,
    value: u64,
) -> Result<(), ConfigValidationError> {
    let width = schema.field(field).map_or(0, |def| def.width);
    if digits(value) > width {
        return Err(overflow(schema, field, value.to_string(), digits(value)));
    }
    Ok(())
}

/// Counts, hash and debit/credit sums over a set of entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ControlTotals {
    /// Entries plus all of their addendas.
    pub entry_addenda_count: u64,
    /// Sum of receiving routing prefixes, mod 10^10.
    pub entry_hash: u64,
    pub total_debit: Amount,
    pub total_credit: Amount,
}

impl ControlTotals {
    /// Adds one entry and its addendas. `None` if a sum overflows.
    pub fn tally(
        self,
        routing_prefix: u64,
        code: TransactionCode,
        amount: Amount,
        addenda_count: usize,
    ) -> Option<Self> {
        let mut next = self;
        next.entry_addenda_count = self
            .entry_addenda_count
            .checked_add(1 + addenda_count as u64)?;
        next.entry_hash =
            (self.entry_hash + routing_prefix % ENTRY_HASH_MODULUS) % ENTRY_HASH_MODULUS;
        if code.is_credit() {
            next.total_credit = self.total_credit.checked_add(amount)?;
        } else {
            next.total_debit = self.total_debit.checked_add(amount)?;
        }
        Some(next)
    }

    /// Adds `entries` and checks the result against the control record
    /// `schema`.
    pub fn admit<'a, I>(
        self,
        entries: I,
        schema: &RecordSchema,
    ) -> Result<Self, ConfigValidationError>
    where
        I: IntoIterator<Item = &'a Entry>,
    {
        let mut totals = self;
        for entry in entries {
            let code = entry.transaction_code();
            totals = totals
                .tally(
                    entry.routing_prefix(),
                    code,
                    entry.amount(),
                    entry.addendas().len(),
                )
                .ok_or_else(|| {
                    let (field, current) = if code.is_credit() {
                        ("total_credit_amount", totals.total_credit)
                    } else {
                        ("total_debit_amount", totals.total_debit)
                    };
                    let value = format!("{} + {}", current.cents(), entry.amount().cents());
                    overflow(schema, field, value, U64_DIGITS)
                })?;
        }
        totals.ensure_fits(schema)?;
        Ok(totals)
    }

    /// Folds another scope's totals into these, e.g. batches into a file, and
    /// checks the result against the control record `schema`.
    pub fn combine(
        self,
        other: Self,
        schema: &RecordSchema,
    ) -> Result<Self, ConfigValidationError> {
        let sum = |a: u64, b: u64, field: &'static str| {
            a.checked_add(b)
                .ok_or_else(|| overflow(schema, field, format!("{} + {}", a, b), U64_DIGITS))
        };
        let totals = ControlTotals {
            entry_addenda_count: sum(
                self.entry_addenda_count,
                other.entry_addenda_count,
                "entry_and_addenda_count",
            )?,
            entry_hash: (self.entry_hash + other.entry_hash) % ENTRY_HASH_MODULUS,
            total_debit: Amount::from_cents(sum(
                self.total_debit.cents(),
                other.total_debit.cents(),
                "total_debit_amount",
            )?),
            total_credit: Amount::from_cents(sum(
                self.total_credit.cents(),
                other.total_credit.cents(),
                "total_credit_amount",
            )?),
        };
        totals.ensure_fits(schema)?;
        Ok(totals)
    }

    /// Fails if a count or sum is too wide for its field in `schema`.
    pub fn ensure_fits(&self, schema: &RecordSchema) -> Result<(), ConfigValidationError> {
        ensure_fits(schema, "entry_and_addenda_count", self.entry_addenda_count)?;
        ensure_fits(schema, "entry_hash", self.entry_hash)?;
        ensure_fits(schema, "total_debit_amount", self.total_debit.cents())?;
        ensure_fits(schema, "total_credit_amount", self.total_credit.cents())
    }
}

impl std::fmt::Display for ControlTotals {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} records, debits {}, credits {}",
            self.entry_addenda_count, self.total_debit, self.total_credit
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::RecordKind;
    use crate::schema::{BATCH_CONTROL, FILE_CONTROL};

    fn tally(
        totals: ControlTotals,
        prefix: u64,
        code: TransactionCode,
        cents: u64,
    ) -> ControlTotals {
        totals.tally(prefix, code, Amount::from_cents(cents), 0).unwrap()
    }

    #[test]
    fn test_tally_partitions_by_transaction_code() {
        let totals = ControlTotals::default()
            .tally(12345678, TransactionCode::CHECKING_CREDIT, Amount::from_cents(1000), 1)
            .unwrap();
        let totals = tally(totals, 12345678, TransactionCode::CHECKING_DEBIT, 15000);
        let totals = tally(totals, 12323231, TransactionCode::CHECKING_CREDIT, 1213);

        assert_eq!(totals.entry_addenda_count, 4);
        assert_eq!(totals.entry_hash, 37014587);
        assert_eq!(totals.total_debit, Amount::from_cents(15000));
        assert_eq!(totals.total_credit, Amount::from_cents(2213));
    }

    #[test]
    fn test_entry_hash_wraps_at_ten_digits() {
        let totals = ControlTotals {
            entry_hash: ENTRY_HASH_MODULUS - 1,
            ..Default::default()
        };
        let totals = tally(totals, 2, TransactionCode::SAVINGS_CREDIT, 0);
        assert_eq!(totals.entry_hash, 1);
    }

    #[test]
    fn test_tally_overflow_is_none() {
        let totals = ControlTotals {
            total_debit: Amount::from_cents(u64::MAX),
            ..Default::default()
        };
        let next = totals.tally(1, TransactionCode::CHECKING_DEBIT, Amount::from_cents(1), 0);
        assert_eq!(next, None);
    }

    #[test]
    fn test_combine_sums_every_quantity() {
        let a = ControlTotals {
            entry_addenda_count: 2,
            entry_hash: 9_999_999_999,
            total_debit: Amount::from_cents(10),
            total_credit: Amount::from_cents(300),
        };
        let b = ControlTotals {
            entry_addenda_count: 3,
            entry_hash: 5,
            total_debit: Amount::from_cents(5),
            total_credit: Amount::from_cents(7000),
        };

        let total = a.combine(b, &FILE_CONTROL).unwrap();
        assert_eq!(total.entry_addenda_count, 5);
        assert_eq!(total.entry_hash, 4);
        assert_eq!(total.total_debit, Amount::from_cents(15));
        assert_eq!(total.total_credit, Amount::from_cents(7300));
        assert_eq!(ControlTotals::default().combine(a, &FILE_CONTROL).unwrap(), a);
    }

    #[test]
    fn test_combine_rejects_sums_wider_than_the_control_record() {
        let half = ControlTotals {
            total_credit: Amount::from_cents(600_000_000_000),
            ..Default::default()
        };

        let err = half.combine(half, &FILE_CONTROL).unwrap_err();
        assert_eq!(
            err,
            ConfigValidationError::InvalidValue {
                record: RecordKind::FileControl,
                field: "total_credit_amount",
                value: "1200000000000".to_string(),
                reason: FieldError::Overflow { digits: 13, width: 12 },
            }
        );
    }

    #[test]
    fn test_counts_are_checked_against_each_record_width() {
        let totals = ControlTotals {
            entry_addenda_count: 1_000_000,
            ..Default::default()
        };
        assert!(totals.ensure_fits(&FILE_CONTROL).is_ok());
        assert!(matches!(
            totals.ensure_fits(&BATCH_CONTROL),
            Err(ConfigValidationError::InvalidValue {
                record: RecordKind::BatchControl,
                field: "entry_and_addenda_count",
                reason: FieldError::Overflow { digits: 7, width: 6 },
                ..
            })
        ));
    }

    #[test]
    fn test_ensure_fits_counts_digits() {
        assert!(ensure_fits(&FILE_CONTROL, "batch_count", 0).is_ok());
        assert!(ensure_fits(&FILE_CONTROL, "batch_count", 999_999).is_ok());
        assert!(ensure_fits(&FILE_CONTROL, "batch_count", 1_000_000).is_err());
    }
}
