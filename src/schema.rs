//! NACHA record layouts.
//!
//! Field order, widths, required-ness and defaults are the wire contract that
//! receiving banks parse against. Every layout sums to [`RECORD_WIDTH`].

use crate::field::FieldType::{
    AlphaNum, BlankPaddedRoutingNumber, Date, ImmediateOrigin, Integer, Time,
};
use crate::record::{FieldDef, RecordKind, RecordSchema};

/// Characters per record line, excluding the terminator.
pub const RECORD_WIDTH: usize = 94;

/// Character repeated across every filler line.
pub const FILLER_CHAR: char = '9';

pub static FILE_HEADER: RecordSchema = RecordSchema {
    kind: RecordKind::FileHeader,
    fields: &[
        FieldDef::literal("record_type_code", Integer, 1, "1"),
        FieldDef::literal("priority_code", Integer, 2, "1"),
        FieldDef::required("destination_routing", BlankPaddedRoutingNumber, 10),
        FieldDef::required("origin_routing", ImmediateOrigin, 10),
        FieldDef::literal("file_creation_date", Date, 6, "today"),
        FieldDef::optional("file_creation_time", Time, 4),
        FieldDef::literal("file_id_modifier", AlphaNum, 1, "A"),
        FieldDef::literal("record_size", Integer, 3, "94"),
        FieldDef::literal("blocking_factor", Integer, 2, "10"),
        FieldDef::literal("format_code", Integer, 1, "1"),
        FieldDef::required("destination_name", AlphaNum, 23),
        FieldDef::required("origin_name", AlphaNum, 23),
        FieldDef::optional("reference_code", AlphaNum, 8),
    ],
};

pub static BATCH_HEADER: RecordSchema = RecordSchema {
    kind: RecordKind::BatchHeader,
    fields: &[
        FieldDef::literal("record_type_code", Integer, 1, "5"),
        FieldDef::literal("service_class_code", Integer, 3, "200"),
        FieldDef::required("company_name", AlphaNum, 16),
        FieldDef::optional("company_discretionary_data", AlphaNum, 20),
        FieldDef::required("company_identification", Integer, 10),
        FieldDef::literal("standard_entry_class_code", AlphaNum, 3, "PPD"),
        FieldDef::required("company_entry_description", AlphaNum, 10),
        FieldDef::optional("company_descriptive_date", Date, 6),
        FieldDef::literal("effective_entry_date", Date, 6, "tomorrow"),
        // inserted by the ACH operator
        FieldDef::optional("settlement_date", AlphaNum, 3),
        FieldDef::literal("originator_status_code", Integer, 1, "1"),
        FieldDef::computed("odfi_identification", Integer, 8),
        FieldDef::computed("batch_number", Integer, 7),
    ],
};

pub static ENTRY_DETAIL: RecordSchema = RecordSchema {
    kind: RecordKind::EntryDetail,
    fields: &[
        FieldDef::literal("record_type_code", Integer, 1, "6"),
        FieldDef::required("transaction_code", Integer, 2),
        FieldDef::required("rdfi_routing", BlankPaddedRoutingNumber, 9),
        FieldDef::required("rdfi_account_number", AlphaNum, 17),
        FieldDef::required("amount", Integer, 10),
        FieldDef::optional("individual_identification_number", AlphaNum, 15),
        FieldDef::required("individual_name", AlphaNum, 22),
        FieldDef::optional("discretionary_data", AlphaNum, 2),
        FieldDef::computed("addenda_record_indicator", Integer, 1),
        FieldDef::computed("trace_odfi_identifier", Integer, 8),
        FieldDef::computed("trace_sequence_number", Integer, 7),
    ],
};

pub static ADDENDA: RecordSchema = RecordSchema {
    kind: RecordKind::Addenda,
    fields: &[
        FieldDef::literal("record_type_code", Integer, 1, "7"),
        FieldDef::literal("addenda_type_code", Integer, 2, "5"),
        FieldDef::optional("payment_related_information", AlphaNum, 80),
        FieldDef::computed("addenda_sequence_number", Integer, 4),
        FieldDef::computed("entry_detail_sequence_number", Integer, 7),
    ],
};

pub static BATCH_CONTROL: RecordSchema = RecordSchema {
    kind: RecordKind::BatchControl,
    fields: &[
        FieldDef::literal("record_type_code", Integer, 1, "8"),
        FieldDef::computed("service_class_code", Integer, 3),
        FieldDef::computed("entry_and_addenda_count", Integer, 6),
        FieldDef::computed("entry_hash", Integer, 10),
        FieldDef::computed("total_debit_amount", Integer, 12),
        FieldDef::computed("total_credit_amount", Integer, 12),
        FieldDef::computed("company_identification", Integer, 10),
        FieldDef::optional("message_authentication_code", AlphaNum, 19),
        FieldDef::optional("reserved", AlphaNum, 6),
        FieldDef::computed("odfi_identification", Integer, 8),
        FieldDef::computed("batch_number", Integer, 7),
    ],
};

pub static FILE_CONTROL: RecordSchema = RecordSchema {
    kind: RecordKind::FileControl,
    fields: &[
        FieldDef::literal("record_type_code", Integer, 1, "9"),
        FieldDef::computed("batch_count", Integer, 6),
        FieldDef::computed("block_count", Integer, 6),
        FieldDef::computed("entry_and_addenda_count", Integer, 8),
        FieldDef::computed("entry_hash", Integer, 10),
        FieldDef::computed("total_debit_amount", Integer, 12),
        FieldDef::computed("total_credit_amount", Integer, 12),
        FieldDef::optional("reserved", AlphaNum, 39),
    ],
};

/// Every layout, in file order.
pub fn all_schemas() -> [&'static RecordSchema; 6] {
    [
        &FILE_HEADER,
        &BATCH_HEADER,
        &ENTRY_DETAIL,
        &ADDENDA,
        &BATCH_CONTROL,
        &FILE_CONTROL,
    ]
}

/// One padding line of [`FILLER_CHAR`].
pub fn filler_line() -> String {
    std::iter::repeat(FILLER_CHAR).take(RECORD_WIDTH).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_layout_is_94_wide() {
        for schema in all_schemas() {
            assert_eq!(schema.width(), RECORD_WIDTH, "{} layout", schema.kind);
        }
        assert_eq!(filler_line().len(), RECORD_WIDTH);
        assert!(filler_line().chars().all(|c| c == '9'));
    }

    #[test]
    fn test_field_names_are_unique_per_layout() {
        for schema in all_schemas() {
            let mut names: Vec<_> = schema.fields.iter().map(|f| f.name).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), schema.fields.len(), "{} layout", schema.kind);
        }
    }

    #[test]
    fn test_required_caller_fields() {
        let file: Vec<_> = FILE_HEADER.required_fields().collect();
        assert_eq!(
            file,
            ["destination_routing", "origin_routing", "destination_name", "origin_name"]
        );

        let batch: Vec<_> = BATCH_HEADER.required_fields().collect();
        assert_eq!(
            batch,
            ["company_name", "company_identification", "company_entry_description"]
        );

        let entry: Vec<_> = ENTRY_DETAIL.required_fields().collect();
        assert_eq!(
            entry,
            [
                "transaction_code",
                "rdfi_routing",
                "rdfi_account_number",
                "amount",
                "individual_name"
            ]
        );

        assert_eq!(ADDENDA.required_fields().count(), 0);
    }

    #[test]
    fn test_caller_fields_exclude_computed() {
        let addenda: Vec<_> = ADDENDA.caller_fields().collect();
        assert_eq!(
            addenda,
            ["record_type_code", "addenda_type_code", "payment_related_information"]
        );
        assert!(FILE_CONTROL
            .caller_fields()
            .all(|name| name == "record_type_code" || name == "reserved"));
    }
}
