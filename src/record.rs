//! Record Model: schema-driven construction and rendering of 94-character records.
//!
//! A [`RecordSchema`] is an ordered list of [`FieldDef`]s. [`Record::build`]
//! takes caller-supplied values by field name, applies defaults and validates
//! every value up front. Fields with the `Computed` strategy stay pending
//! until the sequencing or aggregation stage fills them exactly once through
//! [`Record::fill`].

use crate::error::{AssemblyError, ConfigValidationError, Result, SequenceStateError};
use crate::field::{FieldType, FieldValue, ValidationMode};
use crate::schema::RECORD_WIDTH;
use chrono::NaiveDateTime;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// Kind of line in an ACH file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordKind {
    FileHeader,
    BatchHeader,
    EntryDetail,
    Addenda,
    BatchControl,
    FileControl,
    Filler,
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RecordKind::FileHeader => "file header",
            RecordKind::BatchHeader => "batch header",
            RecordKind::EntryDetail => "entry detail",
            RecordKind::Addenda => "addenda",
            RecordKind::BatchControl => "batch control",
            RecordKind::FileControl => "file control",
            RecordKind::Filler => "filler",
        };
        f.write_str(name)
    }
}

/// Where a field's value comes from when the caller omits it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldDefault {
    /// Fixed value, validated like caller input.
    Literal(&'static str),
    /// Filled in by the builder; callers may not supply it.
    Computed,
    /// No default: required fields fail, optional ones render blank.
    None,
}

/// One positional field of a record layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldDef {
    pub name: &'static str,
    pub field_type: FieldType,
    pub width: usize,
    pub required: bool,
    pub default: FieldDefault,
}

impl FieldDef {
    pub const fn required(name: &'static str, field_type: FieldType, width: usize) -> Self {
        FieldDef {
            name,
            field_type,
            width,
            required: true,
            default: FieldDefault::None,
        }
    }

    pub const fn optional(name: &'static str, field_type: FieldType, width: usize) -> Self {
        FieldDef {
            name,
            field_type,
            width,
            required: false,
            default: FieldDefault::None,
        }
    }

    pub const fn literal(
        name: &'static str,
        field_type: FieldType,
        width: usize,
        value: &'static str,
    ) -> Self {
        FieldDef {
            name,
            field_type,
            width,
            required: true,
            default: FieldDefault::Literal(value),
        }
    }

    pub const fn computed(name: &'static str, field_type: FieldType, width: usize) -> Self {
        FieldDef {
            name,
            field_type,
            width,
            required: true,
            default: FieldDefault::Computed,
        }
    }

    pub fn is_computed(&self) -> bool {
        self.default == FieldDefault::Computed
    }
}

/// Ordered field layout of one record kind.
#[derive(Debug)]
pub struct RecordSchema {
    pub kind: RecordKind,
    pub fields: &'static [FieldDef],
}

impl RecordSchema {
    /// Sum of all field widths.
    pub fn width(&self) -> usize {
        self.fields.iter().map(|f| f.width).sum()
    }

    pub fn field(&self, name: &str) -> Option<&'static FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Names the caller must supply: required and without any default.
    pub fn required_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|f| f.required && f.default == FieldDefault::None)
            .map(|f| f.name)
    }

    /// Names the caller may supply: everything not computed.
    pub fn caller_fields(&self) -> impl Iterator<Item = &'static str> {
        self.fields
            .iter()
            .filter(|f| !f.is_computed())
            .map(|f| f.name)
    }
}

/// Caller-supplied raw values keyed by field name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldValues(BTreeMap<String, String>);

impl FieldValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.0.insert(name.into(), value.into());
        self
    }

    /// Inserts only when `value` is present.
    pub fn insert_opt(&mut self, name: impl Into<String>, value: Option<&String>) -> &mut Self {
        if let Some(value) = value {
            self.0.insert(name.into(), value.clone());
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FieldValues {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        FieldValues(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Slot {
    Ready(FieldValue),
    Pending,
}

/// A validated record instance bound to its schema.
#[derive(Debug, Clone)]
pub struct Record {
    schema: &'static RecordSchema,
    slots: Vec<Slot>,
}

impl Record {
    /// Builds a record from caller values, applying defaults.
    ///
    /// Blank values count as omitted. Unknown names, supplied computed fields,
    /// missing required fields and invalid values are all rejected here.
    pub fn build(
        schema: &'static RecordSchema,
        values: &FieldValues,
        mode: ValidationMode,
    ) -> std::result::Result<Self, ConfigValidationError> {
        if let Some(unknown) = values.names().find(|name| schema.field(name).is_none()) {
            return Err(ConfigValidationError::UnknownField {
                record: schema.kind,
                field: unknown.to_string(),
            });
        }

        let mut slots = Vec::with_capacity(schema.fields.len());
        for def in schema.fields {
            let supplied = values.get(def.name).filter(|v| !v.trim().is_empty());
            let slot = match (supplied, def.default) {
                (Some(_), FieldDefault::Computed) => {
                    return Err(ConfigValidationError::ComputedField {
                        record: schema.kind,
                        field: def.name.to_string(),
                    })
                }
                (Some(raw), _) | (None, FieldDefault::Literal(raw)) => {
                    Slot::Ready(validate(schema.kind, def, raw, mode)?)
                }
                (None, FieldDefault::Computed) => Slot::Pending,
                (None, FieldDefault::None) if def.required => {
                    return Err(ConfigValidationError::MissingField {
                        record: schema.kind,
                        field: def.name,
                    })
                }
                (None, FieldDefault::None) => Slot::Ready(FieldValue::Blank),
            };
            slots.push(slot);
        }

        Ok(Record { schema, slots })
    }

    pub fn kind(&self) -> RecordKind {
        self.schema.kind
    }

    pub fn schema(&self) -> &'static RecordSchema {
        self.schema
    }

    /// Normalized text of a field, if it holds plain text.
    pub fn text(&self, name: &str) -> Option<&str> {
        let idx = self.schema.position(name)?;
        match &self.slots[idx] {
            Slot::Ready(value) => value.text(),
            Slot::Pending => None,
        }
    }

    /// `true` once every computed field has been filled.
    pub fn is_complete(&self) -> bool {
        !self.slots.contains(&Slot::Pending)
    }

    /// Fills a pending computed field. Each computed field is filled once.
    pub fn fill(&mut self, name: &str, value: impl ToString) -> Result<()> {
        let kind = self.schema.kind;
        let idx = self
            .schema
            .position(name)
            .ok_or_else(|| ConfigValidationError::UnknownField {
                record: kind,
                field: name.to_string(),
            })?;
        let def = &self.schema.fields[idx];

        if self.slots[idx] != Slot::Pending {
            return Err(SequenceStateError::AlreadyComputed {
                record: kind,
                field: def.name,
            }
            .into());
        }

        let value = validate(kind, def, &value.to_string(), ValidationMode::Strict)?;
        self.slots[idx] = Slot::Ready(value);
        Ok(())
    }

    /// Pins every symbolic date and time to `now`.
    pub fn resolve(&mut self, now: NaiveDateTime) {
        for slot in &mut self.slots {
            if let Slot::Ready(value) = slot {
                if value.is_symbolic() {
                    *value = value.resolve(now);
                }
            }
        }
    }

    /// Renders the record as one fixed-width line without terminator.
    pub fn render(&self) -> std::result::Result<String, AssemblyError> {
        let kind = self.schema.kind;
        let mut line = String::with_capacity(RECORD_WIDTH);

        for (def, slot) in self.schema.fields.iter().zip(&self.slots) {
            let value = match slot {
                Slot::Ready(value) => value,
                Slot::Pending => {
                    return Err(AssemblyError::PendingField {
                        record: kind,
                        field: def.name,
                    })
                }
            };
            // only unresolved symbolic dates fail to render
            let text = def.field_type.render(value, def.width).map_err(|_| {
                AssemblyError::PendingField {
                    record: kind,
                    field: def.name,
                }
            })?;
            line.push_str(&text);
        }

        if line.len() != RECORD_WIDTH {
            return Err(AssemblyError::RecordWidth {
                record: kind,
                expected: RECORD_WIDTH,
                actual: line.len(),
            });
        }
        Ok(line)
    }
}

/// Serializes as a map from field name to value, in layout order.
///
/// Integer fields become numbers, everything else the normalized text.
/// Pending computed fields are `null`.
impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.slots.len()))?;
        for (def, slot) in self.schema.fields.iter().zip(&self.slots) {
            match slot {
                Slot::Pending => map.serialize_entry(def.name, &())?,
                Slot::Ready(value) if def.field_type == FieldType::Integer => {
                    let number = value
                        .text()
                        .and_then(|digits| digits.parse::<u64>().ok())
                        .unwrap_or_default();
                    map.serialize_entry(def.name, &number)?
                }
                Slot::Ready(value) => map.serialize_entry(def.name, &value.to_string())?,
            }
        }
        map.end()
    }
}

fn validate(
    record: RecordKind,
    def: &FieldDef,
    raw: &str,
    mode: ValidationMode,
) -> std::result::Result<FieldValue, ConfigValidationError> {
    def.field_type
        .validate(raw, def.width, mode)
        .map_err(|reason| ConfigValidationError::InvalidValue {
            record,
            field: def.name,
            value: raw.to_string(),
            reason,
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};
    use crate::error::AchError;
    use crate::field::FieldError;
    use crate::schema::{ADDENDA, ENTRY_DETAIL, FILE_HEADER};

    fn header_values() -> FieldValues {
        [
            ("destination_routing", "012345678"),
            ("origin_routing", "1234567890"),
            ("destination_name", "YOUR BANK"),
            ("origin_name", "YOUR COMPANY"),
            ("file_creation_date", "140902"),
            ("file_creation_time", "0123"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_build_applies_defaults_and_renders_94_characters() {
        let record =
            Record::build(&FILE_HEADER, &header_values(), ValidationMode::Permissive).unwrap();
        let line = record.render().unwrap();

        assert_eq!(line.len(), 94);
        assert!(line.starts_with("101 0123456781234567890140902"));
        assert_eq!(&line[29..40], "0123A094101");
        assert_eq!(record.text("blocking_factor"), Some("10"));
    }

    #[test]
    fn test_missing_required_field() {
        let mut values = header_values();
        values.insert("destination_name", "   ");

        let err = Record::build(&FILE_HEADER, &values, ValidationMode::Permissive).unwrap_err();
        assert_eq!(
            err,
            ConfigValidationError::MissingField {
                record: RecordKind::FileHeader,
                field: "destination_name",
            }
        );
    }

    #[test]
    fn test_unknown_and_computed_fields_are_rejected() {
        let mut values = header_values();
        values.insert("favourite_colour", "blue");
        let err = Record::build(&FILE_HEADER, &values, ValidationMode::Permissive).unwrap_err();
        assert!(matches!(err, ConfigValidationError::UnknownField { .. }));

        let values: FieldValues = [("addenda_sequence_number", "3")].into_iter().collect();
        let err = Record::build(&ADDENDA, &values, ValidationMode::Permissive).unwrap_err();
        assert_eq!(
            err,
            ConfigValidationError::ComputedField {
                record: RecordKind::Addenda,
                field: "addenda_sequence_number".to_string(),
            }
        );
    }

    #[test]
    fn test_invalid_value_carries_context() {
        let values: FieldValues = [
            ("transaction_code", "22"),
            ("rdfi_routing", "123456789"),
            ("rdfi_account_number", "65656565"),
            ("amount", "-5"),
            ("individual_name", "Janey Test"),
        ]
        .into_iter()
        .collect();

        let err = Record::build(&ENTRY_DETAIL, &values, ValidationMode::Permissive).unwrap_err();
        assert_eq!(
            err,
            ConfigValidationError::InvalidValue {
                record: RecordKind::EntryDetail,
                field: "amount",
                value: "-5".to_string(),
                reason: FieldError::Negative,
            }
        );
        assert!(err.to_string().contains("amount"));
    }

    #[test]
    fn test_pending_fields_block_render_until_filled_once() {
        let mut record =
            Record::build(&ADDENDA, &FieldValues::new(), ValidationMode::Permissive).unwrap();
        assert!(!record.is_complete());
        assert!(matches!(
            record.render(),
            Err(AssemblyError::PendingField { .. })
        ));

        record.fill("addenda_sequence_number", 1).unwrap();
        record.fill("entry_detail_sequence_number", 7).unwrap();
        assert!(record.is_complete());
        assert!(record.render().unwrap().ends_with("00010000007"));

        let err = record.fill("addenda_sequence_number", 2).unwrap_err();
        assert!(matches!(
            err,
            AchError::SequenceState(SequenceStateError::AlreadyComputed { .. })
        ));
    }

    #[test]
    fn test_symbolic_dates_resolve_on_request() {
        let mut values = header_values();
        values.insert("file_creation_date", "today");
        let mut record =
            Record::build(&FILE_HEADER, &values, ValidationMode::Permissive).unwrap();
        assert!(record.render().is_err());

        record.resolve(FixedClock::at(2023, 7, 4, 8, 30).unwrap().now());
        assert_eq!(&record.render().unwrap()[23..29], "230704");
    }

    #[test]
    fn test_serializes_field_values_in_layout_order() {
        let mut record =
            Record::build(&ADDENDA, &FieldValues::new(), ValidationMode::Permissive).unwrap();
        record.fill("addenda_sequence_number", 1).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        assert_eq!(
            json,
            "{\"record_type_code\":7,\"addenda_type_code\":5,\
\"payment_related_information\":\"\",\"addenda_sequence_number\":1,\
\"entry_detail_sequence_number\":null}"
        );

        let record =
            Record::build(&FILE_HEADER, &header_values(), ValidationMode::Permissive).unwrap();
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["origin_routing"], "1234567890");
        assert_eq!(value["destination_routing"], "012345678");
        assert_eq!(value["file_creation_date"], "140902");
        assert_eq!(value["blocking_factor"], 10);
        assert_eq!(value["reference_code"], "");
    }
}
