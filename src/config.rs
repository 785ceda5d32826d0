//! Typed per-record configuration.
//!
//! Configs hold raw strings exactly as the caller supplied them. Nothing is
//! validated here: values are checked against their field types when the
//! owning record is built, so every error points at the call that added it.

use crate::assembler::LineEnding;
use crate::error::{AchError, Result};
use crate::field::ValidationMode;
use crate::record::FieldValues;
use std::env;

pub const ENV_DESTINATION_ROUTING: &str = "ACH_DESTINATION_ROUTING";
pub const ENV_ORIGIN_ROUTING: &str = "ACH_ORIGIN_ROUTING";
pub const ENV_DESTINATION_NAME: &str = "ACH_DESTINATION_NAME";
pub const ENV_ORIGIN_NAME: &str = "ACH_ORIGIN_NAME";
pub const ENV_FILE_CREATION_DATE: &str = "ACH_FILE_CREATION_DATE";
pub const ENV_FILE_CREATION_TIME: &str = "ACH_FILE_CREATION_TIME";
pub const ENV_FILE_ID_MODIFIER: &str = "ACH_FILE_ID_MODIFIER";
pub const ENV_BLOCKING_FACTOR: &str = "ACH_BLOCKING_FACTOR";
pub const ENV_REFERENCE_CODE: &str = "ACH_REFERENCE_CODE";
pub const ENV_ODFI_IDENTIFICATION: &str = "ACH_ODFI_IDENTIFICATION";
pub const ENV_LINE_ENDING: &str = "ACH_LINE_ENDING";
pub const ENV_STRICT: &str = "ACH_STRICT";

/// File header settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FileConfig {
    pub destination_routing: String,
    pub origin_routing: String,
    pub destination_name: String,
    pub origin_name: String,
    pub file_creation_date: Option<String>,
    pub file_creation_time: Option<String>,
    pub file_id_modifier: Option<String>,
    pub blocking_factor: Option<String>,
    pub format_code: Option<String>,
    pub reference_code: Option<String>,
    /// Overrides the ODFI identifier derived from `origin_routing`.
    pub odfi_identification: Option<String>,
}

impl FileConfig {
    pub fn new(
        destination_routing: impl Into<String>,
        origin_routing: impl Into<String>,
        destination_name: impl Into<String>,
        origin_name: impl Into<String>,
    ) -> Self {
        FileConfig {
            destination_routing: destination_routing.into(),
            origin_routing: origin_routing.into(),
            destination_name: destination_name.into(),
            origin_name: origin_name.into(),
            ..Default::default()
        }
    }

    /// Accepts `today`, `tomorrow`, `YYMMDD` or an ISO date.
    pub fn with_file_creation_date(mut self, date: impl ToString) -> Self {
        self.file_creation_date = Some(date.to_string());
        self
    }

    /// Accepts `now`, `HHMM` or `HH:MM`.
    pub fn with_file_creation_time(mut self, time: impl ToString) -> Self {
        self.file_creation_time = Some(time.to_string());
        self
    }

    pub fn with_file_id_modifier(mut self, modifier: impl ToString) -> Self {
        self.file_id_modifier = Some(modifier.to_string());
        self
    }

    pub fn with_blocking_factor(mut self, factor: impl ToString) -> Self {
        self.blocking_factor = Some(factor.to_string());
        self
    }

    pub fn with_format_code(mut self, code: impl ToString) -> Self {
        self.format_code = Some(code.to_string());
        self
    }

    pub fn with_reference_code(mut self, code: impl ToString) -> Self {
        self.reference_code = Some(code.to_string());
        self
    }

    pub fn with_odfi_identification(mut self, odfi: impl ToString) -> Self {
        self.odfi_identification = Some(odfi.to_string());
        self
    }

    /// Raw values for the file header record.
    pub fn header_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .insert("destination_routing", self.destination_routing.as_str())
            .insert("origin_routing", self.origin_routing.as_str())
            .insert("destination_name", self.destination_name.as_str())
            .insert("origin_name", self.origin_name.as_str())
            .insert_opt("file_creation_date", self.file_creation_date.as_ref())
            .insert_opt("file_creation_time", self.file_creation_time.as_ref())
            .insert_opt("file_id_modifier", self.file_id_modifier.as_ref())
            .insert_opt("blocking_factor", self.blocking_factor.as_ref())
            .insert_opt("format_code", self.format_code.as_ref())
            .insert_opt("reference_code", self.reference_code.as_ref());
        values
    }

    /// Reads the `ACH_*` process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Like [`FileConfig::from_env`] but reads variables through `lookup`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| {
            lookup(name)
                .filter(|v| !v.trim().is_empty())
                .ok_or(AchError::MissingEnv(name))
        };

        Ok(FileConfig {
            destination_routing: required(ENV_DESTINATION_ROUTING)?,
            origin_routing: required(ENV_ORIGIN_ROUTING)?,
            destination_name: required(ENV_DESTINATION_NAME)?,
            origin_name: required(ENV_ORIGIN_NAME)?,
            file_creation_date: lookup(ENV_FILE_CREATION_DATE),
            file_creation_time: lookup(ENV_FILE_CREATION_TIME),
            file_id_modifier: lookup(ENV_FILE_ID_MODIFIER),
            blocking_factor: lookup(ENV_BLOCKING_FACTOR),
            format_code: None,
            reference_code: lookup(ENV_REFERENCE_CODE),
            odfi_identification: lookup(ENV_ODFI_IDENTIFICATION),
        })
    }
}

/// Batch header settings, plus the one caller-supplied batch control field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchConfig {
    pub company_name: String,
    pub company_identification: String,
    pub company_entry_description: String,
    pub service_class_code: Option<String>,
    pub company_discretionary_data: Option<String>,
    pub standard_entry_class_code: Option<String>,
    pub company_descriptive_date: Option<String>,
    pub effective_entry_date: Option<String>,
    pub settlement_date: Option<String>,
    pub originator_status_code: Option<String>,
    pub message_authentication_code: Option<String>,
}

impl BatchConfig {
    pub fn new(
        company_name: impl Into<String>,
        company_identification: impl Into<String>,
        company_entry_description: impl Into<String>,
    ) -> Self {
        BatchConfig {
            company_name: company_name.into(),
            company_identification: company_identification.into(),
            company_entry_description: company_entry_description.into(),
            ..Default::default()
        }
    }

    /// `200`, `220`, `225` or a [`ServiceClassCode`](crate::ServiceClassCode).
    pub fn with_service_class_code(mut self, code: impl ToString) -> Self {
        self.service_class_code = Some(code.to_string());
        self
    }

    pub fn with_company_discretionary_data(mut self, data: impl ToString) -> Self {
        self.company_discretionary_data = Some(data.to_string());
        self
    }

    pub fn with_standard_entry_class_code(mut self, code: impl ToString) -> Self {
        self.standard_entry_class_code = Some(code.to_string());
        self
    }

    pub fn with_company_descriptive_date(mut self, date: impl ToString) -> Self {
        self.company_descriptive_date = Some(date.to_string());
        self
    }

    pub fn with_effective_entry_date(mut self, date: impl ToString) -> Self {
        self.effective_entry_date = Some(date.to_string());
        self
    }

    pub fn with_settlement_date(mut self, date: impl ToString) -> Self {
        self.settlement_date = Some(date.to_string());
        self
    }

    pub fn with_originator_status_code(mut self, code: impl ToString) -> Self {
        self.originator_status_code = Some(code.to_string());
        self
    }

    pub fn with_message_authentication_code(mut self, mac: impl ToString) -> Self {
        self.message_authentication_code = Some(mac.to_string());
        self
    }

    /// Raw values for the batch header record.
    pub fn header_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .insert("company_name", self.company_name.as_str())
            .insert("company_identification", self.company_identification.as_str())
            .insert("company_entry_description", self.company_entry_description.as_str())
            .insert_opt("service_class_code", self.service_class_code.as_ref())
            .insert_opt("company_discretionary_data", self.company_discretionary_data.as_ref())
            .insert_opt("standard_entry_class_code", self.standard_entry_class_code.as_ref())
            .insert_opt("company_descriptive_date", self.company_descriptive_date.as_ref())
            .insert_opt("effective_entry_date", self.effective_entry_date.as_ref())
            .insert_opt("settlement_date", self.settlement_date.as_ref())
            .insert_opt("originator_status_code", self.originator_status_code.as_ref());
        values
    }

    /// Raw values for the batch control record.
    pub fn control_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert_opt(
            "message_authentication_code",
            self.message_authentication_code.as_ref(),
        );
        values
    }
}

/// One entry detail and the addendas that follow it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryConfig {
    pub transaction_code: String,
    pub rdfi_routing: String,
    pub rdfi_account_number: String,
    /// Minor currency units (cents).
    pub amount: String,
    pub individual_name: String,
    pub individual_identification_number: Option<String>,
    pub discretionary_data: Option<String>,
    pub addendas: Vec<AddendaConfig>,
}

impl EntryConfig {
    /// `amount` is in minor currency units; pass [`Amount::cents`](crate::Amount::cents)
    /// when starting from a decimal amount.
    pub fn new(
        transaction_code: impl ToString,
        rdfi_routing: impl ToString,
        rdfi_account_number: impl ToString,
        amount: impl ToString,
        individual_name: impl ToString,
    ) -> Self {
        EntryConfig {
            transaction_code: transaction_code.to_string(),
            rdfi_routing: rdfi_routing.to_string(),
            rdfi_account_number: rdfi_account_number.to_string(),
            amount: amount.to_string(),
            individual_name: individual_name.to_string(),
            ..Default::default()
        }
    }

    pub fn with_individual_identification_number(mut self, id: impl ToString) -> Self {
        self.individual_identification_number = Some(id.to_string());
        self
    }

    pub fn with_discretionary_data(mut self, data: impl ToString) -> Self {
        self.discretionary_data = Some(data.to_string());
        self
    }

    pub fn with_addenda(mut self, addenda: AddendaConfig) -> Self {
        self.addendas.push(addenda);
        self
    }

    /// Raw values for the entry detail record.
    pub fn entry_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values
            .insert("transaction_code", self.transaction_code.as_str())
            .insert("rdfi_routing", self.rdfi_routing.as_str())
            .insert("rdfi_account_number", self.rdfi_account_number.as_str())
            .insert("amount", self.amount.as_str())
            .insert("individual_name", self.individual_name.as_str())
            .insert_opt(
                "individual_identification_number",
                self.individual_identification_number.as_ref(),
            )
            .insert_opt("discretionary_data", self.discretionary_data.as_ref());
        values
    }
}

/// Free-text addenda attached to an entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddendaConfig {
    pub payment_related_information: Option<String>,
}

impl AddendaConfig {
    pub fn new(payment_related_information: impl Into<String>) -> Self {
        AddendaConfig {
            payment_related_information: Some(payment_related_information.into()),
        }
    }

    /// Raw values for the addenda record.
    pub fn addenda_values(&self) -> FieldValues {
        let mut values = FieldValues::new();
        values.insert_opt(
            "payment_related_information",
            self.payment_related_information.as_ref(),
        );
        values
    }
}

/// Session-wide build behavior.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BuildOptions {
    pub mode: ValidationMode,
    pub line_ending: LineEnding,
}

impl BuildOptions {
    pub fn with_mode(mut self, mode: ValidationMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Reads `ACH_STRICT` and `ACH_LINE_ENDING`; unset variables keep defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut options = BuildOptions::default();

        if let Some(value) = lookup(ENV_STRICT) {
            options.mode = match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" => ValidationMode::Strict,
                "" | "0" | "false" | "no" => ValidationMode::Permissive,
                _ => {
                    return Err(AchError::InvalidEnv {
                        var: ENV_STRICT,
                        value,
                    })
                }
            };
        }

        if let Some(value) = lookup(ENV_LINE_ENDING) {
            options.line_ending = value.parse().map_err(|_| AchError::InvalidEnv {
                var: ENV_LINE_ENDING,
                value: value.clone(),
            })?;
        }

        Ok(options)
    }
}
