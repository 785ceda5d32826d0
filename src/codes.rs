//! Enumerated code values carried by batch headers and entry details.

use crate::field::FieldError;
use std::fmt;
use std::str::FromStr;

/// Two-digit entry transaction code.
///
/// The tens digit names the account type and the units digit the action:
/// units below 5 credit the receiver, 5 and above debit it. Codes outside the
/// named constants are accepted and classified by the same digit rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TransactionCode(u8);

impl TransactionCode {
    pub const CHECKING_CREDIT: Self = TransactionCode(22);
    pub const CHECKING_CREDIT_PRENOTE: Self = TransactionCode(23);
    pub const CHECKING_DEBIT: Self = TransactionCode(27);
    pub const CHECKING_DEBIT_PRENOTE: Self = TransactionCode(28);
    pub const SAVINGS_CREDIT: Self = TransactionCode(32);
    pub const SAVINGS_CREDIT_PRENOTE: Self = TransactionCode(33);
    pub const SAVINGS_DEBIT: Self = TransactionCode(37);
    pub const SAVINGS_DEBIT_PRENOTE: Self = TransactionCode(38);

    /// Returns `None` unless `code` has exactly two digits.
    pub fn new(code: u8) -> Option<Self> {
        (10..=99).contains(&code).then_some(TransactionCode(code))
    }

    pub fn code(&self) -> u8 {
        self.0
    }

    pub fn is_credit(&self) -> bool {
        self.0 % 10 < 5
    }

    pub fn is_debit(&self) -> bool {
        !self.is_credit()
    }

    /// Zero-dollar dry run used to validate account details.
    pub fn is_prenote(&self) -> bool {
        matches!(self.0 % 10, 3 | 8)
    }

    pub fn is_checking(&self) -> bool {
        self.0 / 10 == 2
    }

    pub fn is_savings(&self) -> bool {
        self.0 / 10 == 3
    }
}

impl FromStr for TransactionCode {
    type Err = FieldError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        s.trim()
            .parse::<u8>()
            .ok()
            .and_then(TransactionCode::new)
            .ok_or(FieldError::OutOfRange { min: 10, max: 99 })
    }
}

impl fmt::Display for TransactionCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}", self.0)
    }
}

/// Whether a batch carries credits, debits or both.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum ServiceClassCode {
    #[default]
    Mixed,
    CreditsOnly,
    DebitsOnly,
}

impl ServiceClassCode {
    pub fn code(&self) -> u16 {
        match self {
            ServiceClassCode::Mixed => 200,
            ServiceClassCode::CreditsOnly => 220,
            ServiceClassCode::DebitsOnly => 225,
        }
    }

    /// `true` if an entry with `code` may appear in a batch of this class.
    pub fn permits(&self, code: TransactionCode) -> bool {
        match self {
            ServiceClassCode::Mixed => true,
            ServiceClassCode::CreditsOnly => code.is_credit(),
            ServiceClassCode::DebitsOnly => code.is_debit(),
        }
    }
}

impl FromStr for ServiceClassCode {
    type Err = FieldError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "200" => Ok(ServiceClassCode::Mixed),
            "220" => Ok(ServiceClassCode::CreditsOnly),
            "225" => Ok(ServiceClassCode::DebitsOnly),
            _ => Err(FieldError::UnknownCode("200, 220, 225")),
        }
    }
}

impl fmt::Display for ServiceClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Standard Entry Class code naming the payment application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StandardEntryClassCode {
    #[default]
    Ppd,
    Arc,
    Boc,
    Ccd,
    Cie,
    Ctx,
    Iat,
    Pop,
    Rck,
    Tel,
    Web,
}

impl StandardEntryClassCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            StandardEntryClassCode::Ppd => "PPD",
            StandardEntryClassCode::Arc => "ARC",
            StandardEntryClassCode::Boc => "BOC",
            StandardEntryClassCode::Ccd => "CCD",
            StandardEntryClassCode::Cie => "CIE",
            StandardEntryClassCode::Ctx => "CTX",
            StandardEntryClassCode::Iat => "IAT",
            StandardEntryClassCode::Pop => "POP",
            StandardEntryClassCode::Rck => "RCK",
            StandardEntryClassCode::Tel => "TEL",
            StandardEntryClassCode::Web => "WEB",
        }
    }
}

impl FromStr for StandardEntryClassCode {
    type Err = FieldError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "PPD" => Ok(StandardEntryClassCode::Ppd),
            "ARC" => Ok(StandardEntryClassCode::Arc),
            "BOC" => Ok(StandardEntryClassCode::Boc),
            "CCD" => Ok(StandardEntryClassCode::Ccd),
            "CIE" => Ok(StandardEntryClassCode::Cie),
            "CTX" => Ok(StandardEntryClassCode::Ctx),
            "IAT" => Ok(StandardEntryClassCode::Iat),
            "POP" => Ok(StandardEntryClassCode::Pop),
            "RCK" => Ok(StandardEntryClassCode::Rck),
            "TEL" => Ok(StandardEntryClassCode::Tel),
            "WEB" => Ok(StandardEntryClassCode::Web),
            _ => Err(FieldError::UnknownCode(
                "PPD, ARC, BOC, CCD, CIE, CTX, IAT, POP, RCK, TEL, WEB",
            )),
        }
    }
}

impl fmt::Display for StandardEntryClassCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transaction_code_classification() {
        assert!(TransactionCode::CHECKING_CREDIT.is_credit());
        assert!(TransactionCode::CHECKING_CREDIT.is_checking());
        assert!(!TransactionCode::CHECKING_CREDIT.is_prenote());

        assert!(TransactionCode::SAVINGS_DEBIT_PRENOTE.is_debit());
        assert!(TransactionCode::SAVINGS_DEBIT_PRENOTE.is_savings());
        assert!(TransactionCode::SAVINGS_DEBIT_PRENOTE.is_prenote());
    }

    #[test]
    fn test_unnamed_transaction_codes_use_digit_rules() {
        let loan_credit: TransactionCode = "52".parse().unwrap();
        assert!(loan_credit.is_credit());
        assert!(!loan_credit.is_checking() && !loan_credit.is_savings());

        let gl_debit: TransactionCode = "47".parse().unwrap();
        assert!(gl_debit.is_debit());
    }

    #[test]
    fn test_transaction_code_must_have_two_digits() {
        assert!("7".parse::<TransactionCode>().is_err());
        assert!("100".parse::<TransactionCode>().is_err());
        assert!("x2".parse::<TransactionCode>().is_err());
        assert_eq!(TransactionCode::new(22).unwrap().to_string(), "22");
    }

    #[test]
    fn test_service_class_code_round_trip_and_permits() {
        let credits: ServiceClassCode = "220".parse().unwrap();
        assert_eq!(credits, ServiceClassCode::CreditsOnly);
        assert_eq!(ServiceClassCode::default().to_string(), "200");
        assert!(credits.permits(TransactionCode::SAVINGS_CREDIT));
        assert!(!credits.permits(TransactionCode::CHECKING_DEBIT));
        assert!("201".parse::<ServiceClassCode>().is_err());
    }

    #[test]
    fn test_standard_entry_class_code_parsing() {
        assert_eq!(
            "ccd".parse::<StandardEntryClassCode>().unwrap(),
            StandardEntryClassCode::Ccd
        );
        assert_eq!(StandardEntryClassCode::default().to_string(), "PPD");
        assert!("XYZ".parse::<StandardEntryClassCode>().is_err());
    }
}
