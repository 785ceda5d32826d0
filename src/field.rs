//! Field Type Catalog: validation and fixed-width rendering of primitive values.
//!
//! Every field in every record is backed by one [`FieldType`]. The width comes
//! from the owning field definition, so one type can serve fields of many
//! widths. Validation happens once, when the record is built, and yields a
//! normalized [`FieldValue`]; rendering is then a pure padding step.

use crate::clock::{DateInput, TimeInput};
use chrono::NaiveDateTime;
use log::warn;
use std::fmt;
use thiserror::Error;

/// The closed set of value kinds used by the ACH record layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// Unsigned decimal digits, right-justified, zero-padded.
    Integer,
    /// Letters, digits, spaces and `./()&'-`, left-justified, space-padded.
    AlphaNum,
    /// Calendar date rendered as `YYMMDD`.
    Date,
    /// Clock time rendered as `HHMM`.
    Time,
    /// Nine-digit routing number, right-justified behind leading blanks.
    BlankPaddedRoutingNumber,
    /// Immediate origin: a blank-padded routing number or a full ten-digit
    /// company identifier.
    ImmediateOrigin,
}

/// How overlong or malformed-but-correctable input is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValidationMode {
    /// Strip disallowed characters, truncate overlong alphanumerics and
    /// zero-pad short routing numbers.
    #[default]
    Permissive,
    /// Reject anything that does not fit exactly.
    Strict,
}

/// A validated, normalized value ready to be padded into its field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Text(String),
    Date(DateInput),
    Time(TimeInput),
    Blank,
}

impl FieldValue {
    /// Normalized text of the value, if it is plain text.
    pub fn text(&self) -> Option<&str> {
        match self {
            FieldValue::Text(text) => Some(text),
            _ => None,
        }
    }

    /// `true` while the value still depends on the build clock.
    pub fn is_symbolic(&self) -> bool {
        match self {
            FieldValue::Date(date) => date.is_symbolic(),
            FieldValue::Time(time) => time.is_symbolic(),
            _ => false,
        }
    }

    /// Pins symbolic dates and times to `now`.
    pub fn resolve(&self, now: NaiveDateTime) -> FieldValue {
        match self {
            FieldValue::Date(date) => FieldValue::Date(DateInput::On(date.resolve(now))),
            FieldValue::Time(time) => FieldValue::Time(TimeInput::At(time.resolve(now))),
            other => other.clone(),
        }
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldValue::Text(text) => f.write_str(text),
            FieldValue::Date(date) => write!(f, "{}", date),
            FieldValue::Time(time) => write!(f, "{}", time),
            FieldValue::Blank => Ok(()),
        }
    }
}

/// Why a raw value was rejected by its field type.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("expected unsigned decimal digits")]
    NotNumeric,

    #[error("negative values are not allowed")]
    Negative,

    #[error("{digits} significant digits do not fit in {width}")]
    Overflow { digits: usize, width: usize },

    #[error("{len} characters exceed the field width of {width}")]
    TooLong { len: usize, width: usize },

    #[error("character {0:?} is not allowed in alphanumeric fields")]
    InvalidCharacter(char),

    #[error("expected a 9-digit routing number")]
    InvalidRouting,

    #[error("expected a 9-digit routing number or a 10-digit identifier")]
    InvalidOrigin,

    #[error("expected a calendar date (YYMMDD, YYYY-MM-DD, today or tomorrow)")]
    InvalidDate,

    #[error("expected a clock time (HHMM, HH:MM or now)")]
    InvalidTime,

    #[error("must be between {min} and {max}")]
    OutOfRange { min: u64, max: u64 },

    #[error("not one of {0}")]
    UnknownCode(&'static str),

    #[error("not permitted in a batch with service class {0}")]
    ServiceClassMismatch(u16),

    #[error("symbolic value `{0}` has not been resolved")]
    Unresolved(String),
}

/// Allowed in alphanumeric fields besides ASCII letters and digits.
const ALPHANUM_PUNCTUATION: &str = " ./()&'-";

const ROUTING_DIGITS: usize = 9;
const ORIGIN_ID_DIGITS: usize = 10;

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn is_alphanum_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || ALPHANUM_PUNCTUATION.contains(c)
}

impl FieldType {
    /// Validates `raw` against this type and a field of `width` characters.
    pub fn validate(
        &self,
        raw: &str,
        width: usize,
        mode: ValidationMode,
    ) -> std::result::Result<FieldValue, FieldError> {
        match self {
            FieldType::Integer => validate_integer(raw, width),
            FieldType::AlphaNum => validate_alphanum(raw, width, mode),
            FieldType::Date => raw.parse::<DateInput>().map(FieldValue::Date),
            FieldType::Time => raw.parse::<TimeInput>().map(FieldValue::Time),
            FieldType::BlankPaddedRoutingNumber => validate_routing(raw, width, mode),
            FieldType::ImmediateOrigin => {
                let trimmed = raw.trim();
                if trimmed.len() == ORIGIN_ID_DIGITS && all_digits(trimmed) {
                    if ORIGIN_ID_DIGITS > width {
                        return Err(FieldError::Overflow {
                            digits: ORIGIN_ID_DIGITS,
                            width,
                        });
                    }
                    return Ok(FieldValue::Text(trimmed.to_string()));
                }
                validate_routing(raw, width, mode).map_err(|_| FieldError::InvalidOrigin)
            }
        }
    }

    /// Renders a validated value into exactly `width` characters.
    ///
    /// Fails only when a symbolic date or time was never resolved.
    pub fn render(
        &self,
        value: &FieldValue,
        width: usize,
    ) -> std::result::Result<String, FieldError> {
        let text = match value {
            FieldValue::Blank => String::new(),
            FieldValue::Text(text) => text.clone(),
            FieldValue::Date(date) if date.is_symbolic() => {
                return Err(FieldError::Unresolved(date.to_string()))
            }
            FieldValue::Time(time) if time.is_symbolic() => {
                return Err(FieldError::Unresolved(time.to_string()))
            }
            FieldValue::Date(date) => date.to_string(),
            FieldValue::Time(time) => time.to_string(),
        };

        let rendered = match self {
            FieldType::Integer => format!("{:0>width$}", text, width = width),
            FieldType::AlphaNum | FieldType::Date | FieldType::Time => {
                format!("{:<width$}", text, width = width)
            }
            FieldType::BlankPaddedRoutingNumber | FieldType::ImmediateOrigin => {
                format!("{:>width$}", text, width = width)
            }
        };
        Ok(rendered)
    }
}

fn validate_integer(raw: &str, width: usize) -> std::result::Result<FieldValue, FieldError> {
    let trimmed = raw.trim();
    if let Some(rest) = trimmed.strip_prefix('-') {
        if all_digits(rest) {
            return Err(FieldError::Negative);
        }
    }
    if !all_digits(trimmed) {
        return Err(FieldError::NotNumeric);
    }

    let significant = trimmed.trim_start_matches('0');
    let digits = if significant.is_empty() {
        "0"
    } else {
        significant
    };
    if digits.len() > width {
        return Err(FieldError::Overflow {
            digits: digits.len(),
            width,
        });
    }
    Ok(FieldValue::Text(digits.to_string()))
}

fn validate_alphanum(
    raw: &str,
    width: usize,
    mode: ValidationMode,
) -> std::result::Result<FieldValue, FieldError> {
    let kept = match mode {
        ValidationMode::Strict => {
            if let Some(bad) = raw.chars().find(|c| !is_alphanum_char(*c)) {
                return Err(FieldError::InvalidCharacter(bad));
            }
            raw.to_string()
        }
        ValidationMode::Permissive => {
            let kept: String = raw.chars().filter(|c| is_alphanum_char(*c)).collect();
            if kept.len() != raw.len() {
                warn!("Stripping disallowed characters from {:?}: {:?}", raw, kept);
            }
            kept
        }
    };

    let text = kept.trim_end();
    if text.len() <= width {
        return Ok(FieldValue::Text(text.to_string()));
    }

    match mode {
        ValidationMode::Strict => Err(FieldError::TooLong {
            len: text.len(),
            width,
        }),
        ValidationMode::Permissive => {
            // ASCII only, so byte slicing is char slicing
            let truncated = &text[..width];
            warn!(
                "Truncating {:?} to {} characters: {:?}",
                text, width, truncated
            );
            Ok(FieldValue::Text(truncated.to_string()))
        }
    }
}

fn validate_routing(
    raw: &str,
    width: usize,
    mode: ValidationMode,
) -> std::result::Result<FieldValue, FieldError> {
    let trimmed = raw.trim();
    if !all_digits(trimmed) {
        return Err(FieldError::InvalidRouting);
    }

    let digits = match (trimmed.len(), mode) {
        (ROUTING_DIGITS, _) => trimmed.to_string(),
        (len, ValidationMode::Permissive) if len < ROUTING_DIGITS => {
            format!("{:0>width$}", trimmed, width = ROUTING_DIGITS)
        }
        _ => return Err(FieldError::InvalidRouting),
    };

    if ROUTING_DIGITS > width {
        return Err(FieldError::Overflow {
            digits: ROUTING_DIGITS,
            width,
        });
    }
    Ok(FieldValue::Text(digits))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::{Clock, FixedClock};

    fn encode(ty: FieldType, raw: &str, width: usize) -> String {
        let value = ty.validate(raw, width, ValidationMode::Permissive).unwrap();
        ty.render(&value, width).unwrap()
    }

    #[test]
    fn test_integer_zero_pads_on_the_left() {
        assert_eq!(encode(FieldType::Integer, "300", 10), "0000000300");
        assert_eq!(encode(FieldType::Integer, "1", 2), "01");
        assert_eq!(encode(FieldType::Integer, "000042", 3), "042");
        assert_eq!(encode(FieldType::Integer, "0", 4), "0000");
    }

    #[test]
    fn test_integer_overflow_is_an_error_not_a_truncation() {
        let err = FieldType::Integer
            .validate("12345", 4, ValidationMode::Permissive)
            .unwrap_err();
        assert_eq!(err, FieldError::Overflow { digits: 5, width: 4 });
    }

    #[test]
    fn test_integer_rejects_negative_and_non_numeric() {
        let mode = ValidationMode::Permissive;
        assert_eq!(
            FieldType::Integer.validate("-5", 10, mode),
            Err(FieldError::Negative)
        );
        assert_eq!(
            FieldType::Integer.validate("abc", 10, mode),
            Err(FieldError::NotNumeric)
        );
        assert_eq!(
            FieldType::Integer.validate("12.5", 10, mode),
            Err(FieldError::NotNumeric)
        );
    }

    #[test]
    fn test_alphanum_pads_and_truncates() {
        assert_eq!(encode(FieldType::AlphaNum, "YOUR BANK", 12), "YOUR BANK   ");
        assert_eq!(encode(FieldType::AlphaNum, "Where's my money", 5), "Where");
        assert_eq!(encode(FieldType::AlphaNum, "", 3), "   ");
    }

    #[test]
    fn test_alphanum_strict_mode_rejects_overflow() {
        let err = FieldType::AlphaNum
            .validate("TOO LONG", 3, ValidationMode::Strict)
            .unwrap_err();
        assert_eq!(err, FieldError::TooLong { len: 8, width: 3 });
    }

    #[test]
    fn test_alphanum_strips_disallowed_characters() {
        assert_eq!(encode(FieldType::AlphaNum, "ZOË", 5), "ZO   ");
        assert_eq!(encode(FieldType::AlphaNum, "tab\there", 8), "tabhere ");
        assert_eq!(
            encode(FieldType::AlphaNum, "Smith, J. #42 (A&B) O'Neil-Lee", 30),
            "Smith J. 42 (A&B) O'Neil-Lee  "
        );
        assert_eq!(encode(FieldType::AlphaNum, "café au lait!", 12), "caf au lait ");
    }

    #[test]
    fn test_alphanum_strict_mode_rejects_disallowed_characters() {
        let strict = ValidationMode::Strict;
        assert_eq!(
            FieldType::AlphaNum.validate("ZOË", 20, strict),
            Err(FieldError::InvalidCharacter('Ë'))
        );
        assert_eq!(
            FieldType::AlphaNum.validate("Smith, J.", 20, strict),
            Err(FieldError::InvalidCharacter(','))
        );
        assert_eq!(
            FieldType::AlphaNum.validate("O'Neil-Lee (A&B) 4.2/3", 30, strict),
            Ok(FieldValue::Text("O'Neil-Lee (A&B) 4.2/3".to_string()))
        );
    }

    #[test]
    fn test_routing_number_blank_padding() {
        let ty = FieldType::BlankPaddedRoutingNumber;
        assert_eq!(encode(ty, "123456789", 10), " 123456789");
        assert_eq!(encode(ty, " 123456789", 10), " 123456789");
        assert_eq!(encode(ty, "123456789", 9), "123456789");
    }

    #[test]
    fn test_routing_number_too_long_fails() {
        let ty = FieldType::BlankPaddedRoutingNumber;
        for mode in [ValidationMode::Permissive, ValidationMode::Strict] {
            assert_eq!(
                ty.validate("1234567890", 10, mode),
                Err(FieldError::InvalidRouting)
            );
        }
        assert_eq!(
            ty.validate("12345678A", 10, ValidationMode::Permissive),
            Err(FieldError::InvalidRouting)
        );
    }

    #[test]
    fn test_short_routing_number_is_zero_padded_only_when_permissive() {
        let ty = FieldType::BlankPaddedRoutingNumber;
        assert_eq!(encode(ty, "12345678", 10), " 012345678");
        assert_eq!(
            ty.validate("12345678", 10, ValidationMode::Strict),
            Err(FieldError::InvalidRouting)
        );
    }

    #[test]
    fn test_immediate_origin_accepts_ten_digit_identifier() {
        let ty = FieldType::ImmediateOrigin;
        assert_eq!(encode(ty, "1234567890", 10), "1234567890");
        assert_eq!(encode(ty, "123456780", 10), " 123456780");
        assert_eq!(
            ty.validate("12345678901", 10, ValidationMode::Permissive),
            Err(FieldError::InvalidOrigin)
        );
    }

    #[test]
    fn test_date_renders_literal_and_defers_symbolic() {
        assert_eq!(encode(FieldType::Date, "221105", 6), "221105");
        assert_eq!(encode(FieldType::Date, "2014-09-03", 6), "140903");

        let value = FieldType::Date
            .validate("tomorrow", 6, ValidationMode::Permissive)
            .unwrap();
        assert!(value.is_symbolic());
        assert_eq!(
            FieldType::Date.render(&value, 6),
            Err(FieldError::Unresolved("tomorrow".to_string()))
        );

        let now = FixedClock::at(2014, 12, 31, 23, 0).unwrap().now();
        let resolved = value.resolve(now);
        assert_eq!(FieldType::Date.render(&resolved, 6).unwrap(), "150101");
    }

    #[test]
    fn test_blank_values_render_per_type() {
        assert_eq!(FieldType::Integer.render(&FieldValue::Blank, 3).unwrap(), "000");
        assert_eq!(FieldType::Date.render(&FieldValue::Blank, 6).unwrap(), "      ");
        assert_eq!(FieldType::Time.render(&FieldValue::Blank, 4).unwrap(), "    ");
    }
}
