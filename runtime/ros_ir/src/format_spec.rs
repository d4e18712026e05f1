//! Format specification parser for `{index:spec}` placeholders.
//!
//! Parses the standard numeric format spec grammar scripts can attach to
//! a placeholder: a single letter plus optional precision digits
//! (`F5`, `C`, `X8`, `E2`, ...). The parsed result ([`ParsedFormatSpec`])
//! is consumed by the value formatter when a placeholder carries a spec.

use std::fmt;

/// Parsed format specification.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ParsedFormatSpec {
    /// Formatting mode.
    pub kind: SpecKind,
    /// Precision digits following the letter (`F5` → 5).
    pub precision: Option<usize>,
}

impl ParsedFormatSpec {
    /// General formatting with no precision (`{0}` without a spec).
    pub const GENERAL: Self = Self {
        kind: SpecKind::General,
        precision: None,
    };
}

/// Formatting mode selected by the spec letter.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SpecKind {
    /// `G`/`g`: shortest round-trippable form (default).
    General,
    /// `F`/`f`: fixed-point; precision is the decimal-place count.
    Fixed,
    /// `E`/`e`: scientific notation; field stores whether the exponent
    /// marker is uppercase.
    Scientific { upper: bool },
    /// `C`/`c`: currency with group separators and two default decimals.
    Currency,
    /// `N`/`n`: number with group separators.
    Number,
    /// `X`/`x`: hexadecimal, integers only; field stores digit case.
    Hex { upper: bool },
    /// `P`/`p`: percentage (multiply by 100, append `%`).
    Percent,
}

/// Error produced for an unrecognized or malformed spec.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SpecError {
    /// The offending spec text.
    pub spec: String,
}

impl fmt::Display for SpecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unrecognized format spec '{}'", self.spec)
    }
}

impl std::error::Error for SpecError {}

/// Parse a format spec string.
///
/// The empty spec parses as [`ParsedFormatSpec::GENERAL`]. Anything other
/// than a known letter plus optional digits is an error; the formatter
/// surfaces it as a `FormatError`.
pub fn parse_format_spec(spec: &str) -> Result<ParsedFormatSpec, SpecError> {
    let mut chars = spec.chars();
    let Some(letter) = chars.next() else {
        return Ok(ParsedFormatSpec::GENERAL);
    };

    let kind = match letter {
        'G' | 'g' => SpecKind::General,
        'F' | 'f' => SpecKind::Fixed,
        'E' => SpecKind::Scientific { upper: true },
        'e' => SpecKind::Scientific { upper: false },
        'C' | 'c' => SpecKind::Currency,
        'N' | 'n' => SpecKind::Number,
        'X' => SpecKind::Hex { upper: true },
        'x' => SpecKind::Hex { upper: false },
        'P' | 'p' => SpecKind::Percent,
        _ => {
            return Err(SpecError {
                spec: spec.to_string(),
            })
        }
    };

    let digits = chars.as_str();
    let precision = if digits.is_empty() {
        None
    } else {
        match digits.parse::<usize>() {
            Ok(p) => Some(p),
            Err(_) => {
                return Err(SpecError {
                    spec: spec.to_string(),
                })
            }
        }
    };

    Ok(ParsedFormatSpec { kind, precision })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_spec_is_general() {
        assert_eq!(parse_format_spec(""), Ok(ParsedFormatSpec::GENERAL));
    }

    #[test]
    fn fixed_with_precision() {
        assert_eq!(
            parse_format_spec("F5"),
            Ok(ParsedFormatSpec {
                kind: SpecKind::Fixed,
                precision: Some(5),
            })
        );
    }

    #[test]
    fn currency_without_precision() {
        assert_eq!(
            parse_format_spec("C"),
            Ok(ParsedFormatSpec {
                kind: SpecKind::Currency,
                precision: None,
            })
        );
    }

    #[test]
    fn hex_case_is_preserved() {
        assert_eq!(
            parse_format_spec("x8").map(|s| s.kind),
            Ok(SpecKind::Hex { upper: false })
        );
        assert_eq!(
            parse_format_spec("X").map(|s| s.kind),
            Ok(SpecKind::Hex { upper: true })
        );
    }

    #[test]
    fn unknown_letter_is_rejected() {
        assert!(parse_format_spec("Q").is_err());
    }

    #[test]
    fn trailing_garbage_is_rejected() {
        assert!(parse_format_spec("F5x").is_err());
    }
}
