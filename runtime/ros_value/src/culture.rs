//! Explicit formatting culture.
//!
//! The runtime never reads the host process locale; callers thread a
//! `Culture` through conversion and formatting explicitly. The invariant
//! culture uses `.` as the decimal separator regardless of where the host
//! runs.

use std::borrow::Cow;

/// Formatting/parsing culture for numeric text.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum Culture {
    /// `.` decimal separator, `,` group separator, `¤` currency symbol.
    #[default]
    Invariant,
    /// `,` decimal separator, `.` group separator (continental European
    /// style); currency symbol unchanged.
    DecimalComma,
}

impl Culture {
    /// Decimal separator used when rendering numbers.
    pub fn decimal_separator(self) -> char {
        match self {
            Culture::Invariant => '.',
            Culture::DecimalComma => ',',
        }
    }

    /// Group separator used by grouped formats (`N`, `C`).
    pub fn group_separator(self) -> char {
        match self {
            Culture::Invariant => ',',
            Culture::DecimalComma => '.',
        }
    }

    /// Generic currency symbol; the runtime is host-agnostic, so the
    /// international sign is used for every culture.
    pub fn currency_symbol(self) -> &'static str {
        "\u{a4}"
    }

    /// Normalize a numeric literal for parsing.
    ///
    /// Under the invariant culture a `,` is accepted and read as `.`;
    /// under a decimal-comma culture `,` is the decimal separator and
    /// group dots are stripped.
    pub fn normalize_for_parse(self, literal: &str) -> Cow<'_, str> {
        match self {
            Culture::Invariant => {
                if literal.contains(',') {
                    Cow::Owned(literal.replace(',', "."))
                } else {
                    Cow::Borrowed(literal)
                }
            }
            Culture::DecimalComma => {
                if literal.contains(',') || literal.contains('.') {
                    Cow::Owned(literal.replace('.', "").replace(',', "."))
                } else {
                    Cow::Borrowed(literal)
                }
            }
        }
    }

    /// Re-render a dot-decimal numeric string in this culture.
    pub fn localize_decimal(self, rendered: String) -> String {
        match self {
            Culture::Invariant => rendered,
            Culture::DecimalComma => rendered.replace('.', ","),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn invariant_accepts_comma_as_decimal() {
        assert_eq!(Culture::Invariant.normalize_for_parse("3,14"), "3.14");
        assert_eq!(Culture::Invariant.normalize_for_parse("3.14"), "3.14");
    }

    #[test]
    fn decimal_comma_swaps_separators() {
        assert_eq!(Culture::DecimalComma.normalize_for_parse("1.234,5"), "1234.5");
    }

    #[test]
    fn localize_decimal_rewrites_dot() {
        assert_eq!(
            Culture::DecimalComma.localize_decimal("3.14".to_string()),
            "3,14"
        );
        assert_eq!(
            Culture::Invariant.localize_decimal("3.14".to_string()),
            "3.14"
        );
    }
}
