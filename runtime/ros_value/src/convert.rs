//! The Convert capability.
//!
//! String-to-number parsing is culture-aware: the invariant culture
//! accepts a `,` by reading it as `.`; a decimal-comma culture reads `,`
//! as the decimal separator. Malformed literals always fail with
//! `ParseError`; conversion never silently yields zero.

use crate::culture::Culture;
use crate::descriptor::Descriptor;
use crate::errors::{self, EvalResult};
use crate::value::{Kind, Value};

pub(crate) fn convert(
    desc: &Descriptor,
    value: &Value,
    target: Kind,
    culture: Culture,
) -> EvalResult {
    if value.kind() == target {
        return Ok(value.clone());
    }
    match desc {
        Descriptor::Str => convert_str(value, target, culture),
        Descriptor::Bool => convert_bool(value, target, culture),
        Descriptor::Int | Descriptor::UInt | Descriptor::Float => {
            convert_numeric(value, target, culture)
        }
        Descriptor::Char => convert_char(value, target, culture),
        Descriptor::Null => match target {
            Kind::Str => Ok(Value::string("null")),
            Kind::Bool => Ok(Value::Bool(false)),
            _ => Err(errors::no_conversion("null", kind_name(target))),
        },
        _ => match target {
            Kind::Str => value
                .descriptor()
                .to_display(value, None, culture)
                .map(Value::string),
            _ => Err(errors::no_conversion(value.type_name(), kind_name(target))),
        },
    }
}

fn convert_str(value: &Value, target: Kind, culture: Culture) -> EvalResult {
    let s = value.as_str().unwrap_or_default();
    match target {
        Kind::Str => Ok(value.clone()),
        Kind::Char => Ok(Value::Char(s.chars().next().unwrap_or('\0'))),
        Kind::Int => {
            let normalized = culture.normalize_for_parse(s);
            normalized
                .trim()
                .parse::<i64>()
                .map(Value::Int)
                .map_err(|_| errors::parse_error(s, "int"))
        }
        Kind::UInt => {
            let normalized = culture.normalize_for_parse(s);
            normalized
                .trim()
                .parse::<u64>()
                .map(Value::UInt)
                .map_err(|_| errors::parse_error(s, "uint"))
        }
        Kind::Float => {
            let normalized = culture.normalize_for_parse(s);
            normalized
                .trim()
                .parse::<f64>()
                .map(Value::Float)
                .map_err(|_| errors::parse_error(s, "double"))
        }
        Kind::Bool => Ok(Value::Bool(str_truth(s))),
        _ => Err(errors::no_conversion("string", kind_name(target))),
    }
}

/// First-significant-letter truth rule: the first non-whitespace,
/// non-symbol char decides. t/y/a/e/p (true/yes/ano/enable/povol) or a
/// non-zero digit reads as true.
fn str_truth(s: &str) -> bool {
    for c in s.chars() {
        if c.is_whitespace() || c == '+' || c == '-' {
            continue;
        }
        return matches!(
            c.to_ascii_lowercase(),
            't' | 'y' | 'a' | 'e' | 'p' | '1'..='9'
        );
    }
    false
}

fn convert_bool(value: &Value, target: Kind, _culture: Culture) -> EvalResult {
    let b = matches!(value, Value::Bool(true));
    match target {
        Kind::Bool => Ok(value.clone()),
        Kind::Int => Ok(Value::Int(i64::from(b))),
        Kind::UInt => Ok(Value::UInt(u64::from(b))),
        Kind::Float => Ok(Value::Float(if b { 1.0 } else { 0.0 })),
        Kind::Str => Ok(Value::string(if b { "true" } else { "false" })),
        _ => Err(errors::no_conversion("bool", kind_name(target))),
    }
}

#[allow(
    clippy::cast_precision_loss,
    clippy::cast_possible_truncation,
    reason = "script numerics follow double-based narrowing semantics"
)]
fn convert_numeric(value: &Value, target: Kind, culture: Culture) -> EvalResult {
    match target {
        Kind::Int => match value {
            Value::Int(n) => Ok(Value::Int(*n)),
            Value::UInt(n) => i64::try_from(*n)
                .map(Value::Int)
                .map_err(|_| errors::integer_overflow("conversion")),
            Value::Float(f) => Ok(Value::Int(*f as i64)),
            _ => Err(errors::no_conversion(value.type_name(), "int")),
        },
        Kind::UInt => match value {
            Value::UInt(n) => Ok(Value::UInt(*n)),
            Value::Int(n) => u64::try_from(*n)
                .map(Value::UInt)
                .map_err(|_| errors::integer_overflow("conversion")),
            Value::Float(f) => Ok(Value::UInt(*f as u64)),
            _ => Err(errors::no_conversion(value.type_name(), "uint")),
        },
        Kind::Float => value
            .as_float()
            .map(Value::Float)
            .ok_or_else(|| errors::no_conversion(value.type_name(), "double")),
        Kind::Bool => Ok(Value::Bool(value.is_truthy())),
        Kind::Char => {
            let code = value
                .as_int()
                .and_then(|n| u32::try_from(n).ok())
                .and_then(char::from_u32);
            code.map(Value::Char)
                .ok_or_else(|| errors::no_conversion(value.type_name(), "char"))
        }
        Kind::Str => value
            .descriptor()
            .to_display(value, None, culture)
            .map(Value::string),
        _ => Err(errors::no_conversion(value.type_name(), kind_name(target))),
    }
}

fn convert_char(value: &Value, target: Kind, culture: Culture) -> EvalResult {
    let c = match value {
        Value::Char(c) => *c,
        _ => return Err(errors::no_conversion(value.type_name(), kind_name(target))),
    };
    match target {
        Kind::Char => Ok(value.clone()),
        Kind::Str => Ok(Value::string(c.to_string())),
        Kind::Int => Ok(Value::Int(i64::from(u32::from(c)))),
        Kind::UInt => Ok(Value::UInt(u64::from(u32::from(c)))),
        Kind::Float => Ok(Value::Float(f64::from(u32::from(c)))),
        Kind::Bool => Ok(Value::Bool(c != '\0')),
        _ => {
            let _ = culture;
            Err(errors::no_conversion("char", kind_name(target)))
        }
    }
}

pub(crate) fn kind_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Null => "null",
        Kind::Bool => "bool",
        Kind::Int => "int",
        Kind::UInt => "uint",
        Kind::Float => "double",
        Kind::Char => "char",
        Kind::Str => "string",
        Kind::List => "list",
        Kind::Function => "function",
        Kind::Builtin => "builtin",
        Kind::Native => "native",
    }
}
