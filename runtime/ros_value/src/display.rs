//! The Display capability.
//!
//! General display (no spec) renders the shortest round-trippable form:
//! `20.0` shows as `20`, booleans as the literal words, `null` as `null`.
//! Spec-driven formats follow the standard numeric spec letters parsed by
//! `ros_ir::format_spec`; the culture only affects the separators of the
//! rendered text, never which spec letters exist.

use crate::culture::Culture;
use crate::descriptor::Descriptor;
use crate::errors::{self, EvalResult};
use crate::value::Value;
use ros_ir::{ParsedFormatSpec, SpecKind};

pub(crate) fn to_display(
    _desc: &Descriptor,
    value: &Value,
    spec: Option<&ParsedFormatSpec>,
    culture: Culture,
) -> EvalResult<String> {
    match spec {
        None => Ok(general(value, culture)),
        Some(spec) if spec.kind == SpecKind::General => Ok(general(value, culture)),
        Some(spec) => with_spec(value, spec, culture),
    }
}

fn general(value: &Value, culture: Culture) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => if *b { "true" } else { "false" }.to_string(),
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Float(f) => culture.localize_decimal(f.to_string()),
        Value::Char(c) => c.to_string(),
        Value::Str(s) => s.to_string(),
        Value::List(items) => {
            let mut out = String::from("[");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    out.push_str(", ");
                }
                out.push_str(&general(item, culture));
            }
            out.push(']');
            out
        }
        Value::Function(_) => "function".to_string(),
        Value::Builtin(b) => b.name().to_string(),
        Value::Bound(b) => b.name.to_string(),
        Value::Native(n) => n.descriptor.name.to_string(),
    }
}

fn with_spec(value: &Value, spec: &ParsedFormatSpec, culture: Culture) -> EvalResult<String> {
    match spec.kind {
        SpecKind::General => Ok(general(value, culture)),
        SpecKind::Hex { upper } => hex(value, spec.precision, upper),
        _ => {
            let Some(f) = value.as_float() else {
                return Err(errors::format_error(format!(
                    "numeric format spec applied to {}",
                    value.type_name()
                )));
            };
            Ok(match spec.kind {
                SpecKind::Fixed => {
                    let p = spec.precision.unwrap_or(2);
                    culture.localize_decimal(format!("{f:.p$}"))
                }
                SpecKind::Scientific { upper } => scientific(f, spec.precision.unwrap_or(6), upper, culture),
                SpecKind::Currency => currency(f, spec.precision.unwrap_or(2), culture),
                SpecKind::Number => grouped(f, spec.precision.unwrap_or(2), culture),
                SpecKind::Percent => {
                    let p = spec.precision.unwrap_or(2);
                    let body = grouped(f * 100.0, p, culture);
                    format!("{body} %")
                }
                SpecKind::General | SpecKind::Hex { .. } => unreachable!(),
            })
        }
    }
}

#[allow(clippy::cast_sign_loss, reason = "hex shows the two's-complement bit pattern")]
fn hex(value: &Value, precision: Option<usize>, upper: bool) -> EvalResult<String> {
    let bits = match value {
        Value::Int(n) => *n as u64,
        Value::UInt(n) => *n,
        Value::Char(c) => u64::from(u32::from(*c)),
        _ => {
            return Err(errors::format_error(format!(
                "hex format spec applied to {}",
                value.type_name()
            )))
        }
    };
    let width = precision.unwrap_or(0);
    Ok(if upper {
        format!("{bits:0width$X}")
    } else {
        format!("{bits:0width$x}")
    })
}

/// `E`/`e`: mantissa with fixed precision, three-digit signed exponent
/// (`3.141593E+000`).
fn scientific(f: f64, precision: usize, upper: bool, culture: Culture) -> String {
    let rendered = format!("{f:.precision$e}");
    let marker = if upper { 'E' } else { 'e' };
    match rendered.rsplit_once('e') {
        Some((mantissa, exp)) => {
            let (sign, digits) = match exp.strip_prefix('-') {
                Some(rest) => ('-', rest),
                None => ('+', exp),
            };
            culture.localize_decimal(format!("{mantissa}{marker}{sign}{digits:0>3}"))
        }
        None => rendered,
    }
}

/// Fixed-point with group separators in the integer part.
fn grouped(f: f64, precision: usize, culture: Culture) -> String {
    let rendered = format!("{:.precision$}", f.abs());
    let (int_part, frac_part) = match rendered.split_once('.') {
        Some((i, r)) => (i, Some(r)),
        None => (rendered.as_str(), None),
    };
    let mut out = String::new();
    if f.is_sign_negative() && rendered.bytes().any(|b| (b'1'..=b'9').contains(&b)) {
        out.push('-');
    }
    let digits = int_part.len();
    for (i, c) in int_part.chars().enumerate() {
        if i > 0 && (digits - i) % 3 == 0 {
            out.push(culture.group_separator());
        }
        out.push(c);
    }
    if let Some(frac) = frac_part {
        out.push(culture.decimal_separator());
        out.push_str(frac);
    }
    out
}

/// `C`: currency symbol prefix, parenthesized negatives.
fn currency(f: f64, precision: usize, culture: Culture) -> String {
    let body = grouped(f.abs(), precision, culture);
    let symbol = culture.currency_symbol();
    if f < 0.0 {
        format!("({symbol}{body})")
    } else {
        format!("{symbol}{body}")
    }
}
