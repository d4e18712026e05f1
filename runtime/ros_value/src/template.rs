//! Curly-brace template engine.
//!
//! Templates use `{index}` or `{index:spec}` placeholders with `{{` and
//! `}}` escapes. Two entry points: [`is_format_string`] decides whether a
//! first argument should be treated as a template at all (lenient callers
//! fall back to joining when it says no), and [`format_template`] performs
//! the strict substitution, failing with `FormatError` on any malformed
//! placeholder or out-of-range index. Extra arguments never referenced by
//! the template are not an error.

use crate::culture::Culture;
use crate::errors::{self, EvalResult};
use crate::value::Value;
use ros_ir::parse_format_spec;

/// Heuristic template detection: does `text` contain a placeholder opener?
///
/// A lone `{` not followed by another `{` marks a template. Escaped braces
/// (`{{`) do not count, so `"{{literal}}"` joins like plain text while
/// `"{0}"` formats. Note a malformed opener (e.g. a trailing `"{"`) still
/// counts, so lenient callers detect it and then fail in strict
/// substitution rather than silently joining.
pub fn is_format_string(text: &str) -> bool {
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == '{' {
            if chars.peek() == Some(&'{') {
                chars.next();
            } else {
                return true;
            }
        }
    }
    false
}

/// Substitute `{index[:spec]}` placeholders in `template` from `args`.
///
/// Strict: unmatched `{`, a stray `}` outside `}}`, an empty or
/// non-numeric index, an index at or beyond `args.len()` and an
/// unparseable spec all fail with `FormatError`.
pub fn format_template(template: &str, args: &[Value], culture: Culture) -> EvalResult<String> {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }
                let mut index_text = String::new();
                let mut spec_text: Option<String> = None;
                let mut closed = false;
                while let Some(inner) = chars.next() {
                    match inner {
                        '}' => {
                            closed = true;
                            break;
                        }
                        ':' if spec_text.is_none() => {
                            spec_text = Some(String::new());
                        }
                        _ => match &mut spec_text {
                            Some(spec) => spec.push(inner),
                            None => index_text.push(inner),
                        },
                    }
                }
                if !closed {
                    return Err(errors::format_error("unmatched '{' in format string"));
                }
                let index: usize = index_text
                    .parse()
                    .map_err(|_| errors::format_error(format!("bad placeholder index '{index_text}'")))?;
                let arg = args
                    .get(index)
                    .ok_or_else(|| {
                        errors::format_error(format!(
                            "placeholder {{{index}}} but only {} argument(s)",
                            args.len()
                        ))
                    })?;
                let spec = match spec_text.as_deref() {
                    None | Some("") => None,
                    Some(raw) => Some(
                        parse_format_spec(raw)
                            .map_err(|e| errors::format_error(e.to_string()))?,
                    ),
                };
                out.push_str(&arg.descriptor().to_display(arg, spec.as_ref(), culture)?);
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(errors::format_error("stray '}' in format string"));
                }
            }
            _ => out.push(c),
        }
    }
    Ok(out)
}
