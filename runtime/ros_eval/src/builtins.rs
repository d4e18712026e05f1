//! Runtime-provided callables: `print`, `string` and `string.format`.
//!
//! `print` and `string` share one lenient formatting path: no arguments
//! renders empty, a single argument renders verbatim, and with several
//! arguments the first is treated as a template only when it actually looks
//! like one, otherwise everything joins with `", "`. `string.format` is the
//! strict path: the first argument is always a template (escapes included)
//! and any malformed placeholder fails with `FormatError`.
//!
//! The lenient/strict split matters for one shared case: a first argument
//! with a malformed opener (`"hello {0"`) is detected as a template by the
//! lenient path too, so it fails there rather than silently joining.

use crate::print_handler::SharedPrintHandler;
use ros_value::errors;
use ros_value::{format_template, is_format_string, Builtin, Culture, EvalResult, Kind, Value};

pub(crate) fn call_builtin(
    builtin: Builtin,
    args: &[Value],
    culture: Culture,
    printer: &SharedPrintHandler,
) -> EvalResult {
    match builtin {
        Builtin::Print => {
            let text = render_lenient(args, culture)?;
            printer.borrow_mut().print(&text);
            Ok(Value::string(text))
        }
        Builtin::StringType => render_lenient(args, culture).map(Value::string),
        Builtin::StringFormat => render_strict(args, culture).map(Value::string),
    }
}

fn display(value: &Value, culture: Culture) -> EvalResult<String> {
    value.descriptor().to_display(value, None, culture)
}

/// The `print`/`string` formatting rules.
pub(crate) fn render_lenient(args: &[Value], culture: Culture) -> EvalResult<String> {
    match args {
        [] => Ok(String::new()),
        [single] => display(single, culture),
        [first, rest @ ..] => {
            if let Some(template) = first.as_str() {
                if is_format_string(template) {
                    return format_template(template, rest, culture);
                }
            }
            let mut out = display(first, culture)?;
            for arg in rest {
                out.push_str(", ");
                out.push_str(&display(arg, culture)?);
            }
            Ok(out)
        }
    }
}

/// The `string.format` rules: first argument is always the template.
pub(crate) fn render_strict(args: &[Value], culture: Culture) -> EvalResult<String> {
    let [first, rest @ ..] = args else {
        return Err(errors::arity_mismatch("string.format", 1, 0));
    };
    let template = match first.as_str() {
        Some(s) => s.to_string(),
        None => {
            let converted = first.descriptor().convert(first, Kind::Str, culture)?;
            converted
                .as_str()
                .map(str::to_string)
                .unwrap_or_default()
        }
    };
    format_template(&template, rest, culture)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lenient(args: &[Value]) -> EvalResult<String> {
        render_lenient(args, Culture::Invariant)
    }

    fn strict(args: &[Value]) -> EvalResult<String> {
        render_strict(args, Culture::Invariant)
    }

    #[test]
    fn no_arguments_renders_empty() {
        assert_eq!(lenient(&[]), Ok(String::new()));
    }

    #[test]
    fn single_argument_renders_verbatim() {
        // escapes are NOT processed on the single-argument path
        assert_eq!(lenient(&[Value::string("{{}}")]), Ok("{{}}".to_string()));
        assert_eq!(lenient(&[Value::Float(20.0)]), Ok("20".to_string()));
    }

    #[test]
    fn template_first_argument_formats() {
        assert_eq!(
            lenient(&[Value::string("{0} {1}"), Value::Int(1), Value::Bool(true)]),
            Ok("1 true".to_string())
        );
    }

    #[test]
    fn non_template_arguments_join() {
        assert_eq!(
            lenient(&[Value::string("a"), Value::Int(2), Value::Bool(false)]),
            Ok("a, 2, false".to_string())
        );
    }

    #[test]
    fn malformed_template_fails_even_leniently() {
        let err = lenient(&[Value::string("hello {0"), Value::Int(42)]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn strict_processes_escapes_on_a_single_argument() {
        assert_eq!(strict(&[Value::string("{{}}")]), Ok("{}".to_string()));
    }

    #[test]
    fn strict_requires_an_argument() {
        assert!(strict(&[]).is_err());
    }

    #[test]
    fn strict_rejects_out_of_range_placeholder() {
        let err = strict(&[Value::string("{1}"), Value::Int(1)]).unwrap_err();
        assert!(err.is_format_error());
    }

    #[test]
    fn strict_allows_unreferenced_extras() {
        assert_eq!(
            strict(&[Value::string("{0}"), Value::Int(1), Value::Int(2)]),
            Ok("1".to_string())
        );
    }
}
