//! The Member and Index capabilities.
//!
//! Named members resolve through descriptor-owned [`Props`] tables; method
//! members bind to their receiver on access, so `"abc".substring` is itself
//! a value. String members come in short and long spellings
//! (`substring`/`substr`, `startsWith`/`starts`, ...) and lookup is
//! ASCII-case-insensitive throughout.
//!
//! The string code unit is `char` everywhere: `length`, indexing and
//! enumeration all count the same units, so `s[i]` is valid for every
//! `i < s.length` even in non-BMP text.

use crate::culture::Culture;
use crate::descriptor::Descriptor;
use crate::errors::{self, EvalError, EvalResult};
use crate::props::{PropEntry, Props};
use crate::value::{Builtin, Kind, Value};
use std::cmp::Ordering;
use std::rc::Rc;

pub(crate) fn get_member(desc: &Descriptor, receiver: &Value, name: &str) -> EvalResult {
    match desc {
        Descriptor::Str => {
            let Some(prop) = STRING_PROPS.with(|p| p.find_instance(name).cloned()) else {
                return Err(errors::no_such_member(name, "string"));
            };
            resolve(prop.name, prop.entry, receiver)
        }
        Descriptor::List => {
            if name.eq_ignore_ascii_case("length") || name.eq_ignore_ascii_case("count") {
                if let Value::List(items) = receiver {
                    return Ok(Value::Int(saturating_len(items.len())));
                }
            }
            Err(errors::no_such_member(name, "list"))
        }
        Descriptor::Builtin => match receiver {
            Value::Builtin(Builtin::StringType) => {
                let Some(prop) = STRING_PROPS.with(|p| p.find_static(name).cloned()) else {
                    return Err(errors::no_such_member(name, "string"));
                };
                resolve(prop.name, prop.entry, receiver)
            }
            _ => Err(errors::no_such_member(name, "builtin")),
        },
        Descriptor::Native(native_desc) => {
            let Some(prop) = native_desc.props.find_instance(name).cloned() else {
                return Err(errors::no_such_member(name, "native"));
            };
            resolve(prop.name, prop.entry, receiver)
        }
        _ => Err(errors::no_such_member(name, desc.name())),
    }
}

fn resolve(name: Rc<str>, entry: PropEntry, receiver: &Value) -> EvalResult {
    match entry {
        PropEntry::Value(v) => Ok(v),
        PropEntry::Getter(getter) => getter(receiver),
        PropEntry::Method(func) => Ok(Value::bound(name, func, receiver.clone())),
    }
}

pub(crate) fn index(desc: &Descriptor, receiver: &Value, index: &Value) -> EvalResult {
    match (desc, receiver) {
        (Descriptor::Str, Value::Str(s)) => {
            let idx = index_value(index)?;
            let count = s.chars().count();
            usize::try_from(idx)
                .ok()
                .and_then(|i| s.chars().nth(i))
                .map(Value::Char)
                .ok_or_else(|| errors::index_out_of_range(idx, count))
        }
        (Descriptor::List, Value::List(items)) => {
            let idx = index_value(index)?;
            usize::try_from(idx)
                .ok()
                .and_then(|i| items.get(i))
                .cloned()
                .ok_or_else(|| errors::index_out_of_range(idx, items.len()))
        }
        _ => Err(EvalError::new(format!("{} is not indexable", desc.name()))),
    }
}

fn index_value(index: &Value) -> EvalResult<i64> {
    index
        .as_int()
        .ok_or_else(|| EvalError::new(format!("{} is not a valid index", index.type_name())))
}

// String member table

thread_local! {
    static STRING_PROPS: Props = string_props();
}

fn string_props() -> Props {
    Props::new()
        .instance("length", PropEntry::Getter(Rc::new(str_length)))
        .alias("count", "length")
        .instance("substring", PropEntry::Method(Rc::new(str_substring)))
        .alias("substr", "substring")
        .instance("indexOf", PropEntry::Method(Rc::new(str_index_of)))
        .instance("contains", PropEntry::Method(Rc::new(str_contains)))
        .instance("startsWith", PropEntry::Method(Rc::new(str_starts_with)))
        .alias("starts", "startsWith")
        .instance("endsWith", PropEntry::Method(Rc::new(str_ends_with)))
        .alias("ends", "endsWith")
        .instance("toUpper", PropEntry::Method(Rc::new(str_to_upper)))
        .alias("upper", "toUpper")
        .instance("toLower", PropEntry::Method(Rc::new(str_to_lower)))
        .alias("lower", "toLower")
        .instance("trim", PropEntry::Method(Rc::new(str_trim)))
        .instance("compare", PropEntry::Method(Rc::new(str_compare)))
        .alias("compareTo", "compare")
        .instance("equals", PropEntry::Method(Rc::new(str_equals)))
        .stat(
            "format",
            PropEntry::Value(Value::Builtin(Builtin::StringFormat)),
        )
}

fn receiver_str(receiver: &Value) -> EvalResult<&str> {
    receiver
        .as_str()
        .ok_or_else(|| errors::no_such_member("string method", receiver.type_name()))
}

/// One argument coerced to text through its descriptor.
fn arg_str(args: &[Value], at: usize, method: &str) -> EvalResult<String> {
    let arg = args
        .get(at)
        .ok_or_else(|| errors::arity_mismatch(method, at + 1, args.len()))?;
    let converted = arg.descriptor().convert(arg, Kind::Str, Culture::Invariant)?;
    match converted.as_str() {
        Some(s) => Ok(s.to_string()),
        None => Err(errors::no_conversion(arg.type_name(), "string")),
    }
}

fn arg_int(args: &[Value], at: usize, method: &str) -> EvalResult<i64> {
    let arg = args
        .get(at)
        .ok_or_else(|| errors::arity_mismatch(method, at + 1, args.len()))?;
    arg.as_int()
        .ok_or_else(|| errors::no_conversion(arg.type_name(), "int"))
}

fn saturating_len(len: usize) -> i64 {
    i64::try_from(len).unwrap_or(i64::MAX)
}

fn str_length(receiver: &Value) -> EvalResult {
    let s = receiver_str(receiver)?;
    Ok(Value::Int(saturating_len(s.chars().count())))
}

/// `substring(start)` or `substring(start, length)`, char-indexed.
fn str_substring(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let count = s.chars().count();
    let start = arg_int(args, 0, "substring")?;
    let start_idx = usize::try_from(start)
        .ok()
        .filter(|i| *i <= count)
        .ok_or_else(|| errors::index_out_of_range(start, count))?;
    let taken: String = match args.get(1) {
        None => s.chars().skip(start_idx).collect(),
        Some(len_arg) => {
            let len = len_arg
                .as_int()
                .ok_or_else(|| errors::no_conversion(len_arg.type_name(), "int"))?;
            let take = usize::try_from(len)
                .ok()
                .filter(|n| start_idx + n <= count)
                .ok_or_else(|| errors::index_out_of_range(len, count - start_idx))?;
            s.chars().skip(start_idx).take(take).collect()
        }
    };
    Ok(Value::string(taken))
}

fn str_index_of(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let needle = arg_str(args, 0, "indexOf")?;
    let found = position_ci(s, &needle);
    Ok(Value::Int(found.map_or(-1, saturating_len)))
}

fn str_contains(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let needle = arg_str(args, 0, "contains")?;
    Ok(Value::Bool(position_ci(s, &needle).is_some()))
}

fn str_starts_with(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let prefix = arg_str(args, 0, "startsWith")?;
    Ok(Value::Bool(fold(s).starts_with(&fold(&prefix))))
}

fn str_ends_with(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let suffix = arg_str(args, 0, "endsWith")?;
    Ok(Value::Bool(fold(s).ends_with(&fold(&suffix))))
}

fn str_to_upper(receiver: &Value, _args: &[Value]) -> EvalResult {
    Ok(Value::string(receiver_str(receiver)?.to_uppercase()))
}

fn str_to_lower(receiver: &Value, _args: &[Value]) -> EvalResult {
    Ok(Value::string(receiver_str(receiver)?.to_lowercase()))
}

fn str_trim(receiver: &Value, _args: &[Value]) -> EvalResult {
    Ok(Value::string(receiver_str(receiver)?.trim()))
}

/// `compare(other)`: -1, 0 or 1, ordinal case-insensitive.
fn str_compare(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let other = arg_str(args, 0, "compare")?;
    Ok(Value::Int(match fold(s).cmp(&fold(&other)) {
        Ordering::Less => -1,
        Ordering::Equal => 0,
        Ordering::Greater => 1,
    }))
}

fn str_equals(receiver: &Value, args: &[Value]) -> EvalResult {
    let s = receiver_str(receiver)?;
    let other = arg_str(args, 0, "equals")?;
    Ok(Value::Bool(fold(s) == fold(&other)))
}

/// Case fold used by the case-insensitive string members.
fn fold(s: &str) -> String {
    s.chars().flat_map(char::to_lowercase).collect()
}

/// Char position of the first case-insensitive occurrence of `needle`.
fn position_ci(haystack: &str, needle: &str) -> Option<usize> {
    if needle.is_empty() {
        return Some(0);
    }
    let count = haystack.chars().count();
    let needle_len = needle.chars().count();
    (0..=count.saturating_sub(needle_len)).find(|&start| {
        let window: String = haystack.chars().skip(start).take(needle_len).collect();
        fold(&window) == fold(needle)
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn member(receiver: &Value, name: &str) -> EvalResult {
        receiver.descriptor().get_member(receiver, name)
    }

    fn call_method(receiver: &Value, name: &str, args: &[Value]) -> EvalResult {
        let bound = member(receiver, name)?;
        match bound
            .descriptor()
            .call(&bound, args)?
        {
            Some(result) => Ok(result),
            None => Err(errors::not_callable(bound.type_name())),
        }
    }

    #[test]
    fn length_counts_chars() {
        assert_eq!(member(&Value::string("hello"), "length"), Ok(Value::Int(5)));
        assert_eq!(member(&Value::string("\u{1f680}"), "Length"), Ok(Value::Int(1)));
        assert_eq!(member(&Value::string("ab"), "count"), Ok(Value::Int(2)));
    }

    #[test]
    fn length_and_index_agree_on_non_bmp_text() {
        let s = Value::string("a\u{1f680}b");
        assert_eq!(member(&s, "length"), Ok(Value::Int(3)));
        assert_eq!(
            s.descriptor().index(&s, &Value::Int(1)),
            Ok(Value::Char('\u{1f680}'))
        );
        assert_eq!(s.descriptor().index(&s, &Value::Int(2)), Ok(Value::Char('b')));
        assert!(s.descriptor().index(&s, &Value::Int(3)).is_err());
    }

    #[test]
    fn substring_with_and_without_length() {
        let s = Value::string("hello world");
        assert_eq!(
            call_method(&s, "substring", &[Value::Int(6)]),
            Ok(Value::string("world"))
        );
        assert_eq!(
            call_method(&s, "substr", &[Value::Int(0), Value::Int(5)]),
            Ok(Value::string("hello"))
        );
    }

    #[test]
    fn substring_out_of_range_fails() {
        let s = Value::string("abc");
        assert!(call_method(&s, "substring", &[Value::Int(9)]).is_err());
        assert!(call_method(&s, "substring", &[Value::Int(1), Value::Int(9)]).is_err());
    }

    #[test]
    fn string_predicates_ignore_case() {
        let s = Value::string("Hello World");
        assert_eq!(
            call_method(&s, "startsWith", &[Value::string("hello")]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call_method(&s, "ends", &[Value::string("WORLD")]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call_method(&s, "contains", &[Value::string("lo wo")]),
            Ok(Value::Bool(true))
        );
        assert_eq!(
            call_method(&s, "equals", &[Value::string("hello world")]),
            Ok(Value::Bool(true))
        );
    }

    #[test]
    fn compare_returns_sign() {
        let s = Value::string("apple");
        assert_eq!(
            call_method(&s, "compare", &[Value::string("Apple")]),
            Ok(Value::Int(0))
        );
        assert_eq!(
            call_method(&s, "compareTo", &[Value::string("banana")]),
            Ok(Value::Int(-1))
        );
    }

    #[test]
    fn unknown_member_is_an_error() {
        assert!(member(&Value::string("x"), "frobnicate").is_err());
        assert!(member(&Value::Int(1), "length").is_err());
    }

    #[test]
    fn string_type_exposes_format() {
        let string_type = Value::Builtin(Builtin::StringType);
        assert_eq!(
            member(&string_type, "Format"),
            Ok(Value::Builtin(Builtin::StringFormat))
        );
        // `format` is static: instances do not see it, the type does not
        // see instance members
        assert!(member(&Value::string("x"), "format").is_err());
        assert!(member(&string_type, "length").is_err());
    }

    #[test]
    fn string_index_yields_chars() {
        let s = Value::string("abc");
        assert_eq!(s.descriptor().index(&s, &Value::Int(1)), Ok(Value::Char('b')));
        assert!(s.descriptor().index(&s, &Value::Int(3)).is_err());
        assert!(s.descriptor().index(&s, &Value::Int(-1)).is_err());
    }

    #[test]
    fn list_index_and_length() {
        let l = Value::list(vec![Value::Int(10), Value::Int(20)]);
        assert_eq!(l.descriptor().index(&l, &Value::Int(1)), Ok(Value::Int(20)));
        assert_eq!(member(&l, "length"), Ok(Value::Int(2)));
        assert!(l.descriptor().index(&l, &Value::Int(2)).is_err());
    }
}
