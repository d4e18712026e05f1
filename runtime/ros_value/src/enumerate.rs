//! The Enumerate capability.
//!
//! Enumeration is lazy and finite: iterators index into shared heap
//! payloads instead of snapshotting them. Enumerating the same value twice
//! yields a fresh iterator each time, so `foreach` bodies that enumerate
//! the sequence again start from the beginning.

use crate::descriptor::Descriptor;
use crate::errors::{self, EvalResult};
use crate::heap::Heap;
use crate::value::Value;

/// Iterator over a value's elements.
#[derive(Clone, Debug)]
pub enum ValueIter {
    /// String characters.
    Chars { text: Heap<String>, offset: usize },
    /// List elements.
    List { items: Heap<Vec<Value>>, index: usize },
}

impl Iterator for ValueIter {
    type Item = Value;

    fn next(&mut self) -> Option<Value> {
        match self {
            ValueIter::Chars { text, offset } => {
                let c = text[*offset..].chars().next()?;
                *offset += c.len_utf8();
                Some(Value::Char(c))
            }
            ValueIter::List { items, index } => {
                let item = items.get(*index)?.clone();
                *index += 1;
                Some(item)
            }
        }
    }
}

pub(crate) fn enumerate(desc: &Descriptor, value: &Value) -> EvalResult<ValueIter> {
    match value {
        Value::Str(s) => Ok(ValueIter::Chars {
            text: s.clone(),
            offset: 0,
        }),
        Value::List(items) => Ok(ValueIter::List {
            items: items.clone(),
            index: 0,
        }),
        _ => Err(errors::not_enumerable(desc.name())),
    }
}
