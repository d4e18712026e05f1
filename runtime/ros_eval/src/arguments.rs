//! Evaluated call arguments.
//!
//! A small inline buffer: almost every script call passes at most a few
//! arguments, so the common case never allocates.

use ros_value::Value;
use smallvec::SmallVec;

/// Argument list for a single call, already evaluated left to right.
#[derive(Clone, Debug, Default)]
pub struct Arguments {
    values: SmallVec<[Value; 4]>,
}

impl Arguments {
    /// Empty argument list.
    pub fn new() -> Self {
        Arguments::default()
    }

    /// Append one evaluated argument.
    pub fn push(&mut self, value: Value) {
        self.values.push(value);
    }

    /// Number of arguments.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Returns `true` when no arguments were passed.
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Argument at `index`, if present.
    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// All arguments as a slice.
    pub fn as_slice(&self) -> &[Value] {
        &self.values
    }
}

impl FromIterator<Value> for Arguments {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Arguments {
            values: iter.into_iter().collect(),
        }
    }
}

impl From<Vec<Value>> for Arguments {
    fn from(values: Vec<Value>) -> Self {
        Arguments {
            values: SmallVec::from_vec(values),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn collects_in_order() {
        let args: Arguments = [Value::Int(1), Value::Int(2)].into_iter().collect();
        assert_eq!(args.len(), 2);
        assert_eq!(args.get(1), Some(&Value::Int(2)));
        assert_eq!(args.get(2), None);
    }
}
