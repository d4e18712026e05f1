//! Named member tables.
//!
//! A `Props` table is the shared, ordered member list a descriptor consults
//! for named access: one row per member, alias rows pointing back at the
//! primary row, and instance members kept separate from static (type-level)
//! members. Tables are built once at startup and never mutated afterwards.
//!
//! Member name comparison is ASCII-case-insensitive, an ordinal
//! ignore-case lookup independent of host locale.

use crate::errors::EvalResult;
use crate::value::Value;
use std::rc::Rc;

/// A method implementation: receives the receiver and the argument slice.
pub type MethodFn = Rc<dyn Fn(&Value, &[Value]) -> EvalResult>;

/// A computed member implementation: receives the receiver.
pub type GetterFn = Rc<dyn Fn(&Value) -> EvalResult>;

/// What a member row resolves to.
#[derive(Clone)]
pub enum PropEntry {
    /// A constant value shared by all receivers.
    Value(Value),
    /// A value computed from the receiver (`length`).
    Getter(GetterFn),
    /// A callable bound to the receiver on access (`substring`).
    Method(MethodFn),
}

/// A single named member row.
#[derive(Clone)]
pub struct Prop {
    /// Primary member name.
    pub name: Rc<str>,
    /// What the member resolves to.
    pub entry: PropEntry,
}

/// Ordered member table with aliases and separate instance/static rows.
#[derive(Clone, Default)]
pub struct Props {
    instance: Vec<Prop>,
    instance_aliases: Vec<(Rc<str>, usize)>,
    statics: Vec<Prop>,
    static_aliases: Vec<(Rc<str>, usize)>,
}

impl Props {
    /// Create an empty table.
    pub fn new() -> Self {
        Props::default()
    }

    /// Append an instance member row.
    pub fn instance(mut self, name: &str, entry: PropEntry) -> Self {
        self.instance.push(Prop {
            name: Rc::from(name),
            entry,
        });
        self
    }

    /// Append a static (type-level) member row.
    pub fn stat(mut self, name: &str, entry: PropEntry) -> Self {
        self.statics.push(Prop {
            name: Rc::from(name),
            entry,
        });
        self
    }

    /// Alias `alias` to the existing instance member `target`.
    ///
    /// Silently ignored if `target` does not exist; tables are built from
    /// literals at startup, so a missing target is a programming error
    /// caught by the descriptor tests.
    pub fn alias(mut self, alias: &str, target: &str) -> Self {
        if let Some(idx) = self
            .instance
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(target))
        {
            self.instance_aliases.push((Rc::from(alias), idx));
        }
        self
    }

    /// Alias `alias` to the existing static member `target`.
    pub fn static_alias(mut self, alias: &str, target: &str) -> Self {
        if let Some(idx) = self
            .statics
            .iter()
            .position(|p| p.name.eq_ignore_ascii_case(target))
        {
            self.static_aliases.push((Rc::from(alias), idx));
        }
        self
    }

    /// Look up an instance member (case-insensitive, aliases included).
    pub fn find_instance(&self, name: &str) -> Option<&Prop> {
        if let Some(prop) = self
            .instance
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Some(prop);
        }
        self.instance_aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .and_then(|(_, idx)| self.instance.get(*idx))
    }

    /// Look up a static member (case-insensitive, aliases included).
    pub fn find_static(&self, name: &str) -> Option<&Prop> {
        if let Some(prop) = self
            .statics
            .iter()
            .find(|p| p.name.eq_ignore_ascii_case(name))
        {
            return Some(prop);
        }
        self.static_aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(name))
            .and_then(|(_, idx)| self.statics.get(*idx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Props {
        Props::new()
            .instance("length", PropEntry::Value(Value::Int(0)))
            .instance("substring", PropEntry::Value(Value::Int(1)))
            .alias("count", "length")
            .alias("substr", "substring")
            .stat("format", PropEntry::Value(Value::Int(2)))
    }

    #[test]
    fn primary_names_resolve() {
        assert!(table().find_instance("length").is_some());
        assert!(table().find_static("format").is_some());
    }

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(table().find_instance("LENGTH").is_some());
        assert!(table().find_instance("Count").is_some());
    }

    #[test]
    fn aliases_share_the_primary_row() {
        let t = table();
        let primary = t.find_instance("substring").map(|p| p.name.clone());
        let alias = t.find_instance("substr").map(|p| p.name.clone());
        assert_eq!(primary, alias);
    }

    #[test]
    fn instance_and_static_tables_are_separate() {
        let t = table();
        assert!(t.find_instance("format").is_none());
        assert!(t.find_static("length").is_none());
    }
}
