//! ROS Value - tagged values and descriptor dispatch.
//!
//! Every operation on a [`Value`] (conversion, binary/unary operators,
//! member lookup, indexing, calling, display formatting, enumeration) is
//! resolved through the value's [`Descriptor`], the flat polymorphic set
//! that replaces classical inheritance for built-in types. Callers never
//! type-switch on values directly.
//!
//! # Arc Enforcement
//!
//! Heap-backed variants go through factory methods on `Value`
//! (`Value::string`, `Value::list`); `Heap::new` is crate-private, so
//! external code cannot construct heap values by hand.
//!
//! # Thread Model
//!
//! Values are single-threaded by design: function values keep their defining
//! scope chain alive through `Rc`, matching the runtime's cooperative
//! single-threaded execution model.

mod binary;
mod convert;
mod culture;
mod descriptor;
mod display;
mod enumerate;
pub mod errors;
mod heap;
mod members;
mod native;
mod props;
mod scope;
mod template;
mod value;

pub use culture::Culture;
pub use descriptor::{evaluate_binary, evaluate_unary, Descriptor};
pub use enumerate::ValueIter;
pub use errors::{EvalError, EvalErrorKind, EvalResult};
pub use heap::Heap;
pub use native::{NativeDescriptor, NativeHook, NativeRegistry, NativeValue, RegistryError};
pub use props::{GetterFn, MethodFn, Prop, PropEntry, Props};
pub use scope::{AssignError, LocalScope, Mutability, Scope};
pub use template::{format_template, is_format_string};
pub use value::{BoundMethod, Builtin, FunctionValue, Kind, Value};
