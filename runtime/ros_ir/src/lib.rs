//! ROS IR - program representation for the ROS runtime.
//!
//! This crate contains the data structures the executor consumes:
//! - `Name` for interned identifiers
//! - `Stmt`/`Expr` nodes (parsing is an upstream concern; hosts hand the
//!   runtime an already-built statement tree)
//! - `BinaryOp`/`UnaryOp` operator enums
//! - `ParsedFormatSpec` for `{index:spec}` placeholder suffixes
//!
//! # Design Philosophy
//!
//! - **Intern identifiers**: strings → `Name(u32)` for O(1) equality
//! - **Share blocks**: statement bodies are `Arc<[Stmt]>` so resumable
//!   execution frames can hold them without cloning the tree

pub mod ast;
mod format_spec;
mod interner;
mod name;
mod op;

pub use ast::{Block, Expr, FunctionDef, Stmt, block};
pub use format_spec::{parse_format_spec, ParsedFormatSpec, SpecError, SpecKind};
pub use interner::{SharedInterner, StringInterner};
pub use name::Name;
pub use op::{BinaryOp, UnaryOp};
