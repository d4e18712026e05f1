//! Runtime error types and factory constructors.
//!
//! `EvalErrorKind` provides the typed taxonomy (parse, format, index, type,
//! control-flow, plus execution-level kinds). Factory functions (e.g.
//! [`format_error`], [`index_out_of_range`]) are the public construction
//! API: they populate both `kind` and `message`, so diagnostics can match
//! on kind while hosts log the message.
//!
//! Errors raised inside an expression propagate unchanged to the host
//! boundary; the owning process transitions to a terminal failed state and
//! is never silently retried.

use crate::value::Value;
use ros_ir::BinaryOp;
use std::fmt;

/// Result of evaluation.
pub type EvalResult<T = Value> = Result<T, EvalError>;

/// Typed error category.
#[derive(Clone, Debug, PartialEq)]
pub enum EvalErrorKind {
    /// Malformed literal during conversion (never silently zero).
    ParseError {
        literal: String,
        target: &'static str,
    },
    /// Malformed template or out-of-range placeholder in a strict
    /// formatting path.
    FormatError { reason: String },
    /// Out-of-range indexed access.
    IndexError { index: i64, len: usize },
    /// Operation unsupported by the operand's descriptor.
    InvalidBinaryOp {
        op: BinaryOp,
        lhs: &'static str,
        rhs: &'static str,
    },
    /// Unary operation unsupported by the operand's descriptor.
    InvalidUnaryOp {
        op: &'static str,
        operand: &'static str,
    },
    /// Member not exposed by the operand's descriptor.
    NoSuchMember {
        member: String,
        type_name: &'static str,
    },
    /// Value cannot be called.
    NotCallable { type_name: &'static str },
    /// Value cannot be enumerated.
    NotEnumerable { type_name: &'static str },
    /// Conversion unsupported by the operand's descriptor.
    NoConversion {
        from: &'static str,
        to: &'static str,
    },
    /// `break`/`continue` outside a loop, `return` used illegally, or
    /// `yield` in a context that cannot suspend.
    ControlFlowError { construct: &'static str },
    /// Name not bound in any visible scope.
    UndefinedVariable { name: String },
    /// Assignment to an immutable binding.
    ImmutableBinding { name: String },
    /// Integer division or modulo by zero.
    DivisionByZero,
    /// Integer arithmetic overflow.
    Overflow { op: &'static str },
    /// Wrong number of call arguments.
    ArityMismatch {
        name: String,
        expected: usize,
        got: usize,
    },
    /// The host requested cooperative termination.
    Terminated,
    /// Free-form error.
    Custom { message: String },
}

impl fmt::Display for EvalErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EvalErrorKind::ParseError { literal, target } => {
                write!(f, "cannot parse '{literal}' as {target}")
            }
            EvalErrorKind::FormatError { reason } => {
                write!(f, "format error: {reason}")
            }
            EvalErrorKind::IndexError { index, len } => {
                write!(f, "index {index} out of range (length {len})")
            }
            EvalErrorKind::InvalidBinaryOp { op, lhs, rhs } => {
                write!(f, "operator '{op}' not supported between {lhs} and {rhs}")
            }
            EvalErrorKind::InvalidUnaryOp { op, operand } => {
                write!(f, "unary '{op}' not supported on {operand}")
            }
            EvalErrorKind::NoSuchMember { member, type_name } => {
                write!(f, "{type_name} has no member '{member}'")
            }
            EvalErrorKind::NotCallable { type_name } => {
                write!(f, "{type_name} is not callable")
            }
            EvalErrorKind::NotEnumerable { type_name } => {
                write!(f, "{type_name} is not enumerable")
            }
            EvalErrorKind::NoConversion { from, to } => {
                write!(f, "no conversion from {from} to {to}")
            }
            EvalErrorKind::ControlFlowError { construct } => {
                write!(f, "'{construct}' is not valid here")
            }
            EvalErrorKind::UndefinedVariable { name } => {
                write!(f, "undefined variable '{name}'")
            }
            EvalErrorKind::ImmutableBinding { name } => {
                write!(f, "cannot assign to immutable binding '{name}'")
            }
            EvalErrorKind::DivisionByZero => write!(f, "division by zero"),
            EvalErrorKind::Overflow { op } => write!(f, "integer overflow in {op}"),
            EvalErrorKind::ArityMismatch {
                name,
                expected,
                got,
            } => {
                write!(f, "{name} expects {expected} argument(s), got {got}")
            }
            EvalErrorKind::Terminated => write!(f, "execution terminated by host"),
            EvalErrorKind::Custom { message } => f.write_str(message),
        }
    }
}

/// Evaluation error: structured kind plus rendered message.
#[derive(Clone, Debug, PartialEq)]
pub struct EvalError {
    /// Structured category for programmatic matching.
    pub kind: EvalErrorKind,
    /// Human-readable message (equals `kind.to_string()` for factory-made
    /// errors).
    pub message: String,
}

impl EvalError {
    /// Create an error with just a message (`Custom` kind).
    ///
    /// Prefer the specific factory functions when a structured kind exists.
    pub fn new(message: impl Into<String>) -> Self {
        let msg = message.into();
        Self {
            kind: EvalErrorKind::Custom {
                message: msg.clone(),
            },
            message: msg,
        }
    }

    fn from_kind(kind: EvalErrorKind) -> Self {
        let message = kind.to_string();
        Self { kind, message }
    }

    /// Returns `true` for format errors (used by the strict-vs-lenient
    /// formatting tests).
    pub fn is_format_error(&self) -> bool {
        matches!(self.kind, EvalErrorKind::FormatError { .. })
    }
}

impl fmt::Display for EvalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for EvalError {}

// Factory constructors

/// Malformed literal during conversion.
pub fn parse_error(literal: impl Into<String>, target: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ParseError {
        literal: literal.into(),
        target,
    })
}

/// Malformed template or out-of-range placeholder.
pub fn format_error(reason: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::FormatError {
        reason: reason.into(),
    })
}

/// Out-of-range indexed access.
pub fn index_out_of_range(index: i64, len: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::IndexError { index, len })
}

/// Binary operator unsupported for the operand pair.
pub fn invalid_binary_op(op: BinaryOp, lhs: &'static str, rhs: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidBinaryOp { op, lhs, rhs })
}

/// Unary operator unsupported for the operand.
pub fn invalid_unary_op(op: &'static str, operand: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::InvalidUnaryOp { op, operand })
}

/// Member lookup failed.
pub fn no_such_member(member: impl Into<String>, type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoSuchMember {
        member: member.into(),
        type_name,
    })
}

/// Call on a non-callable value.
pub fn not_callable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotCallable { type_name })
}

/// Enumeration of a non-enumerable value.
pub fn not_enumerable(type_name: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NotEnumerable { type_name })
}

/// Conversion declined by the descriptor.
pub fn no_conversion(from: &'static str, to: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::NoConversion { from, to })
}

/// `break`/`continue`/`return`/`yield` in an invalid context.
pub fn control_flow_error(construct: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ControlFlowError { construct })
}

/// Name not bound in any visible scope.
pub fn undefined_variable(name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::UndefinedVariable { name: name.into() })
}

/// Assignment to an immutable binding.
pub fn immutable_binding(name: impl Into<String>) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ImmutableBinding { name: name.into() })
}

/// Integer division or modulo by zero.
pub fn division_by_zero() -> EvalError {
    EvalError::from_kind(EvalErrorKind::DivisionByZero)
}

/// Integer arithmetic overflow.
pub fn integer_overflow(op: &'static str) -> EvalError {
    EvalError::from_kind(EvalErrorKind::Overflow { op })
}

/// Wrong argument count.
pub fn arity_mismatch(name: impl Into<String>, expected: usize, got: usize) -> EvalError {
    EvalError::from_kind(EvalErrorKind::ArityMismatch {
        name: name.into(),
        expected,
        got,
    })
}

/// Host-requested cooperative termination.
pub fn terminated() -> EvalError {
    EvalError::from_kind(EvalErrorKind::Terminated)
}
