//! Statement and expression nodes.
//!
//! The runtime does not parse script source; the host (or a test) hands it a
//! finished statement tree. Statement bodies are `Arc<[Stmt]>` (`Block`) so
//! that resumable execution frames can reference a block without cloning it.
//!
//! Single-statement inline bodies and indented multi-line bodies both arrive
//! here as plain blocks; `else if` chains arrive as `If { arms }` with one
//! arm per condition, so short-circuiting is structural.

use crate::{BinaryOp, Name, UnaryOp};
use std::sync::Arc;

/// A shared, immutable statement block.
pub type Block = Arc<[Stmt]>;

/// Build a [`Block`] from a statement list.
pub fn block(stmts: Vec<Stmt>) -> Block {
    stmts.into()
}

/// A function definition: named declaration or closure literal.
///
/// The body is shared; the defining scope chain is captured at evaluation
/// time (by the evaluator, not here).
#[derive(Clone, Debug, PartialEq)]
pub struct FunctionDef {
    /// Function name (`Name::EMPTY` for anonymous closures).
    pub name: Name,
    /// Parameter names in declaration order.
    pub params: Vec<Name>,
    /// Function body.
    pub body: Block,
}

/// Expression node.
#[derive(Clone, Debug, PartialEq)]
pub enum Expr {
    /// `null` literal.
    Null,
    /// Boolean literal.
    Bool(bool),
    /// Signed integer literal.
    Int(i64),
    /// Unsigned integer literal.
    UInt(u64),
    /// Floating-point literal.
    Float(f64),
    /// Character literal.
    Char(char),
    /// String literal.
    Str(String),
    /// List literal `[a, b, c]`.
    List(Vec<Expr>),
    /// Variable reference.
    Ident(Name),
    /// Member access `object.name`.
    Member { object: Box<Expr>, name: Name },
    /// Indexed access `object[index]`.
    Index { object: Box<Expr>, index: Box<Expr> },
    /// Call `callee(args...)`.
    Call { callee: Box<Expr>, args: Vec<Expr> },
    /// Binary operation.
    Binary {
        op: BinaryOp,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    /// Unary operation.
    Unary { op: UnaryOp, expr: Box<Expr> },
    /// Assignment `name = value` or compound `name op= value`.
    ///
    /// Evaluates to the assigned value, so `(counter = counter + 1) > 5`
    /// expresses a pre-increment-and-compare.
    Assign {
        target: Name,
        op: Option<BinaryOp>,
        value: Box<Expr>,
    },
    /// Closure literal.
    Function(Arc<FunctionDef>),
}

impl Expr {
    /// Member access helper.
    pub fn member(object: Expr, name: Name) -> Expr {
        Expr::Member {
            object: Box::new(object),
            name,
        }
    }

    /// Call helper.
    pub fn call(callee: Expr, args: Vec<Expr>) -> Expr {
        Expr::Call {
            callee: Box::new(callee),
            args,
        }
    }

    /// Binary operation helper.
    pub fn binary(op: BinaryOp, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Binary {
            op,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    /// Unary operation helper.
    pub fn unary(op: UnaryOp, expr: Expr) -> Expr {
        Expr::Unary {
            op,
            expr: Box::new(expr),
        }
    }

    /// Plain assignment helper.
    pub fn assign(target: Name, value: Expr) -> Expr {
        Expr::Assign {
            target,
            op: None,
            value: Box::new(value),
        }
    }

    /// Compound assignment helper (`target op= value`).
    pub fn assign_op(target: Name, op: BinaryOp, value: Expr) -> Expr {
        Expr::Assign {
            target,
            op: Some(op),
            value: Box::new(value),
        }
    }
}

/// Statement node.
#[derive(Clone, Debug, PartialEq)]
pub enum Stmt {
    /// Expression statement; its value becomes the pending script result.
    Expr(Expr),
    /// Variable declaration `var name = init`.
    Var { name: Name, init: Option<Expr> },
    /// `if`/`else if`/`else` chain: one arm per condition, first true arm
    /// wins.
    If {
        arms: Vec<(Expr, Block)>,
        else_body: Option<Block>,
    },
    /// `unless C: B`: if-not with optional else.
    Unless {
        cond: Expr,
        body: Block,
        else_body: Option<Block>,
    },
    /// `while C: B`: pre-checked loop.
    While { cond: Expr, body: Block },
    /// `until C: B`: `while !C: B`.
    Until { cond: Expr, body: Block },
    /// `do B while C`: post-checked loop, at least one iteration.
    DoWhile { body: Block, cond: Expr },
    /// `do B until C`: post-checked loop, at least one iteration.
    DoUntil { body: Block, cond: Expr },
    /// `for init; cond; step; body`. `continue` still runs `step`.
    For {
        init: Option<Box<Stmt>>,
        cond: Option<Expr>,
        step: Option<Expr>,
        body: Block,
    },
    /// `for|foreach var in seq: body`, one element per iteration from the
    /// sequence's enumerator.
    ForEach { var: Name, seq: Expr, body: Block },
    /// Nested plain block.
    Block(Block),
    /// `return [value]`.
    Return(Option<Expr>),
    /// `break` out of the nearest loop.
    Break,
    /// `continue` the nearest loop.
    Continue,
    /// `yield`: suspend until the next host tick.
    Yield,
    /// `wait [seconds]`: yield with an implicit resume condition.
    Wait(Option<Expr>),
    /// Named function declaration.
    Function(Arc<FunctionDef>),
}
