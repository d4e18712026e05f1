//! Execution frames.
//!
//! A frame is one suspended position inside a statement block: the shared
//! block, the index of the next statement and the scope the block runs in.
//! The frame stack is what makes `yield`/`wait` cheap: suspending is just
//! returning from the stepper with the stack left in place.

use ros_ir::{Block, Expr, Name};
use ros_value::{LocalScope, Scope, ValueIter};

/// One level of the execution stack.
pub(crate) struct Frame {
    /// Statements this frame executes.
    pub block: Block,
    /// Index of the next statement to execute.
    pub index: usize,
    /// Scope the statements run in.
    pub scope: LocalScope<Scope>,
    /// What kind of frame this is, for exit unwinding.
    pub kind: FrameKind,
}

impl Frame {
    pub fn new(block: Block, scope: LocalScope<Scope>, kind: FrameKind) -> Self {
        Frame {
            block,
            index: 0,
            scope,
            kind,
        }
    }
}

/// Frame role during unwinding.
pub(crate) enum FrameKind {
    /// Plain nested block or conditional branch body.
    Block,
    /// Loop body; catches `break`/`continue` and re-checks its condition
    /// when the body completes.
    Loop(LoopKind),
    /// Function body entered from statement position; catches `return` and
    /// delivers the value to `dest`.
    Call { dest: CallDest },
}

/// Loop continuation data.
pub(crate) enum LoopKind {
    /// `while`/`until`/`do-while`/`do-until`: re-check the condition after
    /// each pass (`negate` flips it for the `until` forms).
    Cond { cond: Expr, negate: bool },
    /// Three-clause `for`: run `step`, then re-check `cond` (absent means
    /// loop forever).
    For {
        cond: Option<Expr>,
        step: Option<Expr>,
    },
    /// `foreach`: pull the next element and rebind the loop variable.
    ForEach { var: Name, iter: ValueIter },
}

/// Where a framed call's return value goes.
#[derive(Copy, Clone, Debug)]
pub(crate) enum CallDest {
    /// Expression statement: becomes the pending script result.
    Result,
    /// `var name = f()`: defines `name` in the calling scope.
    Define(Name),
    /// `name = f()`: assigns through the calling scope chain.
    Assign(Name),
    /// `return f()`: the value keeps returning through the next call frame.
    Return,
}
