//! The statement stepper.
//!
//! Execution is a loop over an explicit frame stack: one statement per
//! step, so the engine can stop between any two statements. `yield` and
//! `wait` suspend by returning with the stack intact; the countdown budget
//! forces the same suspension on scripts that never yield, which is what
//! keeps a hostile `while true` loop from stalling the host.
//!
//! Expressions are evaluated recursively. A call sitting directly in
//! statement position (`f()`, `var x = f()`, `x = f()`, `return f()`) runs
//! the function body on the shared frame stack, so it may suspend; a call
//! buried inside a larger expression runs to completion recursively, and a
//! `yield` reached that way is a control-flow error rather than a silent
//! busy-wait.

use crate::arguments::Arguments;
use crate::builtins;
use crate::frame::{CallDest, Frame, FrameKind, LoopKind};
use crate::print_handler::SharedPrintHandler;
use ros_ir::{BinaryOp, Block, Expr, Name, SharedInterner, Stmt};
use ros_value::errors::{self, EvalError, EvalResult};
use ros_value::{
    evaluate_binary, evaluate_unary, AssignError, Culture, FunctionValue, LocalScope, Mutability,
    Scope, Value,
};
use tracing::debug;

/// Why a suspended script stopped.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaitReason {
    /// `yield`: resume on the next host tick.
    Tick,
    /// `wait n`: resume once `n` seconds of host time have elapsed.
    Seconds(f64),
    /// The per-slice statement budget ran out.
    Countdown,
}

/// Control-flow signal reported to the host for the last slice.
///
/// `Break` and `Continue` never escape to the host (they fail at a call
/// or script boundary first) but scripts observe the full set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExitCode {
    /// Fell off the end of the script.
    None,
    /// A `return` reached the script boundary.
    Return,
    /// `break` consumed by a loop.
    Break,
    /// `continue` consumed by a loop.
    Continue,
    /// Suspended; the script handed control back.
    Yield,
}

/// Observable execution state.
#[derive(Clone, Debug, PartialEq)]
pub enum CoreState {
    /// No program loaded, or a program loaded but not yet started.
    Idle,
    /// Currently inside `run` (never observed between host calls).
    Running,
    /// Stopped with the frame stack intact; resumable.
    Suspended(WaitReason),
    /// Ran to the end; carries how it ended and the final script result.
    Completed { exit: ExitCode, value: Value },
    /// Terminal error state; not resumable.
    Failed(EvalError),
}

impl CoreState {
    /// Returns `true` when the script can be resumed.
    pub fn is_suspended(&self) -> bool {
        matches!(self, CoreState::Suspended(_))
    }

    /// Returns `true` when the script ran to completion.
    pub fn is_completed(&self) -> bool {
        matches!(self, CoreState::Completed { .. })
    }

    /// The exit code the host sees for this state: `Yield` while
    /// suspended, the completion exit once completed, `None` otherwise.
    pub fn exit_code(&self) -> ExitCode {
        match self {
            CoreState::Suspended(_) => ExitCode::Yield,
            CoreState::Completed { exit, .. } => *exit,
            _ => ExitCode::None,
        }
    }

    /// Returns `true` for the terminal error state.
    pub fn is_failed(&self) -> bool {
        matches!(self, CoreState::Failed(_))
    }
}

/// Outcome of executing one statement.
enum Step {
    Progress,
    Suspended(WaitReason),
    Finished(ExitCode, Value),
}

pub(crate) struct Core {
    interner: SharedInterner,
    globals: LocalScope<Scope>,
    culture: Culture,
    printer: SharedPrintHandler,
    frames: Vec<Frame>,
    result: Value,
    state: CoreState,
}

impl Core {
    pub fn new(
        interner: SharedInterner,
        globals: LocalScope<Scope>,
        culture: Culture,
        printer: SharedPrintHandler,
    ) -> Self {
        Core {
            interner,
            globals,
            culture,
            printer,
            frames: Vec::new(),
            result: Value::Null,
            state: CoreState::Idle,
        }
    }

    /// Replace any previous program with `block`, ready to run from the top.
    ///
    /// The script root scope is a child of the globals, so top-level `var`
    /// declarations do not leak into host-registered bindings.
    pub fn load(&mut self, block: Block) {
        let root = LocalScope::new(Scope::with_parent(self.globals.clone()));
        self.frames = vec![Frame::new(block, root, FrameKind::Block)];
        self.result = Value::Null;
        self.state = CoreState::Idle;
    }

    pub fn state(&self) -> &CoreState {
        &self.state
    }

    /// Move to the terminal error state, dropping all frames.
    pub fn fail(&mut self, error: EvalError) {
        self.frames.clear();
        self.state = CoreState::Failed(error);
    }

    /// Reduce a pending `wait n` by `elapsed` seconds. Returns `true` when
    /// the wait is satisfied.
    pub fn credit_elapsed(&mut self, elapsed: f64) -> bool {
        if let CoreState::Suspended(WaitReason::Seconds(remaining)) = &mut self.state {
            *remaining -= elapsed;
            *remaining <= 0.0
        } else {
            true
        }
    }

    /// Run up to `budget` statements, stopping at suspension, completion or
    /// failure.
    #[tracing::instrument(level = "trace", skip(self))]
    pub fn run(&mut self, budget: usize) {
        // terminal states stay terminal; re-running would clobber the
        // recorded exit and result
        if matches!(
            self.state,
            CoreState::Completed { .. } | CoreState::Failed(_)
        ) {
            return;
        }
        self.state = CoreState::Running;
        let mut remaining = budget;
        loop {
            if remaining == 0 {
                debug!("statement budget exhausted, forcing suspension");
                self.state = CoreState::Suspended(WaitReason::Countdown);
                return;
            }
            remaining -= 1;
            match self.step() {
                Ok(Step::Progress) => {}
                Ok(Step::Suspended(reason)) => {
                    debug!(?reason, "suspended");
                    self.state = CoreState::Suspended(reason);
                    return;
                }
                Ok(Step::Finished(exit, value)) => {
                    debug!(?exit, "completed");
                    self.state = CoreState::Completed { exit, value };
                    return;
                }
                Err(error) => {
                    debug!(%error, "failed");
                    self.fail(error);
                    return;
                }
            }
        }
    }

    // Stepping

    fn step(&mut self) -> EvalResult<Step> {
        // Settle frames whose block is exhausted before executing anything.
        loop {
            let Some(frame) = self.frames.last() else {
                return Ok(Step::Finished(ExitCode::None, self.take_result()));
            };
            if frame.index < frame.block.len() {
                break;
            }
            match &frame.kind {
                FrameKind::Block => {
                    self.frames.pop();
                }
                FrameKind::Loop(_) => return self.loop_continue(),
                FrameKind::Call { dest } => {
                    let dest = *dest;
                    self.frames.pop();
                    // falling off a function body returns null
                    return self.deliver(dest, Value::Null);
                }
            }
        }
        let (block, scope, index) = {
            let Some(frame) = self.frames.last_mut() else {
                return Ok(Step::Finished(ExitCode::None, self.take_result()));
            };
            let block = frame.block.clone();
            let scope = frame.scope.clone();
            let index = frame.index;
            frame.index += 1;
            (block, scope, index)
        };
        self.exec_stmt(&block[index], &scope)
    }

    fn take_result(&mut self) -> Value {
        std::mem::replace(&mut self.result, Value::Null)
    }

    fn exec_stmt(&mut self, stmt: &Stmt, scope: &LocalScope<Scope>) -> EvalResult<Step> {
        match stmt {
            Stmt::Expr(expr) => match expr {
                Expr::Call { callee, args } => self.stmt_call(callee, args, scope, CallDest::Result),
                Expr::Assign {
                    target,
                    op: None,
                    value,
                } => {
                    if let Expr::Call { callee, args } = value.as_ref() {
                        return self.stmt_call(callee, args, scope, CallDest::Assign(*target));
                    }
                    self.result = self.eval(expr, scope)?;
                    Ok(Step::Progress)
                }
                _ => {
                    self.result = self.eval(expr, scope)?;
                    Ok(Step::Progress)
                }
            },
            Stmt::Var { name, init } => {
                if let Some(Expr::Call { callee, args }) = init {
                    return self.stmt_call(callee, args, scope, CallDest::Define(*name));
                }
                let value = match init {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                scope.borrow_mut().define(*name, value, Mutability::Mutable);
                Ok(Step::Progress)
            }
            Stmt::Function(def) => {
                let func = Value::Function(FunctionValue::new(def.clone(), scope.clone()));
                scope.borrow_mut().define(def.name, func, Mutability::Mutable);
                Ok(Step::Progress)
            }
            Stmt::If { arms, else_body } => {
                for (cond, body) in arms {
                    if self.eval(cond, scope)?.is_truthy() {
                        self.push_block(body.clone(), scope);
                        return Ok(Step::Progress);
                    }
                }
                if let Some(body) = else_body {
                    self.push_block(body.clone(), scope);
                }
                Ok(Step::Progress)
            }
            Stmt::Unless {
                cond,
                body,
                else_body,
            } => {
                if self.eval(cond, scope)?.is_truthy() {
                    if let Some(body) = else_body {
                        self.push_block(body.clone(), scope);
                    }
                } else {
                    self.push_block(body.clone(), scope);
                }
                Ok(Step::Progress)
            }
            Stmt::While { cond, body } => self.enter_cond_loop(cond, false, true, body, scope),
            Stmt::Until { cond, body } => self.enter_cond_loop(cond, true, true, body, scope),
            Stmt::DoWhile { body, cond } => self.enter_cond_loop(cond, false, false, body, scope),
            Stmt::DoUntil { body, cond } => self.enter_cond_loop(cond, true, false, body, scope),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let loop_scope = child_scope(scope);
                if let Some(init) = init {
                    self.run_for_init(init, &loop_scope)?;
                }
                if self.for_cond(cond.as_ref(), &loop_scope)? {
                    self.frames.push(Frame::new(
                        body.clone(),
                        loop_scope,
                        FrameKind::Loop(LoopKind::For {
                            cond: cond.clone(),
                            step: step.clone(),
                        }),
                    ));
                }
                Ok(Step::Progress)
            }
            Stmt::ForEach { var, seq, body } => {
                let sequence = self.eval(seq, scope)?;
                let mut iter = sequence.descriptor().enumerate(&sequence)?;
                if let Some(item) = iter.next() {
                    let loop_scope = child_scope(scope);
                    loop_scope
                        .borrow_mut()
                        .define(*var, item, Mutability::Mutable);
                    self.frames.push(Frame::new(
                        body.clone(),
                        loop_scope,
                        FrameKind::Loop(LoopKind::ForEach { var: *var, iter }),
                    ));
                }
                Ok(Step::Progress)
            }
            Stmt::Block(body) => {
                self.push_block(body.clone(), scope);
                Ok(Step::Progress)
            }
            Stmt::Return(value) => {
                if let Some(Expr::Call { callee, args }) = value {
                    return self.stmt_call(callee, args, scope, CallDest::Return);
                }
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                self.exit_return(value)
            }
            Stmt::Break => self.exit_break(),
            Stmt::Continue => self.exit_continue(),
            Stmt::Yield => Ok(Step::Suspended(WaitReason::Tick)),
            Stmt::Wait(seconds) => match seconds {
                None => Ok(Step::Suspended(WaitReason::Tick)),
                Some(expr) => {
                    let value = self.eval(expr, scope)?;
                    let secs = value
                        .as_float()
                        .ok_or_else(|| errors::no_conversion(value.type_name(), "double"))?;
                    Ok(Step::Suspended(WaitReason::Seconds(secs)))
                }
            },
        }
    }

    fn push_block(&mut self, body: Block, scope: &LocalScope<Scope>) {
        self.frames
            .push(Frame::new(body, child_scope(scope), FrameKind::Block));
    }

    fn enter_cond_loop(
        &mut self,
        cond: &Expr,
        negate: bool,
        check_first: bool,
        body: &Block,
        scope: &LocalScope<Scope>,
    ) -> EvalResult<Step> {
        let loop_scope = child_scope(scope);
        if check_first && self.eval(cond, &loop_scope)?.is_truthy() == negate {
            return Ok(Step::Progress);
        }
        self.frames.push(Frame::new(
            body.clone(),
            loop_scope,
            FrameKind::Loop(LoopKind::Cond {
                cond: cond.clone(),
                negate,
            }),
        ));
        Ok(Step::Progress)
    }

    fn run_for_init(&mut self, init: &Stmt, scope: &LocalScope<Scope>) -> EvalResult<()> {
        match init {
            Stmt::Var { name, init } => {
                let value = match init {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                scope.borrow_mut().define(*name, value, Mutability::Mutable);
                Ok(())
            }
            Stmt::Expr(expr) => {
                self.eval(expr, scope)?;
                Ok(())
            }
            _ => Err(EvalError::new("invalid loop initializer")),
        }
    }

    fn for_cond(&mut self, cond: Option<&Expr>, scope: &LocalScope<Scope>) -> EvalResult<bool> {
        match cond {
            None => Ok(true),
            Some(expr) => Ok(self.eval(expr, scope)?.is_truthy()),
        }
    }

    /// A loop body finished (or hit `continue`): advance the loop and
    /// either restart its body or pop the frame.
    fn loop_continue(&mut self) -> EvalResult<Step> {
        let Some(mut frame) = self.frames.pop() else {
            return Ok(Step::Finished(ExitCode::None, self.take_result()));
        };
        let FrameKind::Loop(kind) = &mut frame.kind else {
            return Ok(Step::Progress);
        };
        let repeat = match kind {
            LoopKind::Cond { cond, negate } => {
                self.eval(cond, &frame.scope)?.is_truthy() != *negate
            }
            LoopKind::For { cond, step } => {
                if let Some(step) = step {
                    self.eval(step, &frame.scope)?;
                }
                self.for_cond(cond.as_ref(), &frame.scope)?
            }
            LoopKind::ForEach { var, iter } => match iter.next() {
                Some(item) => {
                    frame
                        .scope
                        .borrow_mut()
                        .define(*var, item, Mutability::Mutable);
                    true
                }
                None => false,
            },
        };
        if repeat {
            frame.index = 0;
            self.frames.push(frame);
        }
        Ok(Step::Progress)
    }

    // Exit unwinding

    fn exit_return(&mut self, value: Value) -> EvalResult<Step> {
        while let Some(frame) = self.frames.pop() {
            if let FrameKind::Call { dest } = frame.kind {
                return self.deliver(dest, value);
            }
        }
        // top-level return ends the script with the returned value
        Ok(Step::Finished(ExitCode::Return, value))
    }

    fn exit_break(&mut self) -> EvalResult<Step> {
        while let Some(frame) = self.frames.pop() {
            match frame.kind {
                FrameKind::Loop(_) => return Ok(Step::Progress),
                FrameKind::Call { .. } => return Err(errors::control_flow_error("break")),
                FrameKind::Block => {}
            }
        }
        Err(errors::control_flow_error("break"))
    }

    fn exit_continue(&mut self) -> EvalResult<Step> {
        loop {
            match self.frames.last() {
                None => return Err(errors::control_flow_error("continue")),
                Some(frame) => match &frame.kind {
                    FrameKind::Loop(_) => return self.loop_continue(),
                    FrameKind::Call { .. } => {
                        return Err(errors::control_flow_error("continue"))
                    }
                    FrameKind::Block => {
                        self.frames.pop();
                    }
                },
            }
        }
    }

    fn deliver(&mut self, dest: CallDest, value: Value) -> EvalResult<Step> {
        match dest {
            CallDest::Result => {
                self.result = value;
                Ok(Step::Progress)
            }
            CallDest::Define(name) => {
                self.current_scope()
                    .borrow_mut()
                    .define(name, value, Mutability::Mutable);
                Ok(Step::Progress)
            }
            CallDest::Assign(name) => {
                let scope = self.current_scope();
                self.assign_name(name, value.clone(), &scope)?;
                // assignment statements leave their value as the result,
                // matching the unframed path through `eval`
                self.result = value;
                Ok(Step::Progress)
            }
            CallDest::Return => self.exit_return(value),
        }
    }

    fn current_scope(&self) -> LocalScope<Scope> {
        self.frames
            .last()
            .map_or_else(|| self.globals.clone(), |frame| frame.scope.clone())
    }

    /// Framed call entry: script functions get a call frame (and may
    /// suspend from inside); everything else completes immediately.
    fn stmt_call(
        &mut self,
        callee: &Expr,
        arg_exprs: &[Expr],
        scope: &LocalScope<Scope>,
        dest: CallDest,
    ) -> EvalResult<Step> {
        let callee_val = self.eval(callee, scope)?;
        let mut args = Arguments::new();
        for expr in arg_exprs {
            args.push(self.eval(expr, scope)?);
        }
        if let Value::Function(func) = &callee_val {
            let call_scope = function_scope(func, args.as_slice());
            self.frames.push(Frame::new(
                func.def.body.clone(),
                call_scope,
                FrameKind::Call { dest },
            ));
            return Ok(Step::Progress);
        }
        let value = self.call_value(&callee_val, args.as_slice())?;
        self.deliver(dest, value)
    }

    // Recursive expression evaluation

    fn eval(&mut self, expr: &Expr, scope: &LocalScope<Scope>) -> EvalResult<Value> {
        match expr {
            Expr::Null => Ok(Value::Null),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::UInt(n) => Ok(Value::UInt(*n)),
            Expr::Float(f) => Ok(Value::Float(*f)),
            Expr::Char(c) => Ok(Value::Char(*c)),
            Expr::Str(s) => Ok(Value::string(s.clone())),
            Expr::List(items) => {
                let mut values = Vec::with_capacity(items.len());
                for item in items {
                    values.push(self.eval(item, scope)?);
                }
                Ok(Value::list(values))
            }
            Expr::Ident(name) => scope
                .borrow()
                .lookup(*name)
                .ok_or_else(|| errors::undefined_variable(self.interner.lookup(*name))),
            Expr::Member { object, name } => {
                let obj = self.eval(object, scope)?;
                let member = self.interner.lookup(*name);
                obj.descriptor().get_member(&obj, &member)
            }
            Expr::Index { object, index } => {
                let obj = self.eval(object, scope)?;
                let idx = self.eval(index, scope)?;
                obj.descriptor().index(&obj, &idx)
            }
            Expr::Call { callee, args } => {
                let callee_val = self.eval(callee, scope)?;
                let mut arg_values = Arguments::new();
                for expr in args {
                    arg_values.push(self.eval(expr, scope)?);
                }
                self.call_value(&callee_val, arg_values.as_slice())
            }
            Expr::Binary { op, lhs, rhs } => match op {
                BinaryOp::And => {
                    if !self.eval(lhs, scope)?.is_truthy() {
                        return Ok(Value::Bool(false));
                    }
                    Ok(Value::Bool(self.eval(rhs, scope)?.is_truthy()))
                }
                BinaryOp::Or => {
                    if self.eval(lhs, scope)?.is_truthy() {
                        return Ok(Value::Bool(true));
                    }
                    Ok(Value::Bool(self.eval(rhs, scope)?.is_truthy()))
                }
                _ => {
                    let left = self.eval(lhs, scope)?;
                    let right = self.eval(rhs, scope)?;
                    evaluate_binary(*op, &left, &right, self.culture)
                }
            },
            Expr::Unary { op, expr } => {
                let operand = self.eval(expr, scope)?;
                evaluate_unary(*op, &operand)
            }
            Expr::Assign { target, op, value } => {
                let rhs = self.eval(value, scope)?;
                let new_value = match op {
                    None => rhs,
                    Some(op) => {
                        let current = scope.borrow().lookup(*target).ok_or_else(|| {
                            errors::undefined_variable(self.interner.lookup(*target))
                        })?;
                        evaluate_binary(*op, &current, &rhs, self.culture)?
                    }
                };
                self.assign_name(*target, new_value.clone(), scope)?;
                Ok(new_value)
            }
            Expr::Function(def) => Ok(Value::Function(FunctionValue::new(
                def.clone(),
                scope.clone(),
            ))),
        }
    }

    /// Assignment through the scope chain; an unbound name defines a new
    /// mutable global.
    fn assign_name(
        &mut self,
        name: Name,
        value: Value,
        scope: &LocalScope<Scope>,
    ) -> EvalResult<()> {
        let outcome = scope.borrow_mut().assign(name, value.clone());
        match outcome {
            Ok(()) => Ok(()),
            Err(AssignError::Immutable) => {
                Err(errors::immutable_binding(self.interner.lookup(name)))
            }
            Err(AssignError::Undefined) => {
                self.globals
                    .borrow_mut()
                    .define(name, value, Mutability::Mutable);
                Ok(())
            }
        }
    }

    fn call_value(&mut self, callee: &Value, args: &[Value]) -> EvalResult<Value> {
        match callee {
            Value::Builtin(builtin) => {
                builtins::call_builtin(*builtin, args, self.culture, &self.printer)
            }
            Value::Function(func) => self.call_function(func, args),
            _ => match callee.descriptor().call(callee, args)? {
                Some(value) => Ok(value),
                None => Err(errors::not_callable(callee.type_name())),
            },
        }
    }

    /// Run a function body to completion recursively. This path cannot
    /// suspend: `yield`/`wait` inside it is a control-flow error.
    fn call_function(&mut self, func: &FunctionValue, args: &[Value]) -> EvalResult<Value> {
        let scope = function_scope(func, args);
        match self.exec_block_rec(&func.def.body, &scope)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Null),
            Flow::Break => Err(errors::control_flow_error("break")),
            Flow::Continue => Err(errors::control_flow_error("continue")),
        }
    }

    fn exec_block_rec(&mut self, block: &Block, scope: &LocalScope<Scope>) -> EvalResult<Flow> {
        for stmt in block.iter() {
            match self.exec_stmt_rec(stmt, scope)? {
                Flow::Normal => {}
                other => return Ok(other),
            }
        }
        Ok(Flow::Normal)
    }

    fn exec_child_rec(&mut self, block: &Block, scope: &LocalScope<Scope>) -> EvalResult<Flow> {
        let inner = child_scope(scope);
        self.exec_block_rec(block, &inner)
    }

    #[allow(clippy::too_many_lines, reason = "one arm per statement form")]
    fn exec_stmt_rec(&mut self, stmt: &Stmt, scope: &LocalScope<Scope>) -> EvalResult<Flow> {
        match stmt {
            Stmt::Expr(expr) => {
                self.eval(expr, scope)?;
                Ok(Flow::Normal)
            }
            Stmt::Var { name, init } => {
                let value = match init {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                scope.borrow_mut().define(*name, value, Mutability::Mutable);
                Ok(Flow::Normal)
            }
            Stmt::Function(def) => {
                let func = Value::Function(FunctionValue::new(def.clone(), scope.clone()));
                scope.borrow_mut().define(def.name, func, Mutability::Mutable);
                Ok(Flow::Normal)
            }
            Stmt::If { arms, else_body } => {
                for (cond, body) in arms {
                    if self.eval(cond, scope)?.is_truthy() {
                        return self.exec_child_rec(body, scope);
                    }
                }
                match else_body {
                    Some(body) => self.exec_child_rec(body, scope),
                    None => Ok(Flow::Normal),
                }
            }
            Stmt::Unless {
                cond,
                body,
                else_body,
            } => {
                if self.eval(cond, scope)?.is_truthy() {
                    match else_body {
                        Some(body) => self.exec_child_rec(body, scope),
                        None => Ok(Flow::Normal),
                    }
                } else {
                    self.exec_child_rec(body, scope)
                }
            }
            Stmt::While { cond, body } => self.cond_loop_rec(cond, false, true, body, scope),
            Stmt::Until { cond, body } => self.cond_loop_rec(cond, true, true, body, scope),
            Stmt::DoWhile { body, cond } => self.cond_loop_rec(cond, false, false, body, scope),
            Stmt::DoUntil { body, cond } => self.cond_loop_rec(cond, true, false, body, scope),
            Stmt::For {
                init,
                cond,
                step,
                body,
            } => {
                let loop_scope = child_scope(scope);
                if let Some(init) = init {
                    self.run_for_init(init, &loop_scope)?;
                }
                loop {
                    if !self.for_cond(cond.as_ref(), &loop_scope)? {
                        break;
                    }
                    match self.exec_block_rec(body, &loop_scope)? {
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                    }
                    if let Some(step) = step {
                        self.eval(step, &loop_scope)?;
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::ForEach { var, seq, body } => {
                let sequence = self.eval(seq, scope)?;
                let iter = sequence.descriptor().enumerate(&sequence)?;
                let loop_scope = child_scope(scope);
                for item in iter {
                    loop_scope
                        .borrow_mut()
                        .define(*var, item, Mutability::Mutable);
                    match self.exec_block_rec(body, &loop_scope)? {
                        Flow::Return(value) => return Ok(Flow::Return(value)),
                        Flow::Break => break,
                        Flow::Continue | Flow::Normal => {}
                    }
                }
                Ok(Flow::Normal)
            }
            Stmt::Block(body) => self.exec_child_rec(body, scope),
            Stmt::Return(value) => {
                let value = match value {
                    Some(expr) => self.eval(expr, scope)?,
                    None => Value::Null,
                };
                Ok(Flow::Return(value))
            }
            Stmt::Break => Ok(Flow::Break),
            Stmt::Continue => Ok(Flow::Continue),
            Stmt::Yield => Err(errors::control_flow_error("yield")),
            Stmt::Wait(_) => Err(errors::control_flow_error("wait")),
        }
    }

    fn cond_loop_rec(
        &mut self,
        cond: &Expr,
        negate: bool,
        check_first: bool,
        body: &Block,
        scope: &LocalScope<Scope>,
    ) -> EvalResult<Flow> {
        let loop_scope = child_scope(scope);
        let mut first = true;
        loop {
            if (check_first || !first)
                && self.eval(cond, &loop_scope)?.is_truthy() == negate
            {
                break;
            }
            first = false;
            match self.exec_block_rec(body, &loop_scope)? {
                Flow::Return(value) => return Ok(Flow::Return(value)),
                Flow::Break => break,
                Flow::Continue | Flow::Normal => {}
            }
        }
        Ok(Flow::Normal)
    }
}

/// Control flow outcome of a recursively executed statement.
enum Flow {
    Normal,
    Return(Value),
    Break,
    Continue,
}

fn child_scope(scope: &LocalScope<Scope>) -> LocalScope<Scope> {
    LocalScope::new(Scope::with_parent(scope.clone()))
}

fn function_scope(func: &FunctionValue, args: &[Value]) -> LocalScope<Scope> {
    let scope = LocalScope::new(Scope::with_parent(func.captured.clone()));
    for (i, param) in func.def.params.iter().enumerate() {
        scope.borrow_mut().define(
            *param,
            args.get(i).cloned().unwrap_or(Value::Null),
            Mutability::Mutable,
        );
    }
    scope
}
