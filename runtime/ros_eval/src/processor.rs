//! Host facade over the executor.
//!
//! A `Processor` owns one loaded program and drives it in slices: `execute`
//! runs until the script suspends, completes or fails; `resume` and
//! `resume_with` continue a suspended script on later host ticks. The
//! countdown budget bounds every slice, so a script that never yields still
//! hands control back.

use crate::core::{Core, CoreState, ExitCode, WaitReason};
use crate::environment::Environment;
use crate::print_handler::{shared, SharedPrintHandler, StdoutPrint};
use ros_ir::{Block, SharedInterner};
use ros_value::{errors, Culture, Value};
use tracing::debug;

/// Default per-slice statement budget.
pub const DEFAULT_COUNTDOWN: usize = 1000;

/// Configures and builds a [`Processor`].
pub struct ProcessorBuilder {
    countdown: usize,
    culture: Culture,
    printer: Option<SharedPrintHandler>,
    echo: bool,
}

impl ProcessorBuilder {
    /// Start from the defaults: countdown 1000, invariant culture, stdout
    /// printing, no result echo.
    pub fn new() -> Self {
        ProcessorBuilder {
            countdown: DEFAULT_COUNTDOWN,
            culture: Culture::Invariant,
            printer: None,
            echo: false,
        }
    }

    /// Per-slice statement budget before forced suspension.
    pub fn countdown(mut self, countdown: usize) -> Self {
        self.countdown = countdown.max(1);
        self
    }

    /// Formatting culture for conversion and display.
    pub fn culture(mut self, culture: Culture) -> Self {
        self.culture = culture;
        self
    }

    /// Replace the stdout sink.
    pub fn printer(mut self, printer: SharedPrintHandler) -> Self {
        self.printer = Some(printer);
        self
    }

    /// Echo the final script result through the print sink (REPL mode).
    pub fn echo(mut self, echo: bool) -> Self {
        self.echo = echo;
        self
    }

    /// Build the processor with the runtime builtins registered.
    pub fn build(self) -> Processor {
        let interner = SharedInterner::new();
        let env = Environment::new(&interner);
        let printer = self.printer.unwrap_or_else(|| shared(StdoutPrint));
        let core = Core::new(
            interner.clone(),
            env.globals().clone(),
            self.culture,
            printer.clone(),
        );
        Processor {
            interner,
            env,
            core,
            printer,
            countdown: self.countdown,
            culture: self.culture,
            echo: self.echo,
        }
    }
}

impl Default for ProcessorBuilder {
    fn default() -> Self {
        ProcessorBuilder::new()
    }
}

/// One script execution context.
pub struct Processor {
    interner: SharedInterner,
    env: Environment,
    core: Core,
    printer: SharedPrintHandler,
    countdown: usize,
    culture: Culture,
    echo: bool,
}

impl Processor {
    /// Processor with all defaults.
    pub fn new() -> Self {
        ProcessorBuilder::new().build()
    }

    /// The interner hosts use while building statement trees.
    pub fn interner(&self) -> &SharedInterner {
        &self.interner
    }

    /// The global environment, for host registrations.
    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Register an immutable host global.
    pub fn register_global(&self, name: &str, value: Value) {
        self.env.register(&self.interner, name, value);
    }

    /// Load a program, replacing any previous one.
    pub fn load(&mut self, program: Block) {
        debug!(statements = program.len(), "program loaded");
        self.core.load(program);
    }

    /// Current execution state.
    pub fn state(&self) -> &CoreState {
        self.core.state()
    }

    /// Exit code of the last slice: `Yield` while suspended, the
    /// completion exit (`Return` or `None`) once completed.
    pub fn exit(&self) -> ExitCode {
        self.core.state().exit_code()
    }

    /// Final result, once completed.
    pub fn result(&self) -> Option<&Value> {
        match self.core.state() {
            CoreState::Completed { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Run one slice from the current position.
    pub fn execute(&mut self) -> &CoreState {
        self.run_slice()
    }

    /// Continue a suspended script on the next host tick.
    ///
    /// A pending `wait n` stays suspended: its remaining seconds are only
    /// paid down through [`Processor::resume_with`]. A no-op in any state
    /// other than `Suspended`.
    pub fn resume(&mut self) -> &CoreState {
        let timed_wait = matches!(
            self.core.state(),
            CoreState::Suspended(WaitReason::Seconds(_))
        );
        if self.core.state().is_suspended() && !timed_wait {
            return self.run_slice();
        }
        self.core.state()
    }

    /// Continue a suspended script, crediting `elapsed` seconds of host
    /// time against a pending `wait`.
    ///
    /// A `wait n` whose remaining time is not yet covered stays suspended.
    pub fn resume_with(&mut self, elapsed: f64) -> &CoreState {
        if !self.core.state().is_suspended() {
            return self.core.state();
        }
        if self.core.credit_elapsed(elapsed) {
            return self.run_slice();
        }
        self.core.state()
    }

    /// Cooperatively terminate the script; it cannot be resumed afterwards.
    pub fn terminate(&mut self) {
        if !self.core.state().is_completed() {
            debug!("terminated by host");
            self.core.fail(errors::terminated());
        }
    }

    fn run_slice(&mut self) -> &CoreState {
        self.core.run(self.countdown);
        if self.echo {
            if let CoreState::Completed { value, .. } = self.core.state() {
                if !matches!(value, Value::Null) {
                    let rendered = value
                        .descriptor()
                        .to_display(value, None, self.culture)
                        .unwrap_or_else(|e| e.to_string());
                    self.printer.borrow_mut().print(&rendered);
                }
            }
        }
        self.core.state()
    }
}

impl Default for Processor {
    fn default() -> Self {
        Processor::new()
    }
}
