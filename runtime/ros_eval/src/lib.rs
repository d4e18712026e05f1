//! ROS Eval - resumable statement executor.
//!
//! Drives `ros_ir` statement trees over `ros_value` values. The defining
//! feature is cooperative suspension: `yield` and `wait` stop the script
//! between two statements with its frame stack intact, and a statement
//! budget (the countdown) forces the same stop on scripts that never yield.
//! The host drives everything through [`Processor`]: load a program,
//! `execute` one slice per tick, `resume` until completion.
//!
//! ```
//! use ros_eval::{ExitCode, Processor};
//! use ros_ir::{block, Expr, Stmt};
//!
//! let mut processor = Processor::new();
//! processor.load(block(vec![Stmt::Return(Some(Expr::Int(42)))]));
//! processor.execute();
//! assert_eq!(processor.exit(), ExitCode::Return);
//! ```

mod arguments;
mod builtins;
mod core;
mod environment;
mod frame;
pub mod print_handler;
mod processor;

pub use arguments::Arguments;
pub use core::{CoreState, ExitCode, WaitReason};
pub use environment::Environment;
pub use print_handler::{
    shared, BufferPrint, PrintHandler, SharedPrintHandler, SilentPrint, StdoutPrint,
};
pub use processor::{Processor, ProcessorBuilder, DEFAULT_COUNTDOWN};
