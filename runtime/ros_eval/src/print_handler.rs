//! Host print sinks.
//!
//! `print` never writes to stdout directly; it goes through the handler the
//! host installed so game consoles, REPLs and tests each capture output
//! their own way.

use std::cell::RefCell;
use std::rc::Rc;

/// Receives one finished line per `print` call.
pub trait PrintHandler {
    /// Emit one line of script output.
    fn print(&mut self, text: &str);
}

/// Shared handle the executor and the host both hold.
pub type SharedPrintHandler = Rc<RefCell<dyn PrintHandler>>;

/// Wrap a handler into the shared handle form.
pub fn shared<P: PrintHandler + 'static>(handler: P) -> SharedPrintHandler {
    Rc::new(RefCell::new(handler))
}

/// Writes lines to stdout. The default sink.
#[derive(Default)]
pub struct StdoutPrint;

impl PrintHandler for StdoutPrint {
    fn print(&mut self, text: &str) {
        println!("{text}");
    }
}

/// Collects lines in memory; tests and embedded consoles read them back.
#[derive(Default)]
pub struct BufferPrint {
    lines: Vec<String>,
}

impl BufferPrint {
    /// Lines captured so far.
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    /// Drain the captured lines.
    pub fn take_lines(&mut self) -> Vec<String> {
        std::mem::take(&mut self.lines)
    }
}

impl PrintHandler for BufferPrint {
    fn print(&mut self, text: &str) {
        self.lines.push(text.to_string());
    }
}

/// Discards all output.
#[derive(Default)]
pub struct SilentPrint;

impl PrintHandler for SilentPrint {
    fn print(&mut self, _text: &str) {}
}
