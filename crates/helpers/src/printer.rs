use std::{
    any::Any,
    fmt::{self, Debug},
    io::Write,
    sync::{Arc, Mutex, PoisonError},
};

use doubles::{MethodSlot, SpyTarget};
use tracing::warn;

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

fn write_line(out: &SharedWriter, line: &str) {
    let mut out = out.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = writeln!(out, "{line}") {
        warn!(error = %e, "Failed to write printer output");
    }
}

/// Printing helpers with swappable members.
///
/// `print_number_local` and `child_printer` print through the `print_word` member, so a
/// spy on `print_word` sees their output too. `print_number_clone` writes on its own.
#[derive(Clone)]
pub struct Printer {
    print_word: MethodSlot<(String,), ()>,
    print_number_local: MethodSlot<(i64,), ()>,
    print_number_clone: MethodSlot<(i64,), ()>,
    child_printer: MethodSlot<(Vec<String>,), ()>,
}

impl Printer {
    pub fn new(out: impl Write + Send + 'static) -> Self {
        let out: SharedWriter = Arc::new(Mutex::new(Box::new(out)));

        let print_word = MethodSlot::new({
            let out = out.clone();
            move |(word,): (String,)| write_line(&out, &word)
        });
        let print_number_local = MethodSlot::new({
            let print_word = print_word.clone();
            move |(number,): (i64,)| print_word.call((number.to_string(),))
        });
        let print_number_clone = MethodSlot::new({
            let out = out.clone();
            move |(number,): (i64,)| write_line(&out, &number.to_string())
        });
        let child_printer = MethodSlot::new({
            let print_word = print_word.clone();
            move |(words,): (Vec<String>,)| {
                for word in words {
                    print_word.call((word,));
                }
            }
        });

        Self {
            print_word,
            print_number_local,
            print_number_clone,
            child_printer,
        }
    }

    pub fn stdout() -> Self {
        Self::new(std::io::stdout())
    }

    pub fn print_word(&self, word: impl Into<String>) {
        self.print_word.call((word.into(),));
    }

    pub fn print_number_local(&self, number: i64) {
        self.print_number_local.call((number,));
    }

    pub fn print_number_clone(&self, number: i64) {
        self.print_number_clone.call((number,));
    }

    /// Prints each word on its own line
    pub fn child_printer(&self, words: Vec<String>) {
        self.child_printer.call((words,));
    }
}

impl SpyTarget for Printer {
    fn member(&self, name: &str) -> Option<&dyn Any> {
        match name {
            "print_word" => Some(&self.print_word),
            "print_number_local" => Some(&self.print_number_local),
            "print_number_clone" => Some(&self.print_number_clone),
            "child_printer" => Some(&self.child_printer),
            _ => None,
        }
    }
}

impl Debug for Printer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Printer")
            .field("print_word", &self.print_word)
            .field("print_number_local", &self.print_number_local)
            .field("print_number_clone", &self.print_number_clone)
            .field("child_printer", &self.child_printer)
            .finish()
    }
}
