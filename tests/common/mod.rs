#![allow(dead_code)]

use std::cell::RefCell;
use std::io::{self, Cursor, Write};
use std::rc::Rc;

use rlox::builtins::Console;
use rlox::error::LoxError;
use rlox::interpreter::{Config, Interpreter};

/// A writer whose bytes stay readable after it is boxed into a `Console`.
#[derive(Clone, Default)]
pub struct SharedBuf(Rc<RefCell<Vec<u8>>>);

impl SharedBuf {
    pub fn contents(&self) -> String {
        String::from_utf8_lossy(&self.0.borrow()).into_owned()
    }
}

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.borrow_mut().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

pub fn interpreter_with_input(input: &str, config: Config) -> (Interpreter, SharedBuf) {
    let out = SharedBuf::default();
    let console = Console::new(
        Box::new(out.clone()),
        Box::new(Cursor::new(input.as_bytes().to_vec())),
    );

    (Interpreter::with_config(console, config), out)
}

/// Run `source` with empty input, returning everything it printed.
pub fn run(source: &str) -> (String, Result<(), Vec<LoxError>>) {
    run_with_input(source, "")
}

pub fn run_with_input(source: &str, input: &str) -> (String, Result<(), Vec<LoxError>>) {
    let (mut interpreter, out) = interpreter_with_input(input, Config::default());
    let result = rlox::run_with(&mut interpreter, source);

    (out.contents(), result)
}

/// Run `source`, which must succeed, and return its output.
pub fn output_of(source: &str) -> String {
    let (out, result) = run(source);

    if let Err(errors) = result {
        panic!("program failed: {:?}\noutput so far: {}", errors, out);
    }

    out
}

/// Run `source`, which must fail at runtime, and return the error message.
pub fn runtime_error_of(source: &str) -> String {
    match run(source).1 {
        Err(errors) => match errors.as_slice() {
            [LoxError::Runtime(e)] => e.to_string(),
            other => panic!("expected one runtime error, got {:?}", other),
        },
        Ok(()) => panic!("program unexpectedly succeeded"),
    }
}
