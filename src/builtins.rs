//! Host‑provided callables and the console they talk to.
//!
//! | Name      | Arity    | Behaviour                                           |
//! |-----------|----------|-----------------------------------------------------|
//! | `print`   | variadic | space‑joined values, no trailing newline            |
//! | `println` | variadic | same, followed by `\n`                              |
//! | `input`   | 0 or 1   | optional prompt, then one line from the input side  |

use std::io::{self, BufRead, Write};
use std::rc::Rc;

use log::{debug, info};

use crate::environment::Environment;
use crate::error::Arity;
use crate::value::{NativeFunction, NativeFn, Value};

/// The interpreter's I/O endpoints.  Defaults to the process' stdio; tests
/// and embedders swap in their own reader/writer.
pub struct Console {
    out: Box<dyn Write>,
    input: Box<dyn BufRead>,
}

impl Console {
    pub fn new(out: Box<dyn Write>, input: Box<dyn BufRead>) -> Self {
        Self { out, input }
    }

    pub fn stdio() -> Self {
        Self::new(Box::new(io::stdout()), Box::new(io::BufReader::new(io::stdin())))
    }

    pub fn write_str(&mut self, s: &str) -> io::Result<()> {
        self.out.write_all(s.as_bytes())?;
        self.out.flush()
    }

    /// Read one line without its terminator; `None` at end of input.
    pub fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();

        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }

        let trimmed_len: usize = line.trim_end_matches(['\n', '\r']).len();
        line.truncate(trimmed_len);

        Ok(Some(line))
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::stdio()
    }
}

/// Stringify every value and join them with single spaces.
pub fn join_values(values: &[Value]) -> String {
    values
        .iter()
        .map(Value::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

fn native_print(console: &mut Console, args: &[Value]) -> Result<Value, String> {
    console
        .write_str(&join_values(args))
        .map_err(|e| e.to_string())?;

    Ok(Value::Nil)
}

fn native_println(console: &mut Console, args: &[Value]) -> Result<Value, String> {
    let mut line: String = join_values(args);
    line.push('\n');

    console.write_str(&line).map_err(|e| e.to_string())?;

    Ok(Value::Nil)
}

fn native_input(console: &mut Console, args: &[Value]) -> Result<Value, String> {
    if let Some(prompt) = args.first() {
        console
            .write_str(&prompt.to_string())
            .map_err(|e| e.to_string())?;
    }

    match console.read_line().map_err(|e| e.to_string())? {
        Some(line) => {
            debug!("input read {} byte(s)", line.len());
            Ok(Value::string(line))
        }
        None => Err("unexpected end of input".to_string()),
    }
}

const BUILTINS: [(&str, Arity, NativeFn); 3] = [
    ("print", Arity::Variadic, native_print),
    ("println", Arity::Variadic, native_println),
    ("input", Arity::Range(0, 1), native_input),
];

/// Register every built‑in in `globals`.
pub fn define_globals(globals: &mut Environment) {
    for (name, arity, func) in BUILTINS {
        debug!("Defining native function '{}'", name);

        globals.define(
            name,
            Value::NativeFunction(Rc::new(NativeFunction { name, arity, func })),
        );
    }

    info!("Registered {} native functions", BUILTINS.len());
}
