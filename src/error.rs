//! Centralised error hierarchy for the **rlox interpreter**.
//!
//! Scanning, parsing and evaluation each report through their own variant of
//! [`LoxError`]; the three kinds never mix.  Runtime failures get a dedicated
//! [`RuntimeError`] enum so the evaluator can match on the exact failure mode
//! while still converting into `LoxError` with `?` at the pipeline boundary.
//!
//! The module **does not** print diagnostics itself

use std::fmt;
use std::io;
use thiserror::Error;

use log::info;

/// Canonical error type used throughout the interpreter.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum LoxError {
    /// Lexical (scanner) error with source line information.
    #[error("[line {line}] Error: {message}")]
    Lex {
        /// Human‑readable description, including the offending character.
        message: String,

        /// 1‑based line where the error occurred.
        line: usize,
    },

    /// Syntactic (parser) error.
    #[error("[line {line}] Error at {found}: {message}")]
    Parse {
        /// The construct the parser expected.
        message: String,

        /// The token actually found, quoted, or `end` for end of input.
        found: String,

        line: usize,
    },

    /// Runtime evaluation error.
    #[error(transparent)]
    Runtime(#[from] RuntimeError),

    /// Wrapper around `std::io::Error` (transparent).  Enables `?` on I/O ops.
    #[error(transparent)]
    Io(#[from] io::Error),

    /// UTF‑8 decoding failure when ingesting external text.
    #[error(transparent)]
    Utf8(#[from] std::str::Utf8Error),
}

impl LoxError {
    /// Helper constructor for the **scanner**.
    pub fn lex<S: Into<String>>(line: usize, msg: S) -> Self {
        let message: String = msg.into();

        info!("Creating Lex error: line={}, msg={}", line, message);

        LoxError::Lex { message, line }
    }

    /// Helper constructor for the **parser**.
    pub fn parse<F: Into<String>, S: Into<String>>(line: usize, found: F, msg: S) -> Self {
        let message: String = msg.into();
        let found: String = found.into();

        info!(
            "Creating Parse error: line={}, found={}, msg={}",
            line, found, message
        );

        LoxError::Parse {
            message,
            found,
            line,
        }
    }

    /// Source line the error points at, if it has one.
    pub fn line(&self) -> Option<usize> {
        match self {
            LoxError::Lex { line, .. } | LoxError::Parse { line, .. } => Some(*line),
            LoxError::Runtime(e) => Some(e.line()),
            LoxError::Io(_) | LoxError::Utf8(_) => None,
        }
    }
}

/// Number of arguments a callable accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
    Variadic,
}

impl Arity {
    pub fn accepts(&self, count: usize) -> bool {
        match *self {
            Arity::Exact(n) => count == n,
            Arity::Range(lo, hi) => (lo..=hi).contains(&count),
            Arity::Variadic => true,
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Arity::Exact(n) => write!(f, "{}", n),
            Arity::Range(lo, hi) => write!(f, "{} to {}", lo, hi),
            Arity::Variadic => write!(f, "any number of"),
        }
    }
}

/// A well-formed program broke a dynamic contract.  The first one raised halts
/// the whole program.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum RuntimeError {
    #[error("[line {line}] Undefined variable '{name}'.")]
    UndefinedVariable { name: String, line: usize },

    #[error("[line {line}] Undefined property '{name}'.")]
    UndefinedProperty { name: String, line: usize },

    #[error("[line {line}] Invalid operand for '{operator}': {message}")]
    TypeMismatch {
        operator: String,
        message: String,
        line: usize,
    },

    #[error("[line {line}] Division by zero.")]
    DivisionByZero { line: usize },

    #[error("[line {line}] Expected {expected} arguments but got {got}.")]
    ArityMismatch {
        expected: Arity,
        got: usize,
        line: usize,
    },

    #[error("[line {line}] Can only call functions and classes.")]
    NotCallable { line: usize },

    #[error("[line {line}] Stack overflow.")]
    StackOverflow { line: usize },

    /// A built-in failed, typically on console I/O.
    #[error("[line {line}] Error in native fn '{name}': {message}")]
    Native {
        name: String,
        message: String,
        line: usize,
    },
}

impl RuntimeError {
    pub fn type_mismatch<O: Into<String>, M: Into<String>>(
        operator: O,
        message: M,
        line: usize,
    ) -> Self {
        RuntimeError::TypeMismatch {
            operator: operator.into(),
            message: message.into(),
            line,
        }
    }

    pub fn line(&self) -> usize {
        match self {
            RuntimeError::UndefinedVariable { line, .. }
            | RuntimeError::UndefinedProperty { line, .. }
            | RuntimeError::TypeMismatch { line, .. }
            | RuntimeError::DivisionByZero { line }
            | RuntimeError::ArityMismatch { line, .. }
            | RuntimeError::NotCallable { line }
            | RuntimeError::StackOverflow { line }
            | RuntimeError::Native { line, .. } => *line,
        }
    }
}

/// Crate‑wide `Result` alias.
pub type Result<T> = std::result::Result<T, LoxError>;
