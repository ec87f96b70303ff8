//! rlox: a tree-walking interpreter for a small Lox-family scripting
//! language.
//!
//! The pipeline is `source → scanner → tokens → parser → AST → interpreter`.
//! [`run`] drives all three stages; the individual modules are public for the
//! CLI's debug subcommands and for embedders.

pub mod ast;
pub mod ast_printer;
pub mod builtins;
pub mod environment;
pub mod error;
pub mod interpreter;
pub mod parser;
pub mod scanner;
mod stack;
pub mod token;
pub mod value;

use log::info;

use crate::ast::Stmt;
use crate::error::LoxError;
use crate::interpreter::Interpreter;
use crate::token::Token;

/// Outcome of running a program: every lex/parse error, or the one runtime
/// error that halted execution.
pub type RunResult = std::result::Result<(), Vec<LoxError>>;

/// Run `source` on a fresh interpreter bound to stdio.
pub fn run(source: &str) -> RunResult {
    let mut interpreter: Interpreter = Interpreter::new();
    run_with(&mut interpreter, source)
}

/// Run `source` on an existing interpreter, keeping its globals.
pub fn run_with(interpreter: &mut Interpreter, source: &str) -> RunResult {
    info!("Running {} bytes of source", source.len());

    let tokens: Vec<Token<'_>> = scanner::scan(source).map_err(|e| vec![e])?;
    let statements: Vec<Stmt> = parser::parse(&tokens)?;

    interpreter
        .interpret(&statements)
        .map_err(|e| vec![LoxError::from(e)])
}
