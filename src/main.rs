use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process;

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};
use memmap2::Mmap;

use rlox::ast::{Expr, Stmt};
use rlox::ast_printer::Ast;
use rlox::builtins::Console;
use rlox::error::LoxError;
use rlox::interpreter::{Config, Interpreter, DEFAULT_MAX_CALL_DEPTH};
use rlox::parser::{self, Parser};
use rlox::scanner;
use rlox::token::Token;

/// Exit status for malformed source (lex or parse errors).
const EXIT_DATA_ERR: i32 = 65;
/// Exit status for a program that failed while running.
const EXIT_SOFTWARE: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Tree-walking interpreter for the Lox language", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to rlox.log
    #[arg(long, global = true)]
    log: bool,

    /// Maximum depth of nested function calls before a stack overflow error
    #[arg(long, global = true, default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_call_depth: usize,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes a file, printing each token
    Tokenize {
        filename: PathBuf,

        /// Emit the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses a file as a program and prints its AST
    Parse {
        filename: PathBuf,

        /// Emit the AST as JSON
        #[arg(long)]
        json: bool,
    },

    /// Evaluates a file holding a single expression and prints the result
    Evaluate { filename: PathBuf },

    /// Runs a file as a Lox program
    Run { filename: PathBuf },
}

/// Map `path` into memory and check that it is UTF-8.
fn read_source(path: &Path) -> Result<SourceBuf> {
    info!("Reading file: {:?}", path);

    let file = File::open(path)
        .map_err(LoxError::from)
        .with_context(|| format!("Failed to open file {:?}", path))?;

    let len: u64 = file
        .metadata()
        .map_err(LoxError::from)
        .with_context(|| format!("Failed to stat file {:?}", path))?
        .len();

    // Zero-length mappings are rejected on some platforms.
    if len == 0 {
        return Ok(SourceBuf::Empty);
    }

    // SAFETY: the mapping is read-only and the file is not modified while the
    // interpreter runs.
    let map = unsafe { Mmap::map(&file) }
        .map_err(LoxError::from)
        .with_context(|| format!("Failed to map file {:?}", path))?;

    std::str::from_utf8(&map)
        .map_err(LoxError::from)
        .with_context(|| format!("File {:?} is not valid UTF-8", path))?;

    info!("Mapped {} bytes from {:?}", len, path);

    Ok(SourceBuf::Mapped(map))
}

enum SourceBuf {
    Empty,
    Mapped(Mmap),
}

impl SourceBuf {
    fn text(&self) -> &str {
        match self {
            SourceBuf::Empty => "",
            // Validated in `read_source`.
            SourceBuf::Mapped(map) => std::str::from_utf8(map).unwrap_or_default(),
        }
    }
}

fn init_logger() -> Result<()> {
    let log_file = File::create("rlox.log").context("Failed to create rlox.log")?;

    Builder::new()
        .format(|buf, record| {
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rlox::").unwrap_or(module);

            writeln!(
                buf,
                "{} [{}:{}] - {}",
                chrono::Local::now().format("%H:%M:%S%.3f"),
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug)
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to rlox.log");
    Ok(())
}

fn report(errors: &[LoxError]) {
    for e in errors {
        eprintln!("{}", e);
    }
}

fn tokenize(source: &str, json: bool) -> Result<()> {
    let tokens: Vec<Token<'_>> = match scanner::scan(source) {
        Ok(tokens) => tokens,
        Err(e) => {
            debug!("Tokenization failed: {}", e);
            report(&[e]);
            process::exit(EXIT_DATA_ERR);
        }
    };

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if json {
        serde_json::to_writer_pretty(&mut out, &tokens).context("Failed to encode tokens")?;
        writeln!(out)?;
    } else {
        for token in &tokens {
            writeln!(out, "{}", token)?;
        }
    }

    info!("Tokenization completed with {} tokens", tokens.len());
    Ok(())
}

fn parse(source: &str, json: bool) -> Result<()> {
    let statements: Vec<Stmt> = scanner::scan(source)
        .map_err(|e| vec![e])
        .and_then(|tokens| parser::parse(&tokens))
        .unwrap_or_else(|errors| {
            report(&errors);
            process::exit(EXIT_DATA_ERR);
        });

    if json {
        let encoded = serde_json::to_string_pretty(&statements).context("Failed to encode AST")?;
        println!("{}", encoded);
    } else {
        println!("{}", Ast.print_program(&statements));
    }

    info!("Parse subcommand completed");
    Ok(())
}

fn evaluate(source: &str, config: Config) -> Result<()> {
    let tokens: Vec<Token<'_>> = scanner::scan(source).unwrap_or_else(|e| {
        report(&[e]);
        process::exit(EXIT_DATA_ERR);
    });

    let expr: Expr = Parser::new(&tokens).parse_expression().unwrap_or_else(|e| {
        report(&[e]);
        process::exit(EXIT_DATA_ERR);
    });

    let mut interpreter = Interpreter::with_config(Console::stdio(), config);

    match interpreter.evaluate(&expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
            Ok(())
        }
        Err(e) => {
            eprintln!("{}", e);
            process::exit(EXIT_SOFTWARE);
        }
    }
}

fn run(source: &str, config: Config) {
    let mut interpreter = Interpreter::with_config(Console::stdio(), config);

    if let Err(errors) = rlox::run_with(&mut interpreter, source) {
        report(&errors);

        let code: i32 = match errors.first() {
            Some(LoxError::Runtime(_)) => EXIT_SOFTWARE,
            _ => EXIT_DATA_ERR,
        };

        debug!("Run failed, exiting with code {}", code);
        process::exit(code);
    }

    info!("Program executed successfully");
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    if args.log {
        init_logger()?;
    } else {
        Builder::new().filter_level(log::LevelFilter::Off).init();
    }

    info!("CLI arguments: {:?}", args);

    let config = Config {
        max_call_depth: args.max_call_depth,
    };

    match args.commands {
        Commands::Tokenize { filename, json } => {
            let source = read_source(&filename)?;
            tokenize(source.text(), json)?;
        }

        Commands::Parse { filename, json } => {
            let source = read_source(&filename)?;
            parse(source.text(), json)?;
        }

        Commands::Evaluate { filename } => {
            let source = read_source(&filename)?;
            evaluate(source.text(), config)?;
        }

        Commands::Run { filename } => {
            let source = read_source(&filename)?;
            run(source.text(), config);
        }
    }

    Ok(())
}
