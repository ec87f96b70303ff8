//! Tree‑walking evaluator.
//!
//! Statements run against `self.environment`, the innermost scope; blocks and
//! calls swap in a child scope and put the previous one back on every exit
//! path.  `return` travels upward as [`Completion::Return`] until the nearest
//! call frame turns it into the call's value, so it never leaks past a
//! function boundary and is never confused with an error.

use std::cell::RefCell;
use std::collections::HashMap;
use std::mem;
use std::rc::Rc;

use log::{debug, info};

use crate::ast::{BinaryOp, Expr, LiteralValue, LogicalOp, Stmt, UnaryOp};
use crate::builtins::{self, join_values, Console};
use crate::environment::{EnvRef, Environment};
use crate::error::{Arity, RuntimeError};
use crate::stack::ensure_sufficient_stack;
use crate::value::{Class, Instance, UserFunction, Value};

/// Convenient alias for interpreter results.
pub type IResult<T> = Result<T, RuntimeError>;

/// Calls deeper than this raise `StackOverflow`.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Config {
    pub max_call_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
        }
    }
}

/// How a statement finished.
#[derive(Debug)]
enum Completion {
    Normal,
    Return(Value),
}

pub struct Interpreter {
    /// Innermost scope; the globals while no block or call is running.
    environment: EnvRef,
    console: Console,
    config: Config,
    depth: usize,
}

impl Default for Interpreter {
    fn default() -> Self {
        Self::new()
    }
}

impl Interpreter {
    /// Creates an interpreter on the process' stdio with the built‑ins defined.
    pub fn new() -> Self {
        Self::with_console(Console::stdio())
    }

    pub fn with_console(console: Console) -> Self {
        Self::with_config(console, Config::default())
    }

    pub fn with_config(console: Console, config: Config) -> Self {
        info!("Initializing Interpreter with {:?}", config);

        let mut globals = Environment::new();
        builtins::define_globals(&mut globals);

        Self {
            environment: Rc::new(RefCell::new(globals)),
            console,
            config,
            depth: 0,
        }
    }

    /// Runs a program, halting on the first runtime error.
    pub fn interpret(&mut self, statements: &[Stmt]) -> IResult<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if let Completion::Return(_) = self.execute(stmt)? {
                // Only a hand-built tree can get here; the parser rejects
                // top-level `return`.
                break;
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    // ─────────────────────────────── statements ────────────────────────────

    fn execute(&mut self, stmt: &Stmt) -> IResult<Completion> {
        ensure_sufficient_stack(|| self.execute_stmt(stmt))
    }

    fn execute_stmt(&mut self, stmt: &Stmt) -> IResult<Completion> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print { values, line } => {
                let mut printed: Vec<Value> = Vec::with_capacity(values.len());
                for expr in values {
                    printed.push(self.evaluate(expr)?);
                }

                let mut text: String = join_values(&printed);
                text.push('\n');

                self.console
                    .write_str(&text)
                    .map_err(|e| RuntimeError::Native {
                        name: "print".to_string(),
                        message: e.to_string(),
                        line: *line,
                    })?;
            }

            Stmt::Var { name, initializer } => {
                let value: Value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                self.environment.borrow_mut().define(&name.name, value);
            }

            Stmt::Function(declaration) => {
                debug!("Defining function '{}'", declaration.name.name);

                let function = UserFunction::new(
                    Rc::clone(declaration),
                    Rc::clone(&self.environment),
                    false,
                );

                self.environment
                    .borrow_mut()
                    .define(&declaration.name.name, Value::Function(Rc::new(function)));
            }

            Stmt::Class { name, methods } => {
                debug!("Defining class '{}'", name.name);

                let methods: HashMap<String, Rc<UserFunction>> = methods
                    .iter()
                    .map(|decl| {
                        let function = UserFunction::new(
                            Rc::clone(decl),
                            Rc::clone(&self.environment),
                            decl.name.name == "init",
                        );
                        (decl.name.name.clone(), Rc::new(function))
                    })
                    .collect();

                let class = Class {
                    name: name.name.clone(),
                    methods,
                };

                self.environment
                    .borrow_mut()
                    .define(&name.name, Value::Class(Rc::new(class)));
            }

            Stmt::Block(statements) => {
                let env: EnvRef = Environment::child_of(&self.environment);
                return self.execute_block(statements, env);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_branch) = else_branch {
                    return self.execute(else_branch);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Completion::Return(value) = self.execute(body)? {
                        return Ok(Completion::Return(value));
                    }
                }
            }

            Stmt::Return { value, .. } => {
                let value: Value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                return Ok(Completion::Return(value));
            }
        }

        Ok(Completion::Normal)
    }

    /// Run `statements` with `env` as the current scope, restoring the
    /// previous scope afterwards whatever the outcome.
    fn execute_block(&mut self, statements: &[Stmt], env: EnvRef) -> IResult<Completion> {
        let previous: EnvRef = mem::replace(&mut self.environment, env);

        let mut result: IResult<Completion> = Ok(Completion::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Completion::Normal) => continue,
                other => {
                    result = other;
                    break;
                }
            }
        }

        self.environment = previous;
        result
    }

    // ────────────────────────────── expressions ────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &Expr) -> IResult<Value> {
        ensure_sufficient_stack(|| self.evaluate_expr(expr))
    }

    fn evaluate_expr(&mut self, expr: &Expr) -> IResult<Value> {
        match expr {
            Expr::Literal(literal) => Ok(literal_value(literal)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Variable(name) => self.environment.borrow().get(&name.name, name.line),

            Expr::Assign { name, value } => {
                let value: Value = self.evaluate(value)?;

                self.environment
                    .borrow_mut()
                    .assign(&name.name, value.clone(), name.line)?;

                Ok(value)
            }

            Expr::Unary {
                operator,
                right,
                line,
            } => {
                let right: Value = self.evaluate(right)?;

                match (operator, right) {
                    (UnaryOp::Not, value) => Ok(Value::Bool(!value.is_truthy())),
                    (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOp::Negate, other) => Err(RuntimeError::type_mismatch(
                        operator.to_string(),
                        format!("operand must be a number, got {}", other.type_name()),
                        *line,
                    )),
                }
            }

            Expr::Binary {
                left,
                operator,
                right,
                line,
            } => {
                let left: Value = self.evaluate(left)?;
                let right: Value = self.evaluate(right)?;

                binary(*operator, left, right, *line)
            }

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left: Value = self.evaluate(left)?;

                let decided: bool = match operator {
                    LogicalOp::Or => left.is_truthy(),
                    LogicalOp::And => !left.is_truthy(),
                };

                if decided {
                    Ok(left)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Call {
                callee,
                arguments,
                line,
            } => {
                let callee: Value = self.evaluate(callee)?;

                let mut values: Vec<Value> = Vec::with_capacity(arguments.len());
                for argument in arguments {
                    values.push(self.evaluate(argument)?);
                }

                self.call(callee, values, *line)
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => instance.get(&name.name, name.line),
                other => Err(not_an_instance(&other, name.line)),
            },

            Expr::Set {
                object,
                name,
                value,
            } => {
                let instance: Rc<Instance> = match self.evaluate(object)? {
                    Value::Instance(instance) => instance,
                    other => return Err(not_an_instance(&other, name.line)),
                };

                let value: Value = self.evaluate(value)?;
                instance.set(&name.name, value.clone());

                Ok(value)
            }

            Expr::This { line } => self.environment.borrow().get("this", *line),
        }
    }

    // ──────────────────────────────── calls ────────────────────────────────

    /// Invokes a callable (native, user‑defined, or class constructor).
    fn call(&mut self, callee: Value, arguments: Vec<Value>, line: usize) -> IResult<Value> {
        match callee {
            Value::NativeFunction(native) => {
                debug!("Calling native function '{}'", native.name);

                if !native.arity.accepts(arguments.len()) {
                    return Err(RuntimeError::ArityMismatch {
                        expected: native.arity,
                        got: arguments.len(),
                        line,
                    });
                }

                (native.func)(&mut self.console, &arguments).map_err(|message| {
                    RuntimeError::Native {
                        name: native.name.to_string(),
                        message,
                        line,
                    }
                })
            }

            Value::Function(function) => self.call_function(&function, arguments, line),

            Value::Class(class) => {
                debug!("Constructing instance of '{}'", class.name);

                if arguments.len() != class.arity() {
                    return Err(RuntimeError::ArityMismatch {
                        expected: Arity::Exact(class.arity()),
                        got: arguments.len(),
                        line,
                    });
                }

                let instance: Rc<Instance> = Rc::new(Instance::new(Rc::clone(&class)));

                if let Some(init) = class.find_method("init") {
                    let bound: UserFunction = init.bind(Rc::clone(&instance));
                    self.call_function(&bound, arguments, line)?;
                }

                Ok(Value::Instance(instance))
            }

            Value::Nil
            | Value::Bool(_)
            | Value::Number(_)
            | Value::String(_)
            | Value::Instance(_) => Err(RuntimeError::NotCallable { line }),
        }
    }

    fn call_function(
        &mut self,
        function: &UserFunction,
        arguments: Vec<Value>,
        line: usize,
    ) -> IResult<Value> {
        debug!("Calling user-defined function '{}'", function.name());

        if arguments.len() != function.arity() {
            return Err(RuntimeError::ArityMismatch {
                expected: Arity::Exact(function.arity()),
                got: arguments.len(),
                line,
            });
        }

        if self.depth >= self.config.max_call_depth {
            info!("Call depth limit {} reached", self.config.max_call_depth);
            return Err(RuntimeError::StackOverflow { line });
        }

        let env: EnvRef = Environment::child_of(&function.closure);
        {
            let mut scope = env.borrow_mut();
            for (param, argument) in function.declaration.params.iter().zip(arguments) {
                scope.define(&param.name, argument);
            }
        }

        self.depth += 1;
        let result = ensure_sufficient_stack(|| {
            self.execute_block(&function.declaration.body, env)
        });
        self.depth -= 1;

        let completion: Completion = result?;

        if function.is_initializer {
            return function.closure.borrow().get("this", line);
        }

        Ok(match completion {
            Completion::Return(value) => value,
            Completion::Normal => Value::Nil,
        })
    }
}

// ─────────────────────────────── helpers ───────────────────────────────────

fn literal_value(literal: &LiteralValue) -> Value {
    match literal {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::string(s),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

fn binary(operator: BinaryOp, left: Value, right: Value, line: usize) -> IResult<Value> {
    use Value::{Bool, Number};

    match (operator, left, right) {
        (BinaryOp::Equal, l, r) => Ok(Bool(l == r)),
        (BinaryOp::NotEqual, l, r) => Ok(Bool(l != r)),

        (BinaryOp::Add, Number(a), Number(b)) => Ok(Number(a + b)),
        // A string on either side turns `+` into concatenation.
        (BinaryOp::Add, l @ Value::String(_), r) | (BinaryOp::Add, l, r @ Value::String(_)) => {
            Ok(Value::string(format!("{}{}", l, r)))
        }

        (BinaryOp::Subtract, Number(a), Number(b)) => Ok(Number(a - b)),
        (BinaryOp::Multiply, Number(a), Number(b)) => Ok(Number(a * b)),
        (BinaryOp::Divide, Number(_), Number(b)) if b == 0.0 => {
            Err(RuntimeError::DivisionByZero { line })
        }
        (BinaryOp::Divide, Number(a), Number(b)) => Ok(Number(a / b)),

        (BinaryOp::Greater, Number(a), Number(b)) => Ok(Bool(a > b)),
        (BinaryOp::GreaterEqual, Number(a), Number(b)) => Ok(Bool(a >= b)),
        (BinaryOp::Less, Number(a), Number(b)) => Ok(Bool(a < b)),
        (BinaryOp::LessEqual, Number(a), Number(b)) => Ok(Bool(a <= b)),

        (operator, l, r) => {
            let expected: &str = match operator {
                BinaryOp::Add => "operands must be two numbers or include a string",
                _ => "operands must be numbers",
            };

            debug!("Type mismatch for '{}' on line {}", operator, line);

            Err(RuntimeError::type_mismatch(
                operator.to_string(),
                format!("{}, got {} and {}", expected, l.type_name(), r.type_name()),
                line,
            ))
        }
    }
}

fn not_an_instance(value: &Value, line: usize) -> RuntimeError {
    RuntimeError::type_mismatch(
        ".",
        format!("only instances have properties, got {}", value.type_name()),
        line,
    )
}
