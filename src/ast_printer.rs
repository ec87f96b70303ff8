//! Parenthesised, Lisp‑style rendering of the AST, used by the `parse`
//! subcommand and handy in tests.

use crate::ast::{Expr, FunctionDecl, LiteralValue, Stmt};
use crate::stack::ensure_sufficient_stack;

pub struct Ast;

impl Ast {
    /// Render a whole program, one top‑level statement per line.
    pub fn print_program(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn print_stmt(&self, stmt: &Stmt) -> String {
        ensure_sufficient_stack(|| self.stmt(stmt))
    }

    pub fn print(&self, expr: &Expr) -> String {
        ensure_sufficient_stack(|| self.expr(expr))
    }

    fn stmt(&self, stmt: &Stmt) -> String {
        match stmt {
            Stmt::Expression(expr) => format!("(; {})", self.print(expr)),

            Stmt::Print { values, .. } => format!("(print {})", self.print_list(values)),

            Stmt::Var { name, initializer } => match initializer {
                Some(init) => format!("(var {} {})", name.name, self.print(init)),
                None => format!("(var {})", name.name),
            },

            Stmt::Function(decl) => self.print_function("fun", decl),

            Stmt::Class { name, methods } => {
                let mut out: String = format!("(class {}", name.name);

                for method in methods {
                    out.push(' ');
                    out.push_str(&self.print_function("method", method));
                }

                out.push(')');
                out
            }

            Stmt::Block(statements) => format!("(block {})", self.print_body(statements)),

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => match else_branch {
                Some(else_branch) => format!(
                    "(if {} {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch),
                    self.print_stmt(else_branch)
                ),
                None => format!(
                    "(if {} {})",
                    self.print(condition),
                    self.print_stmt(then_branch)
                ),
            },

            Stmt::While { condition, body } => {
                format!("(while {} {})", self.print(condition), self.print_stmt(body))
            }

            Stmt::Return { value, .. } => match value {
                Some(value) => format!("(return {})", self.print(value)),
                None => "(return)".to_string(),
            },
        }
    }

    fn expr(&self, expr: &Expr) -> String {
        match expr {
            Expr::Binary {
                left,
                operator,
                right,
                ..
            } => format!("({} {} {})", operator, self.print(left), self.print(right)),

            Expr::Logical {
                left,
                operator,
                right,
            } => format!("({} {} {})", operator, self.print(left), self.print(right)),

            Expr::Unary {
                operator, right, ..
            } => format!("({} {})", operator, self.print(right)),

            Expr::Literal(literal) => match literal {
                LiteralValue::Number(n) => {
                    if n.fract() == 0.0 {
                        format!("{:.1}", n)
                    } else {
                        n.to_string()
                    }
                }

                LiteralValue::Str(s) => s.to_string(),

                LiteralValue::True => "true".to_string(),

                LiteralValue::False => "false".to_string(),

                LiteralValue::Nil => "nil".to_string(),
            },

            Expr::Grouping(expr) => format!("(group {})", self.print(expr)),

            Expr::Variable(name) => name.name.clone(),

            Expr::Assign { name, value } => format!("(= {} {})", name.name, self.print(value)),

            Expr::Call {
                callee, arguments, ..
            } => {
                if arguments.is_empty() {
                    format!("(call {})", self.print(callee))
                } else {
                    format!("(call {} {})", self.print(callee), self.print_list(arguments))
                }
            }

            Expr::Get { object, name } => format!("(. {} {})", self.print(object), name.name),

            Expr::Set {
                object,
                name,
                value,
            } => format!(
                "(=. {} {} {})",
                self.print(object),
                name.name,
                self.print(value)
            ),

            Expr::This { .. } => "this".to_string(),
        }
    }

    fn print_function(&self, keyword: &str, decl: &FunctionDecl) -> String {
        let params: Vec<&str> = decl.params.iter().map(|p| p.name.as_str()).collect();

        format!(
            "({} {} ({}) {})",
            keyword,
            decl.name.name,
            params.join(" "),
            self.print_body(&decl.body)
        )
    }

    fn print_body(&self, statements: &[Stmt]) -> String {
        statements
            .iter()
            .map(|stmt| self.print_stmt(stmt))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn print_list(&self, exprs: &[Expr]) -> String {
        exprs
            .iter()
            .map(|expr| self.print(expr))
            .collect::<Vec<_>>()
            .join(" ")
    }
}
