//! End‑to‑end pipeline helpers: source → tokens → AST → resolved → executed.
//!
//! Each stage hands back every diagnostic it found, so callers (the CLI and
//! the integration tests) only decide how to print them and with which exit
//! code.

use log::info;

use crate::error::{LoxError, Result};
use crate::interpreter::Interpreter;
use crate::parser::{Expr, Parser, Stmt};
use crate::resolver::Resolver;
use crate::scanner::Scanner;
use crate::token::Token;
use crate::value::Value;

/// Scan `source` completely.  Lexical errors do not stop the scan; all of
/// them are returned together.
pub fn scan(source: &str) -> Result<Vec<Token<'_>>> {
    let mut tokens: Vec<Token<'_>> = Vec::new();
    let mut errors: Vec<LoxError> = Vec::new();

    for item in Scanner::new(source) {
        match item {
            Ok(token) => tokens.push(token),
            Err(e) => errors.push(e),
        }
    }

    if !errors.is_empty() {
        return Err(LoxError::from_many(errors));
    }

    info!("Scanned {} token(s)", tokens.len());

    Ok(tokens)
}

/// Parse a token stream as a program.
pub fn parse<'a>(tokens: &'a [Token<'a>]) -> Result<Vec<Stmt<'a>>> {
    Parser::new(tokens).parse()
}

/// Parse a token stream as exactly one expression.
pub fn parse_expression<'a>(tokens: &'a [Token<'a>]) -> Result<Expr<'a>> {
    Parser::new(tokens).parse_expression()
}

/// Resolve, then interpret.  Nothing runs if resolution reports an error.
pub fn execute<'a>(interpreter: &mut Interpreter<'a>, statements: &'a [Stmt<'a>]) -> Result<()> {
    Resolver::new(interpreter).resolve(statements)?;
    interpreter.interpret(statements)
}

/// Resolve, then evaluate a single expression.
pub fn evaluate<'a>(interpreter: &mut Interpreter<'a>, expr: &'a Expr<'a>) -> Result<Value<'a>> {
    Resolver::new(interpreter).resolve_expression(expr)?;
    interpreter.evaluate(expr)
}
