//! Tree‑walking evaluator.
//!
//! Variable references are looked up through the distances recorded by the
//! [`Resolver`](crate::resolver::Resolver): a recorded distance is fetched with
//! [`Environment::get_at`], anything unrecorded is a global.  The resolver must
//! have run over the *same* tree that is executed, since the side‑table is keyed
//! on node addresses.

use std::collections::HashMap;
use std::io::{self, Write};
use std::rc::Rc;

use chrono::Utc;
use log::{debug, info};

use crate::class::{LoxClass, LoxInstance, Member, Property};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::function::{Callable, LoxFunction, LoxGetter, NativeFunction};
use crate::parser::{Expr, LiteralValue, Stmt};
use crate::token::{Token, TokenType};
use crate::value::Value;

/// Outcome of executing a statement.  `return` unwinds as a value through
/// this type up to the nearest call frame; it never travels the error channel.
#[derive(Debug)]
pub enum Flow<'a> {
    Normal,
    Return(Value<'a>),
}

/// Deepest Lox call nesting before a runtime "Stack overflow." error.
pub const MAX_CALL_DEPTH: usize = 256;

/// Side‑table key: the address of an expression node.
fn node_key(expr: &Expr<'_>) -> usize {
    expr as *const Expr<'_> as usize
}

pub struct Interpreter<'a> {
    globals: EnvRef<'a>,
    environment: EnvRef<'a>,
    locals: HashMap<usize, usize>,
    repl: bool,
    call_depth: usize,
    out: Box<dyn Write + 'a>,
}

impl<'a> Interpreter<'a> {
    /// Creates an Interpreter writing to stdout and defines native functions such as `clock`.
    pub fn new() -> Self {
        Self::with_output(Box::new(io::stdout()))
    }

    /// Creates an Interpreter that writes `print` output to `out`.
    pub fn with_output(out: Box<dyn Write + 'a>) -> Self {
        info!("Initializing Interpreter");

        let globals: EnvRef<'a> = Environment::new().into_ref();

        debug!("Defining native function 'clock'");

        globals.borrow_mut().define(
            "clock",
            Value::Callable(Callable::Native(Rc::new(NativeFunction {
                name: "clock",
                arity: 0,
                func: clock,
            }))),
        );

        Self {
            environment: Rc::clone(&globals),
            globals,
            locals: HashMap::new(),
            repl: false,
            call_depth: 0,
            out,
        }
    }

    /// In REPL mode every top‑level expression statement and `var`
    /// declaration echoes its value.
    pub fn set_repl_mode(&mut self, repl: bool) {
        self.repl = repl;
    }

    /// Called by the resolver: `expr` is bound `depth` scopes up.
    pub(crate) fn note_local(&mut self, expr: &Expr<'a>, depth: usize) {
        self.locals.insert(node_key(expr), depth);
    }

    /// Interprets a list of statements (a "program").  Stops at the first
    /// runtime error.
    pub fn interpret(&mut self, statements: &'a [Stmt<'a>]) -> Result<()> {
        debug!("Interpreting {} statements", statements.len());

        for stmt in statements {
            if self.repl {
                self.execute_echoing(stmt)?;
            } else {
                self.execute(stmt)?;
            }
        }

        info!("Interpretation completed successfully");
        Ok(())
    }

    /// REPL form of a top‑level statement: expression statements and `var`
    /// declarations also print their value.
    fn execute_echoing(&mut self, stmt: &'a Stmt<'a>) -> Result<()> {
        match stmt {
            Stmt::Expression(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
            }

            Stmt::Var { name, .. } => {
                self.execute(stmt)?;
                let value = self.environment.borrow().get_local(name.lexeme).unwrap_or(Value::Nil);
                writeln!(self.out, "{}", value)?;
            }

            _ => {
                self.execute(stmt)?;
            }
        }

        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Statements
    // ─────────────────────────────────────────────────────────────────────────

    pub fn execute(&mut self, stmt: &'a Stmt<'a>) -> Result<Flow<'a>> {
        match stmt {
            Stmt::Expression(expr) => {
                self.evaluate(expr)?;
            }

            Stmt::Print(expr) => {
                let value = self.evaluate(expr)?;
                writeln!(self.out, "{}", value)?;
                debug!("Printed value: {}", value);
            }

            Stmt::Var { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };

                debug!("Variable '{}' defined with value: {}", name.lexeme, value);
                self.environment.borrow_mut().define(name.lexeme, value);
            }

            Stmt::Block(statements) => {
                let scope = Environment::with_enclosing(Rc::clone(&self.environment)).into_ref();
                return self.execute_block(statements, scope);
            }

            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition)?.is_truthy() {
                    return self.execute(then_branch);
                } else if let Some(else_stmt) = else_branch {
                    return self.execute(else_stmt);
                }
            }

            Stmt::While { condition, body } => {
                while self.evaluate(condition)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body)? {
                        return Ok(Flow::Return(value));
                    }
                }
            }

            Stmt::Function(decl) => {
                debug!("Defining function '{}'", decl.name.lexeme);

                let function = LoxFunction::new(decl, Rc::clone(&self.environment), false);
                self.environment.borrow_mut().define(
                    decl.name.lexeme,
                    Value::Callable(Callable::Function(Rc::new(function))),
                );
            }

            Stmt::Getter(decl) => {
                let getter = LoxGetter::new(decl, Rc::clone(&self.environment));
                self.environment.borrow_mut().define(
                    decl.name.lexeme,
                    Value::Callable(Callable::Getter(Rc::new(getter))),
                );
            }

            Stmt::Return { value, .. } => {
                let value = match value {
                    Some(expr) => self.evaluate(expr)?,
                    None => Value::Nil,
                };
                debug!("Returning value: {}", value);
                return Ok(Flow::Return(value));
            }

            Stmt::Class {
                name,
                superclass,
                methods,
            } => self.declare_class(name, superclass.as_ref(), methods)?,
        }

        Ok(Flow::Normal)
    }

    /// Run `statements` inside `scope`, restoring the previous scope on every
    /// exit path.
    pub fn execute_block(&mut self, statements: &'a [Stmt<'a>], scope: EnvRef<'a>) -> Result<Flow<'a>> {
        let previous: EnvRef<'a> = std::mem::replace(&mut self.environment, scope);

        let mut outcome: Result<Flow<'a>> = Ok(Flow::Normal);
        for stmt in statements {
            match self.execute(stmt) {
                Ok(Flow::Normal) => {}
                other => {
                    outcome = other;
                    break;
                }
            }
        }

        self.environment = previous;
        outcome
    }

    fn declare_class(
        &mut self,
        name: &'a Token<'a>,
        superclass: Option<&'a Expr<'a>>,
        methods: &'a [Stmt<'a>],
    ) -> Result<()> {
        debug!("Declaring class '{}'", name.lexeme);

        self.environment.borrow_mut().define(name.lexeme, Value::Nil);

        let parent: Option<Rc<LoxClass<'a>>> = match superclass {
            Some(expr) => match self.evaluate(expr)? {
                Value::Callable(Callable::Class(class)) => Some(class),
                _ => {
                    return Err(LoxError::runtime(
                        expr.line(),
                        "Superclass must be a class.",
                    ))
                }
            },
            None => None,
        };

        // Methods of a subclass close over an extra scope holding `super`.
        let method_scope: EnvRef<'a> = match &parent {
            Some(class) => {
                let mut scope = Environment::with_enclosing(Rc::clone(&self.environment));
                scope.define("super", Value::Callable(Callable::Class(Rc::clone(class))));
                scope.into_ref()
            }
            None => Rc::clone(&self.environment),
        };

        let mut table: HashMap<String, Member<'a>> = HashMap::new();
        for method in methods {
            match method {
                Stmt::Function(decl) => {
                    let is_init = decl.name.lexeme == "init";
                    let function = LoxFunction::new(decl, Rc::clone(&method_scope), is_init);
                    table.insert(decl.name.lexeme.to_string(), Member::Method(Rc::new(function)));
                }
                Stmt::Getter(decl) => {
                    let getter = LoxGetter::new(decl, Rc::clone(&method_scope));
                    table.insert(decl.name.lexeme.to_string(), Member::Getter(Rc::new(getter)));
                }
                other => debug!("Ignoring non-method class member {:?}", other),
            }
        }

        let class = LoxClass::new(name.lexeme, table, parent);
        self.environment.borrow_mut().define(
            name.lexeme,
            Value::Callable(Callable::Class(Rc::new(class))),
        );

        info!("Class '{}' defined", name.lexeme);
        Ok(())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Expressions
    // ─────────────────────────────────────────────────────────────────────────

    /// Evaluates an expression and returns a Value.
    pub fn evaluate(&mut self, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        match expr {
            Expr::Literal(lit) => Ok(literal_value(lit)),

            Expr::Grouping(inner) => self.evaluate(inner),

            Expr::Unary { operator, right } => self.evaluate_unary(operator, right),

            Expr::Binary {
                left,
                operator,
                right,
            } => self.evaluate_binary(left, operator, right),

            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left_val = self.evaluate(left)?;

                let short_circuit = if operator.token_type == TokenType::OR {
                    left_val.is_truthy()
                } else {
                    !left_val.is_truthy()
                };

                if short_circuit {
                    Ok(left_val)
                } else {
                    self.evaluate(right)
                }
            }

            Expr::Variable(name) => self.lookup_variable(name.lexeme, name.line, expr),

            Expr::Assign { name, value } => {
                let value = self.evaluate(value)?;

                match self.locals.get(&node_key(expr)) {
                    Some(&distance) => Environment::assign_at(
                        &self.environment,
                        distance,
                        name.lexeme,
                        value.clone(),
                        name.line,
                    )?,
                    None => self
                        .globals
                        .borrow_mut()
                        .assign(name.lexeme, value.clone(), name.line)?,
                }

                Ok(value)
            }

            Expr::Call {
                callee,
                paren,
                arguments,
            } => {
                let callee_val = self.evaluate(callee)?;

                let mut arg_values: Vec<Value<'a>> = Vec::with_capacity(arguments.len());
                for arg in arguments {
                    arg_values.push(self.evaluate(arg)?);
                }

                let callable: Callable<'a> = match callee_val {
                    Value::Callable(callable) => callable,
                    other => {
                        debug!("Attempted to call a {}", other.type_name());
                        return Err(LoxError::runtime(
                            paren.line,
                            "Can only call functions and classes.",
                        ));
                    }
                };

                if arg_values.len() != callable.arity() {
                    return Err(LoxError::runtime(
                        paren.line,
                        format!(
                            "Expected {} arguments but got {}.",
                            callable.arity(),
                            arg_values.len()
                        ),
                    ));
                }

                self.enter_call(paren.line)?;
                let result = callable.call(self, arg_values, paren.line);
                self.call_depth -= 1;
                result
            }

            Expr::Get { object, name } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    match LoxInstance::get(&instance, name.lexeme, name.line)? {
                        Property::Field(value) => Ok(value),
                        Property::Member(member) => self.access_member(member, &instance, name.line),
                    }
                }
                _ => Err(LoxError::runtime(
                    name.line,
                    "Only instances have properties.",
                )),
            },

            Expr::Set {
                object,
                name,
                value,
            } => match self.evaluate(object)? {
                Value::Instance(instance) => {
                    let value = self.evaluate(value)?;
                    instance.set(name.lexeme, value.clone());
                    Ok(value)
                }
                _ => Err(LoxError::runtime(name.line, "Only instances can be set.")),
            },

            Expr::This(keyword) => self.lookup_variable(keyword.lexeme, keyword.line, expr),

            Expr::Super { keyword, method } => self.evaluate_super(keyword, method, expr),
        }
    }

    /// A class getter runs on access; a method comes back bound to `receiver`.
    /// Field values are never invoked, whatever they hold.
    fn access_member(
        &mut self,
        member: Member<'a>,
        receiver: &Rc<LoxInstance<'a>>,
        line: usize,
    ) -> Result<Value<'a>> {
        match member {
            Member::Getter(getter) => {
                self.enter_call(line)?;
                let result = getter.bind(receiver).call(self);
                self.call_depth -= 1;
                result
            }
            method => Ok(Value::Callable(method.bind(receiver))),
        }
    }

    /// Count one more active Lox call, failing past [`MAX_CALL_DEPTH`].
    fn enter_call(&mut self, line: usize) -> Result<()> {
        if self.call_depth >= MAX_CALL_DEPTH {
            return Err(LoxError::runtime(line, "Stack overflow."));
        }
        self.call_depth += 1;
        Ok(())
    }

    fn lookup_variable(&self, name: &str, line: usize, expr: &Expr<'a>) -> Result<Value<'a>> {
        match self.locals.get(&node_key(expr)) {
            Some(&distance) => Environment::get_at(&self.environment, distance, name, line),
            None => self.globals.borrow().get(name, line),
        }
    }

    fn evaluate_super(
        &mut self,
        keyword: &Token<'a>,
        method: &Token<'a>,
        expr: &Expr<'a>,
    ) -> Result<Value<'a>> {
        let distance: usize = *self.locals.get(&node_key(expr)).ok_or_else(|| {
            LoxError::runtime(keyword.line, "Can't use 'super' outside of a class.")
        })?;

        let Value::Callable(Callable::Class(superclass)) =
            Environment::get_at(&self.environment, distance, "super", keyword.line)?
        else {
            return Err(LoxError::runtime(keyword.line, "Superclass must be a class."));
        };

        // `this` lives in the scope just inside the one holding `super`.
        let Value::Instance(receiver) = Environment::get_at(
            &self.environment,
            distance.saturating_sub(1),
            "this",
            keyword.line,
        )?
        else {
            return Err(LoxError::runtime(keyword.line, "Can't use 'this' outside of a class."));
        };

        let member: Member<'a> = superclass.find_method(method.lexeme).ok_or_else(|| {
            LoxError::runtime(
                method.line,
                format!("Undefined property '{}'.", method.lexeme),
            )
        })?;

        self.access_member(member, &receiver, method.line)
    }

    fn evaluate_unary(&mut self, op: &Token<'a>, expr: &'a Expr<'a>) -> Result<Value<'a>> {
        let right_val = self.evaluate(expr)?;

        match op.token_type {
            TokenType::MINUS => match right_val {
                Value::Number(n) => Ok(Value::Number(-n)),
                _ => Err(LoxError::runtime(op.line, "Operand must be a number.")),
            },
            TokenType::BANG => Ok(Value::Bool(!right_val.is_truthy())),
            _ => Err(LoxError::runtime(op.line, "Invalid unary operator.")),
        }
    }

    fn evaluate_binary(
        &mut self,
        left: &'a Expr<'a>,
        op: &Token<'a>,
        right: &'a Expr<'a>,
    ) -> Result<Value<'a>> {
        let left_val = self.evaluate(left)?;
        let right_val = self.evaluate(right)?;
        debug!("Binary '{}': {} , {}", op.lexeme, left_val, right_val);

        match op.token_type {
            TokenType::PLUS => match (left_val, right_val) {
                (Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
                (Value::String(a), Value::String(b)) => Ok(Value::from(format!("{}{}", a, b))),
                (a @ Value::String(_), b) | (a, b @ Value::String(_)) => {
                    Ok(Value::from(format!("{}{}", a, b)))
                }
                _ => Err(LoxError::runtime(
                    op.line,
                    "Operands must be numbers or strings.",
                )),
            },

            TokenType::EQUAL_EQUAL => Ok(Value::Bool(left_val == right_val)),
            TokenType::BANG_EQUAL => Ok(Value::Bool(left_val != right_val)),

            _ => {
                let (Value::Number(a), Value::Number(b)) = (left_val, right_val) else {
                    return Err(LoxError::runtime(op.line, "Operands must be numbers."));
                };

                match op.token_type {
                    TokenType::MINUS => Ok(Value::Number(a - b)),
                    TokenType::STAR => Ok(Value::Number(a * b)),
                    TokenType::SLASH => Ok(Value::Number(a / b)),
                    TokenType::GREATER => Ok(Value::Bool(a > b)),
                    TokenType::GREATER_EQUAL => Ok(Value::Bool(a >= b)),
                    TokenType::LESS => Ok(Value::Bool(a < b)),
                    TokenType::LESS_EQUAL => Ok(Value::Bool(a <= b)),
                    _ => Err(LoxError::runtime(op.line, "Invalid binary operator.")),
                }
            }
        }
    }
}

impl<'a> Default for Interpreter<'a> {
    fn default() -> Self {
        Self::new()
    }
}

fn literal_value<'a>(lit: &LiteralValue) -> Value<'a> {
    match lit {
        LiteralValue::Number(n) => Value::Number(*n),
        LiteralValue::Str(s) => Value::from(s.as_str()),
        LiteralValue::True => Value::Bool(true),
        LiteralValue::False => Value::Bool(false),
        LiteralValue::Nil => Value::Nil,
    }
}

/// Native `clock()`: seconds since the Unix epoch.
fn clock<'v>(_args: &[Value<'v>]) -> std::result::Result<Value<'v>, String> {
    let micros: i64 = Utc::now().timestamp_micros();
    Ok(Value::Number(micros as f64 / 1_000_000.0))
}
