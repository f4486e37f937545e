//! Callable runtime objects: native functions, user functions, getters, and
//! (through [`Callable::Class`]) class constructors.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use log::{debug, info};

use crate::class::{LoxClass, LoxInstance};
use crate::environment::{EnvRef, Environment};
use crate::error::{LoxError, Result};
use crate::interpreter::{Flow, Interpreter};
use crate::parser::{FunctionDecl, GetterDecl};
use crate::value::Value;

/// Host function signature.  Errors are plain messages; the interpreter
/// attaches the call site's line.
pub type NativeFn = for<'v> fn(&[Value<'v>]) -> std::result::Result<Value<'v>, String>;

/// A function implemented in Rust and pre‑registered in the global scope.
pub struct NativeFunction {
    pub name: &'static str,
    pub arity: usize,
    pub func: NativeFn,
}

/// A user function or method: its declaration plus the scope it closed over.
pub struct LoxFunction<'a> {
    declaration: &'a FunctionDecl<'a>,
    closure: EnvRef<'a>,
    is_initializer: bool,
}

impl<'a> LoxFunction<'a> {
    pub fn new(declaration: &'a FunctionDecl<'a>, closure: EnvRef<'a>, is_initializer: bool) -> Self {
        Self {
            declaration,
            closure,
            is_initializer,
        }
    }

    pub fn name(&self) -> &'a str {
        self.declaration.name.lexeme
    }

    pub fn arity(&self) -> usize {
        self.declaration.params.len()
    }

    /// Produce a copy whose closure has `this` bound to `instance`.
    /// The original closure is left untouched.
    pub fn bind(&self, instance: &Rc<LoxInstance<'a>>) -> LoxFunction<'a> {
        debug!("Binding method '{}' to instance", self.name());

        LoxFunction {
            declaration: self.declaration,
            closure: bind_this(&self.closure, instance),
            is_initializer: self.is_initializer,
        }
    }

    /// Run the body in a fresh scope parented on the closure (never the
    /// caller's scope).  Arity has already been checked by the caller.
    pub fn call(&self, interpreter: &mut Interpreter<'a>, arguments: Vec<Value<'a>>) -> Result<Value<'a>> {
        debug!("Calling function '{}'", self.name());

        let mut frame: Environment<'a> = Environment::with_enclosing(Rc::clone(&self.closure));
        for (param, argument) in self.declaration.params.iter().zip(arguments) {
            frame.define(param.lexeme, argument);
        }

        let flow: Flow<'a> = interpreter.execute_block(&self.declaration.body, frame.into_ref())?;

        if self.is_initializer {
            // An initializer always yields its receiver.
            return Ok(self.closure.borrow().get_local("this").unwrap_or(Value::Nil));
        }

        match flow {
            Flow::Return(value) => {
                info!("Function '{}' returned: {}", self.name(), value);
                Ok(value)
            }
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

/// A zero‑arity class member invoked automatically on property access.
pub struct LoxGetter<'a> {
    declaration: &'a GetterDecl<'a>,
    closure: EnvRef<'a>,
}

impl<'a> LoxGetter<'a> {
    pub fn new(declaration: &'a GetterDecl<'a>, closure: EnvRef<'a>) -> Self {
        Self {
            declaration,
            closure,
        }
    }

    pub fn name(&self) -> &'a str {
        self.declaration.name.lexeme
    }

    pub fn bind(&self, instance: &Rc<LoxInstance<'a>>) -> LoxGetter<'a> {
        LoxGetter {
            declaration: self.declaration,
            closure: bind_this(&self.closure, instance),
        }
    }

    pub fn call(&self, interpreter: &mut Interpreter<'a>) -> Result<Value<'a>> {
        debug!("Invoking getter '{}'", self.name());

        let frame: EnvRef<'a> = Environment::with_enclosing(Rc::clone(&self.closure)).into_ref();

        match interpreter.execute_block(&self.declaration.body, frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal => Ok(Value::Nil),
        }
    }
}

fn bind_this<'a>(closure: &EnvRef<'a>, instance: &Rc<LoxInstance<'a>>) -> EnvRef<'a> {
    let mut scope: Environment<'a> = Environment::with_enclosing(Rc::clone(closure));
    scope.define("this", Value::Instance(Rc::clone(instance)));
    Rc::new(RefCell::new(scope))
}

/// Everything that may appear in callee position.
#[derive(Clone)]
pub enum Callable<'a> {
    Native(Rc<NativeFunction>),
    Function(Rc<LoxFunction<'a>>),
    Getter(Rc<LoxGetter<'a>>),
    Class(Rc<LoxClass<'a>>),
}

impl<'a> Callable<'a> {
    pub fn arity(&self) -> usize {
        match self {
            Callable::Native(native) => native.arity,
            Callable::Function(function) => function.arity(),
            Callable::Getter(_) => 0,
            Callable::Class(class) => class.arity(),
        }
    }

    /// Invoke with already evaluated, arity‑checked arguments.
    pub fn call(
        &self,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
        line: usize,
    ) -> Result<Value<'a>> {
        match self {
            Callable::Native(native) => {
                debug!("Calling native function '{}'", native.name);
                (native.func)(&arguments).map_err(|message| LoxError::runtime(line, message))
            }
            Callable::Function(function) => function.call(interpreter, arguments),
            Callable::Getter(getter) => getter.call(interpreter),
            Callable::Class(class) => LoxClass::instantiate(class, interpreter, arguments),
        }
    }

    /// Identity comparison.
    pub fn same(&self, other: &Callable<'a>) -> bool {
        match (self, other) {
            (Callable::Native(a), Callable::Native(b)) => Rc::ptr_eq(a, b),
            (Callable::Function(a), Callable::Function(b)) => Rc::ptr_eq(a, b),
            (Callable::Getter(a), Callable::Getter(b)) => Rc::ptr_eq(a, b),
            (Callable::Class(a), Callable::Class(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<'a> fmt::Display for Callable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Callable::Native(_) => write!(f, "<native fn>"),
            Callable::Function(function) => write!(f, "<fn {}>", function.name()),
            Callable::Getter(getter) => write!(f, "<fn {}>", getter.name()),
            Callable::Class(class) => write!(f, "{}", class.name()),
        }
    }
}

// Closures can reach themselves through their environment; print names only.
impl<'a> fmt::Debug for Callable<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Callable({})", self)
    }
}
