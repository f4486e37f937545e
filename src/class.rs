//! Classes and instances.
//!
//! A class owns an immutable method table and an optional link to its
//! superclass; lookups walk that chain at call time rather than flattening it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use log::debug;

use crate::error::{LoxError, Result};
use crate::function::{Callable, LoxFunction, LoxGetter};
use crate::interpreter::Interpreter;
use crate::value::Value;

/// An entry of a class's method table.
#[derive(Clone)]
pub enum Member<'a> {
    Method(Rc<LoxFunction<'a>>),
    Getter(Rc<LoxGetter<'a>>),
}

impl<'a> Member<'a> {
    /// Bind `this` to `instance`, yielding a callable value.
    pub fn bind(&self, instance: &Rc<LoxInstance<'a>>) -> Callable<'a> {
        match self {
            Member::Method(method) => Callable::Function(Rc::new(method.bind(instance))),
            Member::Getter(getter) => Callable::Getter(Rc::new(getter.bind(instance))),
        }
    }
}

/// What a property read on an instance found.
pub enum Property<'a> {
    /// A stored field, returned as is even when it holds a callable.
    Field(Value<'a>),

    /// A class member, still unbound.
    Member(Member<'a>),
}

pub struct LoxClass<'a> {
    name: String,
    methods: HashMap<String, Member<'a>>,
    superclass: Option<Rc<LoxClass<'a>>>,
}

impl<'a> LoxClass<'a> {
    pub fn new(
        name: &str,
        methods: HashMap<String, Member<'a>>,
        superclass: Option<Rc<LoxClass<'a>>>,
    ) -> Self {
        Self {
            name: name.to_string(),
            methods,
            superclass,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Own table first, then the superclass chain.
    pub fn find_method(&self, name: &str) -> Option<Member<'a>> {
        match self.methods.get(name) {
            Some(member) => Some(member.clone()),
            None => self.superclass.as_ref()?.find_method(name),
        }
    }

    fn initializer(&self) -> Option<Rc<LoxFunction<'a>>> {
        match self.find_method("init")? {
            Member::Method(init) => Some(init),
            Member::Getter(_) => None,
        }
    }

    /// Arity of `init` (inherited or own), or zero.
    pub fn arity(&self) -> usize {
        self.initializer().map_or(0, |init| init.arity())
    }

    /// Allocate an instance and run the initializer, if any, on it.
    pub fn instantiate(
        class: &Rc<LoxClass<'a>>,
        interpreter: &mut Interpreter<'a>,
        arguments: Vec<Value<'a>>,
    ) -> Result<Value<'a>> {
        debug!("Instantiating class '{}'", class.name);

        let instance: Rc<LoxInstance<'a>> = Rc::new(LoxInstance::new(Rc::clone(class)));

        if let Some(init) = class.initializer() {
            init.bind(&instance).call(interpreter, arguments)?;
        }

        Ok(Value::Instance(instance))
    }
}

impl<'a> fmt::Debug for LoxClass<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxClass")
            .field("name", &self.name)
            .field("methods", &self.methods.keys().collect::<Vec<_>>())
            .field("superclass", &self.superclass.as_ref().map(|s| s.name()))
            .finish()
    }
}

pub struct LoxInstance<'a> {
    class: Rc<LoxClass<'a>>,
    fields: RefCell<HashMap<String, Value<'a>>>,
}

impl<'a> LoxInstance<'a> {
    pub fn new(class: Rc<LoxClass<'a>>) -> Self {
        Self {
            class,
            fields: RefCell::new(HashMap::new()),
        }
    }

    pub fn class(&self) -> &Rc<LoxClass<'a>> {
        &self.class
    }

    /// Field first, then the class's member table.  Binding a method or
    /// running a getter is the caller's job.
    pub fn get(instance: &Rc<LoxInstance<'a>>, name: &str, line: usize) -> Result<Property<'a>> {
        if let Some(value) = instance.fields.borrow().get(name) {
            return Ok(Property::Field(value.clone()));
        }

        match instance.class.find_method(name) {
            Some(member) => Ok(Property::Member(member)),
            None => Err(LoxError::runtime(
                line,
                format!("Undefined property '{}'.", name),
            )),
        }
    }

    /// Create or overwrite a field.
    pub fn set(&self, name: &str, value: Value<'a>) {
        self.fields.borrow_mut().insert(name.to_string(), value);
    }
}

impl<'a> fmt::Debug for LoxInstance<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoxInstance")
            .field("class", &self.class.name)
            .field("fields", &self.fields.borrow().keys().collect::<Vec<_>>())
            .finish()
    }
}
