use core::fmt;
use std::{collections::HashMap, rc::Rc};

use itertools::Itertools;

use crate::{ast::FunctionLiteral, builtin::Builtin, environment::Environment, error::RuntimeError};


pub const TRUE: Object = Object::Boolean(true);
pub const FALSE: Object = Object::Boolean(false);
pub const NULL: Object = Object::Null;

/// Runtime value produced by evaluation.
///
/// `Boolean` and `Null` carry no allocation, so the constants above are the
/// only values of their kind and comparing them by value is the same as
/// comparing them by identity. Heap values are shared through `Rc` and are
/// only ever identical to themselves.
#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
    Array(Rc<Vec<Object>>),
    Hash(Rc<HashMap<HashKey, (Object, Object)>>),
    Null,
    /// Pending `return`. Unwrapped at the program or call boundary.
    ReturnValue(Box<Object>),
    Error(Rc<str>),
    Function(Rc<Closure>),
    Builtin(&'static Builtin),
}

/// A function value: the literal it came from and the scope it was defined in.
pub struct Closure {
    pub literal: Rc<FunctionLiteral>,
    pub environment: Rc<Environment>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum HashKey {
    Integer(i64),
    Boolean(bool),
    String(Rc<str>),
}

impl Object {
    pub fn boolean(value: bool) -> Self {
        if value { TRUE } else { FALSE }
    }

    pub fn string(value: impl Into<Rc<str>>) -> Self {
        Self::String(value.into())
    }

    pub fn array(elements: Vec<Object>) -> Self {
        Self::Array(Rc::new(elements))
    }

    pub fn error(message: impl Into<Rc<str>>) -> Self {
        Self::Error(message.into())
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            Self::Integer(_) => "int",
            Self::Boolean(_) => "bool",
            Self::String(_) => "string",
            Self::Array(_) => "array",
            Self::Hash(_) => "hash",
            Self::Null => "null",
            Self::ReturnValue(_) => "return value",
            Self::Error(_) => "error",
            Self::Function(_) => "function",
            Self::Builtin(_) => "builtin",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Errors and pending returns abort whatever composite expression they
    /// show up in.
    pub fn is_unwinding(&self) -> bool {
        matches!(self, Self::Error(_) | Self::ReturnValue(_))
    }

    /// Identity comparison, the meaning of `==` for everything except two
    /// integers.
    pub fn is(&self, other: &Object) -> bool {
        match (self, other) {
            (Self::Boolean(a), Self::Boolean(b)) => a == b,
            (Self::Null, Self::Null) => true,
            (Self::String(a), Self::String(b)) => Rc::ptr_eq(a, b),
            (Self::Array(a), Self::Array(b)) => Rc::ptr_eq(a, b),
            (Self::Hash(a), Self::Hash(b)) => Rc::ptr_eq(a, b),
            (Self::Function(a), Self::Function(b)) => Rc::ptr_eq(a, b),
            (Self::Builtin(a), Self::Builtin(b)) => std::ptr::eq(*a, *b),
            (Self::Error(a), Self::Error(b)) => Rc::ptr_eq(a, b),
            (Self::ReturnValue(a), Self::ReturnValue(b)) => a.is(b),
            _ => false,
        }
    }

    pub fn hash_key(&self) -> Result<HashKey, RuntimeError> {
        match self {
            Self::Integer(value) => Ok(HashKey::Integer(*value)),
            Self::Boolean(value) => Ok(HashKey::Boolean(*value)),
            Self::String(value) => Ok(HashKey::String(value.clone())),
            other => Err(RuntimeError::UnusableHashKey(other.type_name())),
        }
    }
}

impl From<RuntimeError> for Object {
    fn from(error: RuntimeError) -> Self {
        Self::error(error.to_string())
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(value) => write!(f, "{}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::String(value) => f.write_str(value),
            Self::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            Self::Hash(pairs) => {
                let pairs = pairs.values()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .sorted()
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Self::Null => write!(f, "null"),
            Self::ReturnValue(value) => fmt::Display::fmt(value, f),
            Self::Error(message) => write!(f, "Error: {}", message),
            Self::Function(closure) => fmt::Display::fmt(&closure.literal, f),
            Self::Builtin(_) => write!(f, "builtin function"),
        }
    }
}

// Closures can reach themselves through their environment, so Debug must not
// walk into it
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::String(value) => write!(f, "{:?}", value),
            Self::Error(message) => write!(f, "Error({:?})", message),
            Self::Builtin(builtin) => write!(f, "Builtin({})", builtin.name),
            other => fmt::Display::fmt(other, f),
        }
    }
}

impl fmt::Debug for Closure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Closure({})", self.literal)
    }
}

#[cfg(test)]
mod tests {
    use crate::{ast::BlockStatement, builtin};

    use super::*;

    #[test]
    fn renders_canonical_forms() {
        assert_eq!(Object::Integer(-42).to_string(), "-42");
        assert_eq!(TRUE.to_string(), "true");
        assert_eq!(NULL.to_string(), "null");
        assert_eq!(Object::string("raw text").to_string(), "raw text");
        assert_eq!(
            Object::array(vec![Object::Integer(1), Object::string("two"), FALSE]).to_string(),
            "[1, two, false]"
        );
        assert_eq!(Object::error("boom").to_string(), "Error: boom");
        assert_eq!(Object::ReturnValue(Box::new(Object::Integer(3))).to_string(), "3");
    }

    #[test]
    fn hash_renders_sorted() -> anyhow::Result<()> {
        let mut pairs = HashMap::new();
        for (key, value) in [(Object::string("b"), 2), (Object::string("a"), 1)] {
            pairs.insert(key.hash_key()?, (key, Object::Integer(value)));
        }

        assert_eq!(Object::Hash(Rc::new(pairs)).to_string(), "{a: 1, b: 2}");
        Ok(())
    }

    #[test]
    fn identity() {
        assert!(TRUE.is(&Object::boolean(true)));
        assert!(!TRUE.is(&FALSE));
        assert!(NULL.is(&NULL));
        assert!(!NULL.is(&FALSE));
        assert!(Object::error("boom").is_error());
        assert!(!NULL.is_error());

        let array = Object::array(vec![Object::Integer(1)]);
        assert!(array.is(&array.clone()));
        assert!(!array.is(&Object::array(vec![Object::Integer(1)])));

        let closure = Object::Function(Rc::new(Closure {
            literal: Rc::new(FunctionLiteral { parameters: vec![], body: BlockStatement::default() }),
            environment: Environment::root(),
        }));
        assert!(closure.is(&closure.clone()));
        assert_eq!(closure.to_string(), "fn() {}");

        let (len, puts) = (builtin::lookup("len").unwrap(), builtin::lookup("puts").unwrap());
        assert!(Object::Builtin(len).is(&Object::Builtin(len)));
        assert!(!Object::Builtin(len).is(&Object::Builtin(puts)));
    }

    #[test]
    fn hash_keys() {
        assert_eq!(Object::Integer(1).hash_key(), Ok(HashKey::Integer(1)));
        assert_eq!(Object::string("a").hash_key(), Object::string("a").hash_key());
        assert_eq!(NULL.hash_key(), Err(RuntimeError::UnusableHashKey("null")));
    }
}
