use core::{error::Error, fmt};

use itertools::Itertools;

use crate::token::TokenKind;


#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    UnexpectedToken { expected: TokenKind, got: TokenKind },
    NoPrefixRule(TokenKind),
    InvalidInteger(String),
    IllegalToken(String),
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedToken { expected, got } => write!(f, "expected {}, got {}", expected, got),
            Self::NoPrefixRule(kind) => write!(f, "no prefix parse function for {}", kind),
            Self::InvalidInteger(literal) => write!(f, "could not parse {:?} as integer", literal),
            Self::IllegalToken(literal) => write!(f, "illegal token {:?}", literal),
        }
    }
}

impl Error for ParseError {}

/// Every syntax error found in one input, in source order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ParseErrors(pub Vec<ParseError>);

impl ParseErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParseError> {
        self.0.iter()
    }

    pub(crate) fn push(&mut self, error: ParseError) {
        self.0.push(error)
    }
}

impl fmt::Display for ParseErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.iter().join("\n"))
    }
}

impl Error for ParseErrors {}

impl IntoIterator for ParseErrors {
    type Item = ParseError;
    type IntoIter = std::vec::IntoIter<ParseError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

/// Language level failures. These never escape the interpreter as a Rust
/// error; they are turned into [`Object::Error`](crate::Object::Error) values.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeError {
    UndefinedName(String),
    UnsupportedPrefix { operator: String, operand: &'static str },
    UnsupportedInfix { left: &'static str, operator: String, right: &'static str },
    DivisionByZero,
    IndexOutOfRange,
    IndexNotSupported { collection: &'static str, index: &'static str },
    UnusableHashKey(&'static str),
    NotAFunction(&'static str),
    WrongArity { expected: usize, got: usize },
    BuiltinArity { name: &'static str, expected: usize, got: usize },
    BuiltinArgument { name: &'static str, got: &'static str },
    Output(String),
}

impl fmt::Display for RuntimeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UndefinedName(name) => write!(f, "undefined name: '{}'", name),
            Self::UnsupportedPrefix { operator, operand } => write!(f, "unsupported operator: {}'{}'", operator, operand),
            Self::UnsupportedInfix { left, operator, right } => write!(f, "unsupported operator: '{}' {} '{}'", left, operator, right),
            Self::DivisionByZero => write!(f, "division by zero"),
            Self::IndexOutOfRange => write!(f, "list index out of range"),
            Self::IndexNotSupported { collection, index } => write!(f, "index operator not supported: '{}'['{}']", collection, index),
            Self::UnusableHashKey(kind) => write!(f, "unusable as hash key: '{}'", kind),
            Self::NotAFunction(kind) => write!(f, "not a function: {}", kind),
            Self::WrongArity { expected, got } => write!(f, "wrong number of arguments: expected {}, got {}", expected, got),
            Self::BuiltinArity { name, expected, got } => {
                let plural = if *expected == 1 { "" } else { "s" };
                write!(f, "{}() takes exactly {} argument{}: {} given", name, expected, plural, got)
            }
            Self::BuiltinArgument { name, got } => write!(f, "unsupported argument type of {}(): '{}'", name, got),
            Self::Output(message) => write!(f, "could not write output: {}", message),
        }
    }
}

impl Error for RuntimeError {}
