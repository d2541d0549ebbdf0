mod ast;
mod builtin;
mod context;
mod environment;
mod error;
mod interpreter;
mod object;
mod parser;
mod token;

#[cfg(test)]
mod test_utils;

pub use ast::{BlockStatement, Expression, FunctionLiteral, InfixOperator, PrefixOperator, Program, Statement};
pub use builtin::Builtin;
pub use context::{evaluate, EvaluationContext, Report};
pub use environment::Environment;
pub use error::{ParseError, ParseErrors, RuntimeError};
pub use interpreter::evaluate_program;
pub use object::{Closure, HashKey, Object, FALSE, NULL, TRUE};
pub use parser::{parse, Parser, Precedence};
pub use token::{Lexer, Token, TokenKind};
