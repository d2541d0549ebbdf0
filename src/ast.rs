use core::fmt;
use std::rc::Rc;

use itertools::Itertools;


/// Root of every parse. Owns the whole tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

/// Body of an `if` branch or a function. Unlike [`Program`], a block hands a
/// pending `return` back to its caller untouched.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Let { name: String, value: Expression },
    Return(Expression),
    Expression(Expression),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOperator {
    Not,
    Negate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOperator {
    Add,
    Subtract,
    Multiply,
    Divide,
    LessThan,
    GreaterThan,
    Equal,
    NotEqual,
}

/// A function literal is shared between the tree and every closure created
/// from it, so it lives behind an `Rc`.
#[derive(Debug, Clone, PartialEq)]
pub struct FunctionLiteral {
    pub parameters: Vec<String>,
    pub body: BlockStatement,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    Integer(i64),
    String(String),
    Boolean(bool),
    Array(Vec<Expression>),
    Hash(Vec<(Expression, Expression)>),
    Prefix { operator: PrefixOperator, right: Box<Expression> },
    Infix { operator: InfixOperator, left: Box<Expression>, right: Box<Expression> },
    If { condition: Box<Expression>, consequence: BlockStatement, alternative: Option<BlockStatement> },
    Function(Rc<FunctionLiteral>),
    Call { callee: Box<Expression>, arguments: Vec<Expression> },
    Index { collection: Box<Expression>, index: Box<Expression> },
}

impl fmt::Display for PrefixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Not => "!",
            Self::Negate => "-",
        })
    }
}

impl fmt::Display for InfixOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::LessThan => "<",
            Self::GreaterThan => ">",
            Self::Equal => "==",
            Self::NotEqual => "!=",
        })
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.iter().join(" "))
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.statements.iter().join(" "))
    }
}

fn braced(block: &BlockStatement) -> String {
    if block.statements.is_empty() { return "{}".to_owned() }
    format!("{{ {} }}", block)
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Let { name, value } => write!(f, "let {} = {};", name, value),
            Self::Return(value) => write!(f, "return {};", value),
            Self::Expression(expression) => fmt::Display::fmt(expression, f),
        }
    }
}

impl fmt::Display for FunctionLiteral {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn({}) {}", self.parameters.iter().join(", "), braced(&self.body))
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier(name) => f.write_str(name),
            Self::Integer(value) => write!(f, "{}", value),
            Self::String(value) => write!(f, "{:?}", value),
            Self::Boolean(value) => write!(f, "{}", value),
            Self::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            Self::Hash(pairs) => {
                let pairs = pairs.iter()
                    .map(|(key, value)| format!("{}: {}", key, value))
                    .join(", ");
                write!(f, "{{{}}}", pairs)
            }
            Self::Prefix { operator, right } => write!(f, "({}{})", operator, right),
            Self::Infix { operator, left, right } => write!(f, "({} {} {})", left, operator, right),
            Self::If { condition, consequence, alternative } => {
                write!(f, "if {} {}", condition, braced(consequence))?;
                if let Some(alternative) = alternative {
                    write!(f, " else {}", braced(alternative))?;
                }
                Ok(())
            }
            Self::Function(literal) => fmt::Display::fmt(literal, f),
            Self::Call { callee, arguments } => write!(f, "{}({})", callee, arguments.iter().join(", ")),
            Self::Index { collection, index } => write!(f, "({}[{}])", collection, index),
        }
    }
}
