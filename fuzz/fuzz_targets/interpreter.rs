#![no_main]

use core::fmt;

use itertools::Itertools;
use libfuzzer_sys::{arbitrary::Arbitrary, fuzz_target};

// Literals, builtins and loads from variables
#[derive(Arbitrary, Debug)]
enum ViperAtom {
    True, False,
    Len, Puts, First, Last, Rest, Push,

    Identifier(String),
    Integer(i64),
    Text(String),
}

impl fmt::Display for ViperAtom {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", match self {
            ViperAtom::True => "true",
            ViperAtom::False => "false",
            ViperAtom::Len => "len",
            ViperAtom::Puts => "puts",
            ViperAtom::First => "first",
            ViperAtom::Last => "last",
            ViperAtom::Rest => "rest",
            ViperAtom::Push => "push",
            ViperAtom::Identifier(identifier) => identifier,
            ViperAtom::Integer(value) => return write!(f, "{}", value),
            ViperAtom::Text(text) => return write!(f, "{:?}", text),
        })
    }
}

#[derive(Arbitrary, Debug)]
enum ViperOperator {
    Add, Subtract, Multiply, Divide,
    Less, Greater, Equal, NotEqual,
}

impl fmt::Display for ViperOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ViperOperator::Add => "+",
            ViperOperator::Subtract => "-",
            ViperOperator::Multiply => "*",
            ViperOperator::Divide => "/",
            ViperOperator::Less => "<",
            ViperOperator::Greater => ">",
            ViperOperator::Equal => "==",
            ViperOperator::NotEqual => "!=",
        })
    }
}

#[derive(Arbitrary, Debug)]
enum ViperExpression {
    Not(Box<ViperExpression>),
    Negate(Box<ViperExpression>),
    Infix(Box<ViperExpression>, ViperOperator, Box<ViperExpression>),
    If(Box<ViperExpression>, Vec<ViperStatement>, Option<Vec<ViperStatement>>),
    Function(Vec<String>, Vec<ViperStatement>),
    Call(Box<ViperExpression>, Vec<ViperExpression>),
    Index(Box<ViperExpression>, Box<ViperExpression>),
    Array(Vec<ViperExpression>),
    Hash(Vec<(ViperExpression, ViperExpression)>),

    Atom(ViperAtom),
}

#[derive(Arbitrary, Debug)]
enum ViperStatement {
    Let(String, ViperExpression),
    Return(ViperExpression),
    Expression(ViperExpression),
}

fn block(statements: &[ViperStatement]) -> String {
    format!("{{ {} }}", statements.iter().join(" "))
}

impl fmt::Display for ViperExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViperExpression::Not(right) => write!(f, "(!{})", right),
            ViperExpression::Negate(right) => write!(f, "(-{})", right),
            ViperExpression::Infix(left, operator, right) => write!(f, "({} {} {})", left, operator, right),
            ViperExpression::If(condition, consequence, None) => write!(f, "if ({}) {}", condition, block(consequence)),
            ViperExpression::If(condition, consequence, Some(alternative)) => {
                write!(f, "if ({}) {} else {}", condition, block(consequence), block(alternative))
            }
            ViperExpression::Function(parameters, body) => write!(f, "fn({}) {}", parameters.iter().join(", "), block(body)),
            ViperExpression::Call(callee, arguments) => write!(f, "{}({})", callee, arguments.iter().join(", ")),
            ViperExpression::Index(collection, index) => write!(f, "{}[{}]", collection, index),
            ViperExpression::Array(elements) => write!(f, "[{}]", elements.iter().join(", ")),
            ViperExpression::Hash(pairs) => {
                write!(f, "{{{}}}", pairs.iter().map(|(key, value)| format!("{}: {}", key, value)).join(", "))
            }
            ViperExpression::Atom(atom) => fmt::Display::fmt(atom, f),
        }
    }
}

impl fmt::Display for ViperStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ViperStatement::Let(name, value) => write!(f, "let {} = {};", name, value),
            ViperStatement::Return(value) => write!(f, "return {};", value),
            ViperStatement::Expression(value) => write!(f, "{};", value),
        }
    }
}

fuzz_target!(|lines: Vec<Vec<ViperStatement>>| {
    let mut context = viper::EvaluationContext::new();

    for statements in lines {
        let source = statements.iter().join(" ");
        let _ = context.evaluate_str(&source);
    }
});
