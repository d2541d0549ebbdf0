use std::{collections::HashMap, rc::Rc};

use tracing::instrument;

use crate::{
    ast::{BlockStatement, Expression, InfixOperator, PrefixOperator, Program, Statement},
    builtin,
    environment::Environment,
    error::RuntimeError,
    object::{Closure, Object, NULL, TRUE},
};


// Hands a pending return or an error straight back to the caller
macro_rules! propagate {
    ($value:expr) => {{
        let value = $value;
        if value.is_unwinding() { return value }
        value
    }};
}

/// Evaluates a whole program in `environment`.
///
/// A top level `return` ends the program with its payload, an error ends it
/// with the error. Otherwise the value of the last statement is the result;
/// `None` when that statement is a `let` or the program is empty.
#[instrument(level = "debug", skip_all, fields(statements = program.statements.len()))]
pub fn evaluate_program(program: &Program, environment: &Rc<Environment>) -> Option<Object> {
    let mut result = None;

    for statement in &program.statements {
        match evaluate_statement(statement, environment) {
            Some(Object::ReturnValue(value)) => return Some(*value),
            Some(error @ Object::Error(_)) => return Some(error),
            value => result = value,
        }
    }

    result
}

fn evaluate_block(block: &BlockStatement, environment: &Rc<Environment>) -> Object {
    let mut result = NULL;

    for statement in &block.statements {
        // Left wrapped so the enclosing call still sees the return
        result = evaluate_statement(statement, environment).unwrap_or(NULL);
        if result.is_unwinding() { return result }
    }

    result
}

fn evaluate_statement(statement: &Statement, environment: &Rc<Environment>) -> Option<Object> {
    match statement {
        Statement::Let { name, value } => {
            let value = evaluate_expression(value, environment);
            if value.is_unwinding() { return Some(value) }

            environment.set(name.as_str(), value);
            None
        }
        Statement::Return(value) => {
            let value = evaluate_expression(value, environment);
            if value.is_unwinding() { return Some(value) }

            Some(Object::ReturnValue(Box::new(value)))
        }
        Statement::Expression(expression) => Some(evaluate_expression(expression, environment)),
    }
}

fn evaluate_expression(expression: &Expression, environment: &Rc<Environment>) -> Object {
    match expression {
        Expression::Identifier(name) => evaluate_identifier(name, environment),
        Expression::Integer(value) => Object::Integer(*value),
        Expression::String(value) => Object::string(value.as_str()),
        Expression::Boolean(value) => Object::boolean(*value),
        Expression::Array(elements) => match evaluate_list(elements, environment) {
            Ok(values) => Object::array(values),
            Err(unwinding) => unwinding,
        },
        Expression::Hash(pairs) => evaluate_hash(pairs, environment),
        Expression::Prefix { operator, right } => {
            let right = propagate!(evaluate_expression(right, environment));
            evaluate_prefix(*operator, right)
        }
        Expression::Infix { operator, left, right } => {
            let left = propagate!(evaluate_expression(left, environment));
            let right = propagate!(evaluate_expression(right, environment));
            evaluate_infix(*operator, left, right)
        }
        Expression::If { condition, consequence, alternative } => {
            let condition = propagate!(evaluate_expression(condition, environment));

            // Only the canonical `true` selects the consequence
            if condition.is(&TRUE) {
                evaluate_block(consequence, environment)
            } else if let Some(alternative) = alternative {
                evaluate_block(alternative, environment)
            } else {
                NULL
            }
        }
        Expression::Function(literal) => Object::Function(Rc::new(Closure {
            literal: Rc::clone(literal),
            environment: Rc::clone(environment),
        })),
        Expression::Call { callee, arguments } => {
            let callee = propagate!(evaluate_expression(callee, environment));
            match evaluate_list(arguments, environment) {
                Ok(arguments) => apply_function(callee, arguments),
                Err(unwinding) => unwinding,
            }
        }
        Expression::Index { collection, index } => {
            let collection = propagate!(evaluate_expression(collection, environment));
            let index = propagate!(evaluate_expression(index, environment));
            evaluate_index(collection, index)
        }
    }
}

fn evaluate_identifier(name: &str, environment: &Rc<Environment>) -> Object {
    environment.get(name)
        .or_else(|| builtin::lookup(name).map(Object::Builtin))
        .unwrap_or_else(|| RuntimeError::UndefinedName(name.to_owned()).into())
}

// Left to right, stopping at the first error
fn evaluate_list(expressions: &[Expression], environment: &Rc<Environment>) -> Result<Vec<Object>, Object> {
    expressions.iter()
        .map(|expression| {
            let value = evaluate_expression(expression, environment);
            if value.is_unwinding() { Err(value) } else { Ok(value) }
        })
        .collect()
}

fn evaluate_hash(pairs: &[(Expression, Expression)], environment: &Rc<Environment>) -> Object {
    let mut hash = HashMap::with_capacity(pairs.len());

    for (key, value) in pairs {
        let key = propagate!(evaluate_expression(key, environment));
        let hash_key = match key.hash_key() {
            Ok(hash_key) => hash_key,
            Err(error) => return error.into(),
        };
        let value = propagate!(evaluate_expression(value, environment));

        hash.insert(hash_key, (key, value));
    }

    Object::Hash(Rc::new(hash))
}

fn evaluate_prefix(operator: PrefixOperator, right: Object) -> Object {
    match (operator, right) {
        (PrefixOperator::Not, right) => Object::boolean(!right.is(&TRUE)),
        (PrefixOperator::Negate, Object::Integer(value)) => Object::Integer(value.wrapping_neg()),
        (PrefixOperator::Negate, right) => RuntimeError::UnsupportedPrefix {
            operator: operator.to_string(),
            operand: right.type_name(),
        }.into(),
    }
}

fn unsupported_infix(operator: InfixOperator, left: &Object, right: &Object) -> Object {
    RuntimeError::UnsupportedInfix {
        left: left.type_name(),
        operator: operator.to_string(),
        right: right.type_name(),
    }.into()
}

fn evaluate_infix(operator: InfixOperator, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(left), Object::Integer(right)) => evaluate_integer_infix(operator, *left, *right),
        (Object::String(l), Object::String(r)) => match operator {
            InfixOperator::Add => Object::string(format!("{}{}", l, r)),
            _ => unsupported_infix(operator, &left, &right),
        },
        _ => match operator {
            InfixOperator::Equal => Object::boolean(left.is(&right)),
            InfixOperator::NotEqual => Object::boolean(!left.is(&right)),
            _ => unsupported_infix(operator, &left, &right),
        },
    }
}

fn evaluate_integer_infix(operator: InfixOperator, left: i64, right: i64) -> Object {
    match operator {
        InfixOperator::Add => Object::Integer(left.wrapping_add(right)),
        InfixOperator::Subtract => Object::Integer(left.wrapping_sub(right)),
        InfixOperator::Multiply => Object::Integer(left.wrapping_mul(right)),
        InfixOperator::Divide if right == 0 => RuntimeError::DivisionByZero.into(),
        InfixOperator::Divide => Object::Integer(left.wrapping_div(right)),
        InfixOperator::LessThan => Object::boolean(left < right),
        InfixOperator::GreaterThan => Object::boolean(left > right),
        InfixOperator::Equal => Object::boolean(left == right),
        InfixOperator::NotEqual => Object::boolean(left != right),
    }
}

fn evaluate_index(collection: Object, index: Object) -> Object {
    match (&collection, &index) {
        (Object::Array(elements), Object::Integer(position)) => usize::try_from(*position).ok()
            .and_then(|position| elements.get(position))
            .cloned()
            .unwrap_or_else(|| RuntimeError::IndexOutOfRange.into()),
        (Object::Hash(pairs), key) => match key.hash_key() {
            Ok(key) => pairs.get(&key).map(|(_, value)| value.clone()).unwrap_or(NULL),
            Err(error) => error.into(),
        },
        (collection, index) => RuntimeError::IndexNotSupported {
            collection: collection.type_name(),
            index: index.type_name(),
        }.into(),
    }
}

#[instrument(level = "trace", skip_all, fields(callee = callee.type_name(), arity = arguments.len()))]
fn apply_function(callee: Object, arguments: Vec<Object>) -> Object {
    match callee {
        Object::Function(closure) => {
            let parameters = &closure.literal.parameters;
            if parameters.len() != arguments.len() {
                return RuntimeError::WrongArity { expected: parameters.len(), got: arguments.len() }.into()
            }

            let scope = closure.environment.child();
            for (parameter, argument) in parameters.iter().zip(arguments) {
                scope.set(parameter.as_str(), argument);
            }

            match evaluate_block(&closure.literal.body, &scope) {
                Object::ReturnValue(value) => *value,
                value => value,
            }
        }
        Object::Builtin(builtin) => builtin.call(arguments),
        other => RuntimeError::NotAFunction(other.type_name()).into(),
    }
}
