use core::fmt;
use std::rc::Rc;

use itertools::Itertools;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    environment::Environment,
    error::ParseErrors,
    interpreter::evaluate_program,
    object::Object,
    parser::parse,
};


/// Lexes, parses and evaluates `source` against `environment`.
///
/// Nothing is evaluated when the source has syntax errors. `Ok(None)` means
/// the program produced no value (it was empty or ended in a `let`).
pub fn evaluate(source: &str, environment: &Rc<Environment>) -> Result<Option<Object>, ParseErrors> {
    let program = parse(source)?;
    Ok(evaluate_program(&program, environment))
}

/// An evaluation session. Bindings made by one call to
/// [`evaluate_str`](Self::evaluate_str) stay visible to the next.
pub struct EvaluationContext {
    environment: Rc<Environment>,
}

impl EvaluationContext {
    pub fn new() -> Self {
        Self::with_environment(Environment::root())
    }

    pub fn with_environment(environment: Rc<Environment>) -> Self {
        Self { environment }
    }

    pub fn environment(&self) -> &Rc<Environment> {
        &self.environment
    }

    pub fn evaluate_str(&mut self, source: &str) -> Result<Option<Object>, ParseErrors> {
        debug!(source, "evaluating");

        let result = evaluate(source, &self.environment);
        match &result {
            Ok(Some(value)) if value.is_error() => debug!(%value, "runtime error"),
            Ok(_) => {}
            Err(errors) => debug!(count = errors.len(), "rejected with syntax errors"),
        }

        result
    }

    pub fn report(&mut self, source: &str) -> Report {
        self.evaluate_str(source).into()
    }
}

impl Default for EvaluationContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Serialisable outcome of evaluating one piece of source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum Report {
    Value { output: String },
    Empty,
    Runtime { message: String },
    Syntax { errors: Vec<String> },
}

impl From<Result<Option<Object>, ParseErrors>> for Report {
    fn from(result: Result<Option<Object>, ParseErrors>) -> Self {
        match result {
            Ok(Some(Object::Error(message))) => Self::Runtime { message: message.to_string() },
            Ok(Some(value)) => Self::Value { output: value.to_string() },
            Ok(None) => Self::Empty,
            Err(errors) => Self::Syntax { errors: errors.iter().map(ToString::to_string).collect() },
        }
    }
}

impl Report {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Value { .. } | Self::Empty)
    }
}

/// The shell rendering: values in canonical form, runtime errors prefixed with
/// `Error:`, syntax errors one per line, nothing for an empty result.
impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value { output } => f.write_str(output),
            Self::Empty => Ok(()),
            Self::Runtime { message } => write!(f, "Error: {}", message),
            Self::Syntax { errors } => write!(f, "{}", errors.iter().join("\n")),
        }
    }
}
