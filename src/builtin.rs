use std::{io::{self, Write}, rc::Rc};

use crate::{error::RuntimeError, object::{Object, NULL}};


type BuiltinResult = Result<Object, RuntimeError>;

/// A host function callable from the language.
#[derive(Debug)]
pub struct Builtin {
    pub name: &'static str,
    function: fn(Vec<Object>) -> BuiltinResult,
}

impl Builtin {
    pub fn call(&self, arguments: Vec<Object>) -> Object {
        (self.function)(arguments).unwrap_or_else(Object::from)
    }
}

static BUILTINS: [Builtin; 6] = [
    Builtin { name: "len", function: builtin_len },
    Builtin { name: "puts", function: builtin_puts },
    Builtin { name: "first", function: builtin_first },
    Builtin { name: "last", function: builtin_last },
    Builtin { name: "rest", function: builtin_rest },
    Builtin { name: "push", function: builtin_push },
];

pub fn lookup(name: &str) -> Option<&'static Builtin> {
    BUILTINS.iter().find(|builtin| builtin.name == name)
}

fn check_arity(name: &'static str, values: &[Object], expected: usize) -> Result<(), RuntimeError> {
    if values.len() != expected {
        return Err(RuntimeError::BuiltinArity { name, expected, got: values.len() })
    }
    Ok(())
}

fn expect_array<'v>(name: &'static str, value: &'v Object) -> Result<&'v Rc<Vec<Object>>, RuntimeError> {
    match value {
        Object::Array(elements) => Ok(elements),
        other => Err(RuntimeError::BuiltinArgument { name, got: other.type_name() }),
    }
}

fn builtin_len(values: Vec<Object>) -> BuiltinResult {
    check_arity("len", &values, 1)?;

    let length = match &values[0] {
        Object::String(value) => value.chars().count(),
        Object::Array(elements) => elements.len(),
        Object::Hash(pairs) => pairs.len(),
        other => return Err(RuntimeError::BuiltinArgument { name: "len", got: other.type_name() }),
    };
    Ok(Object::Integer(length as i64))
}

fn write_lines(out: &mut impl Write, values: &[Object]) -> io::Result<()> {
    for value in values {
        writeln!(out, "{}", value)?;
    }
    out.flush()
}

fn builtin_puts(values: Vec<Object>) -> BuiltinResult {
    write_lines(&mut io::stdout().lock(), &values)
        .map_err(|error| RuntimeError::Output(error.to_string()))?;
    Ok(NULL)
}

fn builtin_first(values: Vec<Object>) -> BuiltinResult {
    check_arity("first", &values, 1)?;
    Ok(expect_array("first", &values[0])?.first().cloned().unwrap_or(NULL))
}

fn builtin_last(values: Vec<Object>) -> BuiltinResult {
    check_arity("last", &values, 1)?;
    Ok(expect_array("last", &values[0])?.last().cloned().unwrap_or(NULL))
}

fn builtin_rest(values: Vec<Object>) -> BuiltinResult {
    check_arity("rest", &values, 1)?;

    let elements = expect_array("rest", &values[0])?;
    if elements.is_empty() { return Ok(NULL) }
    Ok(Object::array(elements[1..].to_vec()))
}

fn builtin_push(values: Vec<Object>) -> BuiltinResult {
    check_arity("push", &values, 2)?;

    let mut elements = expect_array("push", &values[0])?.as_ref().clone();
    elements.push(values[1].clone());
    Ok(Object::array(elements))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, arguments: Vec<Object>) -> String {
        lookup(name)
            .map(|builtin| builtin.call(arguments).to_string())
            .unwrap_or_else(|| format!("no builtin {}", name))
    }

    fn numbers(values: &[i64]) -> Object {
        Object::array(values.iter().copied().map(Object::Integer).collect())
    }

    #[test]
    fn len() {
        assert_eq!(call("len", vec![Object::string("")]), "0");
        assert_eq!(call("len", vec![Object::string("héllo")]), "5");
        assert_eq!(call("len", vec![numbers(&[1, 2, 3])]), "3");
        assert_eq!(call("len", vec![Object::Integer(1)]), "Error: unsupported argument type of len(): 'int'");
        assert_eq!(
            call("len", vec![Object::string("one"), Object::string("two")]),
            "Error: len() takes exactly 1 argument: 2 given"
        );
    }

    #[test]
    fn array_accessors() {
        assert_eq!(call("first", vec![numbers(&[1, 2, 3])]), "1");
        assert_eq!(call("last", vec![numbers(&[1, 2, 3])]), "3");
        assert_eq!(call("rest", vec![numbers(&[1, 2, 3])]), "[2, 3]");
        assert_eq!(call("first", vec![numbers(&[])]), "null");
        assert_eq!(call("rest", vec![numbers(&[])]), "null");
        assert_eq!(call("last", vec![Object::string("x")]), "Error: unsupported argument type of last(): 'string'");
    }

    #[test]
    fn push_leaves_argument_untouched() {
        let original = numbers(&[1]);
        assert_eq!(call("push", vec![original.clone(), Object::Integer(2)]), "[1, 2]");
        assert_eq!(original.to_string(), "[1]");
        assert_eq!(call("push", vec![original]), "Error: push() takes exactly 2 arguments: 1 given");
    }

    #[test]
    fn puts_returns_null() {
        assert_eq!(call("puts", vec![Object::string("hello")]), "null");
    }

    #[test]
    fn puts_writes_one_line_per_argument() -> io::Result<()> {
        let mut out = Vec::new();
        write_lines(&mut out, &[Object::string("hello"), numbers(&[1, 2]), NULL])?;

        assert_eq!(String::from_utf8_lossy(&out), "hello\n[1, 2]\nnull\n");
        Ok(())
    }

    #[test]
    fn unknown_names_miss() {
        assert!(lookup("length").is_none());
    }
}
