use std::{cell::RefCell, collections::HashMap, fmt, rc::Rc};

use crate::object::Object;


/// One scope of bindings, linked to the scope it was created in.
///
/// Scopes are shared: a closure keeps its defining scope alive after the call
/// that created it has returned.
#[derive(Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Object>>,
    parent: Option<Rc<Environment>>,
}

impl Environment {
    pub fn root() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn child(self: &Rc<Self>) -> Rc<Self> {
        Rc::new(Self {
            bindings: RefCell::new(HashMap::new()),
            parent: Some(Rc::clone(self)),
        })
    }

    /// Looks the name up here, then outward through the enclosing scopes.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone())
        }
        self.parent.as_ref().and_then(|parent| parent.get(name))
    }

    /// Binds in this scope only. An outer binding of the same name is shadowed,
    /// never overwritten.
    pub fn set(&self, name: impl Into<String>, value: Object) -> Object {
        self.bindings.borrow_mut().insert(name.into(), value.clone());
        value
    }
}

impl fmt::Debug for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.bindings.borrow().keys().cloned().collect();
        names.sort();

        f.debug_struct("Environment")
            .field("names", &names)
            .field("parent", &self.parent)
            .finish()
    }
}
