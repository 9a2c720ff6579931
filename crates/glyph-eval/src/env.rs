//! Scoped variable environment for the Glyph evaluator.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use crate::value::{Lambda, Value};

/// Shared handle to a scope. Closures hold one of these.
pub type Env = Rc<Environment>;

/// One scope level with a link to its parent.
///
/// Lookups walk from this scope outward. `define` always writes to this
/// scope. Scopes are shared by reference: a closure sees later `define`s
/// made in the scope it captured.
pub struct Environment {
    bindings: RefCell<BTreeMap<Rc<str>, Value>>,
    parent: Option<Env>,
}

impl Environment {
    /// A fresh root scope.
    pub fn global() -> Env {
        Rc::new(Self {
            bindings: RefCell::new(BTreeMap::new()),
            parent: None,
        })
    }

    /// A new empty scope whose parent is `parent`.
    pub fn child(parent: &Env) -> Env {
        Rc::new(Self {
            bindings: RefCell::new(BTreeMap::new()),
            parent: Some(Rc::clone(parent)),
        })
    }

    /// Bind `name` in this scope, shadowing any outer binding.
    ///
    /// A bare number is stored rounded.
    pub fn define(&self, name: impl Into<Rc<str>>, value: Value) {
        let value = match value {
            Value::Num(n) => Value::num(n),
            other => other,
        };
        self.bindings.borrow_mut().insert(name.into(), value);
    }

    /// Look up `name` from this scope outward.
    pub fn get(&self, name: &str) -> Option<Value> {
        let mut scope = self;
        loop {
            if let Some(value) = scope.bindings.borrow().get(name) {
                return Some(value.clone());
            }
            scope = scope.parent.as_deref()?;
        }
    }

    pub fn is_bound(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Names bound directly in this scope, sorted.
    pub fn local_names(&self) -> Vec<String> {
        self.bindings.borrow().keys().map(|k| k.to_string()).collect()
    }

    pub fn parent(&self) -> Option<&Env> {
        self.parent.as_ref()
    }

    /// Drop every binding in this scope.
    pub fn clear(&self) {
        // Dropped closures may release other scopes; don't hold the borrow.
        let bindings = std::mem::take(&mut *self.bindings.borrow_mut());
        drop(bindings);
    }

    /// Call `f` for every closure bound in this scope, including closures
    /// nested in lists.
    pub(crate) fn for_each_lambda(&self, mut f: impl FnMut(&Rc<Lambda>)) {
        fn visit(value: &Value, f: &mut impl FnMut(&Rc<Lambda>)) {
            match value {
                Value::Lambda(lambda) => f(lambda),
                Value::List(items) => items.iter().for_each(|item| visit(item, f)),
                _ => {}
            }
        }
        for value in self.bindings.borrow().values() {
            visit(value, &mut f);
        }
    }
}

impl fmt::Debug for Environment {
    // Bindings can hold closures that point back at this scope.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Environment")
            .field("names", &self.local_names())
            .field("has_parent", &self.parent.is_some())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_walks_parents() {
        let root = Environment::global();
        root.define("x", Value::num(1.0));
        let child = Environment::child(&root);
        child.define("y", Value::num(2.0));
        assert_eq!(child.get("x"), Some(Value::num(1.0)));
        assert_eq!(child.get("y"), Some(Value::num(2.0)));
        assert_eq!(root.get("y"), None);
    }

    #[test]
    fn test_shadowing() {
        let root = Environment::global();
        root.define("x", Value::num(1.0));
        let child = Environment::child(&root);
        child.define("x", Value::num(2.0));
        assert_eq!(child.get("x"), Some(Value::num(2.0)));
        assert_eq!(root.get("x"), Some(Value::num(1.0)));
    }

    #[test]
    fn test_later_defines_visible_through_shared_parent() {
        let root = Environment::global();
        let child = Environment::child(&root);
        assert!(!child.is_bound("late"));
        root.define("late", Value::Bool(true));
        assert!(child.is_bound("late"));
    }

    #[test]
    fn test_define_rounds_host_numbers() {
        let root = Environment::global();
        root.define("x", Value::Num(0.123_456_789));
        assert_eq!(root.get("x").and_then(|v| v.as_num()), Some(0.123457));
    }

    #[test]
    fn test_local_names_sorted() {
        let root = Environment::global();
        root.define("b", Value::Nil);
        root.define("a", Value::Nil);
        assert_eq!(root.local_names(), vec!["a", "b"]);
        root.clear();
        assert!(root.local_names().is_empty());
    }
}
