use crate::value::Value;
use achronyme_common::Complex;
use rustc_hash::FxHashMap;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// An ordered chain of name → value frames with lexical parent links.
///
/// Frames are shared by reference: a closure holds its defining frame
/// alive, and every variable visible at capture time stays reachable
/// through it. A lambda bound into the very environment it captures
/// forms a reference cycle; such cycles are reclaimed only when the
/// engine drops the whole root (`reset`), which is the documented
/// release path.
#[derive(Clone)]
pub struct Env(Rc<RefCell<Frame>>);

struct Frame {
    vars: FxHashMap<String, Value>,
    parent: Option<Env>,
}

impl Env {
    /// Fresh root frame with no bindings.
    pub fn root() -> Self {
        Env(Rc::new(RefCell::new(Frame {
            vars: FxHashMap::default(),
            parent: None,
        })))
    }

    /// Root frame pre-seeded with the mathematical constants.
    pub fn with_prelude() -> Self {
        let env = Env::root();
        env.bind("pi", Value::Number(std::f64::consts::PI));
        env.bind("e", Value::Number(std::f64::consts::E));
        env.bind("tau", Value::Number(std::f64::consts::TAU));
        env.bind("i", Value::Complex(Complex::new(0.0, 1.0)));
        env
    }

    /// New child frame whose parent is `self`.
    pub fn child(&self) -> Self {
        Env(Rc::new(RefCell::new(Frame {
            vars: FxHashMap::default(),
            parent: Some(self.clone()),
        })))
    }

    /// Bind (or replace) a name in this frame.
    pub fn bind(&self, name: &str, value: Value) {
        self.0.borrow_mut().vars.insert(name.to_string(), value);
    }

    /// Look a name up through the parent chain.
    pub fn lookup(&self, name: &str) -> Option<Value> {
        let frame = self.0.borrow();
        if let Some(v) = frame.vars.get(name) {
            return Some(v.clone());
        }
        frame.parent.as_ref().and_then(|p| p.lookup(name))
    }

    /// Remove a binding from this frame only.
    pub fn unbind(&self, name: &str) -> Option<Value> {
        self.0.borrow_mut().vars.remove(name)
    }

    pub fn ptr_eq(a: &Env, b: &Env) -> bool {
        Rc::ptr_eq(&a.0, &b.0)
    }
}

impl fmt::Debug for Env {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Never follow parent links: closures can make the chain cyclic.
        let frame = self.0.borrow();
        write!(
            f,
            "Env({} bindings{})",
            frame.vars.len(),
            if frame.parent.is_some() { ", chained" } else { "" }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_walks_parent_links() {
        let root = Env::root();
        root.bind("x", Value::Number(1.0));
        let inner = root.child();
        inner.bind("y", Value::Number(2.0));

        assert_eq!(inner.lookup("x"), Some(Value::Number(1.0)));
        assert_eq!(inner.lookup("y"), Some(Value::Number(2.0)));
        assert_eq!(root.lookup("y"), None);
    }

    #[test]
    fn child_bindings_shadow_without_mutating_parent() {
        let root = Env::root();
        root.bind("x", Value::Number(1.0));
        let inner = root.child();
        inner.bind("x", Value::Number(9.0));

        assert_eq!(inner.lookup("x"), Some(Value::Number(9.0)));
        assert_eq!(root.lookup("x"), Some(Value::Number(1.0)));
    }

    #[test]
    fn frames_are_shared_by_reference() {
        let root = Env::root();
        let alias = root.clone();
        alias.bind("n", Value::Number(3.0));
        assert_eq!(root.lookup("n"), Some(Value::Number(3.0)));
        assert!(Env::ptr_eq(&root, &alias));
    }

    #[test]
    fn prelude_constants() {
        let env = Env::with_prelude();
        assert_eq!(
            env.lookup("pi"),
            Some(Value::Number(std::f64::consts::PI))
        );
        assert!(env.lookup("e").is_some());
        assert!(env.lookup("tau").is_some());
        assert_eq!(
            env.lookup("i"),
            Some(Value::Complex(Complex::new(0.0, 1.0)))
        );
    }

    #[test]
    fn unbind_is_frame_local() {
        let root = Env::root();
        root.bind("x", Value::Number(1.0));
        let inner = root.child();
        assert!(inner.unbind("x").is_none());
        assert_eq!(root.unbind("x"), Some(Value::Number(1.0)));
        assert_eq!(root.lookup("x"), None);
    }
}
