use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use crate::deps::{Deps, Identity};
use crate::effects::{on_unmount, use_layout_effect};

/// Where a component publishes a value for its parent: a callback, or a
/// shared cell the parent reads.
pub enum RefTarget<T> {
    Callback(Rc<dyn Fn(Option<T>)>),
    Cell(Rc<RefCell<Option<T>>>),
}

impl<T> RefTarget<T> {
    pub fn cell() -> Self {
        RefTarget::Cell(Rc::new(RefCell::new(None)))
    }

    pub fn callback(f: impl Fn(Option<T>) + 'static) -> Self {
        RefTarget::Callback(Rc::new(f))
    }

    /// Publishes `value` (or clears the target with `None`).
    pub fn assign(&self, value: Option<T>) {
        match self {
            RefTarget::Callback(f) => f(value),
            RefTarget::Cell(cell) => *cell.borrow_mut() = value,
        }
    }
}

impl<T: Clone> RefTarget<T> {
    /// Current value of a cell target; always `None` for callbacks.
    pub fn current(&self) -> Option<T> {
        match self {
            RefTarget::Callback(_) => None,
            RefTarget::Cell(cell) => cell.borrow().clone(),
        }
    }
}

impl<T> Clone for RefTarget<T> {
    fn clone(&self) -> Self {
        match self {
            RefTarget::Callback(f) => RefTarget::Callback(f.clone()),
            RefTarget::Cell(cell) => RefTarget::Cell(cell.clone()),
        }
    }
}

impl<T> Identity for RefTarget<T> {
    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (RefTarget::Callback(a), RefTarget::Callback(b)) => Rc::ptr_eq(a, b),
            (RefTarget::Cell(a), RefTarget::Cell(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

impl<T> fmt::Debug for RefTarget<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RefTarget::Callback(_) => f.write_str("RefTarget::Callback"),
            RefTarget::Cell(_) => f.write_str("RefTarget::Cell"),
        }
    }
}

/// Publishes `create()` into `target` at commit time.
///
/// Re-publishes when `deps` changes or when a different `target` is passed;
/// the previous publication is cleared first, and on unmount.
pub fn use_imperative_handle<T: 'static>(
    target: &RefTarget<T>,
    create: impl FnOnce() -> T + 'static,
    deps: impl Into<Option<Deps>>,
) {
    let deps = deps.into().map(|deps| deps.with(target.clone()));
    let target = target.clone();
    use_layout_effect(
        move || {
            target.assign(Some(create()));
            on_unmount(move || target.assign(None))
        },
        deps,
    );
}
