//! Identity comparison and dependency lists.
//!
//! Gated hooks (`use_memo`, `use_callback`, `use_effect`, `use_layout_effect`,
//! `use_imperative_handle`) take an optional [`Deps`] list:
//!
//! - `None`: re-run on every render.
//! - `Some(deps![])`: run once, on the first render.
//! - `Some(deps![a, b])`: re-run when any element is no longer the *same*
//!   as the element at that position on the previous render.
//!
//! "Same" is [`Identity`], not `PartialEq`: plain values (numbers, strings)
//! compare by value, shared handles (`Rc`, `Arc`, dispatchers, providers)
//! compare by pointer. Two `Rc`s holding equal data are different deps.

use std::any::Any;
use std::fmt;
use std::rc::Rc;
use std::sync::Arc;

use smallvec::SmallVec;

/// Identity comparison used for dependency gating and state bail-out.
pub trait Identity {
    fn is_same(&self, other: &Self) -> bool;
}

macro_rules! identity_by_value {
    ($($t:ty),* $(,)?) => {
        $(
            impl Identity for $t {
                #[inline]
                fn is_same(&self, other: &Self) -> bool {
                    self == other
                }
            }
        )*
    };
}

identity_by_value!(
    (),
    bool,
    char,
    u8,
    u16,
    u32,
    u64,
    u128,
    usize,
    i8,
    i16,
    i32,
    i64,
    i128,
    isize,
    f32,
    f64,
    String,
    &'static str,
);

impl<T: ?Sized> Identity for Rc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(self, other)
    }
}

impl<T: ?Sized> Identity for Arc<T> {
    fn is_same(&self, other: &Self) -> bool {
        Arc::ptr_eq(self, other)
    }
}

impl<T: Identity> Identity for Option<T> {
    fn is_same(&self, other: &Self) -> bool {
        match (self, other) {
            (Some(a), Some(b)) => a.is_same(b),
            (None, None) => true,
            _ => false,
        }
    }
}

/// Type-erased dependency element.
pub trait DepValue: Any {
    fn same_as(&self, other: &dyn DepValue) -> bool;
    fn as_any(&self) -> &dyn Any;
}

impl<T: Identity + 'static> DepValue for T {
    fn same_as(&self, other: &dyn DepValue) -> bool {
        other
            .as_any()
            .downcast_ref::<T>()
            .is_some_and(|other| self.is_same(other))
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Positional dependency list of a gated hook.
#[derive(Default)]
pub struct Deps(SmallVec<[Box<dyn DepValue>; 4]>);

impl Deps {
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    pub fn push<T: Identity + 'static>(&mut self, value: T) {
        self.0.push(Box::new(value));
    }

    pub fn with<T: Identity + 'static>(mut self, value: T) -> Self {
        self.push(value);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    fn same_as(&self, other: &Deps) -> bool {
        self.0.len() == other.0.len()
            && self
                .0
                .iter()
                .zip(other.0.iter())
                .all(|(a, b)| a.same_as(&**b))
    }
}

impl fmt::Debug for Deps {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Deps").field("len", &self.0.len()).finish()
    }
}

/// Builds a [`Deps`] list: `deps![count, name.clone(), handle.clone()]`.
#[macro_export]
macro_rules! deps {
    () => {
        $crate::deps::Deps::new()
    };
    ($($dep:expr),+ $(,)?) => {{
        let mut deps = $crate::deps::Deps::new();
        $( deps.push($dep); )+
        deps
    }};
}

/// Whether a gated hook must re-run.
///
/// True on the first call (`old` absent), when the caller passed no list at
/// all, when the lengths differ, or when any position is no longer the same.
pub fn changed(old: Option<&Deps>, new: Option<&Deps>) -> bool {
    match (old, new) {
        (Some(old), Some(new)) => !old.same_as(new),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_call_always_changes() {
        assert!(changed(None, Some(&deps![1])));
        assert!(changed(None, Some(&deps![])));
    }

    #[test]
    fn missing_list_always_changes() {
        assert!(changed(Some(&deps![1]), None));
    }

    #[test]
    fn empty_lists_are_stable() {
        assert!(!changed(Some(&deps![]), Some(&deps![])));
    }

    #[test]
    fn scalars_compare_by_value() {
        assert!(!changed(Some(&deps![1, "a"]), Some(&deps![1, "a"])));
        assert!(changed(Some(&deps![1, "a"]), Some(&deps![2, "a"])));
    }

    #[test]
    fn shared_handles_compare_by_pointer() {
        let a = Rc::new(vec![1, 2]);
        let b = Rc::new(vec![1, 2]);
        assert!(!changed(Some(&deps![a.clone()]), Some(&deps![a.clone()])));
        assert!(changed(Some(&deps![a]), Some(&deps![b])));
    }

    #[test]
    fn type_or_length_change_is_a_change() {
        assert!(changed(Some(&deps![1u32]), Some(&deps![1i32])));
        assert!(changed(Some(&deps![1]), Some(&deps![1, 2])));
    }

    #[test]
    fn nan_is_never_the_same() {
        assert!(changed(Some(&deps![f64::NAN]), Some(&deps![f64::NAN])));
    }
}
