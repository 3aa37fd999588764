use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::cursor::hook_slot;
use crate::deps::Identity;
use crate::runtime::{InstanceId, RuntimeInner};
use crate::slots::{HookKind, HookRecord};

type Reducer<S, A> = Rc<dyn Fn(&S, A) -> S>;

struct ReducerCell<S, A> {
    value: RefCell<S>,
    reducer: RefCell<Reducer<S, A>>,
}

/// Sends actions to a reducer slot.
///
/// Stable for the lifetime of the slot, so it can be captured by effects and
/// listed in dependencies. Dispatching to an unmounted instance does nothing.
pub struct Dispatch<S, A> {
    cell: Rc<ReducerCell<S, A>>,
    owner: InstanceId,
    runtime: Weak<RuntimeInner>,
}

impl<S, A> Clone for Dispatch<S, A> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            owner: self.owner,
            runtime: self.runtime.clone(),
        }
    }
}

impl<S, A> Identity for Dispatch<S, A> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.cell, &other.cell)
    }
}

impl<S, A> fmt::Debug for Dispatch<S, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dispatch")
            .field("owner", &self.owner)
            .finish_non_exhaustive()
    }
}

impl<S, A> Dispatch<S, A> {
    pub fn owner(&self) -> InstanceId {
        self.owner
    }
}

impl<S: Clone + Identity + 'static, A: 'static> Dispatch<S, A> {
    /// Applies the slot's latest reducer to the current value.
    ///
    /// When the result is the same (by [`Identity`]) as the current value,
    /// nothing happens. Otherwise the value is replaced and the owner is
    /// enqueued for render.
    pub fn dispatch(&self, action: A) {
        let Some(runtime) = self.runtime.upgrade() else {
            return;
        };
        if !runtime.contains(self.owner) {
            log::debug!("dispatch to unmounted instance {:?} ignored", self.owner);
            return;
        }

        let current = self.cell.value.borrow().clone();
        let reducer = self.cell.reducer.borrow().clone();
        let next = reducer(&current, action);
        if next.is_same(&current) {
            return;
        }
        *self.cell.value.borrow_mut() = next;
        runtime.enqueue_render(self.owner);
    }

    /// Current value of the slot, including updates not yet rendered.
    pub fn current(&self) -> S {
        self.cell.value.borrow().clone()
    }
}

pub enum StateAction<S> {
    Set(S),
    Update(Box<dyn FnOnce(&S) -> S>),
}

impl<S> fmt::Debug for StateAction<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StateAction::Set(_) => f.write_str("Set(..)"),
            StateAction::Update(_) => f.write_str("Update(..)"),
        }
    }
}

pub type SetState<S> = Dispatch<S, StateAction<S>>;

impl<S: Clone + Identity + 'static> Dispatch<S, StateAction<S>> {
    pub fn set(&self, value: S) {
        self.dispatch(StateAction::Set(value));
    }

    /// Computes the next value from the previous one.
    pub fn update(&self, f: impl FnOnce(&S) -> S + 'static) {
        self.dispatch(StateAction::Update(Box::new(f)));
    }
}

fn state_reducer<S>(prev: &S, action: StateAction<S>) -> S {
    match action {
        StateAction::Set(value) => value,
        StateAction::Update(f) => f(prev),
    }
}

/// Reducer-backed state slot.
///
/// Returns the current value and a stable dispatcher. `initial` is only used
/// on the first render of the slot. The reducer is refreshed every render, so
/// it may capture render-local values.
pub fn use_reducer<S, A>(reducer: impl Fn(&S, A) -> S + 'static, initial: S) -> (S, Dispatch<S, A>)
where
    S: Clone + Identity + 'static,
    A: 'static,
{
    use_reducer_with(reducer, initial, |s| s)
}

/// [`use_reducer`] whose first value is `init(initial_arg)`.
pub fn use_reducer_with<S, A, I>(
    reducer: impl Fn(&S, A) -> S + 'static,
    initial_arg: I,
    init: impl FnOnce(I) -> S,
) -> (S, Dispatch<S, A>)
where
    S: Clone + Identity + 'static,
    A: 'static,
{
    let reducer: Reducer<S, A> = Rc::new(reducer);
    let slot = hook_slot(HookKind::State);
    let index = slot.index;

    let existing = slot.with_record(|record| match record {
        HookRecord::State(any) => any.downcast_ref::<Dispatch<S, A>>().cloned(),
        _ => None,
    });

    let dispatch = match existing {
        Some(dispatch) => dispatch,
        None => {
            let initial = init(initial_arg);
            let dispatch = Dispatch {
                cell: Rc::new(ReducerCell {
                    value: RefCell::new(initial),
                    reducer: RefCell::new(reducer.clone()),
                }),
                owner: slot.instance,
                runtime: Rc::downgrade(&slot.runtime),
            };
            slot.with_record(|record| {
                record.warn_if_foreign(HookKind::State, index);
                *record = HookRecord::State(Box::new(dispatch.clone()));
            });
            dispatch
        }
    };

    *dispatch.cell.reducer.borrow_mut() = reducer;
    (dispatch.current(), dispatch)
}

/// State slot whose updates replace the value or map the previous one.
///
/// ```ignore
/// let (count, set_count) = use_state(0);
/// set_count.update(|n| n + 1);
/// ```
pub fn use_state<S>(initial: S) -> (S, SetState<S>)
where
    S: Clone + Identity + 'static,
{
    use_reducer(state_reducer::<S>, initial)
}

/// [`use_state`] with a lazily computed first value.
pub fn use_state_with<S>(init: impl FnOnce() -> S) -> (S, SetState<S>)
where
    S: Clone + Identity + 'static,
{
    use_reducer_with(state_reducer::<S>, init, |init| init())
}
