use std::cell::RefCell;
use std::rc::Rc;

use crate::cursor::hook_slot;
use crate::deps::{Deps, changed};
use crate::slots::{HookKind, HookRecord, MemoSlot};

/// Caches `factory()` in this slot until `deps` changes.
///
/// `None` recomputes on every render; `deps![]` computes once.
pub fn use_memo<T: Clone + 'static>(factory: impl FnOnce() -> T, deps: impl Into<Option<Deps>>) -> T {
    let deps = deps.into();
    let slot = hook_slot(HookKind::Memo);
    let index = slot.index;

    let cached = slot.with_record(|record| match record {
        HookRecord::Memo(memo) if !changed(memo.deps.as_ref(), deps.as_ref()) => {
            memo.value.downcast_ref::<T>().cloned()
        }
        _ => None,
    });
    if let Some(value) = cached {
        return value;
    }

    let value = factory();
    slot.with_record(|record| {
        record.warn_if_foreign(HookKind::Memo, index);
        *record = HookRecord::Memo(MemoSlot {
            deps,
            value: Box::new(value.clone()),
        });
    });
    value
}

/// Returns the same `callback` value until `deps` changes.
///
/// Useful with `Rc<dyn Fn(..)>` handlers passed to children or listed as
/// another hook's dependency.
pub fn use_callback<F: Clone + 'static>(callback: F, deps: impl Into<Option<Deps>>) -> F {
    use_memo(move || callback, deps)
}

/// A mutable box that lives as long as the instance.
///
/// `initial` is only used on the first render. Writing through the box does
/// not trigger a render.
pub fn use_ref<T: 'static>(initial: T) -> Rc<RefCell<T>> {
    use_memo(move || Rc::new(RefCell::new(initial)), crate::deps![])
}

/// A string id unique within the runtime and stable for the slot's lifetime.
pub fn use_id() -> Rc<str> {
    let slot = hook_slot(HookKind::Id);
    let index = slot.index;
    let existing = slot.with_record(|record| match record {
        HookRecord::Id(id) => Some(id.clone()),
        _ => None,
    });
    if let Some(id) = existing {
        return id;
    }

    let id: Rc<str> = format!("r{}", slot.runtime.next_id()).into();
    slot.with_record(|record| {
        record.warn_if_foreign(HookKind::Id, index);
        *record = HookRecord::Id(id.clone());
    });
    id
}
