//! Per-instance hook slot store.
//!
//! Slots are addressed purely by call order: the Nth hook call of a render
//! owns `slots[N]`. The list only grows. Calling hooks conditionally breaks
//! this association; the runtime does not detect it beyond replacing a slot
//! whose kind no longer matches (with a warning).

use std::any::Any;
use std::borrow::Cow;
use std::collections::HashMap;
use std::rc::Rc;

use smallvec::SmallVec;

use crate::context::{ContextId, Subscription};
use crate::deps::Deps;
use crate::effects::{Dispose, EffectFn, EffectKind};
use crate::runtime::InstanceId;

/// What a slot holds; reported to the `on_hook` instrumentation callback.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum HookKind {
    State,
    Memo,
    LayoutEffect,
    Effect,
    Context,
    Id,
}

pub(crate) struct EffectSlot {
    pub kind: EffectKind,
    pub deps: Option<Deps>,
    /// Body registered by the last render that saw a dependency change.
    pub callback: Option<EffectFn>,
    /// Returned by the previous body; runs before the next body or on unmount.
    pub cleanup: Option<Dispose>,
}

pub(crate) struct MemoSlot {
    pub deps: Option<Deps>,
    pub value: Box<dyn Any>,
}

pub(crate) enum HookRecord {
    Empty,
    /// Holds the slot's `Dispatch<S, A>`, which owns the state cell.
    State(Box<dyn Any>),
    Effect(EffectSlot),
    Memo(MemoSlot),
    Context { subscribed: bool },
    Id(Rc<str>),
}

impl HookRecord {
    pub fn kind(&self) -> Option<HookKind> {
        match self {
            HookRecord::Empty => None,
            HookRecord::State(_) => Some(HookKind::State),
            HookRecord::Effect(e) => Some(e.kind.hook_kind()),
            HookRecord::Memo(_) => Some(HookKind::Memo),
            HookRecord::Context { .. } => Some(HookKind::Context),
            HookRecord::Id(_) => Some(HookKind::Id),
        }
    }

    /// Logs a call-order violation when a slot is reused by a different hook.
    pub fn warn_if_foreign(&self, expected: HookKind, index: usize) {
        if let Some(found) = self.kind()
            && found != expected
        {
            log::warn!(
                "hook slot {index} was {found:?} and is now {expected:?}; replacing. \
                 Hooks must be called in the same order on every render."
            );
        }
    }
}

/// Hook state of one mounted component instance.
pub(crate) struct InstanceState {
    pub name: Cow<'static, str>,
    pub parent: Option<InstanceId>,
    pub slots: Vec<HookRecord>,
    /// Slot indices of after-paint effects awaiting the next flush.
    pub pending_after_paint: SmallVec<[usize; 4]>,
    /// Slot indices of layout effects awaiting commit.
    pub layout_effects: SmallVec<[usize; 4]>,
    /// Providers installed on this instance, keyed by context.
    pub providers: HashMap<ContextId, Rc<dyn Any>>,
    pub subscriptions: Vec<Rc<dyn Subscription>>,
    /// Whether the instance is attached to its render target.
    pub attached: bool,
}

impl InstanceState {
    pub fn new(name: Cow<'static, str>, parent: Option<InstanceId>) -> Self {
        Self {
            name,
            parent,
            slots: Vec::new(),
            pending_after_paint: SmallVec::new(),
            layout_effects: SmallVec::new(),
            providers: HashMap::new(),
            subscriptions: Vec::new(),
            attached: true,
        }
    }

    /// Returns the slot at `index`, creating empty slots up to it.
    pub fn slot_mut(&mut self, index: usize) -> &mut HookRecord {
        while self.slots.len() <= index {
            log::trace!("{}: new hook slot {}", self.name, self.slots.len());
            self.slots.push(HookRecord::Empty);
        }
        &mut self.slots[index]
    }

    pub fn take_cleanup(&mut self, index: usize) -> Option<Dispose> {
        match self.slots.get_mut(index) {
            Some(HookRecord::Effect(effect)) => effect.cleanup.take(),
            _ => None,
        }
    }

    pub fn take_callback(&mut self, index: usize) -> Option<EffectFn> {
        match self.slots.get_mut(index) {
            Some(HookRecord::Effect(effect)) => effect.callback.take(),
            _ => None,
        }
    }

    /// Stores a cleanup returned by an effect body. Hands it back if the
    /// slot is gone so the caller can run it instead of leaking it.
    pub fn store_cleanup(&mut self, index: usize, cleanup: Dispose) -> Option<Dispose> {
        match self.slots.get_mut(index) {
            Some(HookRecord::Effect(effect)) => {
                effect.cleanup = Some(cleanup);
                None
            }
            _ => Some(cleanup),
        }
    }

    /// Takes every stored effect cleanup, in slot order.
    pub fn drain_cleanups(&mut self) -> Vec<Dispose> {
        self.slots
            .iter_mut()
            .filter_map(|record| match record {
                HookRecord::Effect(effect) => effect.cleanup.take(),
                _ => None,
            })
            .collect()
    }
}
