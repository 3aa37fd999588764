//! Call-order cursor: which instance is rendering and which slot comes next.
//!
//! Valid only between `Runtime::render` entering and leaving; one instance at
//! a time per thread.

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{HookError, Result};
use crate::runtime::{InstanceId, RuntimeInner};
use crate::slots::{HookKind, HookRecord, InstanceState};

struct Cursor {
    runtime: Rc<RuntimeInner>,
    instance: InstanceId,
    index: usize,
}

thread_local! {
    static CURSOR: RefCell<Option<Cursor>> = const { RefCell::new(None) };
}

/// Clears the cursor on drop, including on unwind out of a render function.
#[must_use = "RenderGuard clears the call-order cursor on drop"]
pub(crate) struct RenderGuard;

impl Drop for RenderGuard {
    fn drop(&mut self) {
        CURSOR.with(|c| {
            c.borrow_mut().take();
        });
    }
}

/// Points the cursor at `instance`, slot 0.
pub(crate) fn enter(runtime: Rc<RuntimeInner>, instance: InstanceId) -> Result<RenderGuard> {
    CURSOR.with(|c| {
        let mut c = c.borrow_mut();
        if let Some(active) = c.as_ref() {
            return Err(HookError::NestedRender {
                active: active.instance,
                requested: instance,
            });
        }
        *c = Some(Cursor {
            runtime,
            instance,
            index: 0,
        });
        Ok(RenderGuard)
    })
}

/// The instance currently rendering and its runtime.
pub(crate) fn current() -> Result<(Rc<RuntimeInner>, InstanceId)> {
    CURSOR.with(|c| {
        c.borrow()
            .as_ref()
            .map(|cur| (cur.runtime.clone(), cur.instance))
            .ok_or(HookError::NoActiveRender)
    })
}

/// The slot consumed by one hook call.
pub(crate) struct SlotRef {
    pub runtime: Rc<RuntimeInner>,
    pub instance: InstanceId,
    pub index: usize,
}

impl SlotRef {
    pub fn with_instance<R>(&self, f: impl FnOnce(&mut InstanceState) -> R) -> R {
        self.runtime
            .with_instance(self.instance, f)
            .unwrap_or_else(|| panic!("{}", HookError::UnknownInstance(self.instance)))
    }

    pub fn with_record<R>(&self, f: impl FnOnce(&mut HookRecord) -> R) -> R {
        let index = self.index;
        self.with_instance(|inst| f(inst.slot_mut(index)))
    }
}

/// Consumes the next slot of the rendering instance and advances the cursor.
pub(crate) fn next_slot(kind: HookKind) -> Result<SlotRef> {
    let slot = CURSOR.with(|c| {
        let mut c = c.borrow_mut();
        let cur = c.as_mut().ok_or(HookError::NoActiveRender)?;
        let index = cur.index;
        cur.index += 1;
        Ok(SlotRef {
            runtime: cur.runtime.clone(),
            instance: cur.instance,
            index,
        })
    })?;

    slot.runtime
        .with_instance(slot.instance, |inst| {
            inst.slot_mut(slot.index);
        })
        .ok_or(HookError::UnknownInstance(slot.instance))?;

    let on_hook = slot.runtime.config.borrow().instrumentation.on_hook.clone();
    if let Some(on_hook) = on_hook {
        on_hook(slot.instance, slot.index, kind);
    }
    Ok(slot)
}

/// [`next_slot`] for public hooks: calling a hook outside a render is a
/// programming error that would misalign every later slot, so it panics.
pub(crate) fn hook_slot(kind: HookKind) -> SlotRef {
    next_slot(kind).unwrap_or_else(|e| panic!("{e}"))
}
