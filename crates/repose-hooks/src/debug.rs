use std::fmt;
use std::rc::Rc;

use crate::cursor;
use crate::runtime::InstanceId;
use crate::slots::HookKind;

pub type DebugValueHook = Rc<dyn Fn(InstanceId, &dyn fmt::Debug)>;
pub type HookAccessHook = Rc<dyn Fn(InstanceId, usize, HookKind)>;
pub type UnmountHook = Rc<dyn Fn(InstanceId)>;

/// Optional callbacks for external tooling. Both default to off, and the
/// runtime does no extra work for a callback that is not set.
#[derive(Clone, Default)]
pub struct Instrumentation {
    /// Receives every `use_debug_value` label.
    pub on_debug_value: Option<DebugValueHook>,
    /// Called on every hook slot access with the slot index and hook kind.
    pub on_hook: Option<HookAccessHook>,
    /// Called once an instance is removed, before its cleanups run.
    pub on_unmount: Option<UnmountHook>,
}

impl Instrumentation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_debug_value(mut self, f: impl Fn(InstanceId, &dyn fmt::Debug) + 'static) -> Self {
        self.on_debug_value = Some(Rc::new(f));
        self
    }

    pub fn on_hook(mut self, f: impl Fn(InstanceId, usize, HookKind) + 'static) -> Self {
        self.on_hook = Some(Rc::new(f));
        self
    }

    pub fn on_unmount(mut self, f: impl Fn(InstanceId) + 'static) -> Self {
        self.on_unmount = Some(Rc::new(f));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.on_debug_value.is_none() && self.on_hook.is_none() && self.on_unmount.is_none()
    }
}

impl fmt::Debug for Instrumentation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instrumentation")
            .field("on_debug_value", &self.on_debug_value.is_some())
            .field("on_hook", &self.on_hook.is_some())
            .field("on_unmount", &self.on_unmount.is_some())
            .finish()
    }
}

/// Labels the rendering instance for tooling. Does not use a slot.
pub fn use_debug_value<T: fmt::Debug>(value: T) {
    emit(move |hook, instance| hook(instance, &value as &dyn fmt::Debug));
}

/// Like [`use_debug_value`], but `format` only runs when a debug-value
/// callback is installed.
pub fn use_debug_value_with<T, D: fmt::Debug>(value: T, format: impl FnOnce(T) -> D) {
    emit(move |hook, instance| hook(instance, &format(value) as &dyn fmt::Debug));
}

fn emit(f: impl FnOnce(&DebugValueHook, InstanceId)) {
    let (runtime, instance) = cursor::current().unwrap_or_else(|e| panic!("{e}"));
    let hook = runtime.config.borrow().instrumentation.on_debug_value.clone();
    if let Some(hook) = hook {
        f(&hook, instance);
    }
}
