use std::cell::RefCell;
use std::rc::Rc;

use crate::cursor::hook_slot;
use crate::deps::{Deps, changed};
use crate::runtime::{InstanceId, RuntimeInner};
use crate::slots::{EffectSlot, HookKind, HookRecord};

#[derive(Clone)]
pub struct Dispose(Rc<RefCell<Option<Box<dyn FnOnce()>>>>);

impl Dispose {
    pub fn new(f: impl FnOnce() + 'static) -> Self {
        Self(Rc::new(RefCell::new(Some(Box::new(f)))))
    }

    /// Runs at most once (safe to call multiple times).
    pub fn run(&self) {
        let f = self.0.borrow_mut().take();
        if let Some(f) = f {
            f()
        }
    }

    pub fn is_spent(&self) -> bool {
        self.0.borrow().is_none()
    }
}

impl std::fmt::Debug for Dispose {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Dispose")
            .field("spent", &self.is_spent())
            .finish()
    }
}

/// Helper to return a cleanup from an effect body.
pub fn on_unmount(f: impl FnOnce() + 'static) -> Dispose {
    Dispose::new(f)
}

/// What an effect body may return: nothing, or a cleanup.
pub trait IntoCleanup {
    fn into_cleanup(self) -> Option<Dispose>;
}

impl IntoCleanup for () {
    fn into_cleanup(self) -> Option<Dispose> {
        None
    }
}

impl IntoCleanup for Dispose {
    fn into_cleanup(self) -> Option<Dispose> {
        Some(self)
    }
}

impl IntoCleanup for Option<Dispose> {
    fn into_cleanup(self) -> Option<Dispose> {
        self
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Runs synchronously during commit, before paint.
    Layout,
    /// Runs in the batched flush after the next paint.
    AfterPaint,
}

impl EffectKind {
    pub(crate) fn hook_kind(self) -> HookKind {
        match self {
            EffectKind::Layout => HookKind::LayoutEffect,
            EffectKind::AfterPaint => HookKind::Effect,
        }
    }
}

pub(crate) type EffectFn = Box<dyn FnOnce() -> Option<Dispose>>;

/// Registers a side effect that runs after the next paint.
///
/// The body runs on the first render and again whenever `deps` changes (or on
/// every render when `deps` is `None`). A cleanup returned by the previous
/// body runs before the new body, and on unmount.
///
/// ```ignore
/// use_effect(
///     {
///         let room = room.clone();
///         move || {
///             let conn = connect(&room);
///             on_unmount(move || conn.close())
///         }
///     },
///     deps![room],
/// );
/// ```
pub fn use_effect<C, F>(effect: F, deps: impl Into<Option<Deps>>)
where
    C: IntoCleanup,
    F: FnOnce() -> C + 'static,
{
    register(
        EffectKind::AfterPaint,
        Box::new(move || effect().into_cleanup()),
        deps.into(),
    );
}

/// Registers a side effect that runs synchronously at commit, before paint.
///
/// Same gating and cleanup rules as [`use_effect`]; the driver runs these from
/// `Runtime::commit` in registration order.
pub fn use_layout_effect<C, F>(effect: F, deps: impl Into<Option<Deps>>)
where
    C: IntoCleanup,
    F: FnOnce() -> C + 'static,
{
    register(
        EffectKind::Layout,
        Box::new(move || effect().into_cleanup()),
        deps.into(),
    );
}

fn register(kind: EffectKind, callback: EffectFn, deps: Option<Deps>) {
    let slot = hook_slot(kind.hook_kind());
    if slot.runtime.config.borrow().skip_effects {
        return;
    }
    let index = slot.index;
    slot.with_instance(move |inst| {
        let record = inst.slot_mut(index);
        let should_run = match record {
            HookRecord::Effect(effect) if effect.kind == kind => {
                changed(effect.deps.as_ref(), deps.as_ref())
            }
            _ => true,
        };
        if !should_run {
            return;
        }
        match record {
            HookRecord::Effect(effect) if effect.kind == kind => {
                effect.deps = deps;
                effect.callback = Some(callback);
            }
            other => {
                other.warn_if_foreign(kind.hook_kind(), index);
                *other = HookRecord::Effect(EffectSlot {
                    kind,
                    deps,
                    callback: Some(callback),
                    cleanup: None,
                });
            }
        }
        let queue = match kind {
            EffectKind::Layout => &mut inst.layout_effects,
            EffectKind::AfterPaint => &mut inst.pending_after_paint,
        };
        if !queue.contains(&index) {
            queue.push(index);
        }
    });
}

/// Runs the effects at `indices`: every stored cleanup first, then every new
/// body, both in the given order. No runtime borrow is held while user code
/// runs, so bodies may dispatch, provide or schedule freely.
pub(crate) fn run_effects(runtime: &RuntimeInner, instance: InstanceId, indices: &[usize]) {
    for &index in indices {
        let cleanup = runtime
            .with_instance(instance, |inst| inst.take_cleanup(index))
            .flatten();
        if let Some(cleanup) = cleanup {
            cleanup.run();
        }
    }

    for &index in indices {
        let callback = runtime
            .with_instance(instance, |inst| inst.take_callback(index))
            .flatten();
        let Some(callback) = callback else { continue };
        let Some(cleanup) = callback() else { continue };
        let orphaned = runtime
            .with_instance(instance, |inst| inst.store_cleanup(index, cleanup.clone()))
            .unwrap_or(Some(cleanup));
        if let Some(orphaned) = orphaned {
            // Instance went away while its effect ran.
            orphaned.run();
        }
    }
}
