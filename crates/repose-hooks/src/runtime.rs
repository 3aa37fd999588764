use std::any::Any;
use std::borrow::Cow;
use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use slotmap::{SlotMap, new_key_type};

use crate::config::RuntimeConfig;
use crate::context::{ContextId, Provider};
use crate::cursor;
use crate::debug::Instrumentation;
use crate::effects::run_effects;
use crate::error::{HookError, Result};
use crate::platform::Platform;
use crate::scheduler::{AfterPaintQueue, FramePrimitive};
use crate::slots::InstanceState;

new_key_type! {
    /// Non-owning handle to a mounted component instance.
    pub struct InstanceId;
}

/// Consumer of re-render requests (dispatch, provider updates).
///
/// Must tolerate being called from inside a dispatch or an effect.
pub trait RenderScheduler {
    fn enqueue_render(&self, instance: InstanceId);
}

/// Default [`RenderScheduler`]: remembers which instances asked for a
/// render, once each, until the driver drains it.
#[derive(Default)]
pub struct RenderQueue {
    pending: RefCell<Vec<InstanceId>>,
}

impl RenderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&self) -> Vec<InstanceId> {
        std::mem::take(&mut *self.pending.borrow_mut())
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.borrow().is_empty()
    }
}

impl RenderScheduler for RenderQueue {
    fn enqueue_render(&self, instance: InstanceId) {
        let mut pending = self.pending.borrow_mut();
        if !pending.contains(&instance) {
            pending.push(instance);
        }
    }
}

pub(crate) struct RuntimeState {
    pub instances: SlotMap<InstanceId, InstanceState>,
    pub after_paint: AfterPaintQueue,
    next_id: u64,
}

pub(crate) struct RuntimeInner {
    pub state: RefCell<RuntimeState>,
    pub config: RefCell<RuntimeConfig>,
    pub platform: Rc<dyn Platform>,
    render_queue: Rc<RenderQueue>,
    render_scheduler: RefCell<Rc<dyn RenderScheduler>>,
}

impl RuntimeInner {
    pub fn with_instance<R>(
        &self,
        instance: InstanceId,
        f: impl FnOnce(&mut InstanceState) -> R,
    ) -> Option<R> {
        let mut st = self.state.borrow_mut();
        st.instances.get_mut(instance).map(f)
    }

    pub fn contains(&self, instance: InstanceId) -> bool {
        self.state.borrow().instances.contains_key(instance)
    }

    pub fn enqueue_render(&self, instance: InstanceId) {
        if !self.contains(instance) {
            log::debug!("render request for unmounted instance {instance:?} dropped");
            return;
        }
        let scheduler = self.render_scheduler.borrow().clone();
        scheduler.enqueue_render(instance);
    }

    pub fn next_id(&self) -> u64 {
        let mut st = self.state.borrow_mut();
        st.next_id += 1;
        st.next_id
    }

    /// Nearest provider for `context`, walking from `instance` to the root.
    pub fn find_provider(&self, instance: InstanceId, context: ContextId) -> Option<Rc<dyn Any>> {
        let st = self.state.borrow();
        let mut at = Some(instance);
        while let Some(id) = at {
            let inst = st.instances.get(id)?;
            if let Some(provider) = inst.providers.get(&context) {
                return Some(provider.clone());
            }
            at = inst.parent;
        }
        None
    }
}

/// The hook runtime: instance table, after-paint queue and host services.
///
/// A renderer drives it per instance:
///
/// 1. `render(id, || component())` runs the render function with the cursor
///    pointing at `id`; hooks called inside address `id`'s slots by order.
/// 2. `commit(id)` runs the layout effects registered by that render.
/// 3. After-paint effects flush on their own at the next frame (or after the
///    fallback timeout) through the host [`Platform`].
///
/// Cheap to clone; single-threaded.
#[derive(Clone)]
pub struct Runtime {
    pub(crate) inner: Rc<RuntimeInner>,
}

impl Runtime {
    pub fn new(platform: Rc<dyn Platform>) -> Self {
        Self::with_config(platform, RuntimeConfig::default())
    }

    pub fn with_config(platform: Rc<dyn Platform>, config: RuntimeConfig) -> Self {
        let default_primitive =
            FramePrimitive::after_next_frame(platform.clone(), config.fallback_timeout);
        let render_queue = Rc::new(RenderQueue::new());
        let scheduler: Rc<dyn RenderScheduler> = render_queue.clone();
        Self {
            inner: Rc::new(RuntimeInner {
                state: RefCell::new(RuntimeState {
                    instances: SlotMap::with_key(),
                    after_paint: AfterPaintQueue::new(default_primitive),
                    next_id: 0,
                }),
                config: RefCell::new(config),
                platform,
                render_queue,
                render_scheduler: RefCell::new(scheduler),
            }),
        }
    }

    pub(crate) fn from_inner(inner: Rc<RuntimeInner>) -> Self {
        Self { inner }
    }

    pub fn platform(&self) -> Rc<dyn Platform> {
        self.inner.platform.clone()
    }

    /// Creates a component instance. Children see their ancestors' providers.
    pub fn mount(
        &self,
        name: impl Into<Cow<'static, str>>,
        parent: Option<InstanceId>,
    ) -> Result<InstanceId> {
        let mut st = self.inner.state.borrow_mut();
        if let Some(parent) = parent
            && !st.instances.contains_key(parent)
        {
            return Err(HookError::UnknownInstance(parent));
        }
        let name = name.into();
        let id = st
            .instances
            .insert(InstanceState::new(name.clone(), parent));
        log::debug!("mounted {name} as {id:?}");
        Ok(id)
    }

    pub fn is_mounted(&self, instance: InstanceId) -> bool {
        self.inner.contains(instance)
    }

    /// Marks whether `instance` is attached to its render target. Detached
    /// instances are skipped by the after-paint flush.
    pub fn set_attached(&self, instance: InstanceId, attached: bool) -> Result<()> {
        self.inner
            .with_instance(instance, |inst| inst.attached = attached)
            .ok_or(HookError::UnknownInstance(instance))
    }

    pub fn is_attached(&self, instance: InstanceId) -> bool {
        self.inner
            .with_instance(instance, |inst| inst.attached)
            .unwrap_or(false)
    }

    /// Number of hook slots `instance` has used so far.
    pub fn slot_count(&self, instance: InstanceId) -> Option<usize> {
        self.inner.with_instance(instance, |inst| inst.slots.len())
    }

    /// Runs `render` as the render pass of `instance`.
    ///
    /// After-paint effects still pending from the previous pass are flushed
    /// first. Effects the pass registers are queued for the next flush.
    pub fn render<R>(&self, instance: InstanceId, render: impl FnOnce() -> R) -> Result<R> {
        let stale = self
            .inner
            .with_instance(instance, |inst| std::mem::take(&mut inst.pending_after_paint))
            .ok_or(HookError::UnknownInstance(instance))?;
        if !stale.is_empty() {
            log::debug!(
                "{instance:?}: flushing {} pending effect(s) before render",
                stale.len()
            );
            run_effects(&self.inner, instance, &stale);
        }

        let output = {
            let _guard = cursor::enter(self.inner.clone(), instance)?;
            render()
        };

        let has_after_paint = self
            .inner
            .with_instance(instance, |inst| !inst.pending_after_paint.is_empty())
            .unwrap_or(false);
        if has_after_paint {
            self.schedule_after_paint(instance);
        }
        Ok(output)
    }

    /// Runs the layout effects registered by the last render of `instance`:
    /// all cleanups, then all bodies, in registration order.
    pub fn commit(&self, instance: InstanceId) -> Result<()> {
        let layout = self
            .inner
            .with_instance(instance, |inst| std::mem::take(&mut inst.layout_effects))
            .ok_or(HookError::UnknownInstance(instance))?;
        if !layout.is_empty() {
            log::trace!("{instance:?}: {} layout effect(s)", layout.len());
            run_effects(&self.inner, instance, &layout);
        }
        Ok(())
    }

    /// Tears `instance` down: its slots are discarded and every stored
    /// effect cleanup runs in slot order.
    ///
    /// A panicking cleanup does not stop the others; the first panic is
    /// re-raised once all of them ran.
    pub fn unmount(&self, instance: InstanceId) -> Result<()> {
        let mut removed = {
            let mut st = self.inner.state.borrow_mut();
            let removed = st
                .instances
                .remove(instance)
                .ok_or(HookError::UnknownInstance(instance))?;
            st.after_paint.forget(instance);
            removed
        };
        log::debug!("unmounting {} ({instance:?})", removed.name);

        let on_unmount = self.inner.config.borrow().instrumentation.on_unmount.clone();
        if let Some(on_unmount) = on_unmount {
            on_unmount(instance);
        }

        for subscription in removed.subscriptions.drain(..) {
            subscription.unsubscribe(instance);
        }

        let mut first_panic = None;
        for cleanup in removed.drain_cleanups() {
            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| cleanup.run())) {
                log::error!("effect cleanup of {} panicked during unmount", removed.name);
                first_panic.get_or_insert(payload);
            }
        }
        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
        Ok(())
    }

    /// Installs `provider` on `instance`; it and its descendants resolve the
    /// provider's context to it.
    pub fn provide<T: 'static>(&self, instance: InstanceId, provider: &Provider<T>) -> Result<()> {
        let erased: Rc<dyn Any> = Rc::new(provider.clone());
        self.inner
            .with_instance(instance, |inst| {
                inst.providers.insert(provider.context_id(), erased);
            })
            .ok_or(HookError::UnknownInstance(instance))
    }

    /// Asks the render scheduler to re-render `instance`.
    pub fn enqueue_render(&self, instance: InstanceId) {
        self.inner.enqueue_render(instance);
    }

    /// Replaces the render scheduler. The built-in queue stops receiving
    /// requests until it is set again.
    pub fn set_render_scheduler(&self, scheduler: Rc<dyn RenderScheduler>) {
        *self.inner.render_scheduler.borrow_mut() = scheduler;
    }

    /// Drains render requests collected by the built-in [`RenderQueue`].
    pub fn take_render_requests(&self) -> Vec<InstanceId> {
        self.inner.render_queue.drain()
    }

    pub fn set_instrumentation(&self, instrumentation: Instrumentation) {
        self.inner.config.borrow_mut().instrumentation = instrumentation;
    }

    pub fn config(&self) -> RuntimeConfig {
        self.inner.config.borrow().clone()
    }
}
