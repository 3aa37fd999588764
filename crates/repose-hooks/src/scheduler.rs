//! After-paint effect scheduling.
//!
//! Instances with pending after-paint effects join one queue shared by the
//! runtime. The first instance queued in a cycle arms a single flush through
//! the current [`FramePrimitive`]; every instance queued before that flush
//! runs is handled by it.
//!
//! ```text
//!   Idle --schedule_after_paint (first in cycle)--> Armed
//!   Armed --schedule_after_paint (same primitive)--> Armed   (no-op)
//!   Armed --schedule_after_paint (primitive swapped)--> Armed (re-armed)
//!   Armed --flush_after_paint--> Idle
//! ```

use std::cell::{Cell, RefCell};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use web_time::Duration;

use crate::deps::Identity;
use crate::effects::run_effects;
use crate::platform::{FrameHandle, Platform, Task, TimerHandle};
use crate::runtime::{InstanceId, Runtime};

/// "Run this after the next paint" primitive.
///
/// Compared by identity: swapping in a different primitive re-arms the
/// scheduler even while a flush is already scheduled.
#[derive(Clone)]
pub struct FramePrimitive(Rc<dyn Fn(Task)>);

impl FramePrimitive {
    pub fn new(request: impl Fn(Task) + 'static) -> Self {
        Self(Rc::new(request))
    }

    /// Races the host's next frame against a `fallback` timeout; whichever
    /// fires first cancels the other and defers `callback`. Hosts without a
    /// frame primitive get the timeout alone.
    pub fn after_next_frame(platform: Rc<dyn Platform>, fallback: Duration) -> Self {
        Self::new(move |callback| {
            let race = Rc::new(FrameRace {
                platform: platform.clone(),
                callback: RefCell::new(Some(callback)),
                timer: Cell::new(None),
                frame: Cell::new(None),
            });

            let on_timeout = race.clone();
            let timer = platform.set_timeout(fallback, Box::new(move || on_timeout.settle()));
            race.timer.set(Some(timer));

            let on_frame = race.clone();
            match platform.request_frame(Box::new(move || on_frame.settle())) {
                Some(frame) => race.frame.set(Some(frame)),
                None => log::trace!("host has no frame primitive; using {fallback:?} timeout"),
            }
        })
    }

    pub fn request(&self, callback: Task) {
        (self.0)(callback)
    }
}

impl Identity for FramePrimitive {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for FramePrimitive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FramePrimitive")
            .field(&Rc::as_ptr(&self.0).cast::<()>())
            .finish()
    }
}

struct FrameRace {
    platform: Rc<dyn Platform>,
    callback: RefCell<Option<Task>>,
    timer: Cell<Option<TimerHandle>>,
    frame: Cell<Option<FrameHandle>>,
}

impl FrameRace {
    fn settle(&self) {
        let Some(callback) = self.callback.borrow_mut().take() else {
            return;
        };
        if let Some(timer) = self.timer.take() {
            self.platform.clear_timeout(timer);
        }
        if let Some(frame) = self.frame.take() {
            self.platform.cancel_frame(frame);
        }
        self.platform.defer(callback);
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    /// A flush is scheduled and has not run yet.
    Armed,
}

pub(crate) struct AfterPaintQueue {
    queue: Vec<InstanceId>,
    armed: bool,
    default_primitive: FramePrimitive,
    custom_primitive: Option<FramePrimitive>,
    last_armed: Option<FramePrimitive>,
}

impl AfterPaintQueue {
    pub fn new(default_primitive: FramePrimitive) -> Self {
        Self {
            queue: Vec::new(),
            armed: false,
            default_primitive,
            custom_primitive: None,
            last_armed: None,
        }
    }

    fn current_primitive(&self) -> FramePrimitive {
        self.custom_primitive
            .clone()
            .unwrap_or_else(|| self.default_primitive.clone())
    }

    /// Queues `instance` once per cycle. Returns the primitive to arm, if any.
    fn enqueue(&mut self, instance: InstanceId) -> Option<FramePrimitive> {
        if !self.queue.contains(&instance) {
            self.queue.push(instance);
        }
        let current = self.current_primitive();
        let swapped = !self.last_armed.is_same(&Some(current.clone()));
        if self.armed && !swapped {
            return None;
        }
        self.armed = true;
        self.last_armed = Some(current.clone());
        Some(current)
    }

    pub fn forget(&mut self, instance: InstanceId) {
        self.queue.retain(|queued| *queued != instance);
    }
}

impl Runtime {
    /// Queues `instance` for the next after-paint flush, arming one if none
    /// is scheduled with the current primitive.
    pub fn schedule_after_paint(&self, instance: InstanceId) {
        let to_arm = {
            let mut st = self.inner.state.borrow_mut();
            if !st.instances.contains_key(instance) {
                return;
            }
            st.after_paint.enqueue(instance)
        };
        let Some(primitive) = to_arm else { return };

        log::debug!("after-paint flush armed by {instance:?}");
        let runtime = Rc::downgrade(&self.inner);
        primitive.request(Box::new(move || {
            if let Some(inner) = runtime.upgrade() {
                Runtime::from_inner(inner).flush_after_paint();
            }
        }));
    }

    /// Runs every queued instance's pending after-paint effects.
    ///
    /// Per instance: all cleanups, then all bodies, in registration order.
    /// Detached and unmounted instances are skipped. A panic in one instance
    /// does not stop the others; the first one is re-raised at the end.
    pub fn flush_after_paint(&self) {
        let queue = {
            let mut st = self.inner.state.borrow_mut();
            st.after_paint.armed = false;
            std::mem::take(&mut st.after_paint.queue)
        };
        if queue.is_empty() {
            return;
        }
        log::debug!("after-paint flush: {} instance(s)", queue.len());

        let mut first_panic = None;
        for instance in queue {
            let pending = self
                .inner
                .with_instance(instance, |inst| {
                    if inst.attached {
                        Some(std::mem::take(&mut inst.pending_after_paint))
                    } else {
                        log::trace!("{}: detached, effects skipped", inst.name);
                        None
                    }
                })
                .flatten();
            let Some(pending) = pending else { continue };

            let outcome =
                panic::catch_unwind(AssertUnwindSafe(|| run_effects(&self.inner, instance, &pending)));
            if let Err(payload) = outcome {
                log::error!("after-paint effect of {instance:?} panicked");
                first_panic.get_or_insert(payload);
            }
        }

        if let Some(payload) = first_panic {
            panic::resume_unwind(payload);
        }
    }

    pub fn scheduler_state(&self) -> SchedulerState {
        if self.inner.state.borrow().after_paint.armed {
            SchedulerState::Armed
        } else {
            SchedulerState::Idle
        }
    }

    /// Instances waiting for the next flush, in queue order.
    pub fn after_paint_queue(&self) -> Vec<InstanceId> {
        self.inner.state.borrow().after_paint.queue.clone()
    }

    /// Swaps the "next frame" primitive; `None` restores the default
    /// frame/timeout race.
    pub fn set_frame_primitive(&self, primitive: Option<FramePrimitive>) {
        self.inner.state.borrow_mut().after_paint.custom_primitive = primitive;
    }
}
