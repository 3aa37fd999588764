//! # Context
//!
//! A [`Context<T>`] is a typed key with a default value. A [`Provider<T>`]
//! supplies a current value for one context to the instance it is installed
//! on (`Runtime::provide`) and to that instance's descendants.
//!
//! ```ignore
//! let theme = Context::new(Theme::default());
//! let dark = Provider::new(&runtime, &theme, Theme::dark());
//! runtime.provide(app, &dark)?;
//!
//! // inside a descendant's render
//! let t = use_context(&theme); // Theme::dark(), and subscribed
//!
//! dark.set(Theme::light()); // every subscriber is enqueued for render
//! ```
//!
//! Without a provider above it, `use_context` returns the default and does
//! not subscribe.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};
use std::sync::atomic::{AtomicU64, Ordering};

use crate::cursor::hook_slot;
use crate::deps::Identity;
use crate::runtime::{InstanceId, Runtime, RuntimeInner};
use crate::slots::{HookKind, HookRecord};

static NEXT_CONTEXT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ContextId(u64);

struct ContextInner<T> {
    id: ContextId,
    default: T,
}

pub struct Context<T> {
    inner: Rc<ContextInner<T>>,
}

impl<T> Context<T> {
    pub fn new(default: T) -> Self {
        let id = ContextId(NEXT_CONTEXT_ID.fetch_add(1, Ordering::Relaxed));
        Self {
            inner: Rc::new(ContextInner { id, default }),
        }
    }

    pub fn id(&self) -> ContextId {
        self.inner.id
    }

    pub fn default_value(&self) -> &T {
        &self.inner.default
    }
}

impl<T> Clone for Context<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Identity for Context<T> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for Context<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Context").field(&self.inner.id).finish()
    }
}

/// Unsubscribe side of a provider, type-erased for the instance table.
pub(crate) trait Subscription {
    fn unsubscribe(&self, instance: InstanceId);
}

struct ProviderInner<T> {
    context: ContextId,
    value: RefCell<T>,
    subscribers: RefCell<Vec<InstanceId>>,
    runtime: Weak<RuntimeInner>,
}

impl<T> Subscription for ProviderInner<T> {
    fn unsubscribe(&self, instance: InstanceId) {
        self.subscribers.borrow_mut().retain(|sub| *sub != instance);
    }
}

pub struct Provider<T> {
    inner: Rc<ProviderInner<T>>,
}

impl<T> Clone for Provider<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> Identity for Provider<T> {
    fn is_same(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T> fmt::Debug for Provider<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Provider")
            .field("context", &self.inner.context)
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl<T: 'static> Provider<T> {
    pub fn new(runtime: &Runtime, context: &Context<T>, value: T) -> Self {
        Self {
            inner: Rc::new(ProviderInner {
                context: context.id(),
                value: RefCell::new(value),
                subscribers: RefCell::new(Vec::new()),
                runtime: Rc::downgrade(&runtime.inner),
            }),
        }
    }

    pub fn context_id(&self) -> ContextId {
        self.inner.context
    }

    /// Registers `instance` for re-render on value changes (once).
    pub fn subscribe(&self, instance: InstanceId) {
        let mut subs = self.inner.subscribers.borrow_mut();
        if !subs.contains(&instance) {
            subs.push(instance);
        }
    }

    pub fn unsubscribe(&self, instance: InstanceId) {
        self.inner.unsubscribe(instance);
    }

    pub fn subscribers(&self) -> Vec<InstanceId> {
        self.inner.subscribers.borrow().clone()
    }

    pub(crate) fn subscription(&self) -> Rc<dyn Subscription> {
        self.inner.clone()
    }
}

impl<T: Clone + 'static> Provider<T> {
    pub fn get(&self) -> T {
        self.inner.value.borrow().clone()
    }
}

impl<T: Identity + 'static> Provider<T> {
    /// Replaces the value. When it is not the same as the current one, every
    /// subscribed instance still mounted is enqueued for render.
    pub fn set(&self, value: T) {
        if self.inner.value.borrow().is_same(&value) {
            return;
        }
        *self.inner.value.borrow_mut() = value;

        let Some(runtime) = self.inner.runtime.upgrade() else {
            return;
        };
        let subscribers = self.subscribers();
        log::debug!(
            "context {:?} changed; {} subscriber(s)",
            self.inner.context,
            subscribers.len()
        );
        for instance in subscribers {
            runtime.enqueue_render(instance);
        }
    }
}

/// Reads `context` from the nearest provider above the rendering instance.
///
/// The first read through a provider subscribes the instance to it. With no
/// provider, returns the context default and subscribes to nothing.
pub fn use_context<T: Clone + 'static>(context: &Context<T>) -> T {
    let slot = hook_slot(HookKind::Context);
    let provider = slot
        .runtime
        .find_provider(slot.instance, context.id())
        .and_then(|erased| erased.downcast_ref::<Provider<T>>().cloned());

    let index = slot.index;
    let newly_subscribed = slot.with_record(|record| {
        let was_subscribed = match record {
            HookRecord::Context { subscribed } => *subscribed,
            ref other => {
                other.warn_if_foreign(HookKind::Context, index);
                false
            }
        };
        *record = HookRecord::Context {
            subscribed: was_subscribed || provider.is_some(),
        };
        !was_subscribed && provider.is_some()
    });

    let Some(provider) = provider else {
        return context.default_value().clone();
    };
    if newly_subscribed {
        provider.subscribe(slot.instance);
        let subscription = provider.subscription();
        slot.with_instance(|inst| inst.subscriptions.push(subscription));
    }
    provider.get()
}
