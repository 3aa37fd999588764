//! # Hooks
//!
//! Render functions in Repose are plain functions that run again on every
//! render. Hooks give them state that survives between runs, and a way to
//! schedule side effects relative to the render/commit/paint cycle.
//!
//! ## Slots
//!
//! Every hook call consumes the next *slot* of the instance being rendered.
//! The Nth hook call of a render always addresses the Nth slot, so hooks must
//! be called unconditionally and in the same order on every render:
//!
//! ```rust
//! use std::rc::Rc;
//! use repose_hooks::*;
//!
//! let platform = Rc::new(ManualPlatform::new());
//! let runtime = Runtime::new(platform.clone());
//! let counter = runtime.mount("Counter", None).unwrap();
//!
//! let render = || {
//!     let (count, set_count) = use_state(0);
//!     let label = use_memo(move || format!("Count = {count}"), deps![count]);
//!     (label, set_count)
//! };
//!
//! let (label, set_count) = runtime.render(counter, render).unwrap();
//! assert_eq!(label, "Count = 0");
//!
//! set_count.update(|n| n + 1);
//! assert_eq!(runtime.take_render_requests(), vec![counter]);
//!
//! let (label, _) = runtime.render(counter, render).unwrap();
//! assert_eq!(label, "Count = 1");
//! ```
//!
//! ## Effects
//!
//! - `use_layout_effect` bodies run synchronously in `Runtime::commit`,
//!   before the host paints.
//! - `use_effect` bodies are batched across instances and flushed once after
//!   the next paint frame (or after `RuntimeConfig::fallback_timeout` when no
//!   frame arrives).
//!
//! Both re-run only when their [`Deps`] change. A body may return a cleanup
//! (`on_unmount(..)`) that runs before the body runs again and on unmount.
//!
//! ## Context
//!
//! `use_context` reads the nearest [`Provider`] for a [`Context`] and
//! subscribes the instance to it; see [`context`].

pub mod config;
pub mod context;
mod cursor;
pub mod debug;
pub mod deps;
pub mod effects;
pub mod error;
pub mod handle;
pub mod memo;
pub mod platform;
pub mod prelude;
pub mod runtime;
pub mod scheduler;
mod slots;
pub mod state;

#[cfg(test)]
mod tests;

pub use config::*;
pub use context::*;
pub use debug::*;
pub use deps::*;
pub use effects::*;
pub use error::HookError;
pub use handle::*;
pub use memo::*;
pub use platform::*;
pub use runtime::*;
pub use scheduler::*;
pub use slots::HookKind;
pub use state::*;
