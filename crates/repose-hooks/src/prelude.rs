pub use crate::config::RuntimeConfig;
pub use crate::context::{Context, Provider, use_context};
pub use crate::debug::{Instrumentation, use_debug_value, use_debug_value_with};
pub use crate::deps;
pub use crate::deps::{Deps, Identity};
pub use crate::effects::{Dispose, on_unmount, use_effect, use_layout_effect};
pub use crate::error::HookError;
pub use crate::handle::{RefTarget, use_imperative_handle};
pub use crate::memo::{use_callback, use_id, use_memo, use_ref};
pub use crate::platform::{ManualPlatform, Platform};
pub use crate::runtime::{InstanceId, RenderQueue, RenderScheduler, Runtime};
pub use crate::scheduler::{FramePrimitive, SchedulerState};
pub use crate::slots::HookKind;
pub use crate::state::{Dispatch, SetState, use_reducer, use_state};
