use thiserror::Error;

use crate::InstanceId;

/// Usage errors raised by the hook runtime.
///
/// None of these are recoverable operational failures: each one means the
/// driver (or a render function) broke the render/commit protocol.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HookError {
    #[error("hook called outside of a render pass (no active component instance)")]
    NoActiveRender,

    #[error("cannot render {requested:?} while {active:?} is still rendering")]
    NestedRender {
        active: InstanceId,
        requested: InstanceId,
    },

    #[error("component instance {0:?} is not mounted in this runtime")]
    UnknownInstance(InstanceId),
}

pub type Result<T, E = HookError> = std::result::Result<T, E>;
