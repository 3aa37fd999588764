use web_time::Duration;

use crate::debug::Instrumentation;

/// How long the after-paint scheduler waits for a paint frame before
/// flushing anyway.
pub const DEFAULT_FALLBACK_TIMEOUT: Duration = Duration::from_millis(100);

#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub fallback_timeout: Duration,
    /// Effects are never registered (headless/server rendering). Effect
    /// hooks still consume their slot.
    pub skip_effects: bool,
    pub instrumentation: Instrumentation,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            fallback_timeout: DEFAULT_FALLBACK_TIMEOUT,
            skip_effects: false,
            instrumentation: Instrumentation::default(),
        }
    }
}

impl RuntimeConfig {
    pub fn fallback_timeout(mut self, timeout: Duration) -> Self {
        self.fallback_timeout = timeout;
        self
    }

    pub fn skip_effects(mut self, skip: bool) -> Self {
        self.skip_effects = skip;
        self
    }

    pub fn instrumentation(mut self, instrumentation: Instrumentation) -> Self {
        self.instrumentation = instrumentation;
        self
    }
}
