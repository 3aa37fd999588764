use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use web_time::{Duration, Instant};

use repose_hooks::{HookKind, InstanceId, Instrumentation, Runtime};

/// Debug labels kept per instance; older ones are dropped first.
const DEBUG_HISTORY: usize = 32;

/// What the inspector has seen of one instance.
#[derive(Clone, Debug, Default)]
pub struct InstanceRecord {
    /// Kind of each slot, by index, as of the last access.
    pub hooks: Vec<HookKind>,
    pub accesses: u64,
    /// Passes seen, counted on each access to slot 0.
    pub renders: u64,
    pub debug_values: Vec<String>,
    pub last_seen: Option<Instant>,
}

#[derive(Clone, Debug, Default)]
pub struct Metrics {
    pub instances: usize,
    pub hook_accesses: u64,
    pub debug_values: usize,
    pub uptime: Duration,
}

struct Records {
    started: Instant,
    instances: HashMap<InstanceId, InstanceRecord>,
}

impl Records {
    fn entry(&mut self, instance: InstanceId) -> &mut InstanceRecord {
        let record = self.instances.entry(instance).or_default();
        record.last_seen = Some(Instant::now());
        record
    }
}

/// Collects hook accesses and `use_debug_value` labels from a [`Runtime`].
///
/// Cheap to clone; clones share their records.
#[derive(Clone)]
pub struct HookInspector {
    records: Rc<RefCell<Records>>,
    enabled: Rc<Cell<bool>>,
}

impl Default for HookInspector {
    fn default() -> Self {
        Self::new()
    }
}

impl HookInspector {
    pub fn new() -> Self {
        Self {
            records: Rc::new(RefCell::new(Records {
                started: Instant::now(),
                instances: HashMap::new(),
            })),
            enabled: Rc::new(Cell::new(true)),
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    pub fn toggle(&self) {
        self.enabled.set(!self.enabled.get());
    }

    /// Callbacks feeding this inspector, for `RuntimeConfig::instrumentation`.
    pub fn instrumentation(&self) -> Instrumentation {
        let on_hook = self.clone();
        let on_debug = self.clone();
        let on_unmount = self.clone();
        Instrumentation::new()
            .on_hook(move |instance, index, kind| on_hook.record_hook(instance, index, kind))
            .on_debug_value(move |instance, value| {
                on_debug.record_debug_value(instance, format!("{value:?}"))
            })
            .on_unmount(move |instance| on_unmount.forget(instance))
    }

    /// Installs this inspector's callbacks on `runtime`, replacing any others.
    pub fn attach(&self, runtime: &Runtime) {
        log::debug!("hook inspector attached");
        runtime.set_instrumentation(self.instrumentation());
    }

    pub fn detach(&self, runtime: &Runtime) {
        runtime.set_instrumentation(Instrumentation::default());
    }

    fn record_hook(&self, instance: InstanceId, index: usize, kind: HookKind) {
        if !self.enabled.get() {
            return;
        }
        let mut records = self.records.borrow_mut();
        let record = records.entry(instance);
        record.accesses += 1;
        if index == 0 {
            record.renders += 1;
        }
        if index < record.hooks.len() {
            if record.hooks[index] != kind {
                log::warn!("{instance:?}: slot {index} changed from {:?} to {kind:?}", record.hooks[index]);
            }
            record.hooks[index] = kind;
        } else {
            record.hooks.resize(index, kind);
            record.hooks.push(kind);
        }
    }

    fn record_debug_value(&self, instance: InstanceId, label: String) {
        if !self.enabled.get() {
            return;
        }
        let mut records = self.records.borrow_mut();
        let record = records.entry(instance);
        if record.debug_values.len() == DEBUG_HISTORY {
            record.debug_values.remove(0);
        }
        record.debug_values.push(label);
    }

    /// Drops the record of an unmounted instance. Runs even while disabled.
    fn forget(&self, instance: InstanceId) {
        self.records.borrow_mut().instances.remove(&instance);
    }

    /// Drops records of instances `runtime` no longer has mounted, for
    /// records collected before the inspector was attached.
    pub fn prune(&self, runtime: &Runtime) {
        self.records
            .borrow_mut()
            .instances
            .retain(|id, _| runtime.is_mounted(*id));
    }

    pub fn instance(&self, instance: InstanceId) -> Option<InstanceRecord> {
        self.records.borrow().instances.get(&instance).cloned()
    }

    pub fn metrics(&self) -> Metrics {
        let records = self.records.borrow();
        Metrics {
            instances: records.instances.len(),
            hook_accesses: records.instances.values().map(|r| r.accesses).sum(),
            debug_values: records.instances.values().map(|r| r.debug_values.len()).sum(),
            uptime: records.started.elapsed(),
        }
    }

    /// One line per instance, most recently seen first.
    pub fn report(&self) -> String {
        let records = self.records.borrow();
        let mut rows: Vec<_> = records.instances.iter().collect();
        rows.sort_by(|a, b| b.1.last_seen.cmp(&a.1.last_seen));

        let mut lines = Vec::with_capacity(rows.len());
        for (id, record) in rows {
            let mut line = format!(
                "{id:?}: {} slot(s), {} render(s), {} access(es)",
                record.hooks.len(),
                record.renders,
                record.accesses
            );
            if let Some(label) = record.debug_values.last() {
                line.push_str(&format!("  |  {label}"));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Forgets every record. Instances keep reporting afterwards.
    pub fn clear(&self) {
        let mut records = self.records.borrow_mut();
        records.instances.clear();
        records.started = Instant::now();
    }
}
