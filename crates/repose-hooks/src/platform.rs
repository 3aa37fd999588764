//! Host scheduling services consumed by the after-paint scheduler.
//!
//! The runtime never owns an event loop. It asks the host for three things:
//! a paint-frame callback, one-shot timers, and a "run soon" queue that
//! drains right after the current callback returns. [`ManualPlatform`] is a
//! single-threaded host with virtual time for tests and headless drivers.

use std::cell::RefCell;
use std::collections::VecDeque;

use slotmap::{SlotMap, new_key_type};
use web_time::{Duration, Instant};

new_key_type! {
    pub struct TimerHandle;
    pub struct FrameHandle;
}

pub type Task = Box<dyn FnOnce()>;

/// Scheduling primitives provided by the host.
pub trait Platform {
    /// Runs `callback` at the next paint frame. Hosts without a paint-frame
    /// primitive return `None` and drop the callback.
    fn request_frame(&self, callback: Task) -> Option<FrameHandle>;

    fn cancel_frame(&self, handle: FrameHandle);

    fn set_timeout(&self, delay: Duration, callback: Task) -> TimerHandle;

    fn clear_timeout(&self, handle: TimerHandle);

    /// Runs `task` after the currently executing callback returns.
    fn defer(&self, task: Task);
}

struct PendingTimer {
    deadline: Duration,
    seq: u64,
    task: Task,
}

struct PendingFrame {
    seq: u64,
    task: Task,
}

struct ManualState {
    elapsed: Duration,
    seq: u64,
    timers: SlotMap<TimerHandle, PendingTimer>,
    frames: SlotMap<FrameHandle, PendingFrame>,
    deferred: VecDeque<Task>,
}

/// Deterministic host driven by the caller.
///
/// Nothing runs on its own: `run_frame` fires the frame callbacks requested
/// so far, `advance` moves virtual time forward and fires due timers in
/// deadline order. Deferred tasks drain after every fired callback.
pub struct ManualPlatform {
    start: Instant,
    frames_supported: bool,
    state: RefCell<ManualState>,
}

impl Default for ManualPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl ManualPlatform {
    pub fn new() -> Self {
        Self::build(true)
    }

    /// A host that has no paint-frame primitive; only timers fire.
    pub fn without_frames() -> Self {
        Self::build(false)
    }

    fn build(frames_supported: bool) -> Self {
        Self {
            start: Instant::now(),
            frames_supported,
            state: RefCell::new(ManualState {
                elapsed: Duration::ZERO,
                seq: 0,
                timers: SlotMap::with_key(),
                frames: SlotMap::with_key(),
                deferred: VecDeque::new(),
            }),
        }
    }

    pub fn now(&self) -> Instant {
        self.start + self.elapsed()
    }

    pub fn elapsed(&self) -> Duration {
        self.state.borrow().elapsed
    }

    pub fn pending_frames(&self) -> usize {
        self.state.borrow().frames.len()
    }

    pub fn pending_timers(&self) -> usize {
        self.state.borrow().timers.len()
    }

    pub fn pending_tasks(&self) -> usize {
        self.state.borrow().deferred.len()
    }

    /// Fires every frame callback requested before this call.
    ///
    /// Callbacks requested while the frame runs wait for the next frame.
    pub fn run_frame(&self) {
        let mut due: Vec<PendingFrame> = {
            let mut st = self.state.borrow_mut();
            st.frames.drain().map(|(_, frame)| frame).collect()
        };
        due.sort_by_key(|frame| frame.seq);
        log::trace!("frame: {} callback(s)", due.len());
        for frame in due {
            (frame.task)();
            self.run_deferred();
        }
        self.run_deferred();
    }

    /// Moves virtual time forward by `by`, firing due timers in order.
    pub fn advance(&self, by: Duration) {
        let target = self.elapsed() + by;
        loop {
            let next = {
                let mut st = self.state.borrow_mut();
                let due = st
                    .timers
                    .iter()
                    .filter(|(_, timer)| timer.deadline <= target)
                    .min_by_key(|(_, timer)| (timer.deadline, timer.seq))
                    .map(|(handle, _)| handle);
                due.and_then(|handle| st.timers.remove(handle)).inspect(|timer| {
                    if timer.deadline > st.elapsed {
                        st.elapsed = timer.deadline;
                    }
                })
            };
            let Some(timer) = next else { break };
            (timer.task)();
            self.run_deferred();
        }
        self.state.borrow_mut().elapsed = target;
        self.run_deferred();
    }

    /// Drains the deferred queue, including tasks deferred while draining.
    pub fn run_deferred(&self) {
        loop {
            let task = self.state.borrow_mut().deferred.pop_front();
            let Some(task) = task else { break };
            task();
        }
    }

    fn next_seq(st: &mut ManualState) -> u64 {
        st.seq += 1;
        st.seq
    }
}

impl Platform for ManualPlatform {
    fn request_frame(&self, callback: Task) -> Option<FrameHandle> {
        if !self.frames_supported {
            return None;
        }
        let mut st = self.state.borrow_mut();
        let seq = Self::next_seq(&mut st);
        Some(st.frames.insert(PendingFrame {
            seq,
            task: callback,
        }))
    }

    fn cancel_frame(&self, handle: FrameHandle) {
        self.state.borrow_mut().frames.remove(handle);
    }

    fn set_timeout(&self, delay: Duration, callback: Task) -> TimerHandle {
        let mut st = self.state.borrow_mut();
        let seq = Self::next_seq(&mut st);
        let deadline = st.elapsed + delay;
        st.timers.insert(PendingTimer {
            deadline,
            seq,
            task: callback,
        })
    }

    fn clear_timeout(&self, handle: TimerHandle) {
        self.state.borrow_mut().timers.remove(handle);
    }

    fn defer(&self, task: Task) {
        self.state.borrow_mut().deferred.push_back(task);
    }
}
