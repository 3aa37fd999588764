use std::cell::RefCell;
use std::panic::{self, AssertUnwindSafe};
use std::rc::Rc;

use web_time::Duration;

use crate::prelude::*;
use crate::{use_reducer_with, use_state_with};

type Log = Rc<RefCell<Vec<String>>>;

fn setup() -> (Rc<ManualPlatform>, Runtime) {
    let _ = env_logger::builder().is_test(true).try_init();
    let platform = Rc::new(ManualPlatform::new());
    let runtime = Runtime::new(platform.clone());
    (platform, runtime)
}

fn log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

fn push(log: &Log, entry: impl Into<String>) {
    log.borrow_mut().push(entry.into());
}

fn entries(log: &Log) -> Vec<String> {
    log.borrow().clone()
}

#[test]
fn slots_are_stable_across_renders() {
    let (_, rt) = setup();
    let id = rt.mount("Stable", None).unwrap();

    let render = || {
        let (value, set) = use_state(10);
        let boxed = use_ref(0u32);
        (value, set, boxed)
    };

    let (v1, set1, box1) = rt.render(id, render).unwrap();
    *box1.borrow_mut() = 7;
    let (v2, set2, box2) = rt.render(id, render).unwrap();

    assert_eq!(v1, 10);
    assert_eq!(v2, 10);
    assert!(Rc::ptr_eq(&box1, &box2));
    assert_eq!(*box2.borrow(), 7);
    assert!(set1.is_same(&set2));
    assert_eq!(rt.slot_count(id), Some(2));
}

#[test]
fn counter_increments_once_per_dispatch() {
    let (_, rt) = setup();
    let id = rt.mount("Counter", None).unwrap();
    let render = || use_state(0);

    let (mut count, mut set_count) = rt.render(id, render).unwrap();
    for _ in 0..3 {
        set_count.update(|n| n + 1);
        assert_eq!(rt.take_render_requests(), vec![id]);
        (count, set_count) = rt.render(id, render).unwrap();
    }
    assert_eq!(count, 3);
    assert!(rt.take_render_requests().is_empty());
}

#[test]
fn reducer_bails_out_when_result_is_the_same() {
    let (_, rt) = setup();
    let id = rt.mount("Toggle", None).unwrap();

    let (_, dispatch) = rt
        .render(id, || {
            use_reducer(
                |on: &bool, action: &'static str| match action {
                    "on" => true,
                    "off" => false,
                    _ => *on,
                },
                false,
            )
        })
        .unwrap();

    dispatch.dispatch("off");
    dispatch.dispatch("noop");
    assert!(rt.take_render_requests().is_empty());

    dispatch.dispatch("on");
    assert_eq!(rt.take_render_requests(), vec![id]);
    assert!(dispatch.current());
}

#[test]
fn rc_state_bails_out_by_pointer_not_by_value() {
    let (_, rt) = setup();
    let id = rt.mount("Shared", None).unwrap();
    let (list, set_list) = rt.render(id, || use_state(Rc::new(vec![1, 2]))).unwrap();

    set_list.set(list.clone());
    assert!(rt.take_render_requests().is_empty());

    set_list.set(Rc::new(vec![1, 2]));
    assert_eq!(rt.take_render_requests(), vec![id]);
}

#[test]
fn lazy_initializers_run_once() {
    let (_, rt) = setup();
    let id = rt.mount("Lazy", None).unwrap();
    let calls = Rc::new(RefCell::new(0));

    for _ in 0..3 {
        let calls = calls.clone();
        let (a, b) = rt
            .render(id, move || {
                let (a, _) = use_state_with({
                    let calls = calls.clone();
                    move || {
                        *calls.borrow_mut() += 1;
                        "ready".to_string()
                    }
                });
                let (b, _) = use_reducer_with(|n: &i32, d: i32| n + d, 20, |x| x * 2);
                (a, b)
            })
            .unwrap();
        assert_eq!(a, "ready");
        assert_eq!(b, 40);
    }
    assert_eq!(*calls.borrow(), 1);
}

#[test]
fn reducer_uses_latest_render_closure() {
    let (_, rt) = setup();
    let id = rt.mount("Step", None).unwrap();
    let render = |step: i32| move || use_reducer(move |n: &i32, _: ()| n + step, 0);

    rt.render(id, render(1)).unwrap();
    let (_, dispatch) = rt.render(id, render(10)).unwrap();
    dispatch.dispatch(());
    assert_eq!(dispatch.current(), 10);
}

#[test]
fn dispatch_after_unmount_is_ignored() {
    let (_, rt) = setup();
    let id = rt.mount("Gone", None).unwrap();
    let (_, set) = rt.render(id, || use_state(1)).unwrap();

    rt.unmount(id).unwrap();
    set.set(2);
    assert!(rt.take_render_requests().is_empty());
    assert!(!rt.is_mounted(id));
}

#[test]
fn memo_recomputes_only_when_deps_change() {
    let (_, rt) = setup();
    let id = rt.mount("Memo", None).unwrap();
    let calls = Rc::new(RefCell::new(0));

    let render = |a: i32, b: &'static str| {
        let calls = calls.clone();
        move || {
            use_memo(
                move || {
                    *calls.borrow_mut() += 1;
                    format!("{a}{b}")
                },
                deps![a, b],
            )
        }
    };

    assert_eq!(rt.render(id, render(1, "x")).unwrap(), "1x");
    assert_eq!(rt.render(id, render(1, "x")).unwrap(), "1x");
    assert_eq!(*calls.borrow(), 1);

    assert_eq!(rt.render(id, render(1, "y")).unwrap(), "1y");
    assert_eq!(*calls.borrow(), 2);
}

#[test]
fn memo_without_deps_always_recomputes_and_empty_deps_never() {
    let (_, rt) = setup();
    let id = rt.mount("Memo", None).unwrap();
    let calls = Rc::new(RefCell::new((0, 0)));

    for _ in 0..3 {
        let calls = calls.clone();
        rt.render(id, move || {
            let c = calls.clone();
            use_memo(move || c.borrow_mut().0 += 1, None);
            let c = calls.clone();
            use_memo(move || c.borrow_mut().1 += 1, deps![]);
        })
        .unwrap();
    }
    assert_eq!(*calls.borrow(), (3, 1));
}

#[test]
fn callback_identity_is_kept_while_deps_hold() {
    let (_, rt) = setup();
    let id = rt.mount("Callback", None).unwrap();

    let render = |key: u32| {
        move || {
            let f: Rc<dyn Fn() -> u32> = Rc::new(move || key);
            use_callback(f, deps![key])
        }
    };

    let a = rt.render(id, render(1)).unwrap();
    let b = rt.render(id, render(1)).unwrap();
    let c = rt.render(id, render(2)).unwrap();
    assert!(Rc::ptr_eq(&a, &b));
    assert!(!Rc::ptr_eq(&b, &c));
    assert_eq!(c(), 2);
}

#[test]
fn layout_effects_run_at_commit_with_cleanup_first() {
    let (_, rt) = setup();
    let id = rt.mount("Layout", None).unwrap();
    let events = log();

    let render = |n: i32| {
        let events = events.clone();
        move || {
            for name in ["a", "b"] {
                let events = events.clone();
                use_layout_effect(
                    move || {
                        push(&events, format!("{name}{n}"));
                        let events = events.clone();
                        on_unmount(move || push(&events, format!("~{name}{n}")))
                    },
                    deps![n],
                );
            }
        }
    };

    rt.render(id, render(1)).unwrap();
    assert!(entries(&events).is_empty());
    rt.commit(id).unwrap();
    assert_eq!(entries(&events), ["a1", "b1"]);

    rt.render(id, render(1)).unwrap();
    rt.commit(id).unwrap();
    assert_eq!(entries(&events).len(), 2);

    rt.render(id, render(2)).unwrap();
    rt.commit(id).unwrap();
    assert_eq!(entries(&events), ["a1", "b1", "~a1", "~b1", "a2", "b2"]);
}

#[test]
fn after_paint_effects_wait_for_the_frame() {
    let (platform, rt) = setup();
    let id = rt.mount("Paint", None).unwrap();
    let events = log();

    let e = events.clone();
    rt.render(id, move || use_effect(move || push(&e, "effect"), deps![]))
        .unwrap();
    rt.commit(id).unwrap();

    assert!(entries(&events).is_empty());
    assert_eq!(rt.scheduler_state(), SchedulerState::Armed);
    assert_eq!(rt.after_paint_queue(), vec![id]);

    platform.run_frame();
    assert_eq!(entries(&events), ["effect"]);
    assert_eq!(rt.scheduler_state(), SchedulerState::Idle);
    assert!(rt.after_paint_queue().is_empty());
    assert_eq!(platform.pending_timers(), 0, "frame must cancel the fallback timer");
}

#[test]
fn after_paint_cleanups_all_run_before_any_body() {
    let (platform, rt) = setup();
    let id = rt.mount("Order", None).unwrap();
    let events = log();
    let shared = Rc::new(RefCell::new(0));

    let render = |n: i32| {
        let events = events.clone();
        let shared = shared.clone();
        move || {
            for name in ["e1", "e2", "e3"] {
                let events = events.clone();
                let shared = shared.clone();
                use_effect(
                    move || {
                        *shared.borrow_mut() += 1;
                        push(&events, format!("{name}:{n}"));
                        let events = events.clone();
                        let shared = shared.clone();
                        on_unmount(move || {
                            push(&events, format!("~{name}:{n} saw {}", shared.borrow()));
                        })
                    },
                    deps![n],
                );
            }
        }
    };

    rt.render(id, render(1)).unwrap();
    platform.run_frame();
    events.borrow_mut().clear();

    rt.render(id, render(2)).unwrap();
    platform.run_frame();
    assert_eq!(
        entries(&events),
        [
            "~e1:1 saw 3",
            "~e2:1 saw 3",
            "~e3:1 saw 3",
            "e1:2",
            "e2:2",
            "e3:2"
        ]
    );
}

#[test]
fn one_flush_per_cycle_covers_every_instance() {
    let (platform, rt) = setup();
    let events = log();
    let ids: Vec<_> = (0..3)
        .map(|i| rt.mount(format!("Item{i}"), None).unwrap())
        .collect();

    for (i, id) in ids.iter().enumerate() {
        let events = events.clone();
        rt.render(*id, move || {
            for k in 0..2 {
                let events = events.clone();
                use_effect(move || push(&events, format!("{i}.{k}")), None);
            }
        })
        .unwrap();
    }

    assert_eq!(platform.pending_frames(), 1);
    assert_eq!(platform.pending_timers(), 1);
    assert_eq!(rt.after_paint_queue(), ids);

    platform.run_frame();
    assert_eq!(entries(&events), ["0.0", "0.1", "1.0", "1.1", "2.0", "2.1"]);
}

#[test]
fn fallback_timeout_flushes_when_no_frame_arrives() {
    let (platform, rt) = setup();
    let id = rt.mount("Hidden", None).unwrap();
    let events = log();
    let e = events.clone();
    rt.render(id, move || use_effect(move || push(&e, "ran"), None))
        .unwrap();

    platform.advance(Duration::from_millis(99));
    assert!(entries(&events).is_empty());

    platform.advance(Duration::from_millis(1));
    assert_eq!(entries(&events), ["ran"]);
    assert_eq!(platform.pending_frames(), 0, "timeout must cancel the frame");
}

#[test]
fn frameless_host_uses_timer_only() {
    let _ = env_logger::builder().is_test(true).try_init();
    let platform = Rc::new(ManualPlatform::without_frames());
    let config = RuntimeConfig::default().fallback_timeout(Duration::from_millis(16));
    let rt = Runtime::with_config(platform.clone(), config);
    let id = rt.mount("Headless", None).unwrap();
    let events = log();
    let e = events.clone();
    rt.render(id, move || use_effect(move || push(&e, "ran"), deps![]))
        .unwrap();

    platform.run_frame();
    assert!(entries(&events).is_empty());
    platform.advance(Duration::from_millis(16));
    assert_eq!(entries(&events), ["ran"]);
}

#[test]
fn swapped_frame_primitive_rearms() {
    let (_, rt) = setup();
    let requests: Rc<RefCell<Vec<Box<dyn FnOnce()>>>> = Rc::new(RefCell::new(Vec::new()));
    let make_primitive = || {
        let requests = requests.clone();
        FramePrimitive::new(move |cb| requests.borrow_mut().push(cb))
    };

    let first = make_primitive();
    rt.set_frame_primitive(Some(first.clone()));
    let a = rt.mount("A", None).unwrap();
    let b = rt.mount("B", None).unwrap();
    let c = rt.mount("C", None).unwrap();
    let render = || use_effect(|| {}, None);

    rt.render(a, render).unwrap();
    rt.render(b, render).unwrap();
    assert_eq!(requests.borrow().len(), 1);

    rt.set_frame_primitive(Some(make_primitive()));
    rt.render(c, render).unwrap();
    assert_eq!(requests.borrow().len(), 2);

    let pending: Vec<_> = requests.borrow_mut().drain(..).collect();
    for cb in pending {
        cb();
    }
    assert_eq!(rt.scheduler_state(), SchedulerState::Idle);
    assert!(rt.after_paint_queue().is_empty());
}

#[test]
fn detached_instance_is_skipped_by_flush() {
    let (platform, rt) = setup();
    let events = log();
    let live = rt.mount("Live", None).unwrap();
    let gone = rt.mount("Detached", None).unwrap();

    for (id, name) in [(live, "live"), (gone, "detached")] {
        let events = events.clone();
        rt.render(id, move || use_effect(move || push(&events, name), deps![]))
            .unwrap();
    }
    rt.set_attached(gone, false).unwrap();
    platform.run_frame();

    assert_eq!(entries(&events), ["live"]);
}

#[test]
fn unmounted_instance_is_dropped_from_the_queue() {
    let (platform, rt) = setup();
    let events = log();
    let id = rt.mount("Short", None).unwrap();
    let e = events.clone();
    rt.render(id, move || use_effect(move || push(&e, "ran"), deps![]))
        .unwrap();

    rt.unmount(id).unwrap();
    assert!(rt.after_paint_queue().is_empty());
    platform.run_frame();
    assert!(entries(&events).is_empty());
}

#[test]
fn unmount_runs_every_cleanup_in_slot_order() {
    let (platform, rt) = setup();
    let events = log();
    let id = rt.mount("Teardown", None).unwrap();

    let e = events.clone();
    rt.render(id, move || {
        let e1 = e.clone();
        use_layout_effect(move || on_unmount(move || push(&e1, "layout")), deps![]);
        let e2 = e.clone();
        use_effect(move || on_unmount(move || push(&e2, "paint")), deps![]);
    })
    .unwrap();
    rt.commit(id).unwrap();
    platform.run_frame();

    rt.unmount(id).unwrap();
    assert_eq!(entries(&events), ["layout", "paint"]);
    assert_eq!(rt.unmount(id), Err(HookError::UnknownInstance(id)));
}

#[test]
fn rerender_flushes_stale_effects_first() {
    let (platform, rt) = setup();
    let events = log();
    let id = rt.mount("Fast", None).unwrap();

    let render = |n: i32| {
        let events = events.clone();
        move || {
            let events = events.clone();
            use_effect(
                move || {
                    push(&events, format!("run {n}"));
                    let events = events.clone();
                    on_unmount(move || push(&events, format!("clean {n}")))
                },
                deps![n],
            )
        }
    };

    rt.render(id, render(1)).unwrap();
    rt.render(id, render(2)).unwrap();
    assert_eq!(entries(&events), ["run 1"]);

    platform.run_frame();
    assert_eq!(entries(&events), ["run 1", "clean 1", "run 2"]);
}

#[test]
fn effect_may_dispatch_state() {
    let (platform, rt) = setup();
    let id = rt.mount("Fetch", None).unwrap();
    let render = || {
        let (data, set_data) = use_state(None::<u32>);
        use_effect(
            {
                let set_data = set_data.clone();
                move || set_data.set(Some(42))
            },
            deps![],
        );
        data
    };

    assert_eq!(rt.render(id, render).unwrap(), None);
    platform.run_frame();
    assert_eq!(rt.take_render_requests(), vec![id]);
    assert_eq!(rt.render(id, render).unwrap(), Some(42));
}

#[test]
fn panicking_effect_does_not_starve_other_instances() {
    let (_, rt) = setup();
    let events = log();
    let bad = rt.mount("Bad", None).unwrap();
    let good = rt.mount("Good", None).unwrap();

    rt.render(bad, || use_effect(|| -> Option<Dispose> { panic!("boom") }, deps![]))
        .unwrap();
    let e = events.clone();
    rt.render(good, move || use_effect(move || push(&e, "good"), deps![]))
        .unwrap();

    let outcome = panic::catch_unwind(AssertUnwindSafe(|| rt.flush_after_paint()));
    assert!(outcome.is_err());
    assert_eq!(entries(&events), ["good"]);
    assert_eq!(rt.scheduler_state(), SchedulerState::Idle);
}

#[test]
fn context_without_provider_returns_default() {
    let (_, rt) = setup();
    let theme = Context::new("light");
    let unrelated = Provider::new(&rt, &Context::new("other"), "x");
    let id = rt.mount("Leaf", None).unwrap();
    rt.provide(id, &unrelated).unwrap();

    let value = rt.render(id, || use_context(&theme)).unwrap();
    assert_eq!(value, "light");
    assert_eq!(rt.slot_count(id), Some(1));
    assert!(unrelated.subscribers().is_empty());

    let dark = Provider::new(&rt, &theme, "dark");
    rt.provide(id, &dark).unwrap();
    let value = rt.render(id, || use_context(&theme)).unwrap();
    assert_eq!(value, "dark");
    assert_eq!(dark.subscribers(), vec![id]);
}

#[test]
fn context_subscribes_once_and_rerenders_on_change() {
    let (_, rt) = setup();
    let theme = Context::new("light".to_string());
    let app = rt.mount("App", None).unwrap();
    let leaf = rt.mount("Leaf", Some(app)).unwrap();
    let provider = Provider::new(&rt, &theme, "dark".to_string());
    rt.provide(app, &provider).unwrap();

    for _ in 0..2 {
        let theme = theme.clone();
        let value = rt.render(leaf, move || use_context(&theme)).unwrap();
        assert_eq!(value, "dark");
    }
    assert_eq!(provider.subscribers(), vec![leaf]);

    provider.set("dark".to_string());
    assert!(rt.take_render_requests().is_empty());

    provider.set("solarized".to_string());
    assert_eq!(rt.take_render_requests(), vec![leaf]);
    let value = rt.render(leaf, || use_context(&theme)).unwrap();
    assert_eq!(value, "solarized");

    rt.unmount(leaf).unwrap();
    assert!(provider.subscribers().is_empty());
}

#[test]
fn nearest_provider_wins() {
    let (_, rt) = setup();
    let depth = Context::new(0);
    let root = rt.mount("Root", None).unwrap();
    let mid = rt.mount("Mid", Some(root)).unwrap();
    let leaf = rt.mount("Leaf", Some(mid)).unwrap();
    rt.provide(root, &Provider::new(&rt, &depth, 1)).unwrap();
    rt.provide(mid, &Provider::new(&rt, &depth, 2)).unwrap();

    assert_eq!(rt.render(leaf, || use_context(&depth)).unwrap(), 2);
    assert_eq!(rt.render(root, || use_context(&depth)).unwrap(), 1);
}

#[test]
fn imperative_handle_follows_target_and_deps() {
    let (_, rt) = setup();
    let id = rt.mount("Input", None).unwrap();
    let first = RefTarget::<String>::cell();
    let second = RefTarget::<String>::cell();

    let render = |target: RefTarget<String>, label: &'static str| {
        move || use_imperative_handle(&target, move || format!("handle:{label}"), deps![label])
    };

    rt.render(id, render(first.clone(), "a")).unwrap();
    rt.commit(id).unwrap();
    assert_eq!(first.current().as_deref(), Some("handle:a"));

    rt.render(id, render(first.clone(), "a")).unwrap();
    rt.commit(id).unwrap();
    assert_eq!(first.current().as_deref(), Some("handle:a"));

    rt.render(id, render(second.clone(), "a")).unwrap();
    rt.commit(id).unwrap();
    assert_eq!(first.current(), None);
    assert_eq!(second.current().as_deref(), Some("handle:a"));

    rt.unmount(id).unwrap();
    assert_eq!(second.current(), None);
}

#[test]
fn callback_ref_receives_handle_and_clear() {
    let (_, rt) = setup();
    let id = rt.mount("Input", None).unwrap();
    let seen: Rc<RefCell<Vec<Option<u8>>>> = Rc::new(RefCell::new(Vec::new()));
    let target = {
        let seen = seen.clone();
        RefTarget::callback(move |v| seen.borrow_mut().push(v))
    };

    let t = target.clone();
    rt.render(id, move || use_imperative_handle(&t, || 9u8, deps![]))
        .unwrap();
    rt.commit(id).unwrap();
    rt.unmount(id).unwrap();
    assert_eq!(*seen.borrow(), vec![Some(9), None]);
}

#[test]
fn debug_values_reach_instrumentation_only_when_installed() {
    let (_, rt) = setup();
    let id = rt.mount("Debug", None).unwrap();
    let formatted = Rc::new(RefCell::new(0));

    let render = {
        let formatted = formatted.clone();
        move || {
            use_debug_value("raw");
            let formatted = formatted.clone();
            use_debug_value_with(5, move |n| {
                *formatted.borrow_mut() += 1;
                format!("n={n}")
            });
        }
    };

    rt.render(id, render.clone()).unwrap();
    assert_eq!(*formatted.borrow(), 0);
    assert_eq!(rt.slot_count(id), Some(0));

    let labels = log();
    let sink = labels.clone();
    rt.set_instrumentation(
        Instrumentation::new().on_debug_value(move |_, v| push(&sink, format!("{v:?}"))),
    );
    rt.render(id, render).unwrap();
    assert_eq!(entries(&labels), ["\"raw\"", "\"n=5\""]);
    assert_eq!(*formatted.borrow(), 1);
}

#[test]
fn unmount_is_reported_to_instrumentation() {
    let (_, rt) = setup();
    let gone: Rc<RefCell<Vec<InstanceId>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = gone.clone();
    rt.set_instrumentation(Instrumentation::new().on_unmount(move |id| sink.borrow_mut().push(id)));

    let a = rt.mount("A", None).unwrap();
    let b = rt.mount("B", None).unwrap();
    rt.unmount(b).unwrap();
    assert!(rt.unmount(b).is_err());
    rt.unmount(a).unwrap();

    assert_eq!(*gone.borrow(), vec![b, a]);
}

#[test]
fn hook_access_is_reported_with_index_and_kind() {
    let (_, rt) = setup();
    let id = rt.mount("Traced", None).unwrap();
    let seen: Rc<RefCell<Vec<(usize, HookKind)>>> = Rc::new(RefCell::new(Vec::new()));
    let sink = seen.clone();
    rt.set_instrumentation(
        Instrumentation::new().on_hook(move |_, index, kind| sink.borrow_mut().push((index, kind))),
    );

    rt.render(id, || {
        use_state(0);
        use_memo(|| 1, deps![]);
        use_layout_effect(|| {}, deps![]);
        use_effect(|| {}, deps![]);
        use_id();
    })
    .unwrap();

    assert_eq!(
        *seen.borrow(),
        vec![
            (0, HookKind::State),
            (1, HookKind::Memo),
            (2, HookKind::LayoutEffect),
            (3, HookKind::Effect),
            (4, HookKind::Id),
        ]
    );
}

#[test]
fn ids_are_stable_per_slot_and_unique() {
    let (_, rt) = setup();
    let a = rt.mount("A", None).unwrap();
    let b = rt.mount("B", None).unwrap();
    let render = || (use_id(), use_id());

    let (a1, a2) = rt.render(a, render).unwrap();
    let (again, _) = rt.render(a, render).unwrap();
    let (b1, _) = rt.render(b, render).unwrap();

    assert_eq!(a1, again);
    assert_ne!(a1, a2);
    assert_ne!(a1, b1);
}

#[test]
fn skip_effects_registers_nothing() {
    let platform = Rc::new(ManualPlatform::new());
    let rt = Runtime::with_config(platform.clone(), RuntimeConfig::default().skip_effects(true));
    let id = rt.mount("Server", None).unwrap();
    let events = log();

    let e = events.clone();
    rt.render(id, move || {
        let e1 = e.clone();
        use_layout_effect(move || push(&e1, "layout"), None);
        let e2 = e.clone();
        use_effect(move || push(&e2, "paint"), None);
        use_state(0).0
    })
    .unwrap();
    rt.commit(id).unwrap();
    platform.run_frame();

    assert!(entries(&events).is_empty());
    assert_eq!(platform.pending_frames(), 0);
    assert_eq!(rt.slot_count(id), Some(3));
}

#[test]
#[should_panic(expected = "outside of a render pass")]
fn hook_outside_render_panics() {
    let _ = use_state(0);
}

#[test]
fn nested_render_is_refused() {
    let (_, rt) = setup();
    let outer = rt.mount("Outer", None).unwrap();
    let inner = rt.mount("Inner", None).unwrap();

    let nested = rt.render(outer, || rt.render(inner, || ())).unwrap();
    assert_eq!(
        nested,
        Err(HookError::NestedRender {
            active: outer,
            requested: inner
        })
    );

    rt.render(inner, || ()).unwrap();
}

#[test]
fn render_of_unknown_instance_fails() {
    let (_, rt) = setup();
    let id = rt.mount("Temp", None).unwrap();
    rt.unmount(id).unwrap();
    assert_eq!(rt.render(id, || ()), Err(HookError::UnknownInstance(id)));
    assert_eq!(rt.commit(id), Err(HookError::UnknownInstance(id)));
    assert!(rt.mount("Orphan", Some(id)).is_err());
}

#[test]
fn custom_render_scheduler_receives_requests() {
    let (_, rt) = setup();
    let queue = Rc::new(RenderQueue::new());
    rt.set_render_scheduler(queue.clone());
    let id = rt.mount("Custom", None).unwrap();

    let (_, set) = rt.render(id, || use_state(0)).unwrap();
    set.set(1);
    set.set(2);

    assert_eq!(queue.drain(), vec![id]);
    assert!(rt.take_render_requests().is_empty());
}
