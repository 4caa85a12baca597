//! Integration Tests for the Reactive System
//!
//! These tests drive cells, effects, triggers, slots and hooks together
//! through the public API.

use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use reactivity_core::config::RuntimeConfig;
use reactivity_core::deps;
use reactivity_core::reactive::{
    it, when, ChangeEvent, IdOptions, Property, Runtime, Stateful, SubscriberId,
};
use reactivity_core::ReactiveError;

/// Each subscription runs once per set.
#[test]
fn subscription_runs_once_per_set() {
    let cell = Stateful::new(0);
    let call_count = Arc::new(AtomicI32::new(0));

    let call_count_clone = call_count.clone();
    cell.subscribe(SubscriberId::new(), move || {
        call_count_clone.fetch_add(1, Ordering::SeqCst);
    });

    cell.set(1).unwrap();
    assert_eq!(call_count.load(Ordering::SeqCst), 1);

    // Setting an equal value is still a change
    cell.set(1).unwrap();
    assert_eq!(call_count.load(Ordering::SeqCst), 2);
}

/// Standalone cells can be listed by any runtime's effects.
#[test]
fn effect_over_standalone_cell() {
    let runtime = Runtime::new();
    let cell = Stateful::new(0);
    let runs = Arc::new(AtomicUsize::new(0));

    let runs_clone = runs.clone();
    let effect = runtime
        .use_effect(
            move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
            },
            deps![cell],
        )
        .unwrap();

    cell.set(1).unwrap();
    cell.set(2).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    effect.dispose();
    cell.set(3).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
}

/// An effect over one cell sees every value it is set to, in order.
#[test]
fn effect_observes_every_value() {
    let runtime = Runtime::new();
    let (count, set_count) = runtime.use_state(0);
    let observed = Arc::new(Mutex::new(Vec::new()));

    let count_clone = count.clone();
    let observed_clone = observed.clone();
    let effect = runtime
        .use_effect(
            move || observed_clone.lock().push(count_clone.get()),
            deps![count],
        )
        .unwrap();

    for i in 1..=10 {
        set_count.set(i).unwrap();
    }

    assert_eq!(effect.run_count(), 10);
    assert_eq!(*observed.lock(), (1..=10).collect::<Vec<_>>());
}

/// Disposing stops the effect; sets after that are silent.
#[test]
fn disposer_stops_effect() {
    let runtime = Runtime::new();
    let a = runtime.state(0);
    let b = runtime.state(String::new());
    let runs = Arc::new(AtomicUsize::new(0));

    let runs_clone = runs.clone();
    let effect = runtime
        .use_effect(
            move || {
                runs_clone.fetch_add(1, Ordering::SeqCst);
            },
            deps![a, b],
        )
        .unwrap();
    let dispose = effect.disposer();

    a.set(1).unwrap();
    b.set("x".into()).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);

    dispose();
    a.set(2).unwrap();
    b.set("y".into()).unwrap();
    assert_eq!(runs.load(Ordering::SeqCst), 2);
    assert!(effect.is_disposed());
}

/// Two predicates, one action per matching change.
#[test]
fn trigger_with_two_predicates() {
    let count = Stateful::new(0);
    let hits = Arc::new(Mutex::new(Vec::new()));

    let hits_clone = hits.clone();
    when(
        it(&count).equals(3).meets_condition(|c| *c > 7),
        move |c| hits_clone.lock().push(c),
    );

    for i in 1..=10 {
        count.set(i).unwrap();
    }

    assert_eq!(*hits.lock(), vec![3, 8, 9, 10]);
}

/// Counting from 40 to 60 crosses 50 exactly once.
#[test]
fn trigger_on_exact_value_fires_once() {
    let runtime = Runtime::new();
    let count = runtime.state(40);
    let reached = Arc::new(Mutex::new(Vec::new()));

    let reached_clone = reached.clone();
    when(it(&count).equals(50), move |c| reached_clone.lock().push(c));

    for _ in 0..20 {
        count.update(|c| c + 1).unwrap();
    }

    assert_eq!(count.get(), 60);
    assert_eq!(*reached.lock(), vec![50]);
}

/// Counting up from 40 until the threshold holds fires at 50, not 49 or 51.
#[test]
fn threshold_trigger_fires_when_reached() {
    let runtime = Runtime::new();
    let count = runtime.state(40);
    let fired = Arc::new(Mutex::new(Vec::new()));

    let fired_clone = fired.clone();
    when(it(&count).meets_condition(|c| *c >= 50), move |c| {
        fired_clone.lock().push(c)
    });

    while fired.lock().is_empty() {
        count.update(|c| c + 1).unwrap();
    }

    assert_eq!(count.get(), 50);
    assert_eq!(*fired.lock(), vec![50]);
}

/// The first call from a site wins; later initial values are ignored.
#[test]
fn slot_keeps_first_value() {
    let runtime = Runtime::new();

    let values: Vec<i32> = [5, 999]
        .into_iter()
        .map(|initial| runtime.use_ref(initial).unwrap().get())
        .collect();

    assert_eq!(values, vec![5, 5]);
}

/// Slot writes persist across calls from the same site.
#[test]
fn slot_tracks_renders() {
    fn render(runtime: &Runtime) -> usize {
        let renders = runtime.use_ref(0_usize).unwrap();
        renders.update(|n| {
            *n += 1;
            *n
        })
    }

    let runtime = Runtime::new();
    assert_eq!(render(&runtime), 1);
    assert_eq!(render(&runtime), 2);
    assert_eq!(render(&runtime), 3);

    // A different runtime has its own slots
    assert_eq!(render(&Runtime::new()), 1);
}

#[test]
fn use_id_is_stable_and_in_range() {
    fn component_id(runtime: &Runtime) -> u64 {
        runtime.use_id(IdOptions::new(100, 200))
    }

    let runtime = Runtime::new();
    let first = component_id(&runtime);
    assert_eq!(component_id(&runtime), first);
    assert!((100..=200).contains(&first));
}

/// A hook sees both mutations, in order, with the new values.
#[test]
fn global_hook_sees_each_mutation() {
    let runtime = Runtime::new();
    let cell = runtime.state(0);
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = seen.clone();
    runtime.install_global_hook(move |event: &ChangeEvent<'_>| {
        if let Some(value) = event.value_as::<i32>() {
            seen_clone.lock().push(*value);
        }
    });

    cell.set(1).unwrap();
    cell.set(2).unwrap();

    assert_eq!(*seen.lock(), vec![1, 2]);
}

/// Hooks run in installation order, after the subscribers.
#[test]
fn hooks_follow_subscribers_in_order() {
    let runtime = Runtime::new();
    let cell = runtime.state(0);
    let order = Arc::new(Mutex::new(Vec::new()));

    for name in ["first hook", "second hook"] {
        let order = order.clone();
        runtime.install_global_hook(move |_: &ChangeEvent<'_>| order.lock().push(name));
    }
    let order_clone = order.clone();
    runtime
        .use_effect(move || order_clone.lock().push("effect"), deps![cell])
        .unwrap();

    cell.set(1).unwrap();
    assert_eq!(*order.lock(), vec!["effect", "first hook", "second hook"]);
}

/// A callback error ends the pass and surfaces from `set()`.
#[test]
fn callback_error_aborts_propagation() {
    let runtime = Runtime::new();
    let cell = runtime.state(0);
    let later = Arc::new(AtomicUsize::new(0));
    let hooked = Arc::new(AtomicUsize::new(0));

    runtime
        .use_effect(
            || -> reactivity_core::Result<()> { Err(ReactiveError::callback("boom")) },
            deps![cell],
        )
        .unwrap();
    let later_clone = later.clone();
    runtime
        .use_effect(
            move || {
                later_clone.fetch_add(1, Ordering::SeqCst);
            },
            deps![cell],
        )
        .unwrap();
    let hooked_clone = hooked.clone();
    runtime.install_global_hook(move |_: &ChangeEvent<'_>| {
        hooked_clone.fetch_add(1, Ordering::SeqCst);
    });

    let err = cell.set(7).unwrap_err();
    assert_eq!(err.to_string(), "callback failed: boom");

    assert_eq!(cell.get(), 7);
    assert_eq!(later.load(Ordering::SeqCst), 0);
    assert_eq!(hooked.load(Ordering::SeqCst), 0);
}

/// Two effects that set each other's cells hit the depth limit.
#[test]
fn mutual_recursion_is_refused() {
    let runtime = Runtime::with_config(RuntimeConfig::default().max_propagation_depth(Some(8)));
    let ping = runtime.state(0);
    let pong = runtime.state(0);

    let (ping_clone, pong_clone) = (ping.clone(), pong.clone());
    runtime
        .use_effect(move || pong_clone.set(ping_clone.get() + 1), deps![ping])
        .unwrap();
    let (ping_clone, pong_clone) = (ping.clone(), pong.clone());
    runtime
        .use_effect(move || ping_clone.set(pong_clone.get() + 1), deps![pong])
        .unwrap();

    let err = ping.set(1).unwrap_err();
    assert!(matches!(
        err,
        ReactiveError::ReentrantMutation { depth: 9, limit: 8, .. }
    ));
    assert_eq!(runtime.propagation_depth(), 0);

    // The runtime is usable again afterwards
    let other = runtime.state(0);
    assert!(other.set(1).is_ok());
}

#[test]
fn unbounded_runtime_allows_deep_chains() {
    let runtime = Runtime::with_config(RuntimeConfig::default().max_propagation_depth(None));
    let cells: Vec<Stateful<u32>> = (0..300).map(|_| runtime.state(0)).collect();

    for pair in cells.windows(2) {
        let (from, to) = (pair[0].clone(), pair[1].clone());
        pair[0].on_change(move || to.set(from.get() + 1));
    }

    cells[0].set(1).unwrap();
    assert_eq!(cells[299].get(), 300);
}

/// Dependencies from another runtime are caught at registration.
#[test]
fn cross_runtime_dependency_is_rejected() {
    let runtime = Runtime::with_config(RuntimeConfig::default().validate_dependencies(true));
    let own = runtime.state(0);
    let foreign = Runtime::new().state(0);

    let err = runtime
        .use_effect(|| {}, deps![own, foreign])
        .unwrap_err();
    assert_eq!(
        err.to_string(),
        format!(
            "dependency #2 is not a valid dependency (got {})",
            std::any::type_name::<Stateful<i32>>()
        )
    );
}

/// Cells of different types in one dependency list.
#[test]
fn mixed_type_dependencies() {
    let runtime = Runtime::new();
    let name = runtime.state(String::from("ada"));
    let age = runtime.state(36_u32);
    let summary = Arc::new(Mutex::new(String::new()));

    let (name_clone, age_clone, summary_clone) = (name.clone(), age.clone(), summary.clone());
    runtime
        .use_effect(
            move || *summary_clone.lock() = format!("{} ({})", name_clone.get(), age_clone.get()),
            deps![name, age],
        )
        .unwrap();

    age.set(37).unwrap();
    assert_eq!(*summary.lock(), "ada (37)");

    name.set(String::from("grace")).unwrap();
    assert_eq!(*summary.lock(), "grace (37)");
}

/// Properties as struct fields, watched by an effect and a trigger.
#[test]
fn property_fields_drive_effects_and_triggers() {
    struct Settings {
        volume: Property<u8>,
    }

    let runtime = Runtime::new();
    let settings = Settings {
        volume: Property::new(&runtime, 5),
    };
    let changes = Arc::new(AtomicUsize::new(0));
    let muted = Arc::new(AtomicUsize::new(0));

    let changes_clone = changes.clone();
    runtime
        .use_effect(
            move || {
                changes_clone.fetch_add(1, Ordering::SeqCst);
            },
            deps![settings.volume.state()],
        )
        .unwrap();
    let muted_clone = muted.clone();
    when(it(&settings.volume.state()).equals(0), move |_| {
        muted_clone.fetch_add(1, Ordering::SeqCst);
    });

    settings.volume.set_value(3).unwrap();
    settings.volume.set_value(0).unwrap();
    settings.volume.update(|v| v + 1).unwrap();

    assert_eq!(settings.volume.value(), 1);
    assert_eq!(changes.load(Ordering::SeqCst), 3);
    assert_eq!(muted.load(Ordering::SeqCst), 1);
}

#[test]
fn verbose_debug_output_from_json_config() {
    let config = RuntimeConfig::from_json(r#"{ "verbose_debug": true }"#).unwrap();
    let runtime = Runtime::with_config(config);

    runtime.enable_verbose_debug_output(true);
    assert_eq!(runtime.global_hook_count(), 1);

    runtime.state("quiet").set("loud").unwrap();
}
