//! End-to-end session behavior through the store + timer pair, driven
//! by the manually stepped frame driver.

use prana_core::{
    shared_store, BreathingStore, BreathingTimer, ManualDriver, Phase, PhaseKey, TimerCore,
};

/// Convenience: a playing box-pattern store (4s per phase, 16s cycle)
/// with an anchored tick core.
fn anchored() -> (BreathingStore, TimerCore) {
    let mut store = BreathingStore::new();
    store.play();
    let mut core = TimerCore::new();
    core.on_frame(0.0, &mut store);
    (store, core)
}

#[test]
fn phases_advance_through_a_full_cycle() {
    let (mut store, mut core) = anchored();

    core.on_frame(4000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::HoldIn);

    core.on_frame(8000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::Exhale);

    core.on_frame(12_000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::HoldOut);
}

#[test]
fn full_cycle_wraps_to_inhale_and_counts() {
    let (mut store, mut core) = anchored();

    core.on_frame(16_000.0, &mut store);
    assert_eq!(store.cycle_count(), 2);
    assert_eq!(store.current_phase(), Phase::Inhale);
    assert!(store.current_time().abs() < 1e-9);
}

#[test]
fn speed_up_mid_cycle_keeps_position_and_shifts_phase() {
    let (mut store, mut core) = anchored();

    core.on_frame(8000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::Exhale);

    store.adjust_cycle_speed(4000.0);
    assert_eq!(store.total_cycle_time(), 20_000.0);
    assert!((store.current_time() - 8000.0).abs() < 1e-9);

    // next frame rederives against the shifted boundaries
    core.on_frame(8000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::HoldIn);
}

#[test]
fn extreme_slowdown_floors_the_cycle_and_reclamps() {
    let (mut store, mut core) = anchored();

    core.on_frame(6000.0, &mut store);
    store.adjust_cycle_speed(-20_000.0);

    assert_eq!(store.total_cycle_time(), 500.0);
    assert!(store.current_time() < 500.0);

    core.on_frame(6000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::Inhale);
}

#[test]
fn zeroed_holds_are_skipped_entirely() {
    let mut store = BreathingStore::new();
    store.update_draft_phase(PhaseKey::HoldIn, 0.0);
    store.update_draft_phase(PhaseKey::HoldOut, 0.0);
    store.save_settings();
    store.play();

    let mut core = TimerCore::new();
    core.on_frame(0.0, &mut store);

    core.on_frame(4000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::Exhale);

    core.on_frame(8000.0, &mut store);
    assert_eq!(store.current_phase(), Phase::Inhale);
    assert_eq!(store.cycle_count(), 2);
}

#[test]
fn timer_subscribes_on_play_and_unsubscribes_on_pause() {
    let driver = ManualDriver::new();
    let mut timer = BreathingTimer::new(shared_store(BreathingStore::new()), driver.clone());
    assert!(!driver.is_subscribed());

    timer.play();
    assert!(driver.is_subscribed());

    driver.step(0.0);
    driver.step(4500.0);
    let snap = timer.snapshot();
    assert_eq!(snap.phase, Phase::HoldIn);
    assert!(snap.is_playing);
    assert!((snap.time_in_cycle - 4500.0).abs() < 1e-9);

    timer.pause();
    assert!(!driver.is_subscribed());

    // a misbehaving driver tick after stop would be ignored anyway
    driver.step(90_000.0);
    let frozen = timer.snapshot();
    assert!(!frozen.is_playing);
    assert!((frozen.time_in_cycle - 4500.0).abs() < 1e-9);
}

#[test]
fn resume_does_not_count_the_pause_as_elapsed() {
    let driver = ManualDriver::new();
    let mut timer = BreathingTimer::new(shared_store(BreathingStore::new()), driver.clone());

    timer.play();
    driver.step(0.0);
    driver.step(2000.0);
    timer.pause();

    timer.play();
    // first tick after resume only re-anchors
    driver.step(600_000.0);
    driver.step(600_500.0);

    let snap = timer.snapshot();
    assert!((snap.time_in_cycle - 2500.0).abs() < 1e-9);
    assert!((snap.session_time - 2500.0).abs() < 1e-9);
}

#[test]
fn reset_returns_to_idle_but_keeps_selection() {
    let driver = ManualDriver::new();
    let store = shared_store(BreathingStore::with_pattern("4-7-8"));
    let mut timer = BreathingTimer::new(store, driver.clone());

    timer.play();
    driver.step(0.0);
    driver.step(30_000.0);
    timer.reset();

    assert!(!driver.is_subscribed());
    let snap = timer.snapshot();
    assert_eq!(snap.phase, Phase::Ready);
    assert_eq!(snap.cycle_count, 1);
    assert_eq!(snap.session_time, 0.0);
    assert_eq!(snap.time_in_cycle, 0.0);
    assert_eq!(timer.store().lock().selected_pattern(), "4-7-8");
}

#[test]
fn dropping_the_timer_stops_the_driver() {
    let driver = ManualDriver::new();
    {
        let mut timer = BreathingTimer::new(shared_store(BreathingStore::new()), driver.clone());
        timer.play();
        assert!(driver.is_subscribed());
    }
    assert!(!driver.is_subscribed());
}
