//! Tests for TimeManager
//!
//! Tick → phase mapping and horizon handling.

use cooperation_simulator_core_rs::TimeManager;

#[test]
fn test_time_manager_new() {
    let time = TimeManager::new(4, 13);
    assert_eq!(time.current_tick(), 0);
    assert_eq!(time.current_phase(), 0);
    assert_eq!(time.horizon(), 52);
    assert!(!time.is_finished());
}

#[test]
fn test_phase_boundary() {
    let mut time = TimeManager::new(4, 13); // 4 ticks per phase

    // Advance to the last tick of phase 0
    for _ in 0..3 {
        time.advance_tick();
    }
    assert_eq!(time.current_tick(), 3);
    assert_eq!(time.current_phase(), 0);
    assert_eq!(time.tick_within_phase(), 3);

    // Cross into phase 1
    time.advance_tick();
    assert_eq!(time.current_phase(), 1);
    assert_eq!(time.tick_within_phase(), 0);
}

#[test]
fn test_end_of_interval() {
    let mut time = TimeManager::new(4, 13);
    let mut closing = Vec::new();
    for _ in 0..12 {
        if time.is_end_of_interval(4) {
            closing.push(time.current_tick());
        }
        time.advance_tick();
    }
    assert_eq!(closing, vec![3, 7, 11]);
    assert!(!time.is_end_of_interval(0));
}

#[test]
fn test_finished_after_horizon() {
    let mut time = TimeManager::new(2, 3);
    for _ in 0..5 {
        time.advance_tick();
        assert!(!time.is_finished());
    }
    time.advance_tick();
    assert!(time.is_finished());
    assert_eq!(time.current_phase(), 2);
}
