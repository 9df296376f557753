// Host-side tests for the pure interaction helpers.

use std::time::Duration;

use app_core::{ButtonCue, ClickTracker, CuePicker, StretchTracker, Throttle};
use glam::Vec2;
use instant::Instant;

#[test]
fn throttle_limits_rate() {
    let mut throttle = Throttle::new(Duration::from_micros(16_670));
    let t0 = Instant::now();
    assert!(throttle.ready(t0));
    assert!(!throttle.ready(t0 + Duration::from_millis(10)));
    assert!(throttle.ready(t0 + Duration::from_millis(17)));
    assert!(!throttle.ready(t0 + Duration::from_millis(18)));
}

#[test]
fn throttle_reset_rearms_immediately() {
    let mut throttle = Throttle::new(Duration::from_millis(100));
    let t0 = Instant::now();
    assert!(throttle.ready(t0));
    throttle.reset();
    assert!(throttle.ready(t0 + Duration::from_millis(1)));
}

#[test]
fn stretch_cues_fire_at_pixel_thresholds() {
    let mut tracker = StretchTracker::new(50.0, 100.0);
    tracker.begin(Vec2::ZERO);
    assert!(!tracker.update(Vec2::new(30.0, 0.0)));
    assert!(tracker.update(Vec2::new(60.0, 0.0)), "50px initial threshold");
    assert!(!tracker.update(Vec2::new(120.0, 0.0)), "only 60px since last");
    assert!(tracker.update(Vec2::new(170.0, 0.0)), "110px since last");
}

#[test]
fn release_cue_depends_on_distance_from_center() {
    let center = Vec2::new(500.0, 400.0);

    let mut tracker = StretchTracker::new(50.0, 100.0);
    tracker.begin(Vec2::new(500.0, 400.0));
    tracker.update(Vec2::new(560.0, 400.0));
    assert!(tracker.finish(Vec2::new(900.0, 400.0), center, 300.0));

    // close to center: stretch stops silently
    tracker.begin(Vec2::new(500.0, 400.0));
    tracker.update(Vec2::new(560.0, 400.0));
    assert!(!tracker.finish(Vec2::new(550.0, 400.0), center, 300.0));

    // no stretch ever triggered: nothing to release
    tracker.begin(Vec2::new(500.0, 400.0));
    assert!(!tracker.finish(Vec2::new(900.0, 400.0), center, 300.0));
}

#[test]
fn stretch_tracker_inactive_without_begin() {
    let mut tracker = StretchTracker::new(50.0, 100.0);
    assert!(!tracker.update(Vec2::new(500.0, 0.0)));
    assert!(!tracker.finish(Vec2::new(900.0, 0.0), Vec2::ZERO, 300.0));
}

#[test]
fn rapid_presses_swap_to_the_alternate_cue() {
    let mut clicks = ClickTracker::new(Duration::from_millis(500), 3);
    let t0 = Instant::now();
    assert_eq!(clicks.press(t0), Some(ButtonCue::Primary));
    assert_eq!(clicks.press(t0 + Duration::from_millis(100)), None);
    assert_eq!(
        clicks.press(t0 + Duration::from_millis(200)),
        Some(ButtonCue::Alternate)
    );
    // still inside the window after the alternate: stays quiet
    assert_eq!(clicks.press(t0 + Duration::from_millis(300)), None);
    // after a pause the primary cue returns
    assert_eq!(
        clicks.press(t0 + Duration::from_millis(900)),
        Some(ButtonCue::Primary)
    );
}

#[test]
fn cue_picker_never_repeats() {
    let mut picker = CuePicker::new(5, 42);
    let mut prev = picker.next();
    for _ in 0..200 {
        let i = picker.next();
        assert!(i < 5);
        assert_ne!(i, prev, "picked the same cue twice in a row");
        prev = i;
    }
}

#[test]
fn cue_picker_single_variant() {
    let mut picker = CuePicker::new(1, 7);
    for _ in 0..5 {
        assert_eq!(picker.next(), 0);
    }
}
