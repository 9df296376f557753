//! Pure interaction heuristics shared with the web frontend.
//!
//! Everything here takes explicit timestamps and positions so it can be
//! exercised natively without a DOM.

use std::time::Duration;

use glam::Vec2;
use instant::Instant;
use rand::prelude::*;

/// Rate limiter for deformation updates.
pub struct Throttle {
    interval: Duration,
    last: Option<Instant>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last: None,
        }
    }

    /// True when enough time has elapsed since the last firing; arms the
    /// timer when it fires.
    pub fn ready(&mut self, now: Instant) -> bool {
        match self.last {
            Some(last) if now.duration_since(last) < self.interval => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

/// Screen-space drag distance tracker deciding when stretch cues fire.
///
/// The first cue fires after the pointer travels `initial` pixels from where
/// the grab began; each subsequent cue needs another `subsequent` pixels from
/// the previous trigger point.
pub struct StretchTracker {
    initial: f32,
    subsequent: f32,
    start: Vec2,
    last_trigger: Vec2,
    triggered: bool,
    active: bool,
}

impl StretchTracker {
    pub fn new(initial: f32, subsequent: f32) -> Self {
        Self {
            initial,
            subsequent,
            start: Vec2::ZERO,
            last_trigger: Vec2::ZERO,
            triggered: false,
            active: false,
        }
    }

    pub fn begin(&mut self, at: Vec2) {
        self.active = true;
        self.triggered = false;
        self.start = at;
        self.last_trigger = at;
    }

    /// Feed a pointer position; true when a stretch cue should fire.
    pub fn update(&mut self, at: Vec2) -> bool {
        if !self.active {
            return false;
        }
        if !self.triggered {
            if at.distance(self.start) >= self.initial {
                self.triggered = true;
                self.last_trigger = at;
                return true;
            }
        } else if at.distance(self.last_trigger) >= self.subsequent {
            self.last_trigger = at;
            return true;
        }
        false
    }

    /// End the drag. True when the release cue should play: a stretch was in
    /// progress and the pointer ended at least `release_distance` from
    /// `center` (the model's screen position).
    pub fn finish(&mut self, at: Vec2, center: Vec2, release_distance: f32) -> bool {
        let fire = self.active && self.triggered && at.distance(center) >= release_distance;
        self.active = false;
        self.triggered = false;
        fire
    }
}

/// Which cue a button press should play.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ButtonCue {
    Primary,
    Alternate,
}

/// Counts rapid presses on the sound button.
///
/// A press after a quiet period plays the primary cue; pressing
/// `presses_for_alt` times in quick succession swaps the last press to the
/// alternate cue. Intermediate rapid presses stay silent.
pub struct ClickTracker {
    window: Duration,
    presses_for_alt: u32,
    count: u32,
    last: Option<Instant>,
}

impl ClickTracker {
    pub fn new(window: Duration, presses_for_alt: u32) -> Self {
        Self {
            window,
            presses_for_alt,
            count: 0,
            last: None,
        }
    }

    pub fn press(&mut self, now: Instant) -> Option<ButtonCue> {
        let rapid = matches!(self.last, Some(last) if now.duration_since(last) < self.window);
        self.last = Some(now);
        if rapid {
            self.count += 1;
            if self.count >= self.presses_for_alt {
                self.count = 0;
                return Some(ButtonCue::Alternate);
            }
            None
        } else {
            self.count = 1;
            Some(ButtonCue::Primary)
        }
    }
}

/// Picks a cue variant index, never repeating the previous pick.
pub struct CuePicker {
    rng: StdRng,
    count: usize,
    last: Option<usize>,
}

impl CuePicker {
    pub fn new(count: usize, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            count,
            last: None,
        }
    }

    pub fn next(&mut self) -> usize {
        if self.count <= 1 {
            self.last = Some(0);
            return 0;
        }
        loop {
            let i = self.rng.gen_range(0..self.count);
            if Some(i) != self.last {
                self.last = Some(i);
                return i;
            }
        }
    }
}
