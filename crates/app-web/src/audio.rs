//! Synthesized audio cues; oscillator sweeps only, no audio assets.

use std::cell::RefCell;
use std::time::Duration;

use app_core::{constants, ButtonCue, ClickTracker, CuePicker};
use instant::Instant;
use web_sys as web;

pub struct AudioRig {
    ctx: web::AudioContext,
    master: web::GainNode,
    cue_gain: web::GainNode,
    drone: RefCell<Option<Drone>>,
    picker: RefCell<CuePicker>,
    clicks: RefCell<ClickTracker>,
}

struct Drone {
    osc: web::OscillatorNode,
    gain: web::GainNode,
}

fn create_gain(ctx: &web::AudioContext, value: f32, label: &str) -> Result<web::GainNode, ()> {
    match web::GainNode::new(ctx) {
        Ok(g) => {
            g.gain().set_value(value);
            Ok(g)
        }
        Err(e) => {
            log::error!("{} GainNode error: {:?}", label, e);
            Err(())
        }
    }
}

// One-shot oscillator sweep routed into `dest`, with a quick attack and a
// linear fade matching the sweep length.
fn sweep(
    ctx: &web::AudioContext,
    dest: &web::AudioNode,
    ty: web::OscillatorType,
    from_hz: f32,
    to_hz: f32,
    duration_sec: f64,
    velocity: f32,
) {
    if let Ok(src) = web::OscillatorNode::new(ctx) {
        src.set_type(ty);
        src.frequency().set_value(from_hz);
        if let Ok(g) = web::GainNode::new(ctx) {
            g.gain().set_value(0.0);
            let t0 = ctx.current_time() + 0.005;
            let _ = src
                .frequency()
                .linear_ramp_to_value_at_time(to_hz, t0 + duration_sec);
            let _ = g.gain().linear_ramp_to_value_at_time(velocity, t0 + 0.02);
            let _ = g.gain().linear_ramp_to_value_at_time(0.0, t0 + duration_sec);
            let _ = src.connect_with_audio_node(&g);
            let _ = g.connect_with_audio_node(dest);
            let _ = src.start_with_when(t0);
            let _ = src.stop_with_when(t0 + duration_sec + 0.05);
        }
    }
}

impl AudioRig {
    pub fn new(seed: u64) -> Result<Self, ()> {
        let ctx = match web::AudioContext::new() {
            Ok(c) => c,
            Err(e) => {
                log::error!("AudioContext error: {:?}", e);
                return Err(());
            }
        };
        let master = create_gain(&ctx, 0.8, "master")?;
        let _ = master.connect_with_audio_node(&ctx.destination());
        let cue_gain = create_gain(&ctx, constants::STRETCH_CUE_VOLUME, "cues")?;
        let _ = cue_gain.connect_with_audio_node(&master);
        Ok(Self {
            ctx,
            master,
            cue_gain,
            drone: RefCell::new(None),
            picker: RefCell::new(CuePicker::new(constants::STRETCH_CUE_COUNT, seed)),
            clicks: RefCell::new(ClickTracker::new(
                Duration::from_millis(constants::CLICK_WINDOW_MS),
                constants::CLICKS_FOR_ALT_CUE,
            )),
        })
    }

    /// Resume the context; must be called from inside a user gesture.
    pub fn unlock(&self) {
        let _ = self.ctx.resume();
    }

    /// Rubbery rising blip; a different variant each time, never repeating.
    pub fn play_stretch(&self) {
        let variant = self.picker.borrow_mut().next();
        let from = 140.0 + 35.0 * variant as f32;
        sweep(
            &self.ctx,
            &self.cue_gain,
            web::OscillatorType::Triangle,
            from,
            from * 1.7,
            0.28,
            0.9,
        );
    }

    /// Snap-back cue on a far release.
    pub fn play_release(&self) {
        sweep(
            &self.ctx,
            &self.cue_gain,
            web::OscillatorType::Square,
            420.0,
            90.0,
            0.18,
            0.7,
        );
    }

    /// Sound-button press; rapid triple presses swap to the alternate cue.
    pub fn button_pressed(&self) {
        match self.clicks.borrow_mut().press(Instant::now()) {
            Some(ButtonCue::Primary) => sweep(
                &self.ctx,
                &self.master,
                web::OscillatorType::Sine,
                160.0,
                70.0,
                0.35,
                1.0,
            ),
            Some(ButtonCue::Alternate) => {
                // detuned pair for a rougher, longer gurgle
                sweep(
                    &self.ctx,
                    &self.master,
                    web::OscillatorType::Sawtooth,
                    95.0,
                    55.0,
                    0.8,
                    0.6,
                );
                sweep(
                    &self.ctx,
                    &self.master,
                    web::OscillatorType::Sawtooth,
                    90.0,
                    60.0,
                    0.8,
                    0.6,
                );
            }
            None => {}
        }
    }

    /// Toggle the disco background drone.
    pub fn set_drone(&self, on: bool) {
        if on {
            if self.drone.borrow().is_some() {
                return;
            }
            let osc = match web::OscillatorNode::new(&self.ctx) {
                Ok(o) => o,
                Err(e) => {
                    log::error!("drone OscillatorNode error: {:?}", e);
                    return;
                }
            };
            osc.set_type(web::OscillatorType::Sawtooth);
            osc.frequency().set_value(55.0);
            let tone = match web::BiquadFilterNode::new(&self.ctx) {
                Ok(f) => f,
                Err(e) => {
                    log::error!("drone BiquadFilterNode error: {:?}", e);
                    return;
                }
            };
            tone.set_type(web::BiquadFilterType::Lowpass);
            tone.frequency().set_value(240.0);
            let gain = match create_gain(&self.ctx, 0.0, "drone") {
                Ok(g) => g,
                Err(()) => return,
            };
            let now = self.ctx.current_time();
            let _ = gain.gain().linear_ramp_to_value_at_time(0.12, now + 0.4);
            let _ = osc.connect_with_audio_node(&tone);
            let _ = tone.connect_with_audio_node(&gain);
            let _ = gain.connect_with_audio_node(&self.master);
            let _ = osc.start();
            *self.drone.borrow_mut() = Some(Drone { osc, gain });
        } else if let Some(d) = self.drone.borrow_mut().take() {
            let now = self.ctx.current_time();
            let _ = d.gain.gain().linear_ramp_to_value_at_time(0.0, now + 0.2);
            let _ = d.osc.stop_with_when(now + 0.25);
        }
    }
}
