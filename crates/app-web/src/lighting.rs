//! Roaming point-light state: letter hover ramps it up over the pointer,
//! disco mode cycles the hue and orbits it.

use app_core::{constants, hsl_to_rgb};
use glam::{Vec2, Vec3};

pub struct LightingRig {
    disco: bool,
    animating: bool,
    current_color: Vec3,
    target_color: Vec3,
    current_intensity: f32,
    target_intensity: f32,
    position: Vec3,
    mouse_ndc: Vec2,
}

impl LightingRig {
    pub fn new() -> Self {
        Self {
            disco: false,
            animating: false,
            current_color: Vec3::ONE,
            target_color: Vec3::ONE,
            current_intensity: 0.0,
            target_intensity: 0.0,
            position: Vec3::new(0.0, 0.0, constants::LIGHT_Z_POSITION),
            mouse_ndc: Vec2::ZERO,
        }
    }

    pub fn set_disco(&mut self, on: bool) {
        self.disco = on;
        if !on {
            self.target_intensity = 0.0;
        }
    }

    /// Hover feedback for the title letters. Only the designated letters
    /// light the model; hovering anything else fades the light out.
    pub fn set_letter_hover(&mut self, lit: bool) {
        if self.disco {
            return;
        }
        if lit {
            self.target_color = Vec3::ONE;
            self.target_intensity = constants::DYNAMIC_LIGHT_INTENSITY;
            self.animating = true;
        } else {
            self.target_intensity = 0.0;
        }
    }

    pub fn set_mouse(&mut self, ndc: Vec2) {
        self.mouse_ndc = ndc;
    }

    /// Advance one frame. `time_ms` drives the disco hue and orbit clocks.
    pub fn animate(&mut self, time_ms: f64) {
        if self.disco {
            self.target_intensity = constants::DISCO_LIGHT_INTENSITY;
            let hue = (time_ms as f32 * constants::DISCO_LIGHT_HUE_SPEED).rem_euclid(1.0);
            self.target_color = Vec3::from(hsl_to_rgb(hue * 360.0, 1.0, 0.5));

            let t = time_ms as f32 * constants::DISCO_LIGHT_MOVE_SPEED;
            self.position = Vec3::new(
                t.sin() * constants::DISCO_LIGHT_RADIUS,
                t.cos() * constants::DISCO_LIGHT_RADIUS,
                constants::LIGHT_Z_POSITION + (t * 2.0).sin() * constants::LIGHT_Z_ANIMATION,
            );
            self.animating = true;
        }

        self.current_intensity +=
            (self.target_intensity - self.current_intensity) * constants::LIGHT_LERP_FACTOR;
        if self.current_intensity < constants::LIGHT_INTENSITY_THRESHOLD && !self.disco {
            self.animating = false;
            return;
        }

        if !self.disco && self.animating {
            self.target_color = Vec3::ONE;
            self.position = Vec3::new(
                self.mouse_ndc.x * constants::MOUSE_LIGHT_MULTIPLIER,
                self.mouse_ndc.y * constants::MOUSE_LIGHT_MULTIPLIER,
                constants::LIGHT_Z_POSITION,
            );
        }
        self.current_color = self
            .current_color
            .lerp(self.target_color, constants::LIGHT_LERP_FACTOR);
    }

    #[inline]
    pub fn point_position(&self) -> Vec3 {
        self.position
    }

    #[inline]
    pub fn point_color(&self) -> Vec3 {
        self.current_color
    }

    #[inline]
    pub fn point_intensity(&self) -> f32 {
        self.current_intensity
    }
}
