//! Color helpers for the disco light and letter animation.

/// Convert HSL to RGB. `h` is in degrees (any value, wrapped), `s` and `l`
/// in [0, 1]; the result channels are in [0, 1].
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> [f32; 3] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(360.0) / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r, g, b) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    [r + m, g + m, b + m]
}

/// Hue wheel precomputed at a fixed degree step.
///
/// DOM color updates run every frame in disco mode; snapping to a small
/// cached table keeps them from recomputing (and re-stringifying) a fresh
/// color per letter per frame.
pub struct ColorWheel {
    colors: Vec<[f32; 3]>,
}

impl ColorWheel {
    pub fn new(step_degrees: u32, saturation: f32, lightness: f32) -> Self {
        let step = step_degrees.max(1);
        let colors = (0..360)
            .step_by(step as usize)
            .map(|deg| hsl_to_rgb(deg as f32, saturation, lightness))
            .collect();
        Self { colors }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.colors.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.colors.is_empty()
    }

    /// Sample by hue expressed in turns; fractional values snap down to the
    /// nearest cached entry.
    pub fn sample(&self, hue_turns: f32) -> [f32; 3] {
        let t = hue_turns.rem_euclid(1.0);
        let i = ((t * self.colors.len() as f32) as usize).min(self.colors.len() - 1);
        self.colors[i]
    }
}
