use std::time::Duration;

use crate::constants;

/// Tunable parameters for the deformation engine.
///
/// Constructed once and passed to [`crate::DeformationEngine::new`]; there is
/// no ambient configuration. Defaults reproduce the shipped feel of the toy.
#[derive(Clone, Debug)]
pub struct DeformConfig {
    /// World-space radius around the grab point within which vertices move.
    pub radius: f32,
    /// Scale applied to the pull vector before displacing vertices.
    pub strength: f32,
    /// Blend factor toward the pulled target per apply call.
    pub grab_lerp: f32,
    /// Blend factor toward rest for vertices outside the influence radius.
    pub return_lerp: f32,
    /// Spring constant of the return-to-rest oscillator.
    pub spring: f32,
    /// Per-tick velocity retention of the return oscillator, in (0, 1).
    pub damping: f32,
    pub velocity_threshold: f32,
    pub distance_threshold: f32,
    /// Minimum interval between apply-deformation calls (enforced by the caller).
    pub throttle: Duration,
    /// Hard bound on return ticks before the mesh is snapped to rest.
    pub max_return_ticks: u32,
}

impl Default for DeformConfig {
    fn default() -> Self {
        Self {
            radius: constants::DEFORM_RADIUS,
            strength: constants::DEFORM_STRENGTH,
            grab_lerp: constants::GRAB_LERP_FACTOR,
            return_lerp: constants::RETURN_LERP_FACTOR,
            spring: constants::RETURN_SPRING,
            damping: constants::RETURN_DAMPING,
            velocity_threshold: constants::VELOCITY_THRESHOLD,
            distance_threshold: constants::DISTANCE_THRESHOLD,
            throttle: Duration::from_secs_f32(constants::DEFORM_THROTTLE_MS / 1000.0),
            max_return_ticks: constants::MAX_RETURN_TICKS,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("influence radius must be positive, got {0}")]
    NonPositiveRadius(f32),
    #[error("damping must be in (0, 1), got {0}")]
    DampingOutOfRange(f32),
    #[error("spring {spring} with damping {damping} falls outside the stable range")]
    UnstableSpring { spring: f32, damping: f32 },
    #[error("interpolation factor must be in (0, 1], got {0}")]
    LerpOutOfRange(f32),
    #[error("settle threshold must be positive, got {0}")]
    NonPositiveThreshold(f32),
}

impl DeformConfig {
    /// Check that the configuration describes a converging simulation.
    ///
    /// The return oscillator is stable when `0 < spring * (1 + damping) < 2`;
    /// outside that range the spring can oscillate forever or diverge.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.radius <= 0.0 {
            return Err(ConfigError::NonPositiveRadius(self.radius));
        }
        if self.damping <= 0.0 || self.damping >= 1.0 {
            return Err(ConfigError::DampingOutOfRange(self.damping));
        }
        let k = self.spring * (1.0 + self.damping);
        if self.spring <= 0.0 || k >= 2.0 {
            return Err(ConfigError::UnstableSpring {
                spring: self.spring,
                damping: self.damping,
            });
        }
        for lerp in [self.grab_lerp, self.return_lerp] {
            if lerp <= 0.0 || lerp > 1.0 {
                return Err(ConfigError::LerpOutOfRange(lerp));
            }
        }
        for threshold in [self.velocity_threshold, self.distance_threshold] {
            if threshold <= 0.0 {
                return Err(ConfigError::NonPositiveThreshold(threshold));
            }
        }
        Ok(())
    }
}
