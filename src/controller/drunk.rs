use glam::Vec2;
use rand::Rng;

use crate::model::Camera;

/// Procedural "drunk" perturbation: a stumble offset mixed into the walking
/// intent, a per-frame speed jitter, and a free-running sway/bob applied to
/// the camera after movement.
///
/// All amplitudes are fixed at construction; `intensity` scales every term,
/// so intensity 0 reduces the controller exactly to the sober formula.
pub struct DrunkEffect {
    pub intensity: f32,
    sway_amount: f32,
    bob_amount: f32,
    rotation_sway_amount: f32,
    base_eye_height: f32,
}

impl DrunkEffect {
    pub fn new(intensity: f32) -> Self {
        Self {
            intensity,
            sway_amount: 0.05,
            bob_amount: 0.03,
            rotation_sway_amount: 0.02,
            base_eye_height: 1.6,
        }
    }

    /// Stumble offset added to the movement intent while at least one
    /// movement key is held. Two sine/cosine pairs at incommensurate rates
    /// keep the wobble from looking periodic.
    pub fn stumble(&self, t: f32) -> Vec2 {
        let x = ((t * 1.5).sin() + (t * 2.3).sin()) * 0.3;
        let z = ((t * 1.2).cos() + (t * 1.8).cos()) * 0.3;
        Vec2::new(x, z) * self.intensity
    }

    /// Multiplicative speed variation, uniform in a band around 1
    pub fn speed_jitter(&self, rng: &mut impl Rng) -> f32 {
        1.0 + (rng.random::<f32>() - 0.5) * 0.3 * self.intensity
    }

    /// Oscillatory position and orientation perturbation. Runs once per frame
    /// whether or not the player is moving or even pointer-locked, as ambient
    /// idle behavior. The bob term is the sole writer of eye height and
    /// overwrites rather than accumulates.
    pub fn apply_sway(&self, camera: &mut Camera, t: f32) {
        let sway_x = (t * 0.8).sin() * self.sway_amount * self.intensity;
        let sway_z = (t * 0.6).cos() * self.sway_amount * self.intensity;
        let bob = (t * 1.5).sin() * self.bob_amount * self.intensity;

        camera.eye.x += sway_x * 0.1;
        camera.eye.z += sway_z * 0.1;
        camera.eye.y = self.base_eye_height + bob;

        let roll_sway = (t * 0.7).sin() * self.rotation_sway_amount * self.intensity;
        let pitch_sway = (t * 0.9).cos() * self.rotation_sway_amount * 0.5 * self.intensity;
        camera.roll = roll_sway;
        camera.pitch += pitch_sway * 0.1;
    }
}

impl Default for DrunkEffect {
    fn default() -> Self {
        Self::new(0.3)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn zero_intensity_vanishes_exactly() {
        let effect = DrunkEffect::new(0.0);
        let mut rng = StdRng::seed_from_u64(3);
        assert_eq!(effect.stumble(12.7), Vec2::ZERO);
        assert_eq!(effect.speed_jitter(&mut rng), 1.0);

        let mut camera = Camera::new(800, 600);
        camera.yaw = 0.9;
        effect.apply_sway(&mut camera, 12.7);
        assert_eq!(camera.roll, 0.0);
        assert_eq!(camera.eye.y, 1.6);
        assert_eq!(camera.eye.x, 0.0);
    }

    #[test]
    fn bob_overwrites_eye_height() {
        let effect = DrunkEffect::default();
        let mut camera = Camera::new(800, 600);
        camera.eye.y = 40.0; // stale height must not survive the sway pass
        effect.apply_sway(&mut camera, 2.0);
        let bob = (2.0f32 * 1.5).sin() * 0.03 * 0.3;
        assert!((camera.eye.y - (1.6 + bob)).abs() < 1e-6);
    }

    #[test]
    fn roll_is_overwritten_not_accumulated() {
        let effect = DrunkEffect::default();
        let mut camera = Camera::new(800, 600);
        effect.apply_sway(&mut camera, 1.0);
        let roll_once = camera.roll;
        effect.apply_sway(&mut camera, 1.0);
        assert_eq!(camera.roll, roll_once);
    }

    #[test]
    fn speed_jitter_stays_in_band() {
        let effect = DrunkEffect::new(1.0);
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..1000 {
            let jitter = effect.speed_jitter(&mut rng);
            assert!((0.85..=1.15).contains(&jitter));
        }
    }

    #[test]
    fn seeded_jitter_is_reproducible() {
        let effect = DrunkEffect::default();
        let a: Vec<f32> = {
            let mut rng = StdRng::seed_from_u64(5);
            (0..8).map(|_| effect.speed_jitter(&mut rng)).collect()
        };
        let b: Vec<f32> = {
            let mut rng = StdRng::seed_from_u64(5);
            (0..8).map(|_| effect.speed_jitter(&mut rng)).collect()
        };
        assert_eq!(a, b);
    }
}
