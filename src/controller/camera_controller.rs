use std::f32::consts::{FRAC_1_SQRT_2, FRAC_PI_2};

use glam::Vec3;
use rand::{rngs::StdRng, SeedableRng};

use super::drunk::DrunkEffect;
use super::input::InputState;
use crate::model::Camera;

/// The three successive demo variants: mouse look only, look plus WASD
/// walking, and walking with the drunk stumble/sway layered on top.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DemoMode {
    Look,
    Walk,
    Drunk,
}

/// Handles camera orientation and planar movement.
///
/// Movement uses per-frame constants (the loop runs once per display
/// refresh), so N frames of forward input displace the camera by exactly
/// N * move_speed. The RNG behind the drunk speed jitter is seeded at
/// construction so a fixed seed gives a reproducible walk.
pub struct CameraController {
    pub mode: DemoMode,
    pub move_speed: f32,
    pub mouse_sensitivity: f32,
    drunk: DrunkEffect,
    rng: StdRng,
}

impl CameraController {
    pub fn new(mode: DemoMode, seed: u64) -> Self {
        Self {
            mode,
            move_speed: 0.12,
            mouse_sensitivity: 0.002,
            drunk: DrunkEffect::default(),
            rng: StdRng::seed_from_u64(seed),
        }
    }

    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.drunk = DrunkEffect::new(intensity);
        self
    }

    pub fn drunk_intensity(&self) -> f32 {
        self.drunk.intensity
    }

    /// Apply mouse look delta to the camera. Deltas are ignored entirely
    /// while the pointer is not captured.
    pub fn apply_look(&self, camera: &mut Camera, input: &InputState, dx: f32, dy: f32) {
        if !input.pointer_locked {
            return;
        }
        camera.yaw -= dx * self.mouse_sensitivity;
        camera.pitch = (camera.pitch - dy * self.mouse_sensitivity).clamp(-FRAC_PI_2, FRAC_PI_2);
    }

    /// Integrate held-key state into a planar displacement.
    ///
    /// Skipped entirely when no movement key is held (no drift, and the
    /// stumble never fires while stationary) or while unlocked.
    pub fn update_movement(&mut self, camera: &mut Camera, input: &InputState, t: f32) {
        if self.mode == DemoMode::Look || !input.pointer_locked || !input.any_movement() {
            return;
        }

        let (mut move_x, mut move_z) = input.move_intent();

        // equalize diagonal speed with single-axis speed
        if move_x != 0.0 && move_z != 0.0 {
            move_x *= FRAC_1_SQRT_2;
            move_z *= FRAC_1_SQRT_2;
        }

        let mut speed = self.move_speed;
        if self.mode == DemoMode::Drunk {
            let stumble = self.drunk.stumble(t);
            move_x += stumble.x;
            move_z += stumble.y;
            speed *= self.drunk.speed_jitter(&mut self.rng);
        }
        move_x *= speed;
        move_z *= speed;

        let forward = camera.planar_forward();
        let right = forward.cross(Vec3::Y).normalize();

        // forward intent is negative z, hence the inverted sign
        let mut displacement = forward * -move_z + right * move_x;
        displacement.y = 0.0;
        camera.eye += displacement;
        tracing::debug!(x = camera.eye.x, z = camera.eye.z, "movement step");
    }

    /// Sway/bob post-processing. In drunk mode this runs once per frame
    /// regardless of movement or lock state; the other modes leave the
    /// camera untouched.
    pub fn apply_sway(&self, camera: &mut Camera, t: f32) {
        if self.mode == DemoMode::Drunk {
            self.drunk.apply_sway(camera, t);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::input::InputEvent;

    fn locked_input() -> InputState {
        let mut input = InputState::new();
        input.process_event(&InputEvent::PointerLockChanged { locked: true });
        input
    }

    fn press(input: &mut InputState, key: &str) {
        input.process_event(&InputEvent::KeyDown(key.into()));
    }

    #[test]
    fn pitch_clamped_for_any_delta() {
        let controller = CameraController::new(DemoMode::Walk, 0);
        let input = locked_input();
        let mut camera = Camera::new(800, 600);

        for dy in [-1e6, -500.0, 0.0, 123.4, 1e6] {
            controller.apply_look(&mut camera, &input, 0.0, dy);
            assert!(camera.pitch >= -FRAC_PI_2 && camera.pitch <= FRAC_PI_2);
        }
    }

    #[test]
    fn mouse_right_turns_view_right() {
        let controller = CameraController::new(DemoMode::Look, 0);
        let input = locked_input();
        let mut camera = Camera::new(800, 600);

        let right = camera.planar_forward().cross(Vec3::Y).normalize();
        controller.apply_look(&mut camera, &input, 100.0, 0.0);
        assert!(camera.planar_forward().dot(right) > 0.0);
    }

    #[test]
    fn mouse_up_looks_up() {
        let controller = CameraController::new(DemoMode::Look, 0);
        let input = locked_input();
        let mut camera = Camera::new(800, 600);

        controller.apply_look(&mut camera, &input, 0.0, -100.0);
        assert!(camera.forward().y > 0.0);
    }

    #[test]
    fn look_is_noop_while_unlocked() {
        let controller = CameraController::new(DemoMode::Walk, 0);
        let input = InputState::new();
        let mut camera = Camera::new(800, 600);
        camera.yaw = 0.5;
        camera.pitch = -0.25;

        controller.apply_look(&mut camera, &input, 300.0, -200.0);
        assert_eq!(camera.yaw, 0.5);
        assert_eq!(camera.pitch, -0.25);
    }

    #[test]
    fn no_keys_no_drift() {
        let mut controller = CameraController::new(DemoMode::Drunk, 0);
        let input = locked_input();
        let mut camera = Camera::new(800, 600);
        let start = camera.eye;

        controller.update_movement(&mut camera, &input, 3.7);
        assert_eq!(camera.eye, start);
    }

    #[test]
    fn diagonal_speed_matches_single_axis() {
        let mut controller = CameraController::new(DemoMode::Walk, 0);
        let mut camera = Camera::new(800, 600);

        let mut forward_only = locked_input();
        press(&mut forward_only, "w");
        let start = camera.eye;
        controller.update_movement(&mut camera, &forward_only, 0.0);
        let single = (camera.eye - start).length();

        let mut diagonal = locked_input();
        press(&mut diagonal, "w");
        press(&mut diagonal, "d");
        let start = camera.eye;
        controller.update_movement(&mut camera, &diagonal, 0.0);
        let diag = (camera.eye - start).length();

        assert!((single - diag).abs() < 1e-5);
    }

    #[test]
    fn zero_intensity_reduces_to_basic_movement() {
        let mut drunk = CameraController::new(DemoMode::Drunk, 42).with_intensity(0.0);
        let mut walk = CameraController::new(DemoMode::Walk, 42);

        let mut input = locked_input();
        press(&mut input, "w");
        press(&mut input, "a");

        let mut cam_a = Camera::new(800, 600);
        let mut cam_b = Camera::new(800, 600);
        cam_a.yaw = 1.1;
        cam_b.yaw = 1.1;

        for frame in 0..20 {
            let t = frame as f32 / 60.0;
            drunk.update_movement(&mut cam_a, &input, t);
            drunk.apply_sway(&mut cam_a, t);
            walk.update_movement(&mut cam_b, &input, t);
        }
        assert!(cam_a.eye.abs_diff_eq(cam_b.eye, 1e-6));
        assert_eq!(cam_a.roll, 0.0);
    }

    #[test]
    fn n_forward_frames_displace_n_times_speed() {
        let mut controller = CameraController::new(DemoMode::Walk, 0);
        let mut input = locked_input();
        press(&mut input, "w");

        let mut camera = Camera::new(800, 600);
        let forward = camera.planar_forward();
        let start = camera.eye;

        let n = 10;
        for _ in 0..n {
            controller.update_movement(&mut camera, &input, 0.0);
        }
        let expected = start + forward * (n as f32 * controller.move_speed);
        assert!(camera.eye.abs_diff_eq(expected, 1e-5));
        assert_eq!(camera.eye.y, start.y);
    }

    #[test]
    fn movement_ignored_while_unlocked() {
        let mut controller = CameraController::new(DemoMode::Walk, 0);
        let mut input = locked_input();
        press(&mut input, "w");
        input.process_event(&InputEvent::PointerLockChanged { locked: false });

        let mut camera = Camera::new(800, 600);
        let start = camera.eye;
        controller.update_movement(&mut camera, &input, 0.0);
        assert_eq!(camera.eye, start);
    }

    #[test]
    fn look_mode_never_moves() {
        let mut controller = CameraController::new(DemoMode::Look, 0);
        let mut input = locked_input();
        press(&mut input, "w");

        let mut camera = Camera::new(800, 600);
        let start = camera.eye;
        controller.update_movement(&mut camera, &input, 0.0);
        assert_eq!(camera.eye, start);
    }

    #[test]
    fn opposing_keys_still_stumble_in_drunk_mode() {
        // w+s cancels the intent but the player is "moving", so the stumble
        // term alone produces a displacement
        let mut controller = CameraController::new(DemoMode::Drunk, 7);
        let mut input = locked_input();
        press(&mut input, "w");
        press(&mut input, "s");

        let mut camera = Camera::new(800, 600);
        let start = camera.eye;
        controller.update_movement(&mut camera, &input, 1.0);
        assert!((camera.eye - start).length() > 0.0);
    }
}
