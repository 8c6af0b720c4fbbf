use super::camera_controller::CameraController;
use super::input::{InputEvent, InputState};
use crate::model::{Camera, Scene};

/// Fixed per-tick advance of the drunk timer, roughly one display refresh
const TICK: f32 = 1.0 / 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    Idle,
    Running,
}

/// Owns all per-session camera state and runs the per-frame update sequence.
///
/// The driver is platform-neutral: the wasm and native front ends feed it
/// queued `InputEvent`s and hand the resulting camera transform to the
/// renderer. That keeps the whole update path testable without a GPU or an
/// event system.
pub struct FrameDriver {
    pub camera: Camera,
    pub input: InputState,
    pub controller: CameraController,
    pub scene: Scene,
    drunk_time: f32,
    state: LoopState,
}

impl FrameDriver {
    pub fn new(camera: Camera, controller: CameraController, scene: Scene) -> Self {
        Self {
            camera,
            input: InputState::new(),
            controller,
            scene,
            drunk_time: 0.0,
            state: LoopState::Idle,
        }
    }

    pub fn state(&self) -> LoopState {
        self.state
    }

    pub fn drunk_time(&self) -> f32 {
        self.drunk_time
    }

    /// One frame: advance the timer, drain the queued input events, update
    /// orientation and position, run the sway pass, advance the scene
    /// animation. The caller renders the camera afterwards.
    pub fn tick(&mut self, events: impl IntoIterator<Item = InputEvent>) {
        self.state = LoopState::Running;
        self.drunk_time += TICK;

        for event in events {
            self.input.process_event(&event);
        }

        let (dx, dy) = self.input.consume_look();
        self.controller.apply_look(&mut self.camera, &self.input, dx, dy);
        self.controller
            .update_movement(&mut self.camera, &self.input, self.drunk_time);
        self.controller.apply_sway(&mut self.camera, self.drunk_time);

        self.scene.advance();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::camera_controller::DemoMode;
    use rand::{rngs::StdRng, SeedableRng};

    fn driver(mode: DemoMode) -> FrameDriver {
        FrameDriver::new(
            Camera::new(800, 600),
            CameraController::new(mode, 0),
            Scene::new(&mut StdRng::seed_from_u64(0)),
        )
    }

    #[test]
    fn first_tick_moves_idle_to_running() {
        let mut driver = driver(DemoMode::Walk);
        assert_eq!(driver.state(), LoopState::Idle);
        driver.tick([]);
        assert_eq!(driver.state(), LoopState::Running);
    }

    #[test]
    fn timer_advances_by_fixed_increment() {
        let mut driver = driver(DemoMode::Drunk);
        driver.tick([]);
        driver.tick([]);
        assert!((driver.drunk_time() - 2.0 / 60.0).abs() < 1e-6);
    }

    #[test]
    fn queued_events_apply_before_update() {
        let mut driver = driver(DemoMode::Walk);
        let start = driver.camera.eye;
        driver.tick([
            InputEvent::PointerLockChanged { locked: true },
            InputEvent::KeyDown("w".into()),
        ]);
        assert!((driver.camera.eye - start).length() > 0.0);
    }

    #[test]
    fn unlock_in_same_batch_suppresses_movement() {
        let mut driver = driver(DemoMode::Walk);
        let start = driver.camera.eye;
        driver.tick([
            InputEvent::PointerLockChanged { locked: true },
            InputEvent::KeyDown("w".into()),
            InputEvent::PointerLockChanged { locked: false },
        ]);
        assert_eq!(driver.camera.eye, start);
        assert!(!driver.input.any_movement());
    }

    #[test]
    fn drunk_sway_runs_while_unlocked() {
        let mut driver = driver(DemoMode::Drunk);
        driver.tick([]);
        assert_ne!(driver.camera.roll, 0.0);
    }

    #[test]
    fn walk_mode_keeps_eye_height_constant() {
        let mut driver = driver(DemoMode::Walk);
        driver.tick([
            InputEvent::PointerLockChanged { locked: true },
            InputEvent::KeyDown("w".into()),
        ]);
        for _ in 0..50 {
            driver.tick([]);
        }
        assert_eq!(driver.camera.eye.y, 1.6);
    }
}
