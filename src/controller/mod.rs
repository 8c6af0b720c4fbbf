// CONTROLLER: input, camera update logic, and the frame loop
pub mod camera_controller;
pub mod drunk;
pub mod frame_loop;
pub mod input;

pub use camera_controller::{CameraController, DemoMode};
pub use drunk::DrunkEffect;
pub use frame_loop::{FrameDriver, LoopState};
pub use input::{InputEvent, InputState, MoveKey};
