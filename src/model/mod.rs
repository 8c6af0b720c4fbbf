// MODEL: camera pose and demo scene
pub mod camera;
pub mod scene;

pub use camera::Camera;
pub use scene::Scene;
