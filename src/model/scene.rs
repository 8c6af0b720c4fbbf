use glam::{Mat4, Vec3};
use rand::Rng;

use crate::mesh::{create_cube_mesh, create_ground_mesh, hsl_to_rgba, Mesh};

/// Sky blue clear color
pub const SKY_COLOR: [f64; 3] = [0.529, 0.808, 0.922];

const GROUND_COLOR: [f32; 4] = [0.545, 0.271, 0.075, 1.0]; // saddle brown
const SPIN_RATE: f32 = 0.01; // radians per frame

/// Static demo environment: a ground plane, scattered reference cubes and one
/// spinning cube so the player can tell they are moving.
pub struct Scene {
    pub static_mesh: Mesh,
    pub spin_mesh: Mesh,
    spin_pos: Vec3,
    spin_angle: f32,
}

impl Scene {
    pub fn new(rng: &mut impl Rng) -> Self {
        let mut static_mesh = create_ground_mesh(50.0, GROUND_COLOR);

        // ten reference cubes scattered around the spawn point
        for _ in 0..10 {
            let color = hsl_to_rgba(rng.random::<f32>(), 0.8, 0.6);
            let mut cube = create_cube_mesh(1.0, color);
            cube.translate([
                (rng.random::<f32>() - 0.5) * 30.0,
                0.5,
                (rng.random::<f32>() - 0.5) * 30.0,
            ]);
            static_mesh.append(&cube);
        }

        Self {
            static_mesh,
            spin_mesh: create_cube_mesh(1.0, [1.0, 1.0, 1.0, 1.0]),
            spin_pos: Vec3::new(0.0, 0.5, -5.0),
            spin_angle: 0.0,
        }
    }

    /// Advance the spinning reference cube by one frame
    pub fn advance(&mut self) {
        self.spin_angle += SPIN_RATE;
    }

    pub fn spin_transform(&self) -> Mat4 {
        Mat4::from_translation(self.spin_pos) * Mat4::from_rotation_y(self.spin_angle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    #[test]
    fn scene_contains_ground_and_reference_cubes() {
        let mut rng = StdRng::seed_from_u64(7);
        let scene = Scene::new(&mut rng);
        // 4 ground vertices + 10 cubes * 8 vertices
        assert_eq!(scene.static_mesh.vertices.len(), 84);
        assert_eq!(scene.spin_mesh.vertices.len(), 8);
    }

    #[test]
    fn same_seed_same_scene() {
        let a = Scene::new(&mut StdRng::seed_from_u64(42));
        let b = Scene::new(&mut StdRng::seed_from_u64(42));
        for (va, vb) in a.static_mesh.vertices.iter().zip(&b.static_mesh.vertices) {
            assert_eq!(va.pos, vb.pos);
            assert_eq!(va.color, vb.color);
        }
    }

    #[test]
    fn advance_rotates_spin_cube() {
        let mut scene = Scene::new(&mut StdRng::seed_from_u64(1));
        let before = scene.spin_transform();
        scene.advance();
        assert_ne!(before, scene.spin_transform());
    }
}
