use glam::{Mat4, Quat, Vec3};

/// First-person camera pose and projection.
///
/// Orientation is stored as Euler angles composed yaw -> pitch -> roll.
/// Pitch is kept within [-pi/2, pi/2] by the controller; roll is cosmetic
/// (head tilt from the drunk sway) and unclamped.
pub struct Camera {
    pub eye: Vec3,
    pub yaw: f32,
    pub pitch: f32,
    pub roll: f32,
    pub fov_y: f32,
    pub aspect: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Camera {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            eye: Vec3::new(0.0, 1.6, 0.0),
            yaw: 0.0,
            pitch: 0.0,
            roll: 0.0,
            fov_y: 75f32.to_radians(),
            aspect: width as f32 / height as f32,
            z_near: 0.1,
            z_far: 1000.0,
        }
    }

    /// View direction including pitch. Yaw 0 faces -Z and positive yaw
    /// turns counter-clockwise (seen from above), so decreasing yaw turns
    /// the view to the right.
    pub fn forward(&self) -> Vec3 {
        let cy = self.yaw;
        let cp = self.pitch.clamp(-1.5533, 1.5533); // slightly less than pi/2 to avoid gimbal lock
        Vec3::new(-cy.sin() * cp.cos(), cp.sin(), -cy.cos() * cp.cos()).normalize()
    }

    /// Walking direction: yaw only, pitch and roll never affect planar movement
    pub fn planar_forward(&self) -> Vec3 {
        Vec3::new(-self.yaw.sin(), 0.0, -self.yaw.cos())
    }

    /// Up vector with roll applied about the view axis
    pub fn up(&self) -> Vec3 {
        Quat::from_axis_angle(self.forward(), self.roll) * Vec3::Y
    }

    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height as f32;
    }

    pub fn view_proj(&self) -> Mat4 {
        let view = Mat4::look_to_rh(self.eye, self.forward(), self.up());
        let proj = Mat4::perspective_rh(self.fov_y, self.aspect, self.z_near, self.z_far);
        proj * view
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn at_rest_forward_is_negative_z() {
        let cam = Camera::new(800, 600);
        assert!(cam.forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        assert!(cam.planar_forward().abs_diff_eq(Vec3::NEG_Z, 1e-6));
        // right-handed basis: right points along +X
        let right = cam.planar_forward().cross(Vec3::Y);
        assert!(right.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn forward_is_unit_length() {
        let mut cam = Camera::new(800, 600);
        cam.yaw = 1.2;
        cam.pitch = -0.7;
        assert!((cam.forward().length() - 1.0).abs() < 1e-5);
    }

    #[test]
    fn planar_forward_has_no_vertical_component() {
        let mut cam = Camera::new(800, 600);
        cam.pitch = 1.0;
        cam.yaw = 0.4;
        assert_eq!(cam.planar_forward().y, 0.0);
        assert!((cam.planar_forward().length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_roll_keeps_up_vertical() {
        let cam = Camera::new(800, 600);
        assert!(cam.up().abs_diff_eq(Vec3::Y, 1e-6));
    }

    #[test]
    fn roll_tilts_up_vector() {
        let mut cam = Camera::new(800, 600);
        cam.roll = 0.3;
        let up = cam.up();
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(!up.abs_diff_eq(Vec3::Y, 1e-4));
    }

    #[test]
    fn view_proj_is_finite() {
        let mut cam = Camera::new(1280, 720);
        cam.yaw = 2.0;
        cam.pitch = 0.5;
        cam.roll = 0.1;
        assert!(cam.view_proj().to_cols_array().iter().all(|v| v.is_finite()));
    }
}
