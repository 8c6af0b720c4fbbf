use wgpu::util::DeviceExt;
use bytemuck::NoUninit;

#[repr(C)]
#[derive(Debug, Clone, Copy, NoUninit)]
pub struct Vertex {
    pub pos: [f32; 3],
    pub color: [f32; 4],
}

pub struct MeshBuffer {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[derive(Debug, Clone)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

impl Mesh {
    /// Append another mesh, re-basing its indices
    pub fn append(&mut self, other: &Mesh) {
        let base = self.vertices.len() as u32;
        self.vertices.extend_from_slice(&other.vertices);
        self.indices.extend(other.indices.iter().map(|i| i + base));
    }

    pub fn translate(&mut self, offset: [f32; 3]) {
        for v in self.vertices.iter_mut() {
            v.pos[0] += offset[0];
            v.pos[1] += offset[1];
            v.pos[2] += offset[2];
        }
    }

    pub fn upload(&self, device: &wgpu::Device) -> MeshBuffer {
        let vertices = bytemuck::cast_slice(&self.vertices);
        let indices = bytemuck::cast_slice(&self.indices);

        let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Vertex Buffer"),
            contents: vertices,
            usage: wgpu::BufferUsages::VERTEX,
        });
        let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("Mesh Index Buffer"),
            contents: indices,
            usage: wgpu::BufferUsages::INDEX,
        });

        MeshBuffer {
            vertex_buffer,
            index_buffer,
            index_count: self.indices.len() as u32,
        }
    }
}

/// Flat quad in the xz-plane, centered at the origin
pub fn create_ground_mesh(size: f32, color: [f32; 4]) -> Mesh {
    let h = size / 2.0;
    let verts = vec![
        Vertex { pos: [-h, 0.0, -h], color },
        Vertex { pos: [h, 0.0, -h], color },
        Vertex { pos: [h, 0.0, h], color },
        Vertex { pos: [-h, 0.0, h], color },
    ];
    // both windings so the ground is visible from below too
    let indices = vec![0, 2, 1, 0, 3, 2, 0, 1, 2, 0, 2, 3];

    Mesh { vertices: verts, indices }
}

/// Axis-aligned cube centered at the origin
pub fn create_cube_mesh(size: f32, color: [f32; 4]) -> Mesh {
    let h = size / 2.0;
    let verts = vec![
        Vertex { pos: [-h, -h, -h], color },
        Vertex { pos: [h, -h, -h], color },
        Vertex { pos: [h, h, -h], color },
        Vertex { pos: [-h, h, -h], color },
        Vertex { pos: [-h, -h, h], color },
        Vertex { pos: [h, -h, h], color },
        Vertex { pos: [h, h, h], color },
        Vertex { pos: [-h, h, h], color },
    ];
    let indices = vec![
        0, 2, 1, 0, 3, 2, // back
        4, 5, 6, 4, 6, 7, // front
        0, 4, 7, 0, 7, 3, // left
        1, 6, 5, 1, 2, 6, // right
        3, 7, 6, 3, 6, 2, // top
        0, 1, 5, 0, 5, 4, // bottom
    ];

    Mesh { vertices: verts, indices }
}

/// HSL to RGB, used for the randomly tinted reference cubes
pub fn hsl_to_rgba(h: f32, s: f32, l: f32) -> [f32; 4] {
    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h.rem_euclid(1.0) * 6.0;
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
    [r + m, g + m, b + m, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_mesh_has_twelve_triangles() {
        let mesh = create_cube_mesh(1.0, [1.0; 4]);
        assert_eq!(mesh.vertices.len(), 8);
        assert_eq!(mesh.indices.len(), 36);
    }

    #[test]
    fn append_rebases_indices() {
        let mut a = create_cube_mesh(1.0, [1.0; 4]);
        let b = create_cube_mesh(1.0, [0.5, 0.5, 0.5, 1.0]);
        a.append(&b);
        assert_eq!(a.vertices.len(), 16);
        assert!(a.indices[36..].iter().all(|&i| i >= 8));
    }

    #[test]
    fn hsl_primaries() {
        let red = hsl_to_rgba(0.0, 1.0, 0.5);
        assert!((red[0] - 1.0).abs() < 1e-6 && red[1].abs() < 1e-6);
        let green = hsl_to_rgba(1.0 / 3.0, 1.0, 0.5);
        assert!((green[1] - 1.0).abs() < 1e-6);
    }
}
