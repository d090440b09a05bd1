use std::ops::Range;

use cgmath::{Matrix, Matrix4, Rad, SquareMatrix, Vector3, Zero};
use wgpu::util::DeviceExt;

use super::vertex::Vertex3D;
use crate::config::Color;
use crate::gfx::camera::camera_utils::convert_matrix4_to_array;
use crate::gfx::geometry::GeometryData;
use crate::wgpu_utils::{BindGroupBuilder, BindGroupLayoutWithDesc, UniformBuffer};

/// Index of a mesh in [`super::Scene::meshes`]
pub type MeshId = usize;

/// Triangle mesh shared between any number of objects
pub struct Mesh {
    pub name: String,
    vertices: Vec<Vertex3D>,
    indices: Vec<u32>,
    vertex_buffer: Option<wgpu::Buffer>,
    index_buffer: Option<wgpu::Buffer>,
    index_count: u32,
}

impl Mesh {
    pub fn new(name: impl Into<String>, vertices: Vec<Vertex3D>, indices: Vec<u32>) -> Self {
        let index_count = indices.len() as u32;
        Self {
            name: name.into(),
            vertices,
            indices,
            vertex_buffer: None,
            index_buffer: None,
            index_count,
        }
    }

    pub fn from_geometry(name: impl Into<String>, geometry: &GeometryData) -> Self {
        let (vertices, indices) = geometry.to_scene_format();
        Self::new(name, vertices, indices)
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertices.len() as u32
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn is_uploaded(&self) -> bool {
        self.vertex_buffer.is_some() && self.index_buffer.is_some()
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device) {
        self.vertex_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Vertex Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.vertices),
            usage: wgpu::BufferUsages::VERTEX,
        }));
        self.index_buffer = Some(device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{} Index Buffer", self.name)),
            contents: bytemuck::cast_slice(&self.indices),
            usage: wgpu::BufferUsages::INDEX,
        }));
    }
}

/// Position, Euler rotation and scale
///
/// Rotations are in radians and applied in X, Y, Z order, so the model matrix
/// is `T * Rx * Ry * Rz * S`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub position: Vector3<f32>,
    pub rotation: Vector3<f32>,
    pub scale: Vector3<f32>,
}

impl Default for Transform {
    fn default() -> Self {
        Self {
            position: Vector3::zero(),
            rotation: Vector3::zero(),
            scale: Vector3::new(1.0, 1.0, 1.0),
        }
    }
}

impl Transform {
    pub fn from_position(x: f32, y: f32, z: f32) -> Self {
        Self {
            position: Vector3::new(x, y, z),
            ..Self::default()
        }
    }

    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vector3::new(x, y, z);
        self
    }

    pub fn with_uniform_scale(mut self, scale: f32) -> Self {
        self.scale = Vector3::new(scale, scale, scale);
        self
    }

    pub fn matrix(&self) -> Matrix4<f32> {
        let t = Matrix4::from_translation(self.position);
        let r = Matrix4::from_angle_x(Rad(self.rotation.x))
            * Matrix4::from_angle_y(Rad(self.rotation.y))
            * Matrix4::from_angle_z(Rad(self.rotation.z));
        let s = Matrix4::from_nonuniform_scale(self.scale.x, self.scale.y, self.scale.z);
        t * r * s // Order matters: T * R * S
    }
}

/// Flat surface colour
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Material {
    pub color: Color,
}

impl Material {
    pub fn new(color: Color) -> Self {
        Self { color }
    }
}

/// Per-object uniform; MUST match `ObjectUniform` in the shaders
#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct ObjectUniform {
    pub model: [[f32; 4]; 4],
    /// Inverse transpose of the model matrix, for normals
    pub normal_matrix: [[f32; 4]; 4],
    /// Linear RGB, alpha unused
    pub color: [f32; 4],
    /// x = receives shadows
    pub flags: [u32; 4],
}

pub struct ObjectGpuResources {
    pub uniform: UniformBuffer<ObjectUniform>,
    pub bind_group: wgpu::BindGroup,
}

/// A placed instance of a mesh
pub struct Object {
    pub name: String,
    pub mesh: MeshId,
    pub material: Material,
    pub transform: Transform,
    pub cast_shadow: bool,
    pub receive_shadow: bool,
    pub visible: bool,
    pub gpu_resources: Option<ObjectGpuResources>, // None until init_gpu_resources called
}

impl Object {
    pub fn new(name: impl Into<String>, mesh: MeshId, material: Material) -> Self {
        Self {
            name: name.into(),
            mesh,
            material,
            transform: Transform::default(),
            cast_shadow: false,
            receive_shadow: false,
            visible: true,
            gpu_resources: None,
        }
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn casting_shadow(mut self) -> Self {
        self.cast_shadow = true;
        self
    }

    pub fn receiving_shadow(mut self) -> Self {
        self.receive_shadow = true;
        self
    }

    pub fn uniform(&self) -> ObjectUniform {
        let model = self.transform.matrix();
        let normal_matrix = model
            .invert()
            .map(|inverse| inverse.transpose())
            .unwrap_or_else(Matrix4::identity);
        let [r, g, b] = self.material.color.to_linear();

        ObjectUniform {
            model: convert_matrix4_to_array(model),
            normal_matrix: convert_matrix4_to_array(normal_matrix),
            color: [r, g, b, 1.0],
            flags: [self.receive_shadow as u32, 0, 0, 0],
        }
    }

    pub fn init_gpu_resources(&mut self, device: &wgpu::Device, layout: &BindGroupLayoutWithDesc) {
        let uniform = UniformBuffer::new_with_data(device, &self.uniform());
        let bind_group = BindGroupBuilder::new(layout)
            .resource(uniform.binding_resource())
            .create(device, &format!("{} Object Bind Group", self.name));

        self.gpu_resources = Some(ObjectGpuResources {
            uniform,
            bind_group,
        });
    }

    /// Uploads the transform and material if they changed since the last call
    pub fn sync_gpu(&mut self, queue: &wgpu::Queue) {
        let content = self.uniform();
        if let Some(gpu_resources) = &mut self.gpu_resources {
            gpu_resources.uniform.update_content(queue, content);
        }
    }

    pub fn bind_group(&self) -> Option<&wgpu::BindGroup> {
        self.gpu_resources.as_ref().map(|res| &res.bind_group)
    }
}

pub trait DrawMesh<'a> {
    fn draw_mesh(&mut self, mesh: &'a Mesh);
    fn draw_mesh_instanced(&mut self, mesh: &'a Mesh, instances: Range<u32>);
}

impl<'a, 'b> DrawMesh<'b> for wgpu::RenderPass<'a>
where
    'b: 'a,
{
    fn draw_mesh(&mut self, mesh: &'b Mesh) {
        self.draw_mesh_instanced(mesh, 0..1);
    }

    fn draw_mesh_instanced(&mut self, mesh: &'b Mesh, instances: Range<u32>) {
        let (Some(vertex_buffer), Some(index_buffer)) = (&mesh.vertex_buffer, &mesh.index_buffer)
        else {
            return; // Skip drawing if not uploaded
        };

        self.set_vertex_buffer(0, vertex_buffer.slice(..));
        self.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        self.draw_indexed(0..mesh.index_count, 0, instances);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use cgmath::Vector4;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_transform_applies_scale_then_rotation_then_translation() {
        let transform = Transform::from_position(1.0, 2.0, 3.0)
            .with_rotation(0.0, FRAC_PI_2, 0.0)
            .with_uniform_scale(2.0);
        let p = transform.matrix() * Vector4::new(1.0, 0.0, 0.0, 1.0);
        // (1,0,0) scaled to (2,0,0), turned about Y to (0,0,-2), then moved
        assert_abs_diff_eq!(p.x, 1.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.y, 2.0, epsilon = 1e-5);
        assert_abs_diff_eq!(p.z, 1.0, epsilon = 1e-5);
    }

    #[test]
    fn test_floor_rotation_points_normal_up() {
        let floor = Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0);
        let n = floor.matrix() * Vector4::new(0.0, 0.0, 1.0, 0.0);
        assert_abs_diff_eq!(n.y, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_uniform_flags_follow_shadow_capability() {
        let mut object = Object::new("walls", 0, Material::new(Color::WHITE));
        assert_eq!(object.uniform().flags[0], 0);
        object = object.receiving_shadow().casting_shadow();
        assert_eq!(object.uniform().flags[0], 1);
        for channel in object.uniform().color {
            assert_abs_diff_eq!(channel, 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_normal_matrix_undoes_nonuniform_scale() {
        let mut object = Object::new("grave", 0, Material::new(Color::WHITE));
        object.transform.scale = Vector3::new(4.0, 1.0, 1.0);
        let uniform = object.uniform();
        assert_abs_diff_eq!(uniform.normal_matrix[0][0], 0.25, epsilon = 1e-6);
        assert_abs_diff_eq!(uniform.normal_matrix[1][1], 1.0, epsilon = 1e-6);
    }

    #[test]
    fn test_mesh_from_geometry_counts() {
        let mesh = Mesh::from_geometry("cube", &crate::gfx::geometry::generate_cube());
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.index_count(), 36);
        assert!(!mesh.is_uploaded());
    }
}
