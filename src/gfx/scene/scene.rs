use wgpu::Device;

use super::lights::{AmbientLight, DirectionalLight, Fog, Ghost, PointLight};
use super::object::{Mesh, MeshId, Object};
use crate::config::{Color, MAX_POINT_LIGHTS};
use crate::wgpu_utils::BindGroupLayoutWithDesc;

/// Main scene containing meshes, objects and lights
pub struct Scene {
    pub meshes: Vec<Mesh>,
    pub objects: Vec<Object>,
    pub ambient: AmbientLight,
    pub moon: DirectionalLight,
    pub door_light: PointLight,
    pub ghosts: Vec<Ghost>,
    pub fog: Fog,
}

impl Scene {
    pub fn new(ambient: AmbientLight, moon: DirectionalLight, door_light: PointLight, fog: Fog) -> Self {
        Self {
            meshes: Vec::new(),
            objects: Vec::new(),
            ambient,
            moon,
            door_light,
            ghosts: Vec::new(),
            fog,
        }
    }

    pub fn add_mesh(&mut self, mesh: Mesh) -> MeshId {
        self.meshes.push(mesh);
        self.meshes.len() - 1
    }

    pub fn mesh(&self, id: MeshId) -> Option<&Mesh> {
        self.meshes.get(id)
    }

    /// Adds an object and returns a mutable reference to it
    pub fn add_object(&mut self, mut object: Object) -> &mut Object {
        object.name = self.ensure_unique_name(&object.name);
        let index = self.objects.len();
        self.objects.push(object);
        &mut self.objects[index]
    }

    pub fn object_by_name(&self, name: &str) -> Option<&Object> {
        self.objects.iter().find(|obj| obj.name == name)
    }

    /// Objects whose name starts with `prefix`
    pub fn objects_with_prefix<'a>(&'a self, prefix: &'a str) -> impl Iterator<Item = &'a Object> {
        self.objects
            .iter()
            .filter(move |obj| obj.name.starts_with(prefix))
    }

    /// Door light first, then the ghosts; at most [`MAX_POINT_LIGHTS`]
    pub fn point_lights(&self) -> impl Iterator<Item = &PointLight> {
        std::iter::once(&self.door_light)
            .chain(self.ghosts.iter().map(|ghost| &ghost.light))
            .take(MAX_POINT_LIGHTS)
    }

    /// Clear colour; matches the fog so distant geometry fades into it
    pub fn background(&self) -> Color {
        self.fog.color
    }

    /// Uploads meshes and creates per-object uniforms
    ///
    /// Must be called after the GPU context is available and before rendering.
    pub fn init_gpu_resources(&mut self, device: &Device, object_layout: &BindGroupLayoutWithDesc) {
        for mesh in &mut self.meshes {
            mesh.init_gpu_resources(device);
        }
        for object in &mut self.objects {
            object.init_gpu_resources(device, object_layout);
        }
        log::debug!(
            "Uploaded {} meshes for {} objects",
            self.meshes.len(),
            self.objects.len()
        );
    }

    /// Writes changed object uniforms to the GPU
    pub fn sync_gpu(&mut self, queue: &wgpu::Queue) {
        for object in &mut self.objects {
            object.sync_gpu(queue);
        }
    }

    pub fn get_statistics(&self) -> SceneStatistics {
        let drawn_meshes = move || {
            self.objects
                .iter()
                .filter_map(move |obj| self.meshes.get(obj.mesh))
        };

        SceneStatistics {
            object_count: self.objects.len(),
            mesh_count: self.meshes.len(),
            point_light_count: self.point_lights().count(),
            total_triangles: drawn_meshes().map(|m| m.index_count() / 3).sum(),
            total_vertices: drawn_meshes().map(|m| m.vertex_count()).sum(),
        }
    }

    pub fn ensure_unique_name(&self, desired_name: &str) -> String {
        let mut counter = 0;
        let mut test_name = desired_name.to_string();

        while self.objects.iter().any(|obj| obj.name == test_name) {
            counter += 1;
            test_name = format!("{} ({})", desired_name, counter);
        }

        test_name
    }
}

/// Scene statistics for debugging and UI display
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SceneStatistics {
    pub object_count: usize,
    pub mesh_count: usize,
    pub point_light_count: usize,
    pub total_triangles: u32,
    pub total_vertices: u32,
}
