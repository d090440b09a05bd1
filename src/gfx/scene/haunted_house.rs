//! The haunted house scene: house, garden, graveyard and its lights.

use std::f32::consts::{FRAC_PI_2, FRAC_PI_4, TAU};

use cgmath::Vector3;
use rand::{rngs::StdRng, Rng, SeedableRng};

use super::lights::{AmbientLight, DirectionalLight, Fog, Ghost, PointLight};
use super::object::{Material, Mesh, Object, Transform};
use super::scene::Scene;
use crate::animation::OrbitPath;
use crate::config::{Color, GraveConfig, SceneConfig};
use crate::gfx::geometry::{generate_box, generate_cone, generate_plane, generate_sphere};

pub const WALLS_SIZE: [f32; 3] = [4.0, 2.5, 4.0];
pub const ROOF_RADIUS: f32 = 3.5;
pub const ROOF_HEIGHT: f32 = 1.5;
pub const DOOR_SIZE: f32 = 2.2;
pub const FLOOR_SIZE: f32 = 20.0;
pub const GRAVE_SIZE: [f32; 3] = [0.6, 0.8, 0.2];
const GRAVE_HEIGHT_JITTER: f32 = 0.4;
const GRAVE_TILT: f32 = 0.4;

const WALLS_COLOR: Color = Color::rgb(0.675, 0.557, 0.51);
const ROOF_COLOR: Color = Color::rgb(0.702, 0.373, 0.271);
const DOOR_COLOR: Color = Color::rgb(1.0, 0.0, 0.0);
const FLOOR_COLOR: Color = Color::rgb(0.663, 0.765, 0.533);
const BUSH_COLOR: Color = Color::rgb(0.537, 0.784, 0.329);

/// Scale and position of each bush beside the door
const BUSHES: [(f32, [f32; 3]); 4] = [
    (0.5, [0.8, 0.2, 2.2]),
    (0.25, [1.4, 0.1, 2.1]),
    (0.4, [-0.8, 0.1, 2.2]),
    (0.15, [-1.0, 0.05, 2.6]),
];

/// Builds the complete scene described by `config`
pub fn build(config: &SceneConfig) -> Scene {
    let lighting = &config.lighting;
    let mut scene = Scene::new(
        AmbientLight {
            color: lighting.ambient.color,
            intensity: lighting.ambient.intensity,
        },
        DirectionalLight {
            color: lighting.moon.color,
            intensity: lighting.moon.intensity,
            position: lighting.moon.position.into(),
            cast_shadow: config.shadows.enabled,
        },
        PointLight {
            color: lighting.door.color,
            intensity: lighting.door.intensity,
            position: lighting.door.position.into(),
            range: lighting.door.range,
        },
        Fog {
            color: config.fog.color,
            density: config.fog.density,
        },
    );

    add_house(&mut scene);
    add_floor(&mut scene);
    add_bushes(&mut scene);
    add_graves(&mut scene, &config.graves);

    scene.ghosts = config
        .ghosts
        .iter()
        .map(|ghost| {
            let light = PointLight {
                color: ghost.color,
                intensity: ghost.intensity,
                position: Vector3::new(0.0, 0.0, 0.0),
                range: ghost.range,
            };
            let orbit = OrbitPath::new(ghost.radius, ghost.speed).with_phase_offset(ghost.phase);
            Ghost::new(light, orbit)
        })
        .collect();

    let stats = scene.get_statistics();
    log::info!(
        "Built haunted house: {} objects, {} triangles, {} point lights",
        stats.object_count,
        stats.total_triangles,
        stats.point_light_count
    );
    scene
}

fn add_house(scene: &mut Scene) {
    let [width, height, depth] = WALLS_SIZE;

    let walls = scene.add_mesh(Mesh::from_geometry(
        "walls",
        &generate_box(width, height, depth),
    ));
    scene.add_object(
        Object::new("walls", walls, Material::new(WALLS_COLOR))
            .with_transform(Transform::from_position(0.0, height * 0.5, 0.0))
            .casting_shadow()
            .receiving_shadow(),
    );

    let roof = scene.add_mesh(Mesh::from_geometry(
        "roof",
        &generate_cone(ROOF_RADIUS, ROOF_HEIGHT, 4),
    ));
    scene.add_object(
        Object::new("roof", roof, Material::new(ROOF_COLOR))
            .with_transform(
                Transform::from_position(0.0, height + ROOF_HEIGHT * 0.5, 0.0)
                    .with_rotation(0.0, FRAC_PI_4, 0.0),
            )
            .casting_shadow(),
    );

    let door = scene.add_mesh(Mesh::from_geometry(
        "door",
        &generate_plane(DOOR_SIZE, DOOR_SIZE, 1, 1),
    ));
    // Just in front of the wall to avoid z-fighting
    scene.add_object(
        Object::new("door", door, Material::new(DOOR_COLOR))
            .with_transform(Transform::from_position(0.0, DOOR_SIZE * 0.5, depth * 0.5 + 0.01))
            .receiving_shadow(),
    );
}

fn add_floor(scene: &mut Scene) {
    let floor = scene.add_mesh(Mesh::from_geometry(
        "floor",
        &generate_plane(FLOOR_SIZE, FLOOR_SIZE, 1, 1),
    ));
    scene.add_object(
        Object::new("floor", floor, Material::new(FLOOR_COLOR))
            .with_transform(Transform::default().with_rotation(-FRAC_PI_2, 0.0, 0.0))
            .receiving_shadow(),
    );
}

fn add_bushes(scene: &mut Scene) {
    let bush = scene.add_mesh(Mesh::from_geometry("bush", &generate_sphere(16, 16)));
    for (i, (scale, [x, y, z])) in BUSHES.into_iter().enumerate() {
        scene.add_object(
            Object::new(format!("bush-{}", i + 1), bush, Material::new(BUSH_COLOR))
                .with_transform(Transform::from_position(x, y, z).with_uniform_scale(scale))
                .casting_shadow()
                .receiving_shadow(),
        );
    }
}

fn add_graves(scene: &mut Scene, config: &GraveConfig) {
    let [width, height, depth] = GRAVE_SIZE;
    let grave = scene.add_mesh(Mesh::from_geometry(
        "grave",
        &generate_box(width, height, depth),
    ));

    let mut rng = StdRng::seed_from_u64(config.seed);
    for i in 0..config.count {
        let angle = rng.random::<f32>() * TAU;
        let radius = config.min_radius + rng.random::<f32>() * (config.max_radius - config.min_radius);
        let y = rng.random::<f32>() * GRAVE_HEIGHT_JITTER;
        let tilt_x = (rng.random::<f32>() - 0.5) * GRAVE_TILT;
        let tilt_y = (rng.random::<f32>() - 0.5) * GRAVE_TILT;
        let tilt_z = (rng.random::<f32>() - 0.5) * GRAVE_TILT;

        scene.add_object(
            Object::new(format!("grave-{i}"), grave, Material::new(config.color))
                .with_transform(
                    Transform::from_position(angle.sin() * radius, y, angle.cos() * radius)
                        .with_rotation(tilt_x, tilt_y, tilt_z),
                )
                .casting_shadow()
                .receiving_shadow(),
        );
    }
    log::debug!("Placed {} graves with seed {}", config.count, config.seed);
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn graves(scene: &Scene) -> Vec<[f32; 3]> {
        scene
            .objects_with_prefix("grave-")
            .map(|grave| grave.transform.position.into())
            .collect()
    }

    #[test]
    fn test_reference_scene_contents() {
        let scene = build(&SceneConfig::default());
        for name in ["walls", "roof", "door", "floor", "bush-1", "bush-4"] {
            assert!(scene.object_by_name(name).is_some(), "missing {name}");
        }
        assert_eq!(scene.objects_with_prefix("bush-").count(), 4);
        assert_eq!(graves(&scene).len(), 30);
        assert_eq!(scene.ghosts.len(), 3);
        assert_eq!(scene.point_lights().count(), 4);
    }

    #[test]
    fn test_house_placement() {
        let scene = build(&SceneConfig::default());
        let roof = scene.object_by_name("roof").unwrap();
        assert_eq!(roof.transform.position.y, 3.25);
        assert_eq!(roof.transform.rotation.y, FRAC_PI_4);

        let door = scene.object_by_name("door").unwrap();
        assert_abs_diff_eq!(door.transform.position.y, 1.1, epsilon = 1e-6);
        assert_abs_diff_eq!(door.transform.position.z, 2.01, epsilon = 1e-6);

        let floor = scene.object_by_name("floor").unwrap();
        assert!(floor.receive_shadow && !floor.cast_shadow);
    }

    #[test]
    fn test_shadow_flags() {
        let scene = build(&SceneConfig::default());
        for name in ["walls", "roof", "bush-2", "grave-0"] {
            assert!(scene.object_by_name(name).unwrap().cast_shadow, "{name} should cast");
        }
        for name in ["floor", "walls", "bush-3", "grave-5"] {
            assert!(
                scene.object_by_name(name).unwrap().receive_shadow,
                "{name} should receive"
            );
        }
    }

    #[test]
    fn test_graves_stay_in_ring() {
        let config = SceneConfig::default();
        let scene = build(&config);
        for [x, y, z] in graves(&scene) {
            let r = (x * x + z * z).sqrt();
            assert!(r >= config.graves.min_radius - 1e-4 && r < config.graves.max_radius + 1e-4);
            assert!((0.0..0.4).contains(&y));
        }
        let mut tilted_x = 0;
        for grave in scene.objects_with_prefix("grave-") {
            let rotation = grave.transform.rotation;
            assert!(rotation.x.abs() <= 0.2);
            assert!(rotation.y.abs() <= 0.2);
            assert!(rotation.z.abs() <= 0.2);
            if rotation.x != 0.0 {
                tilted_x += 1;
            }
        }
        assert!(tilted_x > config.graves.count / 2, "only {tilted_x} graves lean on x");
    }

    #[test]
    fn test_graves_are_reproducible_per_seed() {
        let mut config = SceneConfig::default();
        let first = graves(&build(&config));
        assert_eq!(first, graves(&build(&config)));

        config.graves.seed += 1;
        assert_ne!(first, graves(&build(&config)));
    }

    #[test]
    fn test_grave_count_follows_config() {
        let mut config = SceneConfig::default();
        config.graves.count = 0;
        assert!(graves(&build(&config)).is_empty());
    }

    #[test]
    fn test_ghosts_start_on_the_x_axis() {
        let scene = build(&SceneConfig::default());
        let positions: Vec<[f32; 3]> = scene
            .ghosts
            .iter()
            .map(|ghost| ghost.light.position.into())
            .collect();
        assert_eq!(
            positions,
            vec![[4.0, 0.0, 0.0], [5.0, 0.0, 0.0], [6.0, 0.0, 0.0]]
        );
    }
}
