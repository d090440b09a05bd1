//! # Primitive Shape Generation
//!
//! This module contains functions to generate the primitive shapes the scene is
//! built from. All shapes are Y-up, centred at the origin and wound
//! counter-clockwise when seen from the side their normals point to.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a unit cube centered at the origin
///
/// Returns a cube with vertices from -0.5 to 0.5 on all axes.
/// Each face has proper normals pointing outward and UV coordinates from 0 to 1.
pub fn generate_cube() -> GeometryData {
    let mut data = GeometryData::new();

    #[rustfmt::skip]
    let positions = [
        // Front face
        [-0.5, -0.5,  0.5], [ 0.5, -0.5,  0.5], [ 0.5,  0.5,  0.5], [-0.5,  0.5,  0.5],
        // Back face
        [-0.5, -0.5, -0.5], [-0.5,  0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5, -0.5, -0.5],
        // Left face
        [-0.5, -0.5, -0.5], [-0.5, -0.5,  0.5], [-0.5,  0.5,  0.5], [-0.5,  0.5, -0.5],
        // Right face
        [ 0.5, -0.5,  0.5], [ 0.5, -0.5, -0.5], [ 0.5,  0.5, -0.5], [ 0.5,  0.5,  0.5],
        // Top face
        [-0.5,  0.5,  0.5], [ 0.5,  0.5,  0.5], [ 0.5,  0.5, -0.5], [-0.5,  0.5, -0.5],
        // Bottom face
        [-0.5, -0.5, -0.5], [ 0.5, -0.5, -0.5], [ 0.5, -0.5,  0.5], [-0.5, -0.5,  0.5],
    ];

    let face_uvs = [[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]];
    let face_normals = [
        [0.0, 0.0, 1.0],
        [0.0, 0.0, -1.0],
        [-1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, -1.0, 0.0],
    ];

    data.vertices = positions.to_vec();
    for normal in face_normals {
        data.normals.extend([normal; 4]);
        data.tex_coords.extend(face_uvs);
    }

    // Two triangles per face
    for face in 0..6u32 {
        let base = face * 4;
        data.indices
            .extend([base, base + 1, base + 2, base + 2, base + 3, base]);
    }

    data
}

/// Generate a box with the given extents along X, Y and Z
pub fn generate_box(width: f32, height: f32, depth: f32) -> GeometryData {
    let mut data = generate_cube();
    for position in &mut data.vertices {
        position[0] *= width;
        position[1] *= height;
        position[2] *= depth;
    }
    data
}

/// Generate a UV sphere with specified resolution
///
/// # Arguments
/// * `longitude_segments` - Number of vertical segments (longitude lines)
/// * `latitude_segments` - Number of horizontal segments (latitude lines)
///
/// Returns a sphere of radius 1.0 centered at the origin.
pub fn generate_sphere(longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32; // 0 to PI
        let sin_theta = theta.sin();
        let cos_theta = theta.cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32; // 0 to 2*PI

            let x = sin_theta * phi.cos();
            let y = cos_theta;
            let z = sin_theta * phi.sin();

            data.vertices.push([x, y, z]);
            data.normals.push([x, y, z]);
            data.tex_coords
                .push([long as f32 / long_segs as f32, lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend([first, first + 1, second]);
            data.indices.extend([second, first + 1, second + 1]);
        }
    }

    data
}

/// Generate a plane in the XY plane facing +Z
///
/// # Arguments
/// * `width` - Width of the plane (X direction)
/// * `height` - Height of the plane (Y direction)
/// * `width_segments` - Number of subdivisions along width
/// * `height_segments` - Number of subdivisions along height
///
/// Rotate it by -90° about X to lay it flat as a floor.
pub fn generate_plane(
    width: f32,
    height: f32,
    width_segments: u32,
    height_segments: u32,
) -> GeometryData {
    let mut data = GeometryData::new();

    let w_segs = width_segments.max(1);
    let h_segs = height_segments.max(1);

    for y in 0..=h_segs {
        let v = y as f32 / h_segs as f32;
        let pos_y = (v - 0.5) * height;

        for x in 0..=w_segs {
            let u = x as f32 / w_segs as f32;
            let pos_x = (u - 0.5) * width;

            data.vertices.push([pos_x, pos_y, 0.0]);
            data.normals.push([0.0, 0.0, 1.0]);
            data.tex_coords.push([u, v]);
        }
    }

    for y in 0..h_segs {
        for x in 0..w_segs {
            let i = y * (w_segs + 1) + x;
            let next_row = i + w_segs + 1;

            data.indices.extend([i, i + 1, next_row]);
            data.indices.extend([i + 1, next_row + 1, next_row]);
        }
    }

    data
}

/// Generate a cone with a flat-shaded side
///
/// # Arguments
/// * `radius` - Radius of the base
/// * `height` - Height along Y; the cone spans -height/2 to height/2
/// * `segments` - Number of side faces; 4 gives a pyramid roof
///
/// The first base corner sits on +Z, so a four-sided cone needs a 45° turn
/// about Y to line its faces up with the axes.
pub fn generate_cone(radius: f32, height: f32, segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let segs = segments.max(3);
    let half_height = height * 0.5;
    let apex = [0.0, half_height, 0.0];
    let corner = |i: u32| {
        let angle = i as f32 * 2.0 * PI / segs as f32;
        [radius * angle.sin(), -half_height, radius * angle.cos()]
    };

    // Each side face gets its own vertices so it shades flat
    for i in 0..segs {
        let a = corner(i);
        let b = corner(i + 1);

        let mid_angle = (i as f32 + 0.5) * 2.0 * PI / segs as f32;
        let slope = radius / height;
        let normal = normalize([mid_angle.sin(), slope, mid_angle.cos()]);

        let base = data.vertices.len() as u32;
        data.vertices.extend([a, b, apex]);
        data.normals.extend([normal; 3]);
        data.tex_coords.extend([[0.0, 0.0], [1.0, 0.0], [0.5, 1.0]]);
        data.indices.extend([base, base + 1, base + 2]);
    }

    let center = data.vertices.len() as u32;
    data.vertices.push([0.0, -half_height, 0.0]);
    data.normals.push([0.0, -1.0, 0.0]);
    data.tex_coords.push([0.5, 0.5]);

    for i in 0..segs {
        let base = data.vertices.len() as u32;
        data.vertices.extend([corner(i), corner(i + 1)]);
        data.normals.extend([[0.0, -1.0, 0.0]; 2]);
        data.tex_coords.extend([[0.0, 0.0], [1.0, 0.0]]);
        data.indices.extend([center, base + 1, base]);
    }

    data
}

fn normalize(v: [f32; 3]) -> [f32; 3] {
    let length = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
    [v[0] / length, v[1] / length, v[2] / length]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
    }

    fn cross(a: [f32; 3], b: [f32; 3]) -> [f32; 3] {
        [
            a[1] * b[2] - a[2] * b[1],
            a[2] * b[0] - a[0] * b[2],
            a[0] * b[1] - a[1] * b[0],
        ]
    }

    fn dot(a: [f32; 3], b: [f32; 3]) -> f32 {
        a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
    }

    /// Every triangle's winding must agree with its vertex normals
    fn assert_winding_matches_normals(data: &GeometryData) {
        for tri in data.indices.chunks(3) {
            let [a, b, c] = [0, 1, 2].map(|k| data.vertices[tri[k] as usize]);
            let face = cross(sub(b, a), sub(c, a));
            if dot(face, face) < 1e-12 {
                continue;
            }
            let normal = data.normals[tri[0] as usize];
            assert!(dot(face, normal) > 0.0, "triangle {tri:?} is wound inwards");
        }
    }

    #[test]
    fn test_cube_generation() {
        let cube = generate_cube();
        assert_eq!(cube.vertices.len(), 24); // 6 faces * 4 vertices
        assert_eq!(cube.indices.len(), 36); // 6 faces * 2 triangles * 3 indices
        assert_eq!(cube.vertex_count(), 24);
        assert_eq!(cube.triangle_count(), 12);
        assert_winding_matches_normals(&cube);
    }

    #[test]
    fn test_box_extents() {
        let walls = generate_box(4.0, 2.5, 4.0);
        let max_y = walls.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        let min_x = walls.vertices.iter().map(|v| v[0]).fold(f32::MAX, f32::min);
        assert_eq!(max_y, 1.25);
        assert_eq!(min_x, -2.0);
        assert_winding_matches_normals(&walls);
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(8, 6);
        assert!(!sphere.vertices.is_empty());
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tex_coords.len());
        assert_winding_matches_normals(&sphere);
    }

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(2.0, 2.0, 2, 2);
        assert_eq!(plane.vertices.len(), 9); // 3x3 grid
        assert_eq!(plane.indices.len(), 24); // 4 quads * 2 triangles * 3 indices
        assert_winding_matches_normals(&plane);
    }

    #[test]
    fn test_cone_is_closed_pyramid() {
        let roof = generate_cone(3.5, 1.5, 4);
        assert_eq!(roof.triangle_count(), 8);
        assert_winding_matches_normals(&roof);

        let apex = roof.vertices.iter().map(|v| v[1]).fold(f32::MIN, f32::max);
        assert_eq!(apex, 0.75);
        for normal in &roof.normals {
            let length = dot(*normal, *normal).sqrt();
            assert!((length - 1.0).abs() < 1e-5);
        }
    }
}
