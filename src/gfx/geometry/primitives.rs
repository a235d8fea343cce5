//! # Plane and Sphere
//!
//! Shapes use the z-up convention of the scene.

use super::GeometryData;
use std::f32::consts::PI;

/// Generate a single quad in the XY plane, centered at the origin, facing +Z
///
/// Texture coordinates run from (0, 0) at the (-x, -y) corner to (1, 1) at the
/// (+x, +y) corner. The tangent follows +u and the bitangent +v, which makes the
/// tangent frame right-handed with the +Z normal.
pub fn generate_plane(width: f32, height: f32) -> GeometryData {
    let hw = 0.5 * width;
    let hh = 0.5 * height;

    GeometryData {
        vertices: vec![[-hw, -hh, 0.0], [hw, -hh, 0.0], [hw, hh, 0.0], [-hw, hh, 0.0]],
        tex_coords: vec![[0.0, 0.0], [1.0, 0.0], [1.0, 1.0], [0.0, 1.0]],
        normals: vec![[0.0, 0.0, 1.0]; 4],
        tangents: vec![[1.0, 0.0, 0.0, 1.0]; 4],
        indices: vec![0, 1, 2, 0, 2, 3],
    }
}

/// Generate a UV sphere around the Z axis
///
/// # Arguments
/// * `radius` - Sphere radius
/// * `longitude_segments` - Segments around the Z axis
/// * `latitude_segments` - Segments from pole to pole
pub fn generate_sphere(radius: f32, longitude_segments: u32, latitude_segments: u32) -> GeometryData {
    let mut data = GeometryData::new();

    let long_segs = longitude_segments.max(3);
    let lat_segs = latitude_segments.max(2);

    for lat in 0..=lat_segs {
        let theta = lat as f32 * PI / lat_segs as f32;
        let (sin_theta, cos_theta) = theta.sin_cos();

        for long in 0..=long_segs {
            let phi = long as f32 * 2.0 * PI / long_segs as f32;
            let (sin_phi, cos_phi) = phi.sin_cos();

            let normal = [sin_theta * cos_phi, sin_theta * sin_phi, cos_theta];
            data.vertices
                .push([radius * normal[0], radius * normal[1], radius * normal[2]]);
            data.normals.push(normal);
            data.tangents.push([-sin_phi, cos_phi, 0.0, 1.0]);
            data.tex_coords
                .push([long as f32 / long_segs as f32, lat as f32 / lat_segs as f32]);
        }
    }

    for lat in 0..lat_segs {
        for long in 0..long_segs {
            let first = lat * (long_segs + 1) + long;
            let second = first + long_segs + 1;

            data.indices.extend_from_slice(&[first, second, first + 1]);
            data.indices.extend_from_slice(&[second, second + 1, first + 1]);
        }
    }

    data
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plane_generation() {
        let plane = generate_plane(0.9, 0.9);
        assert_eq!(plane.vertex_count(), 4);
        assert_eq!(plane.indices, vec![0, 1, 2, 0, 2, 3]);
        assert_eq!(plane.vertices[2], [0.45, 0.45, 0.0]);
    }

    #[test]
    fn test_plane_winding_faces_normal() {
        let plane = generate_plane(1.0, 1.0);
        for tri in plane.indices.chunks(3) {
            let a = plane.vertices[tri[0] as usize];
            let b = plane.vertices[tri[1] as usize];
            let c = plane.vertices[tri[2] as usize];
            let e1 = [b[0] - a[0], b[1] - a[1]];
            let e2 = [c[0] - a[0], c[1] - a[1]];
            // z component of the face normal
            assert!(e1[0] * e2[1] - e1[1] * e2[0] > 0.0);
        }
    }

    #[test]
    fn test_sphere_generation() {
        let sphere = generate_sphere(0.02, 8, 6);
        assert_eq!(sphere.vertex_count(), 9 * 7);
        assert_eq!(sphere.triangle_count(), 8 * 6 * 2);
        assert_eq!(sphere.vertices.len(), sphere.normals.len());
        assert_eq!(sphere.vertices.len(), sphere.tangents.len());
        for v in &sphere.vertices {
            let r = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
            assert!((r - 0.02).abs() < 1e-6);
        }
    }

    #[test]
    fn test_scene_format_interleaves() {
        let (vertices, indices) = generate_plane(2.0, 2.0).to_scene_format();
        assert_eq!(vertices.len(), 4);
        assert_eq!(indices.len(), 6);
        assert_eq!(vertices[1].tex_coords, [1.0, 0.0]);
        assert_eq!(vertices[1].tangent, [1.0, 0.0, 0.0, 1.0]);
    }
}
