use glam::Vec3;
use polyspin_scene::{Mesh, MeshError, MotionError, MotionRule, Renderable, Scene, Transform};
use std::sync::Arc;

/// Full rotation period of the demo shapes, in milliseconds.
const SPIN_PERIOD_MS: f32 = 5000.0;

/// Errors from building fixtures or the demo scene.
#[derive(Debug, thiserror::Error)]
pub enum FixtureError {
    #[error(transparent)]
    Mesh(#[from] MeshError),
    #[error(transparent)]
    Motion(#[from] MotionError),
}

/// Build a mesh from a flat xyz vertex table and one color per face.
/// Vertices are laid out three per face-triangle; indices are sequential.
fn face_mesh(positions: &[f32], face_colors: &[[f32; 3]]) -> Result<Mesh, MeshError> {
    let vertices: Vec<Vec3> = positions
        .chunks_exact(3)
        .map(|v| Vec3::new(v[0], v[1], v[2]))
        .collect();
    let colors: Vec<Vec3> = face_colors
        .iter()
        .flat_map(|&[r, g, b]| std::iter::repeat_n(Vec3::new(r, g, b), 3))
        .collect();
    let indices: Vec<u32> = (0..vertices.len() as u32).collect();
    Mesh::new(vertices, colors, indices)
}

/// Square-free pyramid: a pentagon-less 5-sided solid, 3 base triangles
/// plus 4 side faces, red base and mixed side colors.
pub fn pyramid() -> Result<Mesh, MeshError> {
    #[rustfmt::skip]
    let positions: [f32; 72] = [
        // base
        -0.5, -1.0,  0.0,   0.5, -1.0,  0.0,   1.0, -1.0, -1.0,
        -0.5, -1.0,  0.0,   1.0, -1.0, -1.0,   0.0, -1.0, -2.0,
        -0.5, -1.0,  0.0,   0.0, -1.0, -2.0,  -1.0, -1.0, -1.0,
        // sides
        -0.5, -1.0,  0.0,   0.5, -1.0,  0.0,   0.0,  1.0, -1.0,
         0.5, -1.0,  0.0,   1.0, -1.0, -1.0,   0.0,  1.0, -1.0,
         1.0, -1.0, -1.0,   0.0, -1.0, -2.0,   0.0,  1.0, -1.0,
         0.0, -1.0, -2.0,  -1.0, -1.0, -1.0,   0.0,  1.0, -1.0,
        -1.0, -1.0, -1.0,  -0.5, -1.0,  0.0,   0.0,  1.0, -1.0,
    ];
    let face_colors = [
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
    ];
    face_mesh(&positions, &face_colors)
}

/// Scutoid: hexagonal roof, pentagonal floor, and a body that trades one
/// wall for two triangles meeting at a mid-height vertex.
pub fn scutoid() -> Result<Mesh, MeshError> {
    #[rustfmt::skip]
    let positions: [f32; 180] = [
        // roof
        -1.0,  2.0, -1.2,  -0.45, 2.0, -2.0,   0.35, 2.0, -1.8,
        -1.0,  2.0, -1.2,   0.35, 2.0, -1.8,  -0.75, 2.0, -0.2,
        -0.75, 2.0, -0.2,   0.35, 2.0, -1.8,   1.0,  2.0, -0.8,
        -0.75, 2.0, -0.2,   1.0,  2.0, -0.8,   0.15, 2.0,  0.0,
        // floor
         0.55, -2.0, -1.8,  1.0, -2.0, -0.8,  -0.35, -2.0,  0.0,
         0.55, -2.0, -1.8, -0.35, -2.0,  0.0,  -1.0, -2.0, -1.2,
         0.55, -2.0, -1.8, -1.0, -2.0, -1.2,   -0.6, -2.0, -2.0,
        // body
        -1.0,   2.0,  -1.2,  -0.55, 0.55, 0.2,  -0.75, 2.0, -0.2,
        -1.0,   2.0,  -1.2,  -0.55, 0.55, 0.2,  -1.0, -2.0, -1.2,
        -1.0,  -2.0,  -1.2,  -0.55, 0.55, 0.2,  -0.35, -2.0, 0.0,
        -0.75,  2.0,  -0.2,  -0.55, 0.55, 0.2,   0.15, 2.0,  0.0,
         0.15,  2.0,   0.0,  -0.55, 0.55, 0.2,   1.0,  2.0, -0.8,
         1.0,   2.0,  -0.8,  -0.55, 0.55, 0.2,   1.0, -2.0, -0.8,
        -0.35, -2.0,   0.0,  -0.55, 0.55, 0.2,   1.0, -2.0, -0.8,
         1.0,   2.0,  -0.8,   0.35, 2.0, -1.8,   1.0, -2.0, -0.8,
         1.0,  -2.0,  -0.8,   0.55, -2.0, -1.8,  0.35, 2.0, -1.8,
        -0.45,  2.0,  -2.0,   0.35, 2.0, -1.8,   0.55, -2.0, -1.8,
         0.55, -2.0,  -1.8,  -0.6, -2.0, -2.0,  -0.45, 2.0, -2.0,
        -1.0,   2.0,  -1.2,  -0.45, 2.0, -2.0,  -0.6, -2.0, -2.0,
        -0.6,  -2.0,  -2.0,  -1.0, -2.0, -1.2,  -1.0,  2.0, -1.2,
    ];
    let face_colors = [
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
        [1.0, 0.0, 1.0],
        [0.7, 0.5, 0.2],
        [0.7, 0.5, 0.2],
        [0.0, 0.9, 0.5],
        [0.0, 0.9, 0.5],
    ];
    face_mesh(&positions, &face_colors)
}

/// Octahedron: eight faces around two apexes, one color per face.
pub fn octahedron() -> Result<Mesh, MeshError> {
    #[rustfmt::skip]
    let positions: [f32; 72] = [
        0.0,  1.0, -1.0,   0.0,  0.0,  0.0,   1.0,  0.0, -1.0,
        0.0,  1.0, -1.0,   1.0,  0.0, -1.0,   0.0,  0.0, -2.0,
        0.0,  1.0, -1.0,   0.0,  0.0, -2.0,  -1.0,  0.0, -1.0,
        0.0,  1.0, -1.0,  -1.0,  0.0, -1.0,   0.0,  0.0,  0.0,
        0.0, -1.0, -1.0,   0.0,  0.0,  0.0,   1.0,  0.0, -1.0,
        0.0, -1.0, -1.0,   1.0,  0.0, -1.0,   0.0,  0.0, -2.0,
        0.0, -1.0, -1.0,   0.0,  0.0, -2.0,  -1.0,  0.0, -1.0,
        0.0, -1.0, -1.0,  -1.0,  0.0, -1.0,   0.0,  0.0,  0.0,
    ];
    let face_colors = [
        [1.0, 0.0, 0.0],
        [0.0, 1.0, 0.0],
        [0.0, 0.0, 1.0],
        [1.0, 1.0, 0.0],
        [0.0, 1.0, 1.0],
        [1.0, 0.0, 1.0],
        [0.5, 0.9, 0.9],
        [0.3, 0.9, 0.5],
    ];
    face_mesh(&positions, &face_colors)
}

/// The reference scene: pyramid and scutoid spinning about +Y, octahedron
/// spinning and bobbing on a bounded triangular wave.
pub fn demo_scene() -> Result<Scene, FixtureError> {
    let mut scene = Scene::new();

    scene.push(Renderable::new(
        Arc::new(pyramid()?),
        Transform::from_translation(Vec3::new(-3.0, 0.0, -8.0))
            .with_rule(MotionRule::spin(Vec3::Y, SPIN_PERIOD_MS)?),
    ));

    scene.push(Renderable::new(
        Arc::new(scutoid()?),
        Transform::from_translation(Vec3::new(3.0, 0.0, -10.0))
            .with_rule(MotionRule::spin(Vec3::Y, SPIN_PERIOD_MS)?),
    ));

    scene.push(Renderable::new(
        Arc::new(octahedron()?),
        Transform::from_translation(Vec3::new(0.0, 0.0, -6.0))
            .with_rule(MotionRule::spin(Vec3::Y, SPIN_PERIOD_MS)?)
            .with_rule(MotionRule::oscillate(0.2, 0.01)?),
    ));

    Ok(scene)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pyramid_has_eight_faces() {
        let mesh = pyramid().unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.colors().len(), mesh.vertices().len());
    }

    #[test]
    fn scutoid_has_twenty_faces() {
        let mesh = scutoid().unwrap();
        assert_eq!(mesh.vertex_count(), 60);
        assert_eq!(mesh.triangle_count(), 20);
    }

    #[test]
    fn octahedron_has_eight_faces() {
        let mesh = octahedron().unwrap();
        assert_eq!(mesh.vertex_count(), 24);
        assert_eq!(mesh.triangle_count(), 8);
    }

    #[test]
    fn face_colors_are_constant_within_each_face() {
        let mesh = octahedron().unwrap();
        for face in mesh.colors().chunks_exact(3) {
            assert_eq!(face[0], face[1]);
            assert_eq!(face[1], face[2]);
        }
    }

    #[test]
    fn demo_scene_has_three_shapes() {
        let scene = demo_scene().unwrap();
        assert_eq!(scene.len(), 3);
        // The octahedron carries both a spin and an oscillation rule.
        assert_eq!(scene.renderables()[2].transform().rules().len(), 2);
    }
}
