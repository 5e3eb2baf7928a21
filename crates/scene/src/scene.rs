use crate::mesh::Mesh;
use crate::transform::Transform;
use glam::Mat4;
use std::sync::Arc;

/// One drawable instance: a shared, read-only mesh plus an exclusively
/// owned transform.
#[derive(Debug, Clone)]
pub struct Renderable {
    mesh: Arc<Mesh>,
    transform: Transform,
}

impl Renderable {
    pub fn new(mesh: Arc<Mesh>, transform: Transform) -> Self {
        Self { mesh, transform }
    }

    /// Advance this instance's motion by the frame delta. The only side
    /// effect is the transform mutation.
    pub fn update(&mut self, elapsed_ms: f32) {
        self.transform.update(elapsed_ms);
    }

    pub fn mesh(&self) -> &Arc<Mesh> {
        &self.mesh
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.transform.model_matrix()
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }
}

/// Ordered collection of renderables. Insertion order is render order;
/// transforms are independent, so update order only matters for
/// reproducibility, which the `Vec` guarantees.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    renderables: Vec<Renderable>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, renderable: Renderable) {
        self.renderables.push(renderable);
        tracing::debug!(
            renderables = self.renderables.len(),
            triangles = self.renderables.last().map(|r| r.mesh().triangle_count()),
            "renderable added"
        );
    }

    pub fn len(&self) -> usize {
        self.renderables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.renderables.is_empty()
    }

    /// Advance every renderable, in insertion order, by the frame delta.
    pub fn update(&mut self, elapsed_ms: f32) {
        for renderable in &mut self.renderables {
            renderable.update(elapsed_ms);
        }
    }

    /// The ordered sequence a renderer consumes.
    pub fn renderables(&self) -> &[Renderable] {
        &self.renderables
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::MotionRule;
    use glam::Vec3;

    fn one_triangle() -> Arc<Mesh> {
        Arc::new(
            Mesh::new(
                vec![
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(-1.0, -1.0, 0.0),
                    Vec3::new(1.0, -1.0, 0.0),
                ],
                vec![Vec3::new(0.0, 1.0, 0.0); 3],
                vec![0, 1, 2],
            )
            .unwrap(),
        )
    }

    #[test]
    fn empty_scene() {
        let scene = Scene::new();
        assert!(scene.is_empty());
        assert_eq!(scene.renderables().len(), 0);
    }

    #[test]
    fn update_reaches_every_renderable() {
        let mesh = one_triangle();
        let mut scene = Scene::new();
        for _ in 0..3 {
            scene.push(Renderable::new(
                mesh.clone(),
                Transform::new().with_rule(MotionRule::spin(Vec3::Y, 5000.0).unwrap()),
            ));
        }
        scene.update(2500.0);

        for renderable in scene.renderables() {
            // Half a period: every instance rotated by pi.
            let expected = Mat4::from_axis_angle(Vec3::Y, std::f32::consts::PI);
            let got = renderable.model_matrix().to_cols_array();
            let want = expected.to_cols_array();
            assert!(got
                .iter()
                .zip(want.iter())
                .all(|(a, b)| (a - b).abs() < 1e-4));
        }
    }

    #[test]
    fn meshes_are_shared_not_copied() {
        let mesh = one_triangle();
        let mut scene = Scene::new();
        scene.push(Renderable::new(mesh.clone(), Transform::new()));
        scene.push(Renderable::new(mesh.clone(), Transform::new()));
        assert!(Arc::ptr_eq(
            scene.renderables()[0].mesh(),
            scene.renderables()[1].mesh()
        ));
    }

    #[test]
    fn insertion_order_is_preserved() {
        let mesh = one_triangle();
        let mut scene = Scene::new();
        for i in 0..5 {
            scene.push(Renderable::new(
                mesh.clone(),
                Transform::from_translation(Vec3::new(i as f32, 0.0, 0.0)),
            ));
        }
        for (i, renderable) in scene.renderables().iter().enumerate() {
            assert_eq!(renderable.model_matrix().w_axis.x, i as f32);
        }
    }
}
