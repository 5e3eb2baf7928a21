use crate::motion::MotionRule;
use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// A per-instance model matrix plus the motion rules that drive it.
///
/// The initial translation is baked in at construction; every frame,
/// `update` composes each rule's motion onto the current matrix. The
/// rotation semantics are deliberately incremental: the matrix accumulates
/// elapsed-time-weighted steps rather than being recomputed from an
/// absolute angle.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transform {
    model: Mat4,
    rules: Vec<MotionRule>,
}

impl Transform {
    /// Identity transform with no motion rules.
    pub fn new() -> Self {
        Self {
            model: Mat4::IDENTITY,
            rules: Vec::new(),
        }
    }

    /// Transform with an initial translation baked into the model matrix.
    pub fn from_translation(translation: Vec3) -> Self {
        Self {
            model: Mat4::from_translation(translation),
            rules: Vec::new(),
        }
    }

    /// Attach a motion rule; rules apply in attachment order.
    pub fn with_rule(mut self, rule: MotionRule) -> Self {
        self.rules.push(rule);
        self
    }

    pub fn push_rule(&mut self, rule: MotionRule) {
        self.rules.push(rule);
    }

    /// Advance all motion rules by the wall-clock delta since the last frame.
    pub fn update(&mut self, elapsed_ms: f32) {
        for rule in &mut self.rules {
            rule.apply(&mut self.model, elapsed_ms);
        }
    }

    pub fn model_matrix(&self) -> Mat4 {
        self.model
    }

    pub fn rules(&self) -> &[MotionRule] {
        &self.rules
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::Direction;

    const TOLERANCE: f32 = 1e-4;

    fn matrices_close(a: Mat4, b: Mat4) -> bool {
        a.to_cols_array()
            .iter()
            .zip(b.to_cols_array().iter())
            .all(|(x, y)| (x - y).abs() < TOLERANCE)
    }

    #[test]
    fn default_is_identity() {
        assert_eq!(Transform::new().model_matrix(), Mat4::IDENTITY);
    }

    #[test]
    fn translation_is_baked_in() {
        let t = Transform::from_translation(Vec3::new(1.0, 2.0, -10.0));
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, -10.0));
        assert_eq!(t.model_matrix(), expected);
    }

    #[test]
    fn update_without_rules_is_a_no_op() {
        let mut t = Transform::from_translation(Vec3::X);
        let before = t.model_matrix();
        t.update(1000.0);
        assert_eq!(t.model_matrix(), before);
    }

    #[test]
    fn quarter_period_rotates_initial_matrix_by_quarter_turn() {
        let translation = Vec3::new(0.0, 0.0, -8.0);
        let mut t = Transform::from_translation(translation)
            .with_rule(MotionRule::spin(Vec3::Y, 5000.0).unwrap());
        t.update(1250.0);

        let expected = Mat4::from_translation(translation)
            * Mat4::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        assert!(matrices_close(t.model_matrix(), expected));
    }

    #[test]
    fn rotation_and_oscillation_compose_on_one_transform() {
        let mut t = Transform::new()
            .with_rule(MotionRule::spin(Vec3::Y, 5000.0).unwrap())
            .with_rule(MotionRule::oscillate(0.2, 0.01).unwrap());
        t.update(1250.0);

        let expected = Mat4::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2)
            * Mat4::from_translation(Vec3::new(0.0, 0.01, 0.0));
        assert!(matrices_close(t.model_matrix(), expected));

        // Oscillation state is inspectable on the transform.
        let MotionRule::Oscillate {
            offset, direction, ..
        } = t.rules()[1]
        else {
            panic!("expected oscillate rule");
        };
        assert!((offset - 0.01).abs() < TOLERANCE);
        assert_eq!(direction, Direction::Up);
    }
}
