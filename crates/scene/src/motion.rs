use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};

/// Errors from motion-rule construction. Fail-fast input checks; `apply`
/// itself is a pure numeric step with no error conditions.
#[derive(Debug, thiserror::Error)]
pub enum MotionError {
    #[error("angular period must be positive, got {0} ms")]
    NonPositivePeriod(f32),
    #[error("rotation axis must be non-zero")]
    ZeroAxis,
    #[error("oscillation amplitude must be positive, got {0}")]
    NonPositiveAmplitude(f32),
    #[error("oscillation step must be positive, got {0}")]
    NonPositiveStep(f32),
}

/// Direction of travel for an oscillating translation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Up,
    Down,
}

/// A composable per-frame state update applied to a model matrix.
///
/// Rules carry their own state as plain fields rather than captured closure
/// variables, so motion state is inspectable and serializable. A transform
/// may hold zero, one, or many rules; they apply in order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MotionRule {
    /// Incremental rotation about a fixed axis: each update composes
    /// `TAU * elapsed_ms / period_ms` radians onto the current matrix.
    /// Repeated calls accumulate, weighted by elapsed time, rather than
    /// recomputing from an absolute clock.
    Spin { axis: Vec3, period_ms: f32 },
    /// Bounded triangular-wave vertical translation: `step` per call, with
    /// the direction reversing exactly when `offset` reaches `amplitude`
    /// in either direction.
    Oscillate {
        amplitude: f32,
        step: f32,
        offset: f32,
        direction: Direction,
    },
}

impl MotionRule {
    /// Rotation rule completing one full turn every `period_ms` milliseconds.
    /// The axis is normalized here; a zero axis is rejected.
    pub fn spin(axis: Vec3, period_ms: f32) -> Result<Self, MotionError> {
        if period_ms <= 0.0 {
            return Err(MotionError::NonPositivePeriod(period_ms));
        }
        let axis = axis.try_normalize().ok_or(MotionError::ZeroAxis)?;
        Ok(Self::Spin { axis, period_ms })
    }

    /// Oscillation rule starting at offset 0, moving up.
    pub fn oscillate(amplitude: f32, step: f32) -> Result<Self, MotionError> {
        if amplitude <= 0.0 {
            return Err(MotionError::NonPositiveAmplitude(amplitude));
        }
        if step <= 0.0 {
            return Err(MotionError::NonPositiveStep(step));
        }
        Ok(Self::Oscillate {
            amplitude,
            step,
            offset: 0.0,
            direction: Direction::Up,
        })
    }

    /// Advance this rule by `elapsed_ms` and compose its motion onto `model`.
    ///
    /// Both rules post-multiply, composing in the object's current local
    /// frame the way the incremental reference updates do.
    pub fn apply(&mut self, model: &mut Mat4, elapsed_ms: f32) {
        match self {
            Self::Spin { axis, period_ms } => {
                let angle = std::f32::consts::TAU * elapsed_ms / *period_ms;
                *model *= Mat4::from_axis_angle(*axis, angle);
            }
            Self::Oscillate {
                amplitude,
                step,
                offset,
                direction,
            } => {
                let delta = match direction {
                    Direction::Up => *step,
                    Direction::Down => -*step,
                };
                *offset += delta;
                *model *= Mat4::from_translation(Vec3::new(0.0, delta, 0.0));
                if *offset >= *amplitude {
                    *direction = Direction::Down;
                } else if *offset <= -*amplitude {
                    *direction = Direction::Up;
                }
            }
        }
    }
}
