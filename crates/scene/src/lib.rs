//! Scene core: mesh data, motion rules, transforms, and the ordered scene.
//!
//! # Invariants
//! - Mesh data is immutable after construction and validated up front.
//! - Scene update walks renderables in insertion order; renderables share no
//!   mutable state, so order only matters for reproducibility.
//! - No GPU types live here; renderers consume meshes and model matrices.

mod mesh;
mod motion;
mod scene;
mod transform;

pub use mesh::{Mesh, MeshError};
pub use motion::{Direction, MotionError, MotionRule};
pub use scene::{Renderable, Scene};
pub use transform::Transform;

pub fn crate_info() -> &'static str {
    "polyspin-scene v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("scene"));
    }
}
