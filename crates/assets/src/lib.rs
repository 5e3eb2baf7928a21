//! Static geometry fixtures: the three reference polyhedra and the demo
//! scene that animates them.
//!
//! Shape tables are data, not code: each builder feeds literal coordinate
//! and face-color arrays through the one generic `Mesh` constructor. The
//! renderer consumes meshes by value, never by file path.

mod shapes;

pub use shapes::{demo_scene, octahedron, pyramid, scutoid, FixtureError};

pub fn crate_info() -> &'static str {
    "polyspin-assets v0.1.0"
}
