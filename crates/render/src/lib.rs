//! Renderer core: the graphics-context capability and the scene renderer.
//!
//! # Invariants
//! - The renderer never mutates scene state; it reads meshes and model
//!   matrices and issues context calls.
//! - All pipeline and projection state lives on the `Renderer` instance,
//!   never in module-level globals, so independent renderers can coexist
//!   in one process.
//!
//! The `GraphicsContext` trait is the seam to the host: swap in the wgpu
//! implementation, or the recording backend for tests and headless runs,
//! without changing consumers.

mod context;
mod recording;
mod renderer;
pub mod shaders;

pub use context::{BufferId, GraphicsContext, PipelineError, PipelineId, PipelineStage};
pub use recording::{ContextCall, RecordingContext};
pub use renderer::{RenderError, Renderer};

pub fn crate_info() -> &'static str {
    "polyspin-render v0.1.0"
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn crate_loads() {
        assert!(crate_info().contains("render"));
    }
}
