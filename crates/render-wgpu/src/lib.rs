//! wgpu backend for the renderer's graphics-context capability.
//!
//! # Invariants
//! - The context owns all GPU resources it hands out ids for; buffers and
//!   pipelines live until the context is dropped.
//! - A frame is recorded through the trait calls and encoded/submitted as
//!   one render pass in `present`.
//! - Depth-test state is fixed before pipeline creation; pipelines and the
//!   render pass agree on whether a depth attachment exists.

mod context;

pub use context::WgpuContext;

pub fn crate_info() -> &'static str {
    "polyspin-render-wgpu v0.1.0"
}
