use glam::Mat4;

/// Handle to a context-owned GPU buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BufferId(pub u32);

/// Handle to a context-owned compiled pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipelineId(pub u32);

/// Where pipeline construction failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineStage {
    Vertex,
    Fragment,
    Link,
}

impl std::fmt::Display for PipelineStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Vertex => f.write_str("vertex"),
            Self::Fragment => f.write_str("fragment"),
            Self::Link => f.write_str("link"),
        }
    }
}

/// A shader stage failed to compile or the pipeline failed to link.
/// Carries the backend's diagnostic text verbatim.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{stage} stage failed: {log}")]
pub struct PipelineError {
    pub stage: PipelineStage,
    pub log: String,
}

/// Capability object for the host graphics context.
///
/// The renderer drives everything GPU-visible through this trait: buffer
/// creation and upload, pipeline compilation, state setup, and indexed
/// draws. Handles are plain ids so the trait stays object-safe and a
/// recording backend can stand in for real hardware.
pub trait GraphicsContext {
    /// Upload flat xyz position or rgb color data (three floats per vertex).
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferId;

    /// Upload triangle-list index data.
    fn create_index_buffer(&mut self, data: &[u32]) -> BufferId;

    /// Compile and link the two-stage pipeline from the given shader
    /// sources. The sources are consumed verbatim.
    fn create_pipeline(
        &mut self,
        vertex_src: &str,
        fragment_src: &str,
    ) -> Result<PipelineId, PipelineError>;

    fn set_viewport(&mut self, width: u32, height: u32);

    fn set_depth_test(&mut self, enabled: bool);

    /// Clear the color buffer to `color` and the depth buffer to its far
    /// value, once per frame, before any draw.
    fn clear(&mut self, color: [f32; 4]);

    fn bind_pipeline(&mut self, pipeline: PipelineId);

    /// Upload the shared projection matrix and the per-draw model matrix
    /// for the next draw call.
    fn set_matrix_uniforms(&mut self, projection: &Mat4, model: &Mat4);

    /// Issue one indexed triangle-list draw covering `index_count` indices.
    fn draw_indexed(
        &mut self,
        positions: BufferId,
        colors: BufferId,
        indices: BufferId,
        index_count: u32,
    );
}
