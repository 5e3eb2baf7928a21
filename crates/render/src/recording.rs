use crate::context::{BufferId, GraphicsContext, PipelineError, PipelineId};
use glam::Mat4;

/// One recorded context call.
#[derive(Debug, Clone, PartialEq)]
pub enum ContextCall {
    CreateVertexBuffer {
        id: BufferId,
        floats: usize,
    },
    CreateIndexBuffer {
        id: BufferId,
        indices: usize,
    },
    CreatePipeline {
        id: PipelineId,
    },
    SetViewport {
        width: u32,
        height: u32,
    },
    SetDepthTest {
        enabled: bool,
    },
    Clear {
        color: [f32; 4],
    },
    BindPipeline {
        id: PipelineId,
    },
    SetMatrixUniforms {
        projection: Mat4,
        model: Mat4,
    },
    DrawIndexed {
        positions: BufferId,
        colors: BufferId,
        indices: BufferId,
        index_count: u32,
    },
}

/// Graphics context that records every call instead of touching hardware.
///
/// Stands in for the wgpu backend in tests and headless runs: the call log
/// makes ordering, draw counts, and uploaded matrices assertable, and a
/// compile failure can be injected to exercise the error path.
#[derive(Debug, Default)]
pub struct RecordingContext {
    calls: Vec<ContextCall>,
    next_buffer: u32,
    next_pipeline: u32,
    compile_failure: Option<PipelineError>,
}

impl RecordingContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make the next `create_pipeline` call fail with the given error.
    pub fn fail_next_compile(&mut self, error: PipelineError) {
        self.compile_failure = Some(error);
    }

    pub fn calls(&self) -> &[ContextCall] {
        &self.calls
    }

    pub fn take_calls(&mut self) -> Vec<ContextCall> {
        std::mem::take(&mut self.calls)
    }

    pub fn draw_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ContextCall::DrawIndexed { .. }))
            .count()
    }

    pub fn clear_count(&self) -> usize {
        self.calls
            .iter()
            .filter(|c| matches!(c, ContextCall::Clear { .. }))
            .count()
    }

    /// The most recent matrix upload, if any.
    pub fn last_uniforms(&self) -> Option<(Mat4, Mat4)> {
        self.calls.iter().rev().find_map(|c| match c {
            ContextCall::SetMatrixUniforms { projection, model } => Some((*projection, *model)),
            _ => None,
        })
    }
}

impl GraphicsContext for RecordingContext {
    fn create_vertex_buffer(&mut self, data: &[f32]) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.calls.push(ContextCall::CreateVertexBuffer {
            id,
            floats: data.len(),
        });
        id
    }

    fn create_index_buffer(&mut self, data: &[u32]) -> BufferId {
        let id = BufferId(self.next_buffer);
        self.next_buffer += 1;
        self.calls.push(ContextCall::CreateIndexBuffer {
            id,
            indices: data.len(),
        });
        id
    }

    fn create_pipeline(
        &mut self,
        _vertex_src: &str,
        _fragment_src: &str,
    ) -> Result<PipelineId, PipelineError> {
        if let Some(error) = self.compile_failure.take() {
            return Err(error);
        }
        let id = PipelineId(self.next_pipeline);
        self.next_pipeline += 1;
        self.calls.push(ContextCall::CreatePipeline { id });
        Ok(id)
    }

    fn set_viewport(&mut self, width: u32, height: u32) {
        self.calls.push(ContextCall::SetViewport { width, height });
    }

    fn set_depth_test(&mut self, enabled: bool) {
        self.calls.push(ContextCall::SetDepthTest { enabled });
    }

    fn clear(&mut self, color: [f32; 4]) {
        self.calls.push(ContextCall::Clear { color });
    }

    fn bind_pipeline(&mut self, pipeline: PipelineId) {
        self.calls.push(ContextCall::BindPipeline { id: pipeline });
    }

    fn set_matrix_uniforms(&mut self, projection: &Mat4, model: &Mat4) {
        self.calls.push(ContextCall::SetMatrixUniforms {
            projection: *projection,
            model: *model,
        });
    }

    fn draw_indexed(
        &mut self,
        positions: BufferId,
        colors: BufferId,
        indices: BufferId,
        index_count: u32,
    ) {
        self.calls.push(ContextCall::DrawIndexed {
            positions,
            colors,
            indices,
            index_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PipelineStage;

    #[test]
    fn buffer_ids_are_distinct() {
        let mut ctx = RecordingContext::new();
        let a = ctx.create_vertex_buffer(&[0.0; 9]);
        let b = ctx.create_index_buffer(&[0, 1, 2]);
        assert_ne!(a, b);
        assert_eq!(ctx.calls().len(), 2);
    }

    #[test]
    fn injected_compile_failure_fires_once() {
        let mut ctx = RecordingContext::new();
        ctx.fail_next_compile(PipelineError {
            stage: PipelineStage::Fragment,
            log: "syntax error".into(),
        });
        let err = ctx.create_pipeline("vs", "fs").unwrap_err();
        assert_eq!(err.stage, PipelineStage::Fragment);
        assert!(err.to_string().contains("syntax error"));

        // Subsequent compiles succeed.
        assert!(ctx.create_pipeline("vs", "fs").is_ok());
    }
}
