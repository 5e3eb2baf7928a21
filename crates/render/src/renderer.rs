use crate::context::{BufferId, GraphicsContext, PipelineError, PipelineId};
use crate::shaders;
use glam::{Mat4, Vec3};
use polyspin_scene::{Mesh, Scene};
use std::collections::HashMap;
use std::sync::Arc;

/// Errors from renderer operations. All are programming or input errors;
/// none are transient, so there is no retry path.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("`{op}` called before initialize")]
    NotInitialized { op: &'static str },
    #[error("degenerate viewport {width}x{height}")]
    DegenerateViewport { width: u32, height: u32 },
    #[error(transparent)]
    PipelineCompile(#[from] PipelineError),
}

/// State held only once the renderer is initialized.
#[derive(Debug)]
struct PipelineState {
    pipeline: PipelineId,
    projection: Mat4,
    fov_y: f32,
    near: f32,
    far: f32,
}

/// Context-side buffers for one uploaded mesh.
#[derive(Debug, Clone, Copy)]
struct GpuMesh {
    positions: BufferId,
    colors: BufferId,
    indices: BufferId,
    index_count: u32,
}

/// Draws a scene through an injected graphics context.
///
/// Owns the compiled pipeline handle, the shared projection matrix, and the
/// per-mesh upload cache. `Uninitialized → Ready` on `initialize`; `resize`
/// and `draw` are valid only in `Ready`.
#[derive(Debug, Default)]
pub struct Renderer {
    state: Option<PipelineState>,
    clear_color: [f32; 4],
    mesh_cache: HashMap<usize, GpuMesh>,
}

impl Renderer {
    /// An uninitialized renderer with the reference near-black clear color.
    pub fn new() -> Self {
        Self {
            state: None,
            clear_color: [0.1, 0.1, 0.1, 1.0],
            mesh_cache: HashMap::new(),
        }
    }

    pub fn with_clear_color(mut self, color: [f32; 4]) -> Self {
        self.clear_color = color;
        self
    }

    pub fn is_ready(&self) -> bool {
        self.state.is_some()
    }

    /// The shared projection matrix, once initialized.
    pub fn projection_matrix(&self) -> Option<Mat4> {
        self.state.as_ref().map(|s| s.projection)
    }

    /// Build the projection matrix and compile the two-stage pipeline.
    ///
    /// Transitions `Uninitialized → Ready`. Fails on degenerate dimensions
    /// or if either shader stage fails to compile or link; the pipeline
    /// error carries the backend's diagnostic text.
    pub fn initialize(
        &mut self,
        ctx: &mut impl GraphicsContext,
        width: u32,
        height: u32,
        fov_y_radians: f32,
        near: f32,
        far: f32,
    ) -> Result<(), RenderError> {
        if width == 0 || height == 0 {
            return Err(RenderError::DegenerateViewport { width, height });
        }

        ctx.set_viewport(width, height);
        ctx.set_depth_test(true);
        let pipeline = ctx.create_pipeline(shaders::VERTEX_SHADER, shaders::FRAGMENT_SHADER)?;

        let aspect = width as f32 / height as f32;
        self.state = Some(PipelineState {
            pipeline,
            projection: Mat4::perspective_rh(fov_y_radians, aspect, near, far),
            fov_y: fov_y_radians,
            near,
            far,
        });
        tracing::debug!(width, height, fov_y_radians, "renderer initialized");
        Ok(())
    }

    /// Recompute the projection matrix for a new viewport size.
    pub fn resize(
        &mut self,
        ctx: &mut impl GraphicsContext,
        width: u32,
        height: u32,
    ) -> Result<(), RenderError> {
        let state = self
            .state
            .as_mut()
            .ok_or(RenderError::NotInitialized { op: "resize" })?;
        if width == 0 || height == 0 {
            return Err(RenderError::DegenerateViewport { width, height });
        }

        let aspect = width as f32 / height as f32;
        state.projection = Mat4::perspective_rh(state.fov_y, aspect, state.near, state.far);
        ctx.set_viewport(width, height);
        Ok(())
    }

    /// Draw every renderable in scene order.
    ///
    /// Clears color and depth once, before any renderable, then issues one
    /// indexed draw per renderable with its model matrix and the shared
    /// projection matrix.
    pub fn draw(
        &mut self,
        ctx: &mut impl GraphicsContext,
        scene: &Scene,
    ) -> Result<(), RenderError> {
        let state = self
            .state
            .as_ref()
            .ok_or(RenderError::NotInitialized { op: "draw" })?;

        ctx.clear(self.clear_color);
        ctx.bind_pipeline(state.pipeline);

        let projection = state.projection;
        for renderable in scene.renderables() {
            let gpu_mesh = upload_mesh(&mut self.mesh_cache, ctx, renderable.mesh());
            let model = renderable.model_matrix();
            ctx.set_matrix_uniforms(&projection, &model);
            ctx.draw_indexed(
                gpu_mesh.positions,
                gpu_mesh.colors,
                gpu_mesh.indices,
                gpu_mesh.index_count,
            );
        }
        Ok(())
    }
}

/// Upload a mesh's buffers on first use and cache them.
///
/// Meshes are created at scene-build time and live for the whole run, so
/// keying the cache by the `Arc` allocation address is stable.
fn upload_mesh(
    cache: &mut HashMap<usize, GpuMesh>,
    ctx: &mut impl GraphicsContext,
    mesh: &Arc<Mesh>,
) -> GpuMesh {
    let key = Arc::as_ptr(mesh) as usize;
    if let Some(&gpu_mesh) = cache.get(&key) {
        return gpu_mesh;
    }

    let gpu_mesh = GpuMesh {
        positions: ctx.create_vertex_buffer(&flatten(mesh.vertices())),
        colors: ctx.create_vertex_buffer(&flatten(mesh.colors())),
        indices: ctx.create_index_buffer(mesh.indices()),
        index_count: mesh.index_count(),
    };
    tracing::trace!(
        vertices = mesh.vertex_count(),
        triangles = mesh.triangle_count(),
        "uploaded mesh"
    );
    cache.insert(key, gpu_mesh);
    gpu_mesh
}

fn flatten(vecs: &[Vec3]) -> Vec<f32> {
    let mut out = Vec::with_capacity(vecs.len() * 3);
    for v in vecs {
        out.extend_from_slice(&v.to_array());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::PipelineStage;
    use crate::recording::{ContextCall, RecordingContext};
    use polyspin_scene::{MotionRule, Renderable, Transform};

    const TOLERANCE: f32 = 1e-4;

    fn one_triangle() -> Arc<Mesh> {
        Arc::new(
            Mesh::new(
                vec![
                    Vec3::new(0.0, 1.0, 0.0),
                    Vec3::new(-1.0, -1.0, 0.0),
                    Vec3::new(1.0, -1.0, 0.0),
                ],
                vec![Vec3::new(1.0, 0.0, 0.0); 3],
                vec![0, 1, 2],
            )
            .unwrap(),
        )
    }

    fn ready_renderer(ctx: &mut RecordingContext) -> Renderer {
        let mut renderer = Renderer::new();
        renderer
            .initialize(ctx, 800, 600, std::f32::consts::FRAC_PI_4, 1.0, 10000.0)
            .unwrap();
        renderer
    }

    #[test]
    fn draw_before_initialize_fails() {
        let mut ctx = RecordingContext::new();
        let mut renderer = Renderer::new();
        let err = renderer.draw(&mut ctx, &Scene::new()).unwrap_err();
        assert!(matches!(err, RenderError::NotInitialized { op: "draw" }));
    }

    #[test]
    fn resize_before_initialize_fails() {
        let mut ctx = RecordingContext::new();
        let mut renderer = Renderer::new();
        let err = renderer.resize(&mut ctx, 800, 600).unwrap_err();
        assert!(matches!(err, RenderError::NotInitialized { op: "resize" }));
    }

    #[test]
    fn initialize_rejects_degenerate_viewport() {
        let mut ctx = RecordingContext::new();
        let mut renderer = Renderer::new();
        let err = renderer
            .initialize(&mut ctx, 0, 600, std::f32::consts::FRAC_PI_4, 1.0, 10000.0)
            .unwrap_err();
        assert!(matches!(
            err,
            RenderError::DegenerateViewport {
                width: 0,
                height: 600
            }
        ));
        assert!(!renderer.is_ready());
    }

    #[test]
    fn resize_rejects_zero_dimensions() {
        let mut ctx = RecordingContext::new();
        let mut renderer = ready_renderer(&mut ctx);

        assert!(matches!(
            renderer.resize(&mut ctx, 0, 600),
            Err(RenderError::DegenerateViewport { .. })
        ));
        assert!(matches!(
            renderer.resize(&mut ctx, 800, 0),
            Err(RenderError::DegenerateViewport { .. })
        ));

        // The stored projection is untouched and still NaN-free.
        let projection = renderer.projection_matrix().unwrap();
        assert!(projection.to_cols_array().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn compile_failure_propagates_with_diagnostic() {
        let mut ctx = RecordingContext::new();
        ctx.fail_next_compile(PipelineError {
            stage: PipelineStage::Vertex,
            log: "expected ';'".into(),
        });
        let mut renderer = Renderer::new();
        let err = renderer
            .initialize(&mut ctx, 800, 600, std::f32::consts::FRAC_PI_4, 1.0, 10000.0)
            .unwrap_err();
        assert!(err.to_string().contains("expected ';'"));
        assert!(!renderer.is_ready());
    }

    #[test]
    fn empty_scene_clears_and_draws_nothing() {
        let mut ctx = RecordingContext::new();
        let mut renderer = ready_renderer(&mut ctx);
        ctx.take_calls();

        renderer.draw(&mut ctx, &Scene::new()).unwrap();
        assert_eq!(ctx.clear_count(), 1);
        assert_eq!(ctx.draw_count(), 0);
    }

    #[test]
    fn clear_precedes_every_draw() {
        let mut ctx = RecordingContext::new();
        let mut renderer = ready_renderer(&mut ctx);

        let mut scene = Scene::new();
        let mesh = one_triangle();
        scene.push(Renderable::new(mesh.clone(), Transform::new()));
        scene.push(Renderable::new(mesh, Transform::new()));

        ctx.take_calls();
        renderer.draw(&mut ctx, &scene).unwrap();

        let calls = ctx.calls();
        let clear_at = calls
            .iter()
            .position(|c| matches!(c, ContextCall::Clear { .. }))
            .unwrap();
        let first_draw_at = calls
            .iter()
            .position(|c| matches!(c, ContextCall::DrawIndexed { .. }))
            .unwrap();
        assert!(clear_at < first_draw_at);
        assert_eq!(ctx.clear_count(), 1);
        assert_eq!(ctx.draw_count(), 2);
    }

    #[test]
    fn shared_mesh_uploads_once() {
        let mut ctx = RecordingContext::new();
        let mut renderer = ready_renderer(&mut ctx);

        let mesh = one_triangle();
        let mut scene = Scene::new();
        scene.push(Renderable::new(mesh.clone(), Transform::new()));
        scene.push(Renderable::new(mesh, Transform::new()));

        ctx.take_calls();
        renderer.draw(&mut ctx, &scene).unwrap();
        renderer.draw(&mut ctx, &scene).unwrap();

        let uploads = ctx
            .calls()
            .iter()
            .filter(|c| matches!(c, ContextCall::CreateVertexBuffer { .. }))
            .count();
        // One position + one color buffer total, across two renderables
        // and two frames.
        assert_eq!(uploads, 2);
        assert_eq!(ctx.draw_count(), 4);
    }

    #[test]
    fn depth_test_enabled_at_initialize() {
        let mut ctx = RecordingContext::new();
        let _renderer = ready_renderer(&mut ctx);
        assert!(ctx
            .calls()
            .iter()
            .any(|c| matches!(c, ContextCall::SetDepthTest { enabled: true })));
    }

    /// End-to-end: one-triangle scene, quarter of a 5000 ms period, model
    /// matrix equals the initial matrix rotated by pi/2 about the axis.
    #[test]
    fn quarter_period_scene_uploads_rotated_model() {
        let mut ctx = RecordingContext::new();
        let mut renderer = ready_renderer(&mut ctx);

        let translation = Vec3::new(0.0, 0.0, -8.0);
        let mut scene = Scene::new();
        scene.push(Renderable::new(
            one_triangle(),
            Transform::from_translation(translation)
                .with_rule(MotionRule::spin(Vec3::Y, 5000.0).unwrap()),
        ));

        scene.update(1250.0);
        renderer.draw(&mut ctx, &scene).unwrap();

        let (projection, model) = ctx.last_uniforms().unwrap();
        let expected_model = Mat4::from_translation(translation)
            * Mat4::from_axis_angle(Vec3::Y, std::f32::consts::FRAC_PI_2);
        for (got, want) in model
            .to_cols_array()
            .iter()
            .zip(expected_model.to_cols_array().iter())
        {
            assert!((got - want).abs() < TOLERANCE);
        }

        let expected_projection =
            Mat4::perspective_rh(std::f32::consts::FRAC_PI_4, 800.0 / 600.0, 1.0, 10000.0);
        assert_eq!(projection, expected_projection);
    }
}
