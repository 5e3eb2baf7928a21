use anyhow::Result;
use clap::Parser;
use polyspin_render::Renderer;
use polyspin_render_wgpu::WgpuContext;
use polyspin_scene::Scene;
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalSize;
use winit::event::WindowEvent;
use winit::event_loop::{ActiveEventLoop, ControlFlow, EventLoop};
use winit::window::{Window, WindowId};

/// Reference projection: 45 degree field of view, near 1, far 10000.
const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
const NEAR: f32 = 1.0;
const FAR: f32 = 10000.0;

#[derive(Parser)]
#[command(name = "polyspin-desktop", about = "Animated polyhedra viewer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Initial window width in pixels
    #[arg(long, default_value = "800")]
    width: u32,

    /// Initial window height in pixels
    #[arg(long, default_value = "600")]
    height: u32,
}

struct App {
    scene: Scene,
    renderer: Renderer,
    window: Option<Arc<Window>>,
    surface: Option<wgpu::Surface<'static>>,
    config: Option<wgpu::SurfaceConfiguration>,
    ctx: Option<WgpuContext>,
    initial_size: PhysicalSize<u32>,
    last_frame: Instant,
}

impl App {
    fn new(scene: Scene, width: u32, height: u32) -> Self {
        Self {
            scene,
            renderer: Renderer::new(),
            window: None,
            surface: None,
            config: None,
            ctx: None,
            initial_size: PhysicalSize::new(width.max(1), height.max(1)),
            last_frame: Instant::now(),
        }
    }
}

impl ApplicationHandler for App {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let attrs = Window::default_attributes()
            .with_title("polyspin")
            .with_inner_size(self.initial_size);
        let window = Arc::new(event_loop.create_window(attrs).expect("create window"));

        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::all(),
            ..Default::default()
        });

        let surface = instance
            .create_surface(window.clone())
            .expect("create surface");

        let adapter = pollster::block_on(instance.request_adapter(&wgpu::RequestAdapterOptions {
            power_preference: wgpu::PowerPreference::HighPerformance,
            compatible_surface: Some(&surface),
            force_fallback_adapter: false,
        }))
        .expect("find adapter");

        let (device, queue) = pollster::block_on(adapter.request_device(
            &wgpu::DeviceDescriptor {
                label: Some("polyspin_device"),
                required_features: wgpu::Features::empty(),
                required_limits: wgpu::Limits::default(),
                memory_hints: Default::default(),
            },
            None,
        ))
        .expect("create device");

        let size = window.inner_size();
        let surface_caps = surface.get_capabilities(&adapter);
        let surface_format = surface_caps
            .formats
            .iter()
            .find(|f| f.is_srgb())
            .copied()
            .unwrap_or(surface_caps.formats[0]);

        let config = wgpu::SurfaceConfiguration {
            usage: wgpu::TextureUsages::RENDER_ATTACHMENT,
            format: surface_format,
            width: size.width.max(1),
            height: size.height.max(1),
            present_mode: wgpu::PresentMode::AutoVsync,
            alpha_mode: surface_caps.alpha_modes[0],
            view_formats: vec![],
            desired_maximum_frame_latency: 2,
        };
        surface.configure(&device, &config);

        let mut ctx = WgpuContext::new(device, queue, surface_format, config.width, config.height);
        self.renderer
            .initialize(&mut ctx, config.width, config.height, FOV_Y, NEAR, FAR)
            .expect("initialize renderer");

        tracing::info!(
            backend = adapter.get_info().backend.to_str(),
            width = config.width,
            height = config.height,
            "GPU initialized"
        );

        self.window = Some(window);
        self.surface = Some(surface);
        self.config = Some(config);
        self.ctx = Some(ctx);
        self.last_frame = Instant::now();
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                event_loop.exit();
            }
            WindowEvent::Resized(new_size) => {
                let (Some(surface), Some(config), Some(ctx)) =
                    (&self.surface, &mut self.config, &mut self.ctx)
                else {
                    return;
                };
                config.width = new_size.width.max(1);
                config.height = new_size.height.max(1);
                surface.configure(ctx.device(), config);
                if let Err(e) = self.renderer.resize(ctx, config.width, config.height) {
                    tracing::error!("resize failed: {e}");
                }
            }
            WindowEvent::RedrawRequested => {
                let now = Instant::now();
                // Clamp the frame delta so a stall does not teleport the scene.
                let dt_ms = (now - self.last_frame).as_secs_f32().min(0.1) * 1000.0;
                self.last_frame = now;
                self.scene.update(dt_ms);

                let (Some(surface), Some(ctx)) = (&self.surface, &mut self.ctx) else {
                    return;
                };

                let output = match surface.get_current_texture() {
                    Ok(t) => t,
                    Err(wgpu::SurfaceError::Lost | wgpu::SurfaceError::Outdated) => {
                        if let Some(config) = &self.config {
                            surface.configure(ctx.device(), config);
                        }
                        return;
                    }
                    Err(e) => {
                        tracing::error!("surface error: {e}");
                        return;
                    }
                };

                let view = output
                    .texture
                    .create_view(&wgpu::TextureViewDescriptor::default());

                if let Err(e) = self.renderer.draw(ctx, &self.scene) {
                    tracing::error!("draw failed: {e}");
                    return;
                }
                ctx.present(&view);
                output.present();

                if let Some(window) = &self.window {
                    window.request_redraw();
                }
            }
            _ => {}
        }
    }

    fn about_to_wait(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    tracing::info!("polyspin-desktop starting");

    let scene = polyspin_assets::demo_scene()?;

    let event_loop = EventLoop::new()?;
    event_loop.set_control_flow(ControlFlow::Poll);

    let mut app = App::new(scene, cli.width, cli.height);
    event_loop.run_app(&mut app)?;

    Ok(())
}
