use anyhow::Result;
use clap::{Parser, Subcommand};
use polyspin_render::{ContextCall, RecordingContext, Renderer};
use tracing_subscriber::EnvFilter;

const FOV_Y: f32 = std::f32::consts::FRAC_PI_4;
const NEAR: f32 = 1.0;
const FAR: f32 = 10000.0;

#[derive(Parser)]
#[command(name = "polyspin-cli", about = "Headless tools for the polyspin renderer")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print version information for every workspace crate
    Info,
    /// Replay the demo scene against the recording backend and check
    /// that two identical runs produce identical call logs
    Run {
        /// Number of frames to simulate
        #[arg(long, default_value = "120")]
        frames: u32,

        /// Fixed timestep per frame, in milliseconds
        #[arg(long, default_value = "16.0")]
        dt_ms: f32,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Command::Info => info(),
        Command::Run { frames, dt_ms } => run(frames, dt_ms),
    }
}

fn info() -> Result<()> {
    println!("{}", polyspin_scene::crate_info());
    println!("{}", polyspin_render::crate_info());
    println!("{}", polyspin_render_wgpu::crate_info());
    println!("{}", polyspin_assets::crate_info());
    Ok(())
}

/// One full headless pass: build the demo scene, initialize a renderer on a
/// fixed viewport, step the scene at a fixed timestep, and collect the call
/// log of every frame.
fn replay(frames: u32, dt_ms: f32) -> Result<Vec<ContextCall>> {
    let mut scene = polyspin_assets::demo_scene()?;
    let mut ctx = RecordingContext::new();
    let mut renderer = Renderer::new();
    renderer.initialize(&mut ctx, 800, 600, FOV_Y, NEAR, FAR)?;

    let mut log = ctx.take_calls();
    for _ in 0..frames {
        scene.update(dt_ms);
        renderer.draw(&mut ctx, &scene)?;
        log.append(&mut ctx.take_calls());
    }
    Ok(log)
}

fn run(frames: u32, dt_ms: f32) -> Result<()> {
    tracing::info!(frames, dt_ms, "replaying demo scene");

    let first = replay(frames, dt_ms)?;
    let second = replay(frames, dt_ms)?;

    let draws = first
        .iter()
        .filter(|c| matches!(c, ContextCall::DrawIndexed { .. }))
        .count();
    let clears = first
        .iter()
        .filter(|c| matches!(c, ContextCall::Clear { .. }))
        .count();

    println!("Frames:     {frames}");
    println!("Calls:      {}", first.len());
    println!("Clears:     {clears}");
    println!("Draw calls: {draws}");
    println!(
        "Match:      {}",
        if first == second { "OK" } else { "MISMATCH" }
    );

    if first != second {
        anyhow::bail!("replay diverged between identical runs");
    }
    Ok(())
}
