use std::fs::File;
use std::path::PathBuf;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;

use tree3d::app::{Options, TerminalApp};
use tree3d::{Config, PixelBuffer, ProceduralSprites, Simulation};

/// Frames rendered in headless mode when no limit is given
const DEFAULT_HEADLESS_FRAMES: u64 = 240;

#[derive(Parser, Debug)]
#[command(name = "tree3d")]
#[command(about = "A 3D particle tree in your terminal. Double-click or press space to blow it up.")]
#[command(version)]
struct Cli {
    #[command(flatten)]
    config: Config,

    /// Target frames per second
    #[arg(long, default_value_t = 60)]
    fps: u32,

    /// Virtual pixels per terminal half-cell (higher is sharper and slower)
    #[arg(long, default_value_t = 4)]
    supersample: usize,

    /// Exit after this many frames
    #[arg(long)]
    frames: Option<u64>,

    /// Detonate automatically on this frame
    #[arg(long)]
    detonate_at: Option<u64>,

    /// Render off-screen instead of to the terminal and print timings
    #[arg(long)]
    headless: bool,

    /// Off-screen surface width
    #[arg(long, default_value_t = 800, requires = "headless")]
    width: usize,

    /// Off-screen surface height
    #[arg(long, default_value_t = 600, requires = "headless")]
    height: usize,

    /// Write log output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,

    /// Verbosity level (can be repeated for more detail)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(cli: &Cli) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if cli.verbose > 0 {
        builder.filter_level(match cli.verbose {
            1 => log::LevelFilter::Info,
            2 => log::LevelFilter::Debug,
            _ => log::LevelFilter::Trace,
        });
    } else if cli.quiet {
        builder.filter_level(log::LevelFilter::Error);
    }
    if let Some(path) = &cli.log_file {
        let file = File::create(path)
            .with_context(|| format!("cannot create log file {}", path.display()))?;
        builder.target(env_logger::Target::Pipe(Box::new(file)));
    }
    builder.init();
    Ok(())
}

fn run_headless(mut sim: Simulation, cli: &Cli) {
    let frames = cli.frames.unwrap_or(DEFAULT_HEADLESS_FRAMES);
    let dt = 1.0 / f64::from(cli.fps.max(1));
    let mut buffer = PixelBuffer::new(cli.width, cli.height);
    let mut visible = 0;
    let start = Instant::now();
    for _ in 0..frames {
        if cli.detonate_at == Some(sim.frame()) {
            sim.detonate();
        }
        sim.advance_frame(dt);
        visible = sim.render(&mut buffer);
    }
    let elapsed = start.elapsed().as_secs_f64();
    let per_frame = if frames > 0 {
        elapsed * 1000.0 / frames as f64
    } else {
        0.0
    };
    println!("Frames rendered: {frames}");
    println!("Surface: {}x{}", cli.width, cli.height);
    println!("Average frame time: {per_frame:.2} ms");
    println!("Visible sprites (last frame): {visible}");
    println!(
        "Explosion: {}",
        if sim.explosion().is_active() {
            format!("active, frame {}", sim.explosion().time())
        } else {
            "idle".to_string()
        }
    );
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    log::info!("starting {} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));

    let sprites = ProceduralSprites::new();
    let sim = Simulation::new(cli.config.clone(), &sprites).context("failed to set up the scene")?;

    if cli.headless {
        run_headless(sim, &cli);
        return Ok(());
    }

    let options = Options {
        fps: cli.fps,
        supersample: cli.supersample,
        frames: cli.frames,
        detonate_at: cli.detonate_at,
    };
    TerminalApp::new(sim, options).run()
}
