use std::path::{Path, PathBuf};

use anyhow::Context;
use boxworld_common::BodyIndex;
use boxworld_kernel::{Scene, World};
use boxworld_persist::{load_snapshot, save_snapshot, Snapshot, SnapshotStore};
use boxworld_render::{AsciiRenderer, DebugTextRenderer, Renderer};
use boxworld_tools::WorldInspector;
use clap::{Parser, Subcommand};
use glam::DVec2;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "boxworld-cli", about = "Headless driver for the boxworld simulator")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Print the built-in demo scene as YAML
    Scene,
    /// Step a scene and render frames
    Run {
        /// YAML scene file; the built-in demo scene when omitted
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Number of ticks to simulate
        #[arg(short, long, default_value = "120")]
        ticks: u64,
        /// Render a frame every N ticks (0 renders only the final frame)
        #[arg(short, long, default_value = "0")]
        every: u64,
        /// World units per character cell
        #[arg(long, default_value = "20")]
        scale: f64,
        /// Print a body listing instead of a character raster
        #[arg(long)]
        text: bool,
        /// Save a snapshot of the final state to this file
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Check that identical runs and event replay agree bit for bit
    Replay {
        #[arg(short, long)]
        scene: Option<PathBuf>,
        #[arg(short, long, default_value = "600")]
        ticks: u64,
    },
    /// Demonstrate snapshot, divergence and rollback
    Snapshot {
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Ticks to run before the snapshot
        #[arg(short, long, default_value = "60")]
        ticks: u64,
    },
    /// Continue a saved snapshot file
    Resume {
        /// Snapshot file written by `run --save`
        path: PathBuf,
        #[arg(short, long, default_value = "60")]
        ticks: u64,
    },
    /// Print per-body details
    Inspect {
        #[arg(short, long)]
        scene: Option<PathBuf>,
        /// Ticks to run before inspecting
        #[arg(short, long, default_value = "0")]
        ticks: u64,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    match cli.command {
        Commands::Info => {
            println!("boxworld-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: default gravity={}", World::DEFAULT_GRAVITY);
            println!("render: {}", boxworld_render::crate_info());
            println!("persist: {}", boxworld_persist::crate_info());
            println!("tools: {}", boxworld_tools::crate_info());
        }
        Commands::Scene => {
            print!("{}", Scene::demo().to_yaml_string()?);
        }
        Commands::Run {
            scene,
            ticks,
            every,
            scale,
            text,
            save,
        } => {
            anyhow::ensure!(scale > 0.0, "--scale must be positive, got {scale}");
            let mut world = build_world(scene.as_deref())?;
            let render = |world: &World| {
                if text {
                    print!("{}", DebugTextRenderer::new().render(world));
                } else {
                    println!("--- tick {} ---", world.tick());
                    print!("{}", AsciiRenderer::new(scale).render(world).to_ascii());
                }
            };

            let mut last_rendered = None;
            for _ in 0..ticks {
                world.step();
                if every > 0 && world.tick() % every == 0 {
                    render(&world);
                    last_rendered = Some(world.tick());
                }
            }
            if last_rendered != Some(world.tick()) {
                render(&world);
            }
            println!("{}", WorldInspector::summary(&world));

            if let Some(path) = save {
                save_snapshot(&path, &Snapshot::capture(&world))
                    .with_context(|| format!("saving snapshot to {}", path.display()))?;
                println!("Saved snapshot to {}", path.display());
            }
        }
        Commands::Replay { scene, ticks } => {
            println!("Deterministic replay: ticks={ticks}");

            let mut w1 = build_world(scene.as_deref())?;
            let mut w2 = build_world(scene.as_deref())?;
            for _ in 0..ticks {
                w1.step();
                w2.step();
            }
            let replayed = World::replay(w1.bounds(), w1.gravity(), w1.events());

            println!("Run 1:  tick={}, hash={:#018x}", w1.tick(), w1.state_hash());
            println!("Run 2:  tick={}, hash={:#018x}", w2.tick(), w2.state_hash());
            println!(
                "Replay: tick={}, hash={:#018x}",
                replayed.tick(),
                replayed.state_hash()
            );
            let ok = w1.state_hash() == w2.state_hash()
                && w1.state_hash() == replayed.state_hash()
                && w1.bodies() == replayed.bodies();
            println!("Match: {}", if ok { "OK" } else { "MISMATCH" });
            anyhow::ensure!(ok, "runs diverged");
        }
        Commands::Snapshot { scene, ticks } => {
            let mut world = build_world(scene.as_deref())?;
            for _ in 0..ticks {
                world.step();
            }

            let mut store = SnapshotStore::new();
            let idx = store.take_snapshot(&mut world);
            if let Some(snap) = store.snapshot(idx) {
                println!(
                    "Snapshot: tick={}, bodies={}, hash={}, valid={}",
                    snap.tick,
                    snap.bodies.len(),
                    snap.hash,
                    snap.verify()
                );
            }

            // Diverge, then roll back.
            push_first_body(&mut world)?;
            for _ in 0..ticks {
                world.step();
            }
            store.flush_events(&mut world);
            println!(
                "After divergence: tick={}, hash={:#018x}",
                world.tick(),
                world.state_hash()
            );

            let rolled_back = store.rollback(idx)?;
            println!(
                "After rollback: tick={}, hash={:#018x}",
                rolled_back.tick(),
                rolled_back.state_hash()
            );
            let replayed = store.replay_from(idx)?;
            println!(
                "Replayed log: tick={}, matches current={}",
                replayed.tick(),
                replayed.state_hash() == world.state_hash()
            );
        }
        Commands::Resume { path, ticks } => {
            let snap = load_snapshot(&path)
                .with_context(|| format!("loading snapshot from {}", path.display()))?;
            info!(tick = snap.tick, "resuming");
            let mut world = snap.restore();
            for _ in 0..ticks {
                world.step();
            }
            print!("{}", DebugTextRenderer::new().render(&world));
            println!("{}", WorldInspector::summary(&world));
        }
        Commands::Inspect { scene, ticks } => {
            let mut world = build_world(scene.as_deref())?;
            for _ in 0..ticks {
                world.step();
            }
            println!("{}", WorldInspector::summary(&world));
            for index in WorldInspector::list_bodies(&world) {
                if let Some(body) = WorldInspector::inspect_body(&world, index) {
                    println!("  {body}");
                }
            }
        }
    }

    Ok(())
}

fn build_world(scene: Option<&Path>) -> anyhow::Result<World> {
    let scene = match scene {
        Some(path) => {
            Scene::load(path).with_context(|| format!("loading scene {}", path.display()))?
        }
        None => Scene::demo(),
    };
    info!(bodies = scene.bodies.len(), gravity = scene.gravity, "scene loaded");
    Ok(scene.build_world()?)
}

/// Kick body #0 upward. Fails on an empty world instead of silently doing nothing.
fn push_first_body(world: &mut World) -> anyhow::Result<()> {
    anyhow::ensure!(
        world.apply_force(BodyIndex(0), DVec2::new(0.0, -50.0)),
        "scene has no bodies to push"
    );
    Ok(())
}
