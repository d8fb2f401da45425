use anyhow::{Context, Result};
use clap::Parser;
use log::{error, info};
use std::path::{Path, PathBuf};
use std::time::Duration;

use train_sim::protocol::{self, CommandDecoder, UnknownOpcode};
use train_sim::simulation::{SensorLatch, SimConfig, Simulation, TrackGraph, TrackSpec, TrainId};
use train_sim::transport::{self, FakeTransport, Transport};

#[derive(Parser)]
#[command(name = "train_sim")]
#[command(about = "Mock train layout driven by the controller byte protocol")]
struct Cli {
    /// Track description (JSON). Uses the built-in demo loop when omitted
    #[arg(long)]
    track: Option<PathBuf>,

    /// Controller address, e.g. localhost:1230. Runs without one when omitted
    #[arg(long)]
    connect: Option<String>,

    /// Number of frames to run
    #[arg(long, default_value = "1000")]
    frames: u32,

    /// Frame time in seconds
    #[arg(long, default_value_t = 1.0 / 30.0)]
    delta: f64,

    /// Train to put on the track (repeatable)
    #[arg(long = "train", default_values_t = [58u8])]
    trains: Vec<TrainId>,

    /// Seed for reproducible train placement
    #[arg(long)]
    seed: Option<u64>,

    /// Skip unknown command bytes instead of stopping
    #[arg(long)]
    resync: bool,

    /// Keep sensor bits set across polls
    #[arg(long)]
    latch_sensors: bool,

    /// Sleep for the frame time between frames
    #[arg(long)]
    realtime: bool,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        error!("{:#}", e);
        std::process::exit(1);
    }
}

fn load_track(path: Option<&Path>) -> Result<TrackGraph> {
    let spec = match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading track file {}", path.display()))?;
            TrackSpec::from_json(&text)
                .with_context(|| format!("parsing track file {}", path.display()))?
        }
        None => TrackSpec::demo_loop(),
    };
    let track = TrackGraph::load(&spec).context("track description is inconsistent")?;
    Ok(track)
}

fn run(cli: Cli) -> Result<()> {
    let track = load_track(cli.track.as_deref())?;
    let config = SimConfig {
        sensor_latch: if cli.latch_sensors {
            SensorLatch::UntilCleared
        } else {
            SensorLatch::UntilPolled
        },
        ..SimConfig::default()
    };
    let mut sim = match cli.seed {
        Some(seed) => Simulation::new_with_seed(track, config, seed),
        None => Simulation::new(track, config),
    };
    for &id in &cli.trains {
        sim.spawn_train_randomly(id)?;
    }

    let mut transport: Box<dyn Transport> = match &cli.connect {
        Some(addr) => transport::connect(addr)?,
        None => Box::new(FakeTransport::with_handshake()),
    };
    let mut decoder = CommandDecoder::new(if cli.resync {
        UnknownOpcode::SkipByte
    } else {
        UnknownOpcode::Fatal
    });

    let delta = Duration::try_from_secs_f64(cli.delta).context("invalid --delta")?;
    let frames_per_summary = (1.0 / cli.delta).ceil().max(1.0) as u32;

    info!(
        "Running {} frames of {:.3}s with {} train(s)",
        cli.frames,
        cli.delta,
        sim.trains.len()
    );
    sim.log_summary();

    for frame in 1..=cli.frames {
        transport.service()?;
        decoder.feed(&transport.read());
        protocol::pump(&mut decoder, &mut sim, &mut transport)?;

        sim.tick(delta)?;

        if frame % frames_per_summary == 0 {
            sim.log_summary();
        }
        if transport.is_closed() {
            info!("Controller disconnected after {} frames", frame);
            break;
        }
        if cli.realtime {
            std::thread::sleep(delta);
        }
    }
    // Push out any poll replies from the last frame.
    transport.service()?;

    info!("=== SIMULATION COMPLETE ===");
    sim.log_summary();
    Ok(())
}
