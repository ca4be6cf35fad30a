use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use hex_automaton::{LifeRule, MapConfig, Simulation};
use rand::{SeedableRng, rngs::StdRng};
use tracing::info;

/// Step a hexagonal cellular automaton and print the final snapshot as JSON.
#[derive(Parser, Debug)]
#[command(name = "hex_automaton", version)]
struct Args {
    /// Columns of the rectangular starting field
    #[arg(long, default_value_t = 6)]
    columns: i32,
    /// Rows of the rectangular starting field
    #[arg(long, default_value_t = 4)]
    rows: i32,
    /// Generations to advance before printing
    #[arg(short, long, default_value_t = 1)]
    generations: u32,
    /// Seed for the random starting field
    #[arg(long)]
    seed: Option<u64>,
    /// Probability that a starting cell is alive
    #[arg(long, default_value_t = 0.3)]
    alive: f64,
    /// A cell with this many live neighbors or fewer dies
    #[arg(long, default_value_t = 1)]
    lonely: u8,
    /// A cell with this many live neighbors or more dies
    #[arg(long, default_value_t = 4)]
    crowded: u8,
    /// Start from a snapshot file instead of a random field
    #[arg(short, long)]
    load: Option<PathBuf>,
    /// Print the snapshot on a single line
    #[arg(long)]
    compact: bool,
}

fn main() -> Result<()> {
    init_tracing();
    let args = Args::parse();

    let rule = LifeRule::new(args.lonely, args.crowded);
    let mut sim = Simulation::new(MapConfig::default(), rule);

    match &args.load {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading snapshot {}", path.display()))?;
            sim.load_json(&text)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
        }
        None => {
            sim.build_rect(args.columns, args.rows);
            let mut rng = match args.seed {
                Some(seed) => StdRng::seed_from_u64(seed),
                None => StdRng::from_os_rng(),
            };
            sim.randomize(&mut rng, args.alive);
        }
    }

    info!(
        cells = sim.map.len(),
        population = sim.population(),
        rule = %rule.description(),
        "starting"
    );

    for _ in 0..args.generations {
        sim.step()
            .with_context(|| format!("advancing generation {}", sim.generation + 1))?;
    }

    let snapshot = sim.map.to_snapshot();
    let json = if args.compact {
        snapshot.to_json()?
    } else {
        snapshot.to_json_pretty()?
    };
    println!("{json}");

    info!(generation = sim.generation, population = sim.population(), "done");
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .try_init();
}
