//! Performance benchmark comparing serial and parallel generation stepping

use std::time::Instant;

use anyhow::Result;
use hex_automaton::domain::{ConwayHex, HexMap, LifeRule, MapConfig, Registry};
use rand::{Rng, SeedableRng, rngs::StdRng};

fn random_map(size: i32) -> HexMap {
    let mut rng = StdRng::seed_from_u64(0x4E58);
    let mut map = HexMap::new(MapConfig {
        autodraw: false,
        ..MapConfig::default()
    });
    map.build_rect(size, size, || Box::new(ConwayHex::new(rng.random_bool(0.3))));
    map
}

fn registry() -> Registry {
    let mut registry = Registry::new();
    ConwayHex::register(&mut registry, LifeRule::default());
    registry
}

fn benchmark_serial(size: i32, iterations: u32) -> Result<f64> {
    let registry = registry();
    let mut map = random_map(size);

    let start = Instant::now();
    for _ in 0..iterations {
        let next = map.next_generation()?;
        map.load(&next, &registry)?;
    }
    Ok(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64)
}

fn benchmark_parallel(size: i32, iterations: u32) -> Result<f64> {
    let registry = registry();
    let mut map = random_map(size);

    let start = Instant::now();
    for _ in 0..iterations {
        let next = map.next_generation_parallel()?;
        map.load(&next, &registry)?;
    }
    Ok(start.elapsed().as_secs_f64() * 1000.0 / iterations as f64)
}

fn main() -> Result<()> {
    println!("=== Hex Automaton Stepping Benchmark ===\n");

    let sizes = [6, 16, 32, 64, 128, 256];
    let iterations = 20;

    println!("{:>10} {:>8} {:>12} {:>12} {:>10}", "Size", "Cells", "Serial", "Parallel", "Speedup");
    println!("{:-<56}", "");

    for size in sizes {
        let cells = random_map(size).len();
        let serial_ms = benchmark_serial(size, iterations)?;
        let parallel_ms = benchmark_parallel(size, iterations)?;

        println!(
            "{:>10} {:>8} {:>12.3} {:>12.3} {:>9.1}x",
            format!("{}x{}", size, size),
            cells,
            serial_ms,
            parallel_ms,
            serial_ms / parallel_ms
        );
    }

    Ok(())
}
