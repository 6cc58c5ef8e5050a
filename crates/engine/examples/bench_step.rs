//! Benchmark: sequential vs row-parallel generation step.
//!
//! Steps one seeded grid a fixed number of generations both ways and checks
//! the results match.
//! Run with: `cargo run --release -p life-engine --example bench_step`

use std::time::Instant;

use life_engine::factory;
use life_engine::life;

fn main() {
    let (width, height) = (2048, 2048);
    let generations = 20;

    println!("=== Game of Life: Step Benchmark ===\n");
    println!("  {}x{} grid ({} cells), {} generations\n", width, height, width * height, generations);

    let seed = match factory::seeded_grid(width, height, factory::DEFAULT_ALIVE_RATIO, 1) {
        Ok(grid) => grid,
        Err(e) => {
            eprintln!("  Failed to seed grid: {}", e);
            return;
        }
    };

    // --- Sequential ---
    let t0 = Instant::now();
    let mut seq = seed.clone();
    for _ in 0..generations {
        seq = life::next_generation(&seq);
    }
    let dt_seq = t0.elapsed();
    println!("  Sequential: {:>8.2?} ({:.2?}/gen)", dt_seq, dt_seq / generations);

    // --- Parallel ---
    let t0 = Instant::now();
    let mut par = seed;
    for _ in 0..generations {
        par = life::next_generation_parallel(&par);
    }
    let dt_par = t0.elapsed();
    println!("  Parallel:   {:>8.2?} ({:.2?}/gen)", dt_par, dt_par / generations);

    let speedup = dt_seq.as_secs_f64() / dt_par.as_secs_f64();
    println!("\n  Speedup: {:.2}x", speedup);

    // --- Verify identical ---
    if seq == par {
        println!("  Results identical ({} cells alive).", seq.alive_count());
    } else {
        println!("  MISMATCH between sequential and parallel results!");
        std::process::exit(1);
    }
}
