//! Lattice Fluid CLI - Run headless simulations from JSON configuration.

use std::fs;
use std::path::PathBuf;
use std::time::Instant;

use lattice_fluid::{
    compute::{Engine, SimulationStats},
    schema::{Seed, SimulationConfig},
};

fn main() {
    env_logger::init();

    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: {} <config.json> [frames]", args[0]);
        eprintln!();
        eprintln!("Run a lattice Boltzmann fluid simulation from JSON configuration.");
        eprintln!();
        eprintln!("Arguments:");
        eprintln!("  config.json  Path to simulation configuration file");
        eprintln!("  frames       Number of frames to simulate (default: 100)");
        eprintln!();
        eprintln!("Example configuration is generated with --example flag.");
        std::process::exit(1);
    }

    if args[1] == "--example" {
        print_example_config();
        return;
    }

    let config_path = PathBuf::from(&args[1]);
    let frames: u64 = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(100);

    let config = SimulationConfig::load(&config_path).unwrap_or_else(|e| {
        eprintln!("Error loading config: {}", e);
        std::process::exit(1);
    });

    // Load seed if present
    let seed_path = config_path.with_extension("seed.json");
    let seed: Seed = if seed_path.exists() {
        let seed_str = fs::read_to_string(&seed_path).unwrap_or_else(|e| {
            eprintln!("Error reading seed file: {}", e);
            std::process::exit(1);
        });
        serde_json::from_str(&seed_str).unwrap_or_else(|e| {
            eprintln!("Error parsing seed: {}", e);
            std::process::exit(1);
        })
    } else {
        log::info!("No seed file at {}, starting at rest", seed_path.display());
        Seed::default()
    };

    let steps = frames * config.sweeps as u64;

    println!("Lattice Fluid Simulation");
    println!("========================");
    println!("Grid: {}x{}", config.width, config.height);
    println!(
        "Viscosity: {} (omega = {:.4})",
        config.viscosity,
        config.omega()
    );
    println!("Frames: {} ({} sweeps each)", frames, config.sweeps);
    println!();

    let mut engine = Engine::from_config(&config).unwrap_or_else(|e| {
        eprintln!("Error creating engine: {}", e);
        std::process::exit(1);
    });
    seed.apply(&mut engine);

    let initial_stats = engine.stats();
    println!("Initial state:");
    print_stats(&initial_stats);
    println!();

    println!("Running simulation...");
    let start = Instant::now();

    for frame in 0..frames {
        engine.run(config.sweeps as u64);

        // Print progress every 10%
        if (frame + 1) % (frames / 10).max(1) == 0 {
            let stats = engine.stats();
            let elapsed = start.elapsed().as_secs_f64();
            println!(
                "  Frame {}/{}: mass={:.6}, velocity=({:.3e}, {:.3e}), {:.1} steps/s",
                frame + 1,
                frames,
                stats.total_mass,
                stats.average_velocity.0,
                stats.average_velocity.1,
                engine.step_count() as f64 / elapsed
            );
            if !stats.is_finite() {
                eprintln!("Simulation became unstable, stopping");
                std::process::exit(2);
            }
        }
    }

    let elapsed = start.elapsed();
    let final_stats = engine.stats();

    println!();
    println!("Final state:");
    print_stats(&final_stats);
    println!();
    println!(
        "Mass conservation: {:.6}%",
        (1.0 - (final_stats.total_mass - initial_stats.total_mass).abs()
            / initial_stats.total_mass)
            * 100.0
    );
    println!(
        "Time: {:.2}s ({:.1} steps/s)",
        elapsed.as_secs_f64(),
        steps as f64 / elapsed.as_secs_f64()
    );
}

fn print_stats(stats: &SimulationStats) {
    println!("  Total mass: {:.6}", stats.total_mass);
    println!(
        "  Average velocity: ({:.6e}, {:.6e})",
        stats.average_velocity.0, stats.average_velocity.1
    );
    println!(
        "  Density range: [{:.6}, {:.6}]",
        stats.min_density, stats.max_density
    );
    println!("  Max speed: {:.6}", stats.max_speed);
}

fn print_example_config() {
    let config = SimulationConfig::default();
    let seed = Seed {
        pattern: lattice_fluid::Pattern::DensityBlock {
            corner: (0.5, 0.5),
            size: 3,
            density: 5.0,
        },
    };

    match (
        serde_json::to_string_pretty(&config),
        serde_json::to_string_pretty(&seed),
    ) {
        (Ok(config), Ok(seed)) => {
            println!("Example configuration (config.json):");
            println!("{}", config);
            println!();
            println!("Example seed (config.seed.json):");
            println!("{}", seed);
        }
        (Err(e), _) | (_, Err(e)) => {
            eprintln!("Error serializing example: {}", e);
            std::process::exit(1);
        }
    }
}
