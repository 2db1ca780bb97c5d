//! Dungeon layout generator
//!
//! Generates one layout and prints it as an ASCII map or JSON, or generates
//! a batch and reports audit results.

use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;

use mz_cli::{render_ascii, summary};
use mz_core::{ContainerId, MazeConfig, MazeRng, audit_layout, complexity_for_depth, generate_maze};

/// Dungeon layout generator
#[derive(Parser, Debug)]
#[command(name = "mazegen")]
#[command(author, version, about = "Generate a grid-based dungeon layout", long_about = None)]
struct Args {
    /// RNG seed (random if omitted)
    #[arg(short = 's', long = "seed")]
    seed: Option<u64>,

    /// Level depth; derives the complexity multiplier
    #[arg(short = 'd', long = "depth")]
    depth: Option<u32>,

    /// Complexity multiplier (overrides --depth)
    #[arg(short = 'c', long = "complexity")]
    complexity: Option<f32>,

    /// JSON configuration file
    #[arg(long = "config")]
    config: Option<PathBuf>,

    /// Print the layout as JSON instead of a map
    #[arg(long = "json")]
    json: bool,

    /// Generate N layouts from consecutive seeds and audit each
    #[arg(short = 'n', long = "runs")]
    runs: Option<u64>,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose")]
    verbose: bool,
}

fn load_config(args: &Args) -> Result<MazeConfig, Box<dyn Error>> {
    let mut config = match &args.config {
        Some(path) => MazeConfig::load(path)?,
        None => MazeConfig::default(),
    };
    if let Some(depth) = args.depth {
        config.complexity_multiplier = complexity_for_depth(depth);
    }
    if let Some(complexity) = args.complexity {
        config.complexity_multiplier = complexity;
    }
    Ok(config)
}

fn run_single(config: &MazeConfig, seed: u64, json: bool) -> Result<(), Box<dyn Error>> {
    let mut rng = MazeRng::new(seed);
    let layout = generate_maze(config, ContainerId(0), &mut rng)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&layout)?);
        return Ok(());
    }
    print!("{}", render_ascii(&layout));
    println!();
    print!("{}", summary(&layout));
    for violation in audit_layout(&layout) {
        println!("violation: {violation}");
    }
    Ok(())
}

/// Returns the number of runs with at least one violation
fn run_batch(config: &MazeConfig, first_seed: u64, runs: u64) -> Result<u64, Box<dyn Error>> {
    let (mut failed, mut fallbacks, mut rooms, mut loops) = (0u64, 0u64, 0usize, 0usize);
    for i in 0..runs {
        let seed = first_seed.wrapping_add(i);
        let layout = generate_maze(config, ContainerId(i), &mut MazeRng::new(seed))?;
        let violations = audit_layout(&layout);
        rooms += layout.graph.len();
        loops += layout.graph.loop_count();
        if layout.diagnostics.used_fallback {
            fallbacks += 1;
        }
        if violations.is_empty() {
            log::debug!("seed {seed}: ok, {} rooms", layout.graph.len());
        } else {
            failed += 1;
            println!("seed {seed}: {} violation(s)", violations.len());
            for violation in &violations {
                println!("  {violation}");
            }
        }
    }
    let runs_f = runs.max(1) as f64;
    println!(
        "{runs} runs: {failed} with violations, {fallbacks} fallbacks, \
         {:.1} rooms and {:.1} loops on average",
        rooms as f64 / runs_f,
        loops as f64 / runs_f
    );
    Ok(failed)
}

fn main() -> ExitCode {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("mazegen: {e}");
            return ExitCode::from(2);
        }
    };
    let seed = args.seed.unwrap_or_else(|| MazeRng::from_entropy().seed());

    let result = match args.runs {
        Some(runs) => run_batch(&config, seed, runs).map(|failed| failed == 0),
        None => run_single(&config, seed, args.json).map(|()| true),
    };
    match result {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("mazegen: {e}");
            ExitCode::from(2)
        }
    }
}
