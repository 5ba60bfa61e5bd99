//! Benchmarks uct_rs by just taking the first turn and timing it
use clap::Parser;
use log::error;
use std::fs;
use std::process;
use std::time::Instant;
use uct_rs::games::{Games, TicTacToe};
use uct_rs::mcts::{decide_with_config, Board, MctsConfig};

#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    #[arg(value_enum, default_value_t = Games::TicTacToe)]
    game: Games,
    #[command(flatten)]
    verbose: clap_verbosity_flag::Verbosity,
    #[arg(short, long, default_value_t = 1000)]
    iterations: usize,
    #[arg(short, long, default_value_t = 10)]
    episodes: usize,
    #[arg(short('c'), long, default_value_t = 2.0)]
    exploration_constant: f64,
    #[arg(short, long)]
    seed: Option<u64>,
    /// JSON search configuration; overrides the other search flags
    #[arg(long)]
    config: Option<String>,
}

fn run_benchmark<B: Board>(board: &B, state: &B::State, config: &MctsConfig) -> Option<f64> {
    let start = Instant::now();
    let action = match decide_with_config(board, state, config) {
        Ok(action) => action,
        Err(err) => {
            error!("Search failed: {}", err);
            return None;
        }
    };
    let elapsed = start.elapsed();
    let iterations_per_second = config.iterations as f64 / elapsed.as_secs_f64();
    println!(
        "{:?}: {} iterations in {:.3} seconds ({:.2} iterations per second)",
        action,
        config.iterations,
        elapsed.as_secs_f64(),
        iterations_per_second
    );
    Some(elapsed.as_secs_f64())
}

fn load_config(args: &Args) -> Result<MctsConfig, String> {
    match &args.config {
        Some(path) => {
            let json = fs::read_to_string(path)
                .map_err(|err| format!("Failed to read config file {}: {}", path, err))?;
            MctsConfig::from_json(&json).map_err(|err| err.to_string())
        }
        None => {
            let config = MctsConfig {
                iterations: args.iterations,
                exploration_constant: args.exploration_constant,
                seed: args.seed,
                ..Default::default()
            };
            config.validate().map_err(|err| err.to_string())?;
            Ok(config)
        }
    }
}

fn main() {
    let args = Args::parse();
    env_logger::Builder::new()
        .filter_level(args.verbose.log_level_filter())
        .init();

    let config = match load_config(&args) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("{}", err);
            process::exit(1);
        }
    };

    println!(
        "===\nGame: {:?}, Iterations: {}, Episodes: {}, C: {}",
        args.game, config.iterations, args.episodes, config.exploration_constant
    );
    println!("---");

    let durations: Vec<f64> = (0..args.episodes)
        .filter_map(|_| match args.game {
            Games::TicTacToe => run_benchmark(&TicTacToe, &TicTacToe.initial_state(), &config),
        })
        .collect();
    if durations.is_empty() {
        process::exit(1);
    }
    println!("---");
    println!(
        "Average duration: {:.3} seconds",
        durations.iter().sum::<f64>() / durations.len() as f64
    );
    println!(
        "Average iterations per second: {:.2}",
        (durations.len() * config.iterations) as f64 / durations.iter().sum::<f64>()
    );
}
