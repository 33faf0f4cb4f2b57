//! Self-play data generation and arena matches on tic-tac-toe.
//!
//! ```bash
//! zero selfplay --games 20 --output data/iter0
//! zero arena --games 10 --previous-c-puct 1.0 --current-c-puct 2.0
//! ```
//!
//! Without the `torch` feature every engine uses a uniform oracle.

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use log::info;

use zero_core::{HistoryPlanes, Rules, TicTacToe};
use zero_mcts::{Mcts, MctsConfig, Oracle, UniformOracle};
use zero_selfplay::{
    game_to_training_examples, play_arena, play_game, save_training_data, ArenaConfig,
    SelfPlayConfig,
};

#[derive(Parser, Debug)]
#[command(name = "zero")]
#[command(about = "AlphaZero-style self-play and evaluation")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Play self-play games and save training examples
    Selfplay(SelfplayArgs),
    /// Pit two engines against each other
    Arena(ArenaArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Exploration constant (c_puct)
    #[arg(long, default_value_t = 1.5)]
    c_puct: f32,

    /// Query the oracle through a random board symmetry
    #[arg(long)]
    random_symmetry: bool,

    /// RNG seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,
}

#[derive(Args, Debug)]
struct SelfplayArgs {
    #[arg(long, default_value_t = 10)]
    games: u32,

    /// Simulations for recorded full searches
    #[arg(long, default_value_t = 400)]
    full_sims: u32,

    /// Simulations for fast searches
    #[arg(long, default_value_t = 50)]
    fast_sims: u32,

    /// Chance of a full search on each turn
    #[arg(long, default_value_t = 0.25)]
    full_probability: f32,

    /// Turns before greedy move selection
    #[arg(long, default_value_t = 4)]
    temperature_threshold: u32,

    /// Base path for the NPY output files
    #[arg(short, long, default_value = "selfplay_data")]
    output: String,

    /// TorchScript model used as the oracle
    #[cfg(feature = "torch")]
    #[arg(long)]
    model: Option<String>,

    #[command(flatten)]
    search: SearchArgs,
}

#[derive(Args, Debug)]
struct ArenaArgs {
    #[arg(long, default_value_t = 20)]
    games: u32,

    /// Simulations per move; the search default when omitted
    #[arg(long)]
    sims: Option<u32>,

    #[arg(long, default_value_t = 0.55)]
    acceptance: f32,

    #[arg(long, default_value_t = 1.5)]
    previous_c_puct: f32,

    #[arg(long, default_value_t = 1.5)]
    current_c_puct: f32,

    #[cfg(feature = "torch")]
    #[arg(long)]
    previous_model: Option<String>,

    #[cfg(feature = "torch")]
    #[arg(long)]
    current_model: Option<String>,

    #[arg(long)]
    seed: Option<u64>,
}

/// Either the uniform oracle or a loaded network
enum CliOracle {
    Uniform(UniformOracle),
    #[cfg(feature = "torch")]
    Network(zero_mcts::NetworkOracle<zero_mcts::NnModel>),
}

impl CliOracle {
    fn load(_path: Option<&str>, action_space_size: usize) -> Result<Self> {
        #[cfg(feature = "torch")]
        if let Some(path) = _path {
            let device = tch::Device::cuda_if_available();
            info!("Loading TorchScript model from {path} on {device:?}");
            let model = zero_mcts::NnModel::load(path, device)?;
            return Ok(CliOracle::Network(zero_mcts::NetworkOracle::new(model)));
        }
        Ok(CliOracle::Uniform(UniformOracle::new(action_space_size)))
    }
}

impl Oracle for CliOracle {
    fn evaluate(&self, history: &HistoryPlanes) -> zero_mcts::Result<(Vec<f32>, f32)> {
        match self {
            CliOracle::Uniform(oracle) => oracle.evaluate(history),
            #[cfg(feature = "torch")]
            CliOracle::Network(oracle) => oracle.evaluate(history),
        }
    }
}

fn mcts_config(c_puct: f32, random_symmetry: bool, seed: Option<u64>) -> MctsConfig {
    let config = MctsConfig::default()
        .with_c_puct(c_puct)
        .with_random_symmetry(random_symmetry);
    match seed {
        Some(seed) => config.with_seed(seed),
        None => config,
    }
}

fn run_selfplay(args: SelfplayArgs) -> Result<()> {
    let game = TicTacToe::new();
    #[cfg(feature = "torch")]
    let model = args.model.as_deref();
    #[cfg(not(feature = "torch"))]
    let model = None;
    let oracle = CliOracle::load(model, game.action_space_size())?;

    let mut examples = Vec::new();
    for i in 0..args.games {
        // Distinct but reproducible streams per game
        let seed = args.search.seed.map(|s| s.wrapping_add(u64::from(i)));
        let config = SelfPlayConfig {
            full_search_simulations: args.full_sims,
            fast_search_simulations: args.fast_sims,
            full_search_probability: args.full_probability,
            temperature_threshold: args.temperature_threshold,
            seed,
        };
        let search = mcts_config(args.search.c_puct, args.search.random_symmetry, seed);

        let record = play_game(&game, &oracle, search, &config)?;
        info!(
            "Game {}/{}: {:?} in {} moves",
            i + 1,
            args.games,
            record.winner,
            record.len()
        );
        examples.extend(game_to_training_examples(&game, &record));
    }

    if examples.is_empty() {
        info!("No full searches were played, nothing to save");
        return Ok(());
    }
    save_training_data(&examples, &args.output)
}

fn run_arena(args: ArenaArgs) -> Result<()> {
    let game = TicTacToe::new();
    #[cfg(feature = "torch")]
    let (previous_model, current_model) = (args.previous_model.as_deref(), args.current_model.as_deref());
    #[cfg(not(feature = "torch"))]
    let (previous_model, current_model) = (None, None);

    let previous_oracle = CliOracle::load(previous_model, game.action_space_size())?;
    let current_oracle = CliOracle::load(current_model, game.action_space_size())?;

    let previous_config = mcts_config(args.previous_c_puct, false, args.seed);
    let simulations = args.sims.unwrap_or(previous_config.num_simulations);
    let mut previous = Mcts::new(&game, &previous_oracle, previous_config);
    let mut current = Mcts::new(
        &game,
        &current_oracle,
        mcts_config(args.current_c_puct, false, args.seed.map(|s| s.wrapping_add(1))),
    );

    let config = ArenaConfig {
        num_games: args.games,
        simulations,
        acceptance_threshold: args.acceptance,
    };
    let result = play_arena(&game, &mut previous, &mut current, &config)?;

    let accepted = result.current_wins as f32 >= config.num_games as f32 * config.acceptance_threshold;
    info!(
        "Arena finished after {} games: previous {} / current {} / draws {}, current {}",
        result.games(),
        result.previous_wins,
        result.current_wins,
        result.draws,
        if accepted { "accepted" } else { "rejected" }
    );
    Ok(())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match Cli::parse().command {
        Command::Selfplay(args) => run_selfplay(args),
        Command::Arena(args) => run_arena(args),
    }
}
