//! tak-zero: self-play data generation and bot matches for 4x4 Tak.
//!
//! Subcommands:
//! 1. `self-play` writes training records to `out{w}.json` per worker
//! 2. `oppose` plays two evaluators against each other and prints the tally
//! 3. `legal-moves` prints a position and its legal moves

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

use tak_zero::core::GameState;
use tak_zero::mcts::MCTSConfig;
use tak_zero::nn::{Evaluator, HeuristicEvaluator, NetworkEvaluator, UniformNetwork};
use tak_zero::rules::{parse_move, try_apply};
use tak_zero::training::{run_opposition_workers, run_self_play_workers, RecordFormat, SelfPlayConfig};

#[derive(Parser, Debug)]
#[command(name = "tak-zero")]
#[command(about = "4x4 Tak self-play with guided MCTS")]
struct Cli {
    /// Log level (trace, debug, info, warn, error); RUST_LOG overrides it
    #[arg(long, global = true, env = "TAK_LOG_LEVEL", default_value = "info")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate training records by self-play
    SelfPlay(SelfPlayArgs),
    /// Play two bots against each other
    Oppose(OpposeArgs),
    /// Print the position after a move sequence and its legal moves
    LegalMoves(LegalMovesArgs),
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Number of games
    #[arg(long, env = "TAK_GAMES", default_value_t = 1)]
    games: usize,

    /// Simulations per move
    #[arg(long, env = "TAK_SIMULATIONS", default_value_t = 100)]
    simulations: u32,

    /// Worker threads
    #[arg(long, env = "TAK_THREADS", default_value_t = 1)]
    threads: usize,

    /// Base random seed
    #[arg(long, env = "TAK_SEED", default_value_t = 42)]
    seed: u64,

    /// Exploration constant applied to priors
    #[arg(long, env = "TAK_EXPLORATION", default_value_t = 1.0)]
    exploration: f32,

    /// Abandon games longer than this
    #[arg(long, env = "TAK_MAX_PLIES", default_value_t = 500)]
    max_plies: usize,
}

impl SearchArgs {
    fn to_config(&self) -> SelfPlayConfig {
        let mcts = MCTSConfig::default()
            .with_simulations(self.simulations)
            .with_seed(self.seed)
            .with_exploration(self.exploration);
        SelfPlayConfig::new()
            .with_mcts(mcts)
            .with_games(self.games)
            .with_threads(self.threads)
            .with_max_plies(self.max_plies)
    }
}

#[derive(Args, Debug)]
struct SelfPlayArgs {
    #[command(flatten)]
    search: SearchArgs,

    /// Directory for the per-worker record files
    #[arg(long, env = "TAK_OUT_DIR", default_value = "records")]
    out_dir: PathBuf,

    #[arg(long, env = "TAK_FORMAT", value_enum, default_value_t = FormatArg::Json)]
    format: FormatArg,

    #[arg(long, env = "TAK_EVALUATOR", value_enum, default_value_t = EvaluatorKind::Heuristic)]
    evaluator: EvaluatorKind,
}

#[derive(Args, Debug)]
struct OpposeArgs {
    #[command(flatten)]
    search: SearchArgs,

    #[arg(long, env = "TAK_BOT1", value_enum, default_value_t = EvaluatorKind::Heuristic)]
    bot1: EvaluatorKind,

    #[arg(long, env = "TAK_BOT2", value_enum, default_value_t = EvaluatorKind::Uniform)]
    bot2: EvaluatorKind,

    /// Swap which bot moves first every other game
    #[arg(long, env = "TAK_ALTERNATE_COLORS")]
    alternate_colors: bool,
}

#[derive(Args, Debug)]
struct LegalMovesArgs {
    /// Space-separated move text applied from the initial position
    #[arg(long, default_value = "")]
    moves: String,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum EvaluatorKind {
    /// Uniform priors, flat-count value
    Heuristic,
    /// Network baseline with all-zero outputs
    Uniform,
}

impl EvaluatorKind {
    fn build(self) -> Arc<dyn Evaluator> {
        match self {
            EvaluatorKind::Heuristic => Arc::new(HeuristicEvaluator),
            EvaluatorKind::Uniform => Arc::new(NetworkEvaluator::new(UniformNetwork)),
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum FormatArg {
    Json,
    Bincode,
}

impl From<FormatArg> for RecordFormat {
    fn from(arg: FormatArg) -> Self {
        match arg {
            FormatArg::Json => RecordFormat::Json,
            FormatArg::Bincode => RecordFormat::Bincode,
        }
    }
}

fn init_tracing(level: &str) -> Result<()> {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli.log_level)?;

    match cli.command {
        Command::SelfPlay(args) => self_play(args),
        Command::Oppose(args) => oppose(args),
        Command::LegalMoves(args) => print_legal_moves(&args),
    }
}

fn self_play(args: SelfPlayArgs) -> Result<()> {
    let config = args.search.to_config();
    config.validate().context("invalid self-play configuration")?;
    info!(
        games = config.games,
        threads = config.threads,
        simulations = config.mcts.simulations,
        seed = config.mcts.seed,
        out_dir = %args.out_dir.display(),
        "starting self-play"
    );

    let summary = run_self_play_workers(args.evaluator.build(), &config, &args.out_dir, args.format.into())
        .context("self-play run failed")?;
    println!(
        "{} games, {} positions; player 1 won {}, player 2 won {}, {} ties",
        summary.games, summary.positions, summary.wins[0], summary.wins[1], summary.ties
    );
    for file in &summary.files {
        println!("wrote {}", file.display());
    }
    Ok(())
}

fn oppose(args: OpposeArgs) -> Result<()> {
    let config = args.search.to_config().with_alternate_colors(args.alternate_colors);
    config.validate().context("invalid opposition configuration")?;
    info!(
        games = config.games,
        bot1 = ?args.bot1,
        bot2 = ?args.bot2,
        alternate_colors = config.alternate_colors,
        "starting opposition"
    );

    let tally = run_opposition_workers(args.bot1.build(), args.bot2.build(), &config)
        .context("opposition run failed")?;
    println!("{tally}");
    Ok(())
}

fn print_legal_moves(args: &LegalMovesArgs) -> Result<()> {
    let mut state = GameState::new();
    for text in args.moves.split_whitespace() {
        let mv = parse_move(text, &state).with_context(|| format!("cannot read move {text:?}"))?;
        state = try_apply(&state, &mv).with_context(|| format!("cannot play {mv}"))?;
    }

    println!("{state}");
    println!("outcome: {}", state.outcome());
    let moves: Vec<String> = state.legal_moves().iter().map(ToString::to_string).collect();
    println!("{} legal moves: {}", moves.len(), moves.join(" "));
    Ok(())
}
