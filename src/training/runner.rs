//! Multi-threaded self-play and opposition runs.
//!
//! Games are split as evenly as possible across worker threads. Each worker
//! owns its trees and an RNG forked from the base seed in worker order, so a
//! run is reproducible for a fixed seed and thread count. The evaluator is
//! the only shared value.

use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::core::{GameRng, Player, PlayerMap};
use crate::mcts::SearchStats;
use crate::nn::Evaluator;
use crate::rules::Outcome;

use super::record::{RecordError, RecordFormat, RecordWriter};
use super::self_play::{Opposition, OppositionTally, SelfPlayConfig, SelfPlayError, SelfPlayWorker};

/// Totals for a finished self-play run.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub games: usize,

    /// Positions written across all files.
    pub positions: usize,

    /// Wins by each player, indexed by player number minus one.
    pub wins: [usize; 2],
    pub ties: usize,

    pub files: Vec<PathBuf>,

    /// Search counters summed over every tree in the run.
    pub search: SearchStats,
}

impl RunSummary {
    fn merge(&mut self, other: RunSummary) {
        self.games += other.games;
        self.positions += other.positions;
        self.ties += other.ties;
        for (total, wins) in self.wins.iter_mut().zip(other.wins) {
            *total += wins;
        }
        self.files.extend(other.files);
        self.search.merge(&other.search);
    }
}

/// Games assigned to `worker` when `games` are split across `workers`.
#[must_use]
pub fn worker_share(games: usize, workers: usize, worker: usize) -> usize {
    games / workers + usize::from(worker < games % workers)
}

/// Output file of worker `w`: `out{w}.json` or `out{w}.bin`.
#[must_use]
pub fn worker_output_path(out_dir: &Path, worker: usize, format: RecordFormat) -> PathBuf {
    out_dir.join(format!("out{worker}.{}", format.extension()))
}

/// Play `config.games` self-play games on `config.threads` workers, each
/// writing its records to its own file in `out_dir`.
pub fn run_self_play_workers(
    evaluator: Arc<dyn Evaluator>,
    config: &SelfPlayConfig,
    out_dir: &Path,
    format: RecordFormat,
) -> Result<RunSummary, SelfPlayError> {
    config.validate()?;
    fs::create_dir_all(out_dir).map_err(RecordError::from)?;

    let mut base = GameRng::new(config.mcts.seed);
    let rngs: Vec<GameRng> = (0..config.threads).map(|_| base.fork()).collect();

    let results = thread::scope(|scope| {
        let handles: Vec<_> = rngs
            .into_iter()
            .enumerate()
            .map(|(w, rng)| {
                let evaluator = Arc::clone(&evaluator);
                let games = worker_share(config.games, config.threads, w);
                let path = worker_output_path(out_dir, w, format);
                scope.spawn(move || self_play_worker(evaluator, config, rng, games, path, format))
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(w, handle)| handle.join().unwrap_or(Err(SelfPlayError::WorkerPanicked(w))))
            .collect::<Vec<_>>()
    });

    let mut summary = RunSummary::default();
    for result in results {
        summary.merge(result?);
    }
    info!(
        games = summary.games,
        positions = summary.positions,
        player1_wins = summary.wins[0],
        player2_wins = summary.wins[1],
        ties = summary.ties,
        simulations = summary.search.simulations,
        sims_per_sec = summary.search.simulations_per_second(),
        "self-play run finished"
    );
    Ok(summary)
}

fn self_play_worker(
    evaluator: Arc<dyn Evaluator>,
    config: &SelfPlayConfig,
    rng: GameRng,
    games: usize,
    path: PathBuf,
    format: RecordFormat,
) -> Result<RunSummary, SelfPlayError> {
    let file = File::create(&path).map_err(RecordError::from)?;
    let mut writer = RecordWriter::new(BufWriter::new(file), format);
    let mut worker = SelfPlayWorker::new(evaluator, config.clone())?.with_rng(rng);

    let mut wins = PlayerMap::with_value(0usize);
    let mut ties = 0;
    for _ in 0..games {
        let record = worker.play_game()?;
        match record.outcome {
            Outcome::Player1Win => wins[Player::One] += 1,
            Outcome::Player2Win => wins[Player::Two] += 1,
            Outcome::Tie | Outcome::InProgress => ties += 1,
        }
        writer.write_game(&record)?;
    }

    let positions = writer.positions_written();
    writer.finish()?;
    let search = worker.stats().clone();
    info!(
        path = %path.display(),
        games,
        positions,
        max_depth = search.max_depth,
        "worker finished"
    );
    Ok(RunSummary {
        games,
        positions,
        wins: *wins.as_array(),
        ties,
        files: vec![path],
        search,
    })
}

/// Play `config.games` opposition games on `config.threads` workers and sum
/// the tallies.
pub fn run_opposition_workers(
    bot1: Arc<dyn Evaluator>,
    bot2: Arc<dyn Evaluator>,
    config: &SelfPlayConfig,
) -> Result<OppositionTally, SelfPlayError> {
    config.validate()?;

    let mut base = GameRng::new(config.mcts.seed);
    let rngs: Vec<GameRng> = (0..config.threads).map(|_| base.fork()).collect();

    let results = thread::scope(|scope| {
        let handles: Vec<_> = rngs
            .into_iter()
            .enumerate()
            .map(|(w, rng)| {
                let bot1 = Arc::clone(&bot1);
                let bot2 = Arc::clone(&bot2);
                let games = worker_share(config.games, config.threads, w);
                scope.spawn(move || {
                    Opposition::new(bot1, bot2, config.clone())?
                        .with_rng(rng)
                        .run(games)
                })
            })
            .collect();
        handles
            .into_iter()
            .enumerate()
            .map(|(w, handle)| handle.join().unwrap_or(Err(SelfPlayError::WorkerPanicked(w))))
            .collect::<Vec<_>>()
    });

    let mut tally = OppositionTally::new();
    for result in results {
        tally.merge(&result?);
    }
    info!(
        bot1_wins = tally.bot1_wins,
        bot2_wins = tally.bot2_wins,
        ties = tally.ties,
        games = tally.games,
        "opposition run finished"
    );
    Ok(tally)
}
