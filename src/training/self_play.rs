//! Self-play and opposition games.
//!
//! A [`SelfPlayWorker`] plays games with a single tree that follows the
//! real game, then turns the finished tree into a [`GameRecord`].
//! An [`Opposition`] steps two independently owned trees, one per bot,
//! and applies every chosen move to both.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info};

use crate::core::{GameRng, GameState, Player};
use crate::mcts::{ConfigError, MCTSConfig, MCTSSearch, SearchError, SearchStats};
use crate::nn::Evaluator;
use crate::rules::Outcome;

use super::record::{GameRecord, RecordError};

/// Errors raised while playing games.
#[derive(Debug, Error)]
pub enum SelfPlayError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("search failed: {0}")]
    Search(#[from] SearchError),

    #[error("record output failed: {0}")]
    Record(#[from] RecordError),

    #[error("game exceeded {limit} plies")]
    PlyLimit { limit: usize },

    #[error("worker {0} panicked")]
    WorkerPanicked(usize),
}

/// Configuration for self-play and opposition runs.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SelfPlayConfig {
    /// Search parameters shared by every tree. `mcts.seed` is the base seed.
    pub mcts: MCTSConfig,

    /// Total games to play.
    pub games: usize,

    /// Worker threads the games are split across.
    pub threads: usize,

    /// Abandon a game that runs longer than this.
    pub max_plies: usize,

    /// In opposition runs, swap which bot moves first every other game.
    pub alternate_colors: bool,
}

impl Default for SelfPlayConfig {
    fn default() -> Self {
        Self {
            mcts: MCTSConfig::default(),
            games: 1,
            threads: 1,
            max_plies: 500,
            alternate_colors: false,
        }
    }
}

impl SelfPlayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_mcts(mut self, mcts: MCTSConfig) -> Self {
        self.mcts = mcts;
        self
    }

    /// Set simulations per move.
    pub fn with_simulations(mut self, simulations: u32) -> Self {
        self.mcts.simulations = simulations;
        self
    }

    /// Set the base seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.mcts.seed = seed;
        self
    }

    pub fn with_games(mut self, games: usize) -> Self {
        self.games = games;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads;
        self
    }

    /// Set maximum plies per game.
    pub fn with_max_plies(mut self, max: usize) -> Self {
        self.max_plies = max;
        self
    }

    pub fn with_alternate_colors(mut self, alternate: bool) -> Self {
        self.alternate_colors = alternate;
        self
    }

    /// Reject settings no run can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.mcts.validate()?;
        if self.games == 0 {
            return Err(ConfigError::ZeroGames);
        }
        if self.threads == 0 {
            return Err(ConfigError::ZeroThreads);
        }
        Ok(())
    }
}

/// Plays self-play games and builds their training records.
pub struct SelfPlayWorker {
    evaluator: Arc<dyn Evaluator>,
    config: SelfPlayConfig,

    /// Base stream; every game forks its own tree RNG from it.
    rng: GameRng,

    /// Search counters summed over every game played.
    stats: SearchStats,
}

impl SelfPlayWorker {
    pub fn new(evaluator: Arc<dyn Evaluator>, config: SelfPlayConfig) -> Result<Self, SelfPlayError> {
        config.validate()?;
        Ok(Self {
            rng: GameRng::new(config.mcts.seed),
            stats: SearchStats::new(),
            evaluator,
            config,
        })
    }

    /// Replace the base RNG, e.g. with one forked per worker thread.
    #[must_use]
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    #[must_use]
    pub fn config(&self) -> &SelfPlayConfig {
        &self.config
    }

    #[must_use]
    pub fn stats(&self) -> &SearchStats {
        &self.stats
    }

    /// Play one game from the initial position.
    pub fn play_game(&mut self) -> Result<GameRecord, SelfPlayError> {
        self.play_game_from(GameState::new())
    }

    /// Play one game from `state` with a fresh tree.
    pub fn play_game_from(&mut self, state: GameState) -> Result<GameRecord, SelfPlayError> {
        let tree_rng = self.rng.fork();
        let seed = tree_rng.seed();
        let mut search = MCTSSearch::new(state, Arc::clone(&self.evaluator), self.config.mcts.clone())?
            .with_rng(tree_rng);

        let mut plies = 0;
        while !search.is_terminal() {
            if plies >= self.config.max_plies {
                return Err(SelfPlayError::PlyLimit {
                    limit: self.config.max_plies,
                });
            }
            let mv = search.choose_move(self.config.mcts.simulations)?;
            search.advance(&mv)?;
            plies += 1;
            debug!(ply = plies, "position:\n{}", search.state());
        }

        let record = GameRecord::from_search(&search, seed)?;
        self.stats.merge(search.stats());
        info!(
            seed,
            plies,
            outcome = %record.outcome,
            nodes = search.tree().len(),
            "self-play game finished"
        );
        Ok(record)
    }

    /// Play `count` games in sequence.
    pub fn play_games(&mut self, count: usize) -> Result<Vec<GameRecord>, SelfPlayError> {
        (0..count).map(|_| self.play_game()).collect()
    }
}

/// Win counts for two bots over a series of games.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OppositionTally {
    pub bot1_wins: usize,
    pub bot2_wins: usize,
    pub ties: usize,
    pub games: usize,
}

impl OppositionTally {
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one finished game. `bot1_player` is the side bot 1 played.
    pub fn record(&mut self, outcome: Outcome, bot1_player: Player) {
        match outcome.winner() {
            Some(winner) if winner == bot1_player => self.bot1_wins += 1,
            Some(_) => self.bot2_wins += 1,
            None => self.ties += 1,
        }
        self.games += 1;
    }

    pub fn merge(&mut self, other: &OppositionTally) {
        self.bot1_wins += other.bot1_wins;
        self.bot2_wins += other.bot2_wins;
        self.ties += other.ties;
        self.games += other.games;
    }
}

impl std::fmt::Display for OppositionTally {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "bot 1 won {}, bot 2 won {}, {} ties over {} games",
            self.bot1_wins, self.bot2_wins, self.ties, self.games
        )
    }
}

/// Plays two bots against each other, each with its own tree.
pub struct Opposition {
    bot1: Arc<dyn Evaluator>,
    bot2: Arc<dyn Evaluator>,
    config: SelfPlayConfig,
    rng: GameRng,
    games_played: usize,
}

impl Opposition {
    pub fn new(
        bot1: Arc<dyn Evaluator>,
        bot2: Arc<dyn Evaluator>,
        config: SelfPlayConfig,
    ) -> Result<Self, SelfPlayError> {
        config.validate()?;
        Ok(Self {
            rng: GameRng::new(config.mcts.seed),
            bot1,
            bot2,
            config,
            games_played: 0,
        })
    }

    #[must_use]
    pub fn with_rng(mut self, rng: GameRng) -> Self {
        self.rng = rng;
        self
    }

    /// Play one game. Bot 1 plays player 1 unless `bot1_first` is false.
    pub fn play(&mut self, bot1_first: bool) -> Result<Outcome, SelfPlayError> {
        let mcts = &self.config.mcts;
        let mut bots = [
            MCTSSearch::new(GameState::new(), Arc::clone(&self.bot1), mcts.clone())?
                .with_rng(self.rng.fork()),
            MCTSSearch::new(GameState::new(), Arc::clone(&self.bot2), mcts.clone())?
                .with_rng(self.rng.fork()),
        ];
        let bot1_player = if bot1_first { Player::One } else { Player::Two };

        let mut plies = 0;
        while !bots[0].is_terminal() {
            if plies >= self.config.max_plies {
                return Err(SelfPlayError::PlyLimit {
                    limit: self.config.max_plies,
                });
            }
            let mover = if bots[0].state().turn() == bot1_player { 0 } else { 1 };
            let mv = bots[mover].choose_move(mcts.simulations)?;
            for bot in &mut bots {
                bot.advance(&mv)?;
            }
            plies += 1;
        }

        let outcome = bots[0].outcome().ok_or(SearchError::NoLegalMoves)?;
        self.games_played += 1;
        info!(
            game = self.games_played,
            plies,
            bot1 = %bot1_player,
            %outcome,
            "opposition game finished"
        );
        Ok(outcome)
    }

    /// Play `count` games and tally the results per bot.
    pub fn run(&mut self, count: usize) -> Result<OppositionTally, SelfPlayError> {
        let mut tally = OppositionTally::new();
        for game in 0..count {
            let bot1_first = !(self.config.alternate_colors && game % 2 == 1);
            let outcome = self.play(bot1_first)?;
            let bot1_player = if bot1_first { Player::One } else { Player::Two };
            tally.record(outcome, bot1_player);
        }
        Ok(tally)
    }
}
