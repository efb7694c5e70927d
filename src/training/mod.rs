//! Self-play, opposition and training-record output.
//!
//! ## Overview
//!
//! - **SelfPlayWorker**: plays games with one tree and returns `GameRecord`s
//! - **Opposition**: pits two evaluators against each other
//! - **RecordWriter**: writes records as JSON arrays or bincode
//! - **runner**: splits a run across worker threads
//!
//! ## Usage
//!
//! ```rust,no_run
//! use std::path::Path;
//! use std::sync::Arc;
//! use tak_zero::nn::HeuristicEvaluator;
//! use tak_zero::training::{run_self_play_workers, RecordFormat, SelfPlayConfig};
//!
//! let config = SelfPlayConfig::default()
//!     .with_games(8)
//!     .with_threads(4)
//!     .with_simulations(200);
//!
//! let summary = run_self_play_workers(
//!     Arc::new(HeuristicEvaluator),
//!     &config,
//!     Path::new("records"),
//!     RecordFormat::Json,
//! )
//! .unwrap();
//! println!("{} positions written", summary.positions);
//! ```

pub mod record;
pub mod runner;
pub mod self_play;

pub use record::{
    read_bincode_games, read_json_positions, GameRecord, PositionRecord, RecordError, RecordFormat,
    RecordWriter, TrainingSample,
};
pub use runner::{run_opposition_workers, run_self_play_workers, worker_output_path, worker_share, RunSummary};
pub use self_play::{Opposition, OppositionTally, SelfPlayConfig, SelfPlayError, SelfPlayWorker};
