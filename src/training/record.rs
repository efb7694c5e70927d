//! Training records built from a finished game's search tree.
//!
//! After a game ends, the record builder walks from the terminal node's
//! parent back to the root. The terminal node's parent gets the negated
//! terminal value and each earlier position the negation of the one after
//! it, so every value is the final result seen from that position's mover.
//! Each position also stores the visit distribution over its legal moves.
//!
//! Records are written either as one JSON array of positions per file or as
//! a stream of bincode-encoded games. Bincode cannot decode the tagged move
//! objects used in JSON, so the binary form stores moves as policy indices
//! and decodes them against the recorded state.

use std::io::{self, Read, Write};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::{GameState, Move, StateError, StateSnapshot};
use crate::mcts::{MCTSSearch, SearchError};
use crate::nn::{BoardEncoder, EncodedState, PolicyTable, StateEncoder, POLICY_SIZE};
use crate::rules::{legal_moves, Outcome};

/// Errors raised while writing or reading records.
#[derive(Debug, Error)]
pub enum RecordError {
    #[error("record I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("JSON record error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary record error: {0}")]
    Bincode(#[from] bincode::Error),

    #[error("invalid state in record: {0}")]
    State(#[from] StateError),

    #[error("policy index {0} does not name a legal move in its position")]
    UnknownMoveIndex(u16),
}

/// One position of a finished game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PositionRecord {
    pub state: StateSnapshot,

    /// Legal moves in enumeration order.
    pub moves: Vec<Move>,

    /// Visit share of each move, aligned with `moves`.
    pub probabilities: Vec<f32>,

    /// Final result from the perspective of the player to move here.
    pub value: f32,

    /// The move actually played from this position.
    pub played: Move,
}

impl PositionRecord {
    /// Visit share of the move that was played.
    #[must_use]
    pub fn played_probability(&self) -> f32 {
        self.moves
            .iter()
            .position(|m| *m == self.played)
            .map_or(0.0, |i| self.probabilities[i])
    }
}

/// A finished game as training data.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    /// Positions in game order, one per move played.
    pub positions: Vec<PositionRecord>,

    pub outcome: Outcome,

    /// Seed of the tree RNG that played the game.
    pub seed: u64,
}

impl GameRecord {
    /// Build the record from a search whose current node is terminal.
    ///
    /// Fails with [`SearchError::NoLegalMoves`] if the game is not over.
    pub fn from_search(search: &MCTSSearch, seed: u64) -> Result<Self, SearchError> {
        let tree = search.tree();
        let terminal = search.current();
        let final_node = tree.get(terminal);
        let outcome = final_node.outcome().ok_or(SearchError::NoLegalMoves)?;

        let mut positions = Vec::with_capacity(final_node.depth as usize);
        let mut value = -final_node.value;
        let mut child = terminal;
        for id in tree.ancestors(terminal).skip(1) {
            let node = tree.get(id);
            let expansion = node.expansion().ok_or(SearchError::NoVisits)?;
            let played_edge = tree.get(child).parent_edge as usize;
            positions.push(PositionRecord {
                state: node.state.snapshot(),
                moves: expansion.moves.clone(),
                probabilities: search.visit_distribution(id)?,
                value,
                played: expansion.moves[played_edge],
            });
            value = -value;
            child = id;
        }
        positions.reverse();

        Ok(Self {
            positions,
            outcome,
            seed,
        })
    }

    /// Number of recorded positions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    /// Convert to network training samples with dense policy targets.
    pub fn to_training_samples(&self) -> Result<Vec<TrainingSample>, RecordError> {
        self.positions
            .iter()
            .map(|position| {
                let state = GameState::try_from(&position.state)?;
                let mut policy = vec![0.0; POLICY_SIZE];
                for (mv, &p) in position.moves.iter().zip(&position.probabilities) {
                    policy[PolicyTable::index_of(mv)] = p;
                }
                Ok(TrainingSample {
                    board: BoardEncoder.encode(&state),
                    policy,
                    value: position.value,
                })
            })
            .collect()
    }
}

/// A single training sample for neural network training.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TrainingSample {
    /// Encoded board (input features).
    pub board: EncodedState,

    /// Target policy over all [`POLICY_SIZE`] slots.
    pub policy: Vec<f32>,

    /// Target value for the side to move.
    pub value: f32,
}

/// On-disk record format.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecordFormat {
    /// One JSON array of position objects per file.
    #[default]
    Json,
    /// Consecutive bincode-encoded games.
    Bincode,
}

impl RecordFormat {
    /// File extension for this format.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            RecordFormat::Json => "json",
            RecordFormat::Bincode => "bin",
        }
    }
}

/// Compact position used by the binary format.
#[derive(Serialize, Deserialize)]
struct BinaryPosition {
    state: StateSnapshot,
    moves: Vec<u16>,
    probabilities: Vec<f32>,
    value: f32,
    played: u16,
}

impl From<&PositionRecord> for BinaryPosition {
    fn from(position: &PositionRecord) -> Self {
        let index = |mv: &Move| PolicyTable::index_of(mv) as u16;
        Self {
            state: position.state.clone(),
            moves: position.moves.iter().map(index).collect(),
            probabilities: position.probabilities.clone(),
            value: position.value,
            played: index(&position.played),
        }
    }
}

impl TryFrom<BinaryPosition> for PositionRecord {
    type Error = RecordError;

    fn try_from(binary: BinaryPosition) -> Result<Self, Self::Error> {
        let state = GameState::try_from(&binary.state)?;
        let legal = legal_moves(&state);
        let decode = |index: u16| {
            legal
                .iter()
                .find(|mv| PolicyTable::index_of(mv) == usize::from(index))
                .copied()
                .ok_or(RecordError::UnknownMoveIndex(index))
        };
        Ok(Self {
            moves: binary.moves.iter().map(|&i| decode(i)).collect::<Result<_, _>>()?,
            played: decode(binary.played)?,
            state: binary.state,
            probabilities: binary.probabilities,
            value: binary.value,
        })
    }
}

/// Appends game records to a stream.
///
/// Call [`RecordWriter::finish`] to close the JSON array and flush.
pub struct RecordWriter<W: Write> {
    inner: W,
    format: RecordFormat,
    positions_written: usize,
    games_written: usize,
}

impl<W: Write> RecordWriter<W> {
    pub fn new(inner: W, format: RecordFormat) -> Self {
        Self {
            inner,
            format,
            positions_written: 0,
            games_written: 0,
        }
    }

    #[must_use]
    pub fn games_written(&self) -> usize {
        self.games_written
    }

    #[must_use]
    pub fn positions_written(&self) -> usize {
        self.positions_written
    }

    /// Append all positions of one game.
    pub fn write_game(&mut self, game: &GameRecord) -> Result<(), RecordError> {
        match self.format {
            RecordFormat::Json => {
                for position in &game.positions {
                    let separator: &[u8] = if self.positions_written == 0 { b"[" } else { b"," };
                    self.inner.write_all(separator)?;
                    serde_json::to_writer(&mut self.inner, position)?;
                    self.positions_written += 1;
                }
            }
            RecordFormat::Bincode => {
                let binary: Vec<BinaryPosition> = game.positions.iter().map(Into::into).collect();
                bincode::serialize_into(&mut self.inner, &binary)?;
                self.positions_written += binary.len();
            }
        }
        self.games_written += 1;
        Ok(())
    }

    /// Close the stream and return the inner writer.
    pub fn finish(mut self) -> Result<W, RecordError> {
        if self.format == RecordFormat::Json {
            let closing: &[u8] = if self.positions_written == 0 { b"[]" } else { b"]" };
            self.inner.write_all(closing)?;
        }
        self.inner.flush()?;
        Ok(self.inner)
    }
}

/// Read every position from a JSON record file.
pub fn read_json_positions<R: Read>(reader: R) -> Result<Vec<PositionRecord>, RecordError> {
    Ok(serde_json::from_reader(reader)?)
}

/// Read every game's positions from a bincode record stream.
pub fn read_bincode_games<R: Read>(mut reader: R) -> Result<Vec<Vec<PositionRecord>>, RecordError> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;

    let mut games = Vec::new();
    let mut cursor = io::Cursor::new(bytes.as_slice());
    while (cursor.position() as usize) < bytes.len() {
        let binary: Vec<BinaryPosition> = bincode::deserialize_from(&mut cursor)?;
        let positions = binary
            .into_iter()
            .map(PositionRecord::try_from)
            .collect::<Result<Vec<_>, _>>()?;
        games.push(positions);
    }
    Ok(games)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Cell, Direction};
    use crate::rules::apply_move;

    fn sample_position() -> PositionRecord {
        let state = apply_move(&GameState::new(), &Move::PlaceFlat { cell: Cell::new(1, 1) });
        let state = apply_move(&state, &Move::PlaceFlat { cell: Cell::new(2, 1) });
        let moves = legal_moves(&state);
        let played = Move::MoveStack {
            cell: Cell::new(1, 1),
            direction: Direction::East,
            drops: [1, 0, 0],
        };
        assert!(moves.contains(&played));
        let probabilities = vec![1.0 / moves.len() as f32; moves.len()];
        PositionRecord {
            state: state.snapshot(),
            moves,
            probabilities,
            value: -1.0,
            played,
        }
    }

    fn sample_game() -> GameRecord {
        GameRecord {
            positions: vec![sample_position(), sample_position()],
            outcome: Outcome::Player2Win,
            seed: 5,
        }
    }

    #[test]
    fn test_played_probability() {
        let position = sample_position();
        let expected = 1.0 / position.moves.len() as f32;
        assert!((position.played_probability() - expected).abs() < 1e-6);
    }

    #[test]
    fn test_json_writer_emits_one_array() {
        let mut writer = RecordWriter::new(Vec::new(), RecordFormat::Json);
        writer.write_game(&sample_game()).unwrap();
        writer.write_game(&sample_game()).unwrap();
        assert_eq!(writer.games_written(), 2);
        let bytes = writer.finish().unwrap();

        let text = String::from_utf8(bytes.clone()).unwrap();
        assert!(text.starts_with("[{\"state\":"));
        assert!(text.ends_with("}]"));
        assert!(text.contains("\"type\":\"move_stack\""));

        let positions = read_json_positions(bytes.as_slice()).unwrap();
        assert_eq!(positions.len(), 4);
        assert_eq!(positions[0], sample_position());
    }

    #[test]
    fn test_empty_json_file_is_valid() {
        let writer = RecordWriter::new(Vec::new(), RecordFormat::Json);
        let bytes = writer.finish().unwrap();
        assert_eq!(bytes, b"[]");
        assert!(read_json_positions(bytes.as_slice()).unwrap().is_empty());
    }

    #[test]
    fn test_bincode_stream() {
        let mut writer = RecordWriter::new(Vec::new(), RecordFormat::Bincode);
        writer.write_game(&sample_game()).unwrap();
        writer.write_game(&sample_game()).unwrap();
        let bytes = writer.finish().unwrap();

        let games = read_bincode_games(bytes.as_slice()).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[1], sample_game().positions);
    }

    #[test]
    fn test_training_samples() {
        let samples = sample_game().to_training_samples().unwrap();
        assert_eq!(samples.len(), 2);
        let sample = &samples[0];
        assert_eq!(sample.board.shape, vec![4, 4, 9]);
        assert_eq!(sample.policy.len(), POLICY_SIZE);
        assert!((sample.policy.iter().sum::<f32>() - 1.0).abs() < 1e-4);
        assert_eq!(sample.value, -1.0);
    }

    #[test]
    fn test_format_extension() {
        assert_eq!(RecordFormat::Json.extension(), "json");
        assert_eq!(RecordFormat::Bincode.extension(), "bin");
        assert_eq!(RecordFormat::default(), RecordFormat::Json);
    }
}
