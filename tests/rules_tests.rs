//! Integration tests for the rules engine, move text and policy table.

use proptest::prelude::*;
use std::collections::HashSet;

use tak_zero::core::{Cell, GameState, Move, Player, MAX_HEIGHT};
use tak_zero::nn::{BoardEncoder, PolicyTable, StateEncoder, POLICY_SIZE};
use tak_zero::rules::{apply_move, legal_moves, outcome, parse_move, road_winner, try_apply, Outcome};

/// Play move text from the initial position.
fn play(moves: &[&str]) -> GameState {
    moves.iter().fold(GameState::new(), |state, text| {
        let mv = parse_move(text, &state).unwrap();
        try_apply(&state, &mv).unwrap()
    })
}

/// Follow `choices` (taken modulo the number of legal moves) until the game ends.
fn reachable(choices: &[usize]) -> GameState {
    let mut state = GameState::new();
    for &choice in choices {
        if outcome(&state).is_terminal() {
            break;
        }
        let moves = legal_moves(&state);
        state = apply_move(&state, &moves[choice % moves.len()]);
    }
    state
}

fn choices() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 0..80)
}

// =============================================================================
// Scenarios
// =============================================================================

#[test]
fn test_initial_position_has_32_moves() {
    let moves = legal_moves(&GameState::new());
    assert_eq!(moves.len(), 32);
    assert!(moves.iter().all(Move::is_placement));
}

#[test]
fn test_column_road_wins() {
    let state = play(&["fa1", "fd1", "fa2", "fd2", "fa3", "fd3"]);
    assert_eq!(outcome(&state), Outcome::InProgress);

    let state = play(&["fa1", "fd1", "fa2", "fd2", "fa3", "fd3", "fa4"]);
    assert_eq!(road_winner(state.board()), Some(Player::One));
    assert_eq!(outcome(&state), Outcome::Player1Win);
}

#[test]
fn test_wall_blocks_road() {
    let state = play(&["fa1", "fd1", "fa2", "fd2", "wa3", "fd3", "fa4"]);
    assert_eq!(road_winner(state.board()), None);
    assert_eq!(outcome(&state), Outcome::InProgress);
}

#[test]
fn test_moves_after_game_end_are_rejected() {
    let state = play(&["fa1", "fd1", "fa2", "fd2", "fa3", "fd3", "fa4"]);
    let mv = Move::PlaceFlat { cell: Cell::new(2, 2) };
    assert!(try_apply(&state, &mv).is_err());
}

#[test]
fn test_stack_move_text() {
    let state = play(&["fb2", "fc2", "mb2d"]);
    let stack = state.board().stack(Cell::new(2, 1));
    assert_eq!(stack.height(), 2);
    assert_eq!(stack.top().map(|p| p.owner), Some(Player::One));
    assert!(state.board().stack(Cell::new(1, 1)).is_empty());
}

#[test]
fn test_bad_move_text() {
    let state = GameState::new();
    assert!(parse_move("", &state).is_err());
    assert!(parse_move("xa1", &state).is_err());
    assert!(parse_move("fe1", &state).is_err());
    assert!(parse_move("ma1d", &state).is_err());
}

// =============================================================================
// Properties over reachable states
// =============================================================================

proptest! {
    #[test]
    fn prop_legal_moves_are_well_formed(choices in choices()) {
        let state = reachable(&choices);
        let board = state.board();
        for mv in legal_moves(&state) {
            match mv {
                Move::PlaceFlat { cell } | Move::PlaceWall { cell } => {
                    prop_assert!(board.stack(cell).is_empty());
                }
                Move::MoveStack { cell, .. } => {
                    prop_assert_eq!(mv.carried(), board.height(cell));
                    prop_assert_eq!(board.top(cell).map(|p| p.owner), Some(state.turn()));
                }
            }
        }
    }

    #[test]
    fn prop_stacks_never_exceed_limit(choices in choices()) {
        let state = reachable(&choices);
        prop_assert!(state.board().tallest() <= MAX_HEIGHT);
    }

    #[test]
    fn prop_apply_is_deterministic(choices in choices()) {
        let state = reachable(&choices);
        for mv in legal_moves(&state) {
            prop_assert_eq!(apply_move(&state, &mv), apply_move(&state, &mv));
        }
    }

    #[test]
    fn prop_in_progress_iff_open(choices in choices()) {
        let state = reachable(&choices);
        let open = !state.board().is_full()
            && road_winner(state.board()).is_none()
            && Player::ALL.iter().all(|&p| state.pieces_remaining(p) > 0);
        prop_assert_eq!(outcome(&state) == Outcome::InProgress, open);
        prop_assert_eq!(outcome(&state), outcome(&state));
    }

    #[test]
    fn prop_policy_indices_unique_and_invertible(choices in choices()) {
        let state = reachable(&choices);
        let moves = legal_moves(&state);
        let mut seen = HashSet::new();
        for mv in &moves {
            let index = PolicyTable::index_of(mv);
            prop_assert!(index < POLICY_SIZE);
            prop_assert!(seen.insert(index));
            prop_assert_eq!(PolicyTable::move_at(index, &state), Some(*mv));
        }
    }

    #[test]
    fn prop_move_text_round_trips(choices in choices()) {
        let state = reachable(&choices);
        for mv in legal_moves(&state) {
            let text = mv.to_string();
            prop_assert_eq!(parse_move(&text, &state).ok(), Some(mv));
        }
    }

    #[test]
    fn prop_encoding_is_relative(choices in choices()) {
        let state = reachable(&choices);
        let encoded = BoardEncoder.encode(&state);
        prop_assert_eq!(encoded.shape.clone(), vec![4, 4, 9]);
        for cell in Cell::all() {
            let top = state.board().top(cell);
            let value = encoded.tensor[BoardEncoder::offset(cell, 0)];
            match top {
                None => prop_assert_eq!(value, 0.0),
                Some(piece) if piece.owner == state.turn() => prop_assert!(value < 0.0),
                Some(_) => prop_assert!(value > 0.0),
            }
        }
    }
}
