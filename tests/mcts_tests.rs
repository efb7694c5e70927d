//! MCTS integration tests.

use std::sync::Arc;

use tak_zero::core::{Cell, GameState, Move};
use tak_zero::mcts::{MCTSConfig, MCTSSearch, SearchError};
use tak_zero::nn::{Evaluator, HeuristicEvaluator, NetworkEvaluator, UniformNetwork};
use tak_zero::rules::{apply_move, legal_moves, parse_move, Outcome};

fn heuristic() -> Arc<dyn Evaluator> {
    Arc::new(HeuristicEvaluator)
}

fn search_from(state: GameState, seed: u64) -> MCTSSearch {
    MCTSSearch::new(state, heuristic(), MCTSConfig::default().with_seed(seed)).unwrap()
}

fn play(moves: &[&str]) -> GameState {
    moves.iter().fold(GameState::new(), |state, text| {
        let mv = parse_move(text, &state).unwrap();
        apply_move(&state, &mv)
    })
}

// =============================================================================
// Basic Search Tests
// =============================================================================

#[test]
fn test_choose_move_returns_legal_move() {
    let mut search = search_from(GameState::new(), 1);
    let mv = search.choose_move(50).unwrap();
    assert!(legal_moves(&GameState::new()).contains(&mv));
}

#[test]
fn test_minimum_simulations() {
    let mut search = search_from(GameState::new(), 1);
    assert!(search.choose_move(2).is_ok());
}

#[test]
fn test_child_visits_count_descending_simulations() {
    // The first simulation expands the root; every later one visits a child.
    let mut search = search_from(GameState::new(), 3);
    search.choose_move(40).unwrap();
    let tree = search.tree();
    let expansion = search.current_node().expansion().unwrap();
    let visits: u32 = expansion.children.iter().map(|&c| tree.get(c).visits).sum();
    assert_eq!(visits, 39);
    assert_eq!(search.stats().simulations, 40);
}

#[test]
fn test_distribution_over_legal_moves() {
    let state = play(&["fb2", "fc3", "fb3"]);
    let mut search = search_from(state.clone(), 5);
    search.choose_move(64).unwrap();

    let expansion = search.current_node().expansion().unwrap();
    assert_eq!(expansion.moves, legal_moves(&state));

    let probabilities = search.visit_distribution(search.current()).unwrap();
    assert_eq!(probabilities.len(), expansion.moves.len());
    assert!((probabilities.iter().sum::<f32>() - 1.0).abs() < 1e-5);
}

#[test]
fn test_unvisited_node_has_no_distribution() {
    let search = search_from(GameState::new(), 1);
    assert!(matches!(
        search.visit_distribution(search.current()),
        Err(SearchError::NoVisits)
    ));
}

#[test]
fn test_takes_immediate_road() {
    // Player 1 to move with a1, a2, a3 placed; a4 completes the road.
    let state = play(&["fa1", "fd1", "fa2", "fd2", "fa3", "fd3"]);
    let mut search = search_from(state, 9);
    let mv = search.choose_move(400).unwrap();
    assert_eq!(mv, Move::PlaceFlat { cell: Cell::new(0, 3) });
}

// =============================================================================
// Tree Reuse Tests
// =============================================================================

#[test]
fn test_advance_matches_rules() {
    let mut search = search_from(GameState::new(), 2);
    let mv = search.choose_move(30).unwrap();
    let before = search.state().clone();
    search.advance(&mv).unwrap();
    assert_eq!(*search.state(), apply_move(&before, &mv));
}

#[test]
fn test_advance_into_unsearched_node() {
    let mut search = search_from(GameState::new(), 2);
    let mv = Move::PlaceWall { cell: Cell::new(3, 3) };
    search.advance(&mv).unwrap();
    assert_eq!(*search.state(), apply_move(&GameState::new(), &mv));

    let reply = Move::PlaceFlat { cell: Cell::new(0, 0) };
    search.advance(&reply).unwrap();
    assert_eq!(search.current_node().depth, 2);
}

#[test]
fn test_tree_grows_across_moves() {
    let mut search = search_from(GameState::new(), 4);
    let mv = search.choose_move(50).unwrap();
    let after_first = search.tree().len();
    search.advance(&mv).unwrap();
    search.choose_move(50).unwrap();
    assert!(search.tree().len() > after_first);
    assert_eq!(search.tree().ancestors(search.current()).count(), 2);
}

#[test]
fn test_advance_rejects_illegal_move() {
    let mut search = search_from(play(&["fa1"]), 4);
    let mv = Move::PlaceFlat { cell: Cell::new(0, 0) };
    assert!(matches!(search.advance(&mv), Err(SearchError::UnknownMove(_))));
}

#[test]
fn test_terminal_position_has_no_move() {
    let state = play(&["fa1", "fd1", "fa2", "fd2", "fa3", "fd3", "fa4"]);
    let mut search = search_from(state, 4);
    assert!(search.is_terminal());
    assert_eq!(search.outcome(), Some(Outcome::Player1Win));
    assert!(matches!(search.choose_move(10), Err(SearchError::NoLegalMoves)));
}

// =============================================================================
// Determinism Tests
// =============================================================================

#[test]
fn test_deterministic_with_seed() {
    let run = |seed| {
        let mut search = search_from(GameState::new(), seed);
        let mut moves = Vec::new();
        for _ in 0..4 {
            let mv = search.choose_move(30).unwrap();
            search.advance(&mv).unwrap();
            moves.push(mv);
        }
        moves
    };
    assert_eq!(run(77), run(77));
}

#[test]
fn test_network_evaluator_search() {
    let evaluator: Arc<dyn Evaluator> = Arc::new(NetworkEvaluator::new(UniformNetwork));
    let mut search = MCTSSearch::new(GameState::new(), evaluator, MCTSConfig::default()).unwrap();
    let mv = search.choose_move(20).unwrap();
    assert!(mv.is_placement());
}
