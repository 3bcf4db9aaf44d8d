//! End-to-end round flows driven tick by tick, without a timer.
//!
//! These tests feed [`RoundState`] directly: ticks via `apply_tick`,
//! inputs via `handle_input`, with seeded RNGs so layouts are
//! reproducible. The victory test plans a route at runtime from the
//! published knight targets and step budgets, so it passes for any seed.

#![allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]

use knightfall_core::round::{ROUND_START, RoundState};
use knightfall_types::{
    Axis, Coords, Direction, GOAL, GRID_SIZE, PlayerInput, RoundOutcome, TickUpdate,
};
use rand::SeedableRng;
use rand::rngs::StdRng;

fn setup(seed: u64) -> RoundState {
    let mut rng = StdRng::seed_from_u64(seed);
    RoundState::setup(1.0, &mut rng)
}

/// Tick until the observed value `v` has been processed, returning the
/// update for that tick.
fn tick_until(state: &mut RoundState, v: u64) -> TickUpdate {
    loop {
        let update = state.apply_tick().unwrap();
        if update.tick >= v {
            return update;
        }
    }
}

fn targets_on(state: &RoundState, axis: Axis) -> Vec<u8> {
    state
        .knight_snapshots()
        .iter()
        .filter(|k| k.axis == axis)
        .filter_map(|k| k.target)
        .collect()
}

fn manhattan(a: Coords, b: Coords) -> u8 {
    a.row.abs_diff(b.row).saturating_add(a.col.abs_diff(b.col))
}

/// Steps from `a` to `b`, vertical moves first, padded with back-and-forth
/// pairs to consume exactly `budget` steps. Requires matching parity.
fn route(a: Coords, b: Coords, budget: u8) -> Vec<Direction> {
    let mut steps = Vec::new();
    for _ in 0..a.row.abs_diff(b.row) {
        steps.push(if b.row < a.row {
            Direction::North
        } else {
            Direction::South
        });
    }
    for _ in 0..a.col.abs_diff(b.col) {
        steps.push(if b.col < a.col {
            Direction::West
        } else {
            Direction::East
        });
    }
    let spare = budget - manhattan(a, b);
    assert_eq!(spare % 2, 0, "budget parity must match distance");
    let (out, back) = if b.row > 0 {
        (Direction::North, Direction::South)
    } else {
        (Direction::South, Direction::North)
    };
    for _ in 0..spare / 2 {
        steps.push(out);
        steps.push(back);
    }
    steps
}

/// Find a starting cell and a first-window destination that dodge every
/// knight and leave the goal reachable with the exact second budget.
fn plan(state: &RoundState) -> (Coords, Coords) {
    let row_targets = targets_on(state, Axis::Row);
    let col_targets = targets_on(state, Axis::Col);
    let budget = state.step_budget();

    for start_row in 0..GRID_SIZE {
        if row_targets.contains(&start_row) {
            continue;
        }
        for start_col in 0..GRID_SIZE {
            let start = Coords::new(start_row, start_col).unwrap();
            // The center cell reads as "never clicked" at the idle check.
            if start == knightfall_types::CENTER {
                continue;
            }
            for mid_col in 0..GRID_SIZE {
                if col_targets.contains(&mid_col) {
                    continue;
                }
                for mid_row in 0..GRID_SIZE {
                    let mid = Coords::new(mid_row, mid_col).unwrap();
                    let first = manhattan(start, mid);
                    let second = manhattan(mid, GOAL);
                    if first <= budget.first
                        && (budget.first - first) % 2 == 0
                        && second <= budget.second
                        && (budget.second - second) % 2 == 0
                    {
                        return (start, mid);
                    }
                }
            }
        }
    }
    panic!("no viable route for this layout");
}

#[test]
fn idle_player_loses_before_knights_arm() {
    let mut state = setup(1);
    let update = tick_until(&mut state, ROUND_START - 2);
    assert_eq!(update.outcome, Some(RoundOutcome::NoStartingPosition));
    assert!(state.is_ended());
    assert!(
        state.knight_snapshots().iter().all(|k| !k.ready),
        "hazards never armed"
    );
}

#[test]
fn planned_route_wins_for_many_seeds() {
    for seed in 0..20 {
        let mut state = setup(seed);
        let (start, mid) = plan(&state);
        let budget = state.step_budget();

        state.apply_tick().unwrap();
        state.handle_input(PlayerInput::Click {
            row: start.row,
            col: start.col,
        });

        // Survive the row sweep; the first window opens on this tick.
        let update = tick_until(&mut state, ROUND_START);
        assert_eq!(update.outcome, None, "seed {seed}: row sweep hit");
        assert!(state.movement_open());

        for direction in route(start, mid, budget.first) {
            state.handle_input(PlayerInput::Step(direction));
        }
        assert_eq!(state.player_snapshot().remaining_steps, 0);

        // Budget check, horizontal arming, column sweep.
        let update = tick_until(&mut state, ROUND_START + 12);
        assert_eq!(update.outcome, None, "seed {seed}: column sweep hit");
        assert_eq!(state.player_snapshot().position, mid);

        // Second window opens at start + 16.
        tick_until(&mut state, ROUND_START + 16);
        assert!(state.movement_open());
        for direction in route(mid, GOAL, budget.second) {
            state.handle_input(PlayerInput::Step(direction));
        }

        let update = tick_until(&mut state, ROUND_START + 25);
        assert_eq!(
            update.outcome,
            Some(RoundOutcome::Victory),
            "seed {seed}: expected a win"
        );
        assert_eq!(state.player_snapshot().position, GOAL);
    }
}

#[test]
fn unspent_first_budget_is_a_loss() {
    let mut state = setup(2);
    let row_targets = targets_on(&state, Axis::Row);
    let safe_row = (0..GRID_SIZE).find(|r| !row_targets.contains(r)).unwrap();

    state.apply_tick().unwrap();
    state.handle_input(PlayerInput::Click {
        row: safe_row,
        col: 0,
    });

    // Survive the sweep, then never move.
    tick_until(&mut state, ROUND_START);
    let update = tick_until(&mut state, ROUND_START + 10);
    assert_eq!(update.outcome, Some(RoundOutcome::StepsNotConsumed));
}

#[test]
fn overspent_budget_is_also_a_loss() {
    let mut state = setup(3);
    let row_targets = targets_on(&state, Axis::Row);
    let safe_row = (0..GRID_SIZE).find(|r| !row_targets.contains(r)).unwrap();

    state.apply_tick().unwrap();
    state.handle_input(PlayerInput::Click {
        row: safe_row,
        col: 2,
    });

    tick_until(&mut state, ROUND_START);
    let budget = state.step_budget();
    // Oscillate one extra pair beyond the budget.
    let overspend = budget.first + 2;
    for i in 0..overspend {
        let direction = if i % 2 == 0 {
            Direction::East
        } else {
            Direction::West
        };
        state.handle_input(PlayerInput::Step(direction));
    }
    assert!(state.player_snapshot().remaining_steps < 0);

    let update = tick_until(&mut state, ROUND_START + 10);
    assert_eq!(update.outcome, Some(RoundOutcome::StepsNotConsumed));
}

#[test]
fn missing_the_goal_is_a_loss_after_exact_budgets() {
    let mut state = setup(4);
    let budget = state.step_budget();

    // Reuse the planner, then sabotage the second window by burning the
    // whole budget in place instead of walking to the goal.
    let (start, mid) = plan(&state);
    state.apply_tick().unwrap();
    state.handle_input(PlayerInput::Click {
        row: start.row,
        col: start.col,
    });

    tick_until(&mut state, ROUND_START);
    for direction in route(start, mid, budget.first) {
        state.handle_input(PlayerInput::Step(direction));
    }

    tick_until(&mut state, ROUND_START + 16);
    let (out, back) = if mid.row > 0 {
        (Direction::North, Direction::South)
    } else {
        (Direction::South, Direction::North)
    };
    // Budgets are even here only half the time; burn floor pairs and, if
    // one step remains, take it. Either way the player cannot be on the
    // goal if `mid` was not one step away, which the assert below checks.
    for i in 0..budget.second {
        state.handle_input(PlayerInput::Step(if i % 2 == 0 { out } else { back }));
    }
    let final_pos = state.player_snapshot().position;
    if final_pos == GOAL {
        // Degenerate layout for this seed; nothing to assert.
        return;
    }

    let update = tick_until(&mut state, ROUND_START + 25);
    assert_eq!(update.outcome, Some(RoundOutcome::GoalNotReached));
}

#[test]
fn skip_jumps_straight_to_the_arming_tick() {
    let mut state = setup(6);
    let row_targets = targets_on(&state, Axis::Row);
    let safe_row = (0..GRID_SIZE).find(|r| !row_targets.contains(r)).unwrap();

    let first = state.apply_tick().unwrap();
    assert_eq!(first.tick, 0);

    state.handle_input(PlayerInput::Click {
        row: safe_row,
        col: 1,
    });
    state.handle_input(PlayerInput::Skip);

    let jumped = state.apply_tick().unwrap();
    assert_eq!(jumped.tick, ROUND_START - 2, "skip lands on the arming tick");
    assert_eq!(jumped.outcome, None);
    assert!(
        state
            .knight_snapshots()
            .iter()
            .filter(|k| k.axis == Axis::Row)
            .all(|k| k.ready),
        "vertical knights armed after the jump"
    );

    // A second skip is a no-op once the hazards are armed.
    state.handle_input(PlayerInput::Skip);
    let next = state.apply_tick().unwrap();
    assert_eq!(next.tick, ROUND_START - 1);
}
