#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use unordered_pair::UnorderedPair;

    use crate::agent::OpenEntry;
    use crate::builder::BoardBuilder;
    use crate::coordinator::Coordinator;
    use crate::error::{BoardError, SolveError};
    use crate::location::Location;
    use crate::prune;
    use crate::regions::RegionsMap;
    use crate::state::State;

    fn state_from(rows: &[&str]) -> State {
        BoardBuilder::from_rows(rows).build().unwrap()
    }

    /// Walk `color`'s cells from its source; the flow is complete when the
    /// connected same-colored component contains a neighbour of the target.
    fn flow_connects(board: &State, color: usize) -> bool {
        let (source, target) = board.endpoints(color);
        let mut visited = HashSet::from([source]);
        let mut frontier = vec![source];

        while let Some(at) = frontier.pop() {
            if at.is_orthogonal_neighbour(target) {
                return true;
            }
            for row_offset in [-1isize, 1] {
                let next = at.offset_by((row_offset, 0));
                if next.0 < board.size()
                    && board.color_at(next) == Some(color)
                    && visited.insert(next)
                {
                    frontier.push(next);
                }
            }
            for col_offset in [-1isize, 1] {
                let next = at.offset_by((0, col_offset));
                if next.1 < board.size()
                    && board.color_at(next) == Some(color)
                    && visited.insert(next)
                {
                    frontier.push(next);
                }
            }
        }

        false
    }

    fn assert_solved(board: &State) {
        assert_eq!(board.remaining_free(), 0, "goal board has free squares:\n{board}");
        for color in 0..board.num_colors() {
            assert!(board.is_finished(color), "color {color} unfinished:\n{board}");
            assert!(flow_connects(board, color), "color {color} disconnected:\n{board}");
        }
    }

    #[test]
    fn construct_board() {
        let mut builder = BoardBuilder::with_size(3);
        builder.add_termini('A', UnorderedPair(Location(0, 0), Location(2, 2)));
        builder.add_termini('B', UnorderedPair(Location(1, 0), Location(1, 2)));
        let state = builder.build().unwrap();
        assert_eq!(state.to_string(), "A..\nB.B\n..A\n");
        assert_eq!(state.num_colors(), 2);
        assert_eq!(state.remaining_free(), 5);
    }

    #[test]
    fn termini_out_of_bounds() {
        let mut builder = BoardBuilder::with_size(3);
        builder.add_termini('A', UnorderedPair(Location(0, 0), Location(5, 5)));
        assert!(builder.is_valid().is_some());
        assert!(matches!(builder.build(), Err(BoardError::OutOfBounds { .. })));
    }

    #[test]
    fn rows_not_square() {
        let result = BoardBuilder::from_rows(&["AB", "A"]).build();
        assert!(matches!(result, Err(BoardError::NotSquare { row: 1, len: 1, expected: 2 })));
    }

    #[test]
    fn endpoint_char_must_appear_twice() {
        let result = BoardBuilder::from_rows(&["RGR", "...", "RGR"]).build();
        assert!(matches!(
            result,
            Err(BoardError::UnpairedEndpoint { display: 'R', count: 4 })
        ));
    }

    #[test]
    fn endpoint_swap_rule() {
        // A's first occurrence is already on the edge; B's second is closer
        // than its first and the pair must swap.
        let state = state_from(&["....A", ".....", "..A..", "..B..", "B...."]);
        assert_eq!(state.endpoints(0), (Location(0, 4), Location(2, 2)));
        assert_eq!(state.endpoints(1), (Location(4, 0), Location(3, 2)));

        // Idempotence: the chosen source is never farther from an edge than
        // the target, so re-applying the rule would change nothing.
        for color in 0..state.num_colors() {
            let (source, target) = state.endpoints(color);
            assert!(
                source.min_edge_distance(state.size()) <= target.min_edge_distance(state.size())
            );
        }
    }

    #[test]
    fn free_cell_count_tracks_moves() {
        let mut state = state_from(&["....A", ".....", "..A..", "..B..", "B...."]);
        assert_eq!(state.remaining_free(), 25 - 4);

        let source = state.endpoints(0).0;
        state.set_head(source);
        assert_eq!(state.player(), Some(0));

        state.perform_move(Location(1, 4), 0).unwrap();
        assert_eq!(state.remaining_free(), 20);
        let free = state.board.iter().filter(|cell| cell.is_free()).count();
        assert_eq!(state.h, free);
    }

    #[test]
    fn illegal_moves_are_rejected() {
        let mut state = state_from(&["A..", "...", "..A"]);
        state.set_head(Location(0, 0));

        // out of bounds, occupied, and not adjacent to any of A's cells
        assert!(state.perform_move(Location(3, 0), 0).is_none());
        assert!(state.perform_move(Location(2, 2), 0).is_none());
        assert!(state.perform_move(Location(0, 2), 0).is_none());
        assert_eq!(state.remaining_free(), 7);
        assert_eq!(state.g, 0);
    }

    #[test]
    fn chosen_move_increments_g() {
        let mut state = state_from(&["A..", "...", "..A"]);
        state.set_head(Location(0, 0));

        let outcome = state.perform_move(Location(0, 1), 0).unwrap();
        assert!(!outcome.forced);
        assert_eq!(state.g, 1);
    }

    #[test]
    fn goal_reaching_move_is_forced() {
        let mut state = state_from(&["A.", ".A"]);
        state.set_head(Location(0, 0));

        let outcome = state.perform_move(Location(0, 1), 0).unwrap();
        assert!(outcome.forced);
        assert_eq!(state.g, 0);
        assert!(state.is_agent_goal_state(0));
    }

    #[test]
    fn possible_moves_from_head() {
        let mut state = state_from(&["A..", "...", "..A"]);
        state.set_head(Location(0, 0));
        assert_eq!(state.possible_moves(), vec![Location(1, 0), Location(0, 1)]);
    }

    #[test]
    fn unfinished_endpoint_neighbours() {
        let mut state = state_from(&["A..", "...", "..A"]);
        assert!(state.edgepoints_neighbour_didnt_finish(Location(0, 1)));
        state.finished[0] = true;
        assert!(!state.edgepoints_neighbour_didnt_finish(Location(0, 1)));
    }

    #[test]
    fn labeling_splits_walled_regions() {
        // The A column plus B's corner wall off the left side from the right.
        let state = state_from(&[".A.", ".A.", ".BB"]);
        let (map, labels) = RegionsMap::compute(&state);
        assert_eq!(labels.len(), 2);

        // The occupied cell at (1, 1) touches both regions.
        let adjacent = map.find_regions(Location(1, 1));
        assert_eq!(adjacent.len(), 2);
    }

    #[test]
    fn labeling_unites_around_a_bend() {
        // Free cells form a U around the A pair; the two arms only meet in
        // the bottom row, so pass 1 must record a dependency between them.
        let state = state_from(&[".A.", ".A.", "..."]);
        let (_, labels) = RegionsMap::compute(&state);
        assert_eq!(labels.len(), 1);
    }

    #[test]
    fn blocked_endpoint_detected() {
        let state = state_from(&["AB..", "B...", "....", "...A"]);
        // B's endpoints wall off A's source corner entirely.
        assert!(prune::blocked_agent(&state, 1));
        assert!(!prune::blocked_agent(&state, 0));
    }

    #[test]
    fn dead_end_detected() {
        let mut state = state_from(&["A.A", ".B.", "..B"]);
        // (0, 1) has no free neighbour but borders unfinished endpoints.
        assert!(!prune::dead_end(&state));

        state.finished[0] = true;
        state.finished[1] = true;
        assert!(prune::dead_end(&state));
    }

    #[test]
    fn stranded_color_detected() {
        let mut state = state_from(&["A...", "....", "....", "...A"]);
        state.set_head(Location(0, 0));
        for location in [
            Location(1, 0),
            Location(1, 1),
            Location(1, 2),
            Location(1, 3),
            Location(0, 3),
        ] {
            state.perform_move(location, 0).unwrap();
        }

        // The flow sealed a two-cell pocket in the top row: the head's free
        // region no longer meets the target's.
        assert!(prune::stranded_color_or_region(&state));
    }

    #[test]
    fn bottleneck_detected() {
        let mut state = state_from(&["A..B", "....", "....", "A..B"]);
        state.set_head(Location(0, 0));
        for location in [
            Location(1, 0),
            Location(1, 1),
            Location(1, 2),
            Location(1, 3),
        ] {
            state.perform_move(location, 0).unwrap();
        }

        // Probing up from the head hits B's terminus immediately (a corridor
        // of length one) while the wall strands B entirely.
        assert!(prune::bottleneck(&state, 0));
    }

    #[test]
    fn clean_successor_passes_all_predicates() {
        let mut state = state_from(&["A..A", "B..B", "C...", "C..."]);
        state.set_head(Location(0, 0));
        state.perform_move(Location(0, 1), 0).unwrap();
        assert!(!prune::should_prune(&state, 0));
    }

    #[test]
    fn heap_pops_are_deterministic() {
        let template = state_from(&["A.", ".A"]);
        let mut heap = std::collections::BinaryHeap::new();
        for (f, seq) in [(5, 1), (5, 0), (3, 2)] {
            heap.push(OpenEntry { f, seq, state: template.clone() });
        }

        let order: Vec<(usize, u64)> =
            std::iter::from_fn(|| heap.pop().map(|e| (e.f, e.seq))).collect();
        assert_eq!(order, vec![(3, 2), (5, 0), (5, 1)]);
    }

    #[test]
    fn handoff_rehoming_preserves_the_board() {
        let state = state_from(&["A..A", "B..B", "C...", "C..."]);
        let mut handoff = state.clone();
        handoff.set_head(state.endpoints(1).0);

        assert_eq!(handoff.player(), Some(1));
        assert_eq!(handoff.remaining_free(), state.remaining_free());
        assert!(handoff.same_board(&state));
    }

    #[test]
    fn solve_three_color_rows() {
        let initial = state_from(&["A..A", "B..B", "C...", "C..."]);
        let report = Coordinator::new(initial).solve().unwrap();
        assert_solved(&report.board);
        assert!(report.total_expanded() > 0);
    }

    #[test]
    fn solve_flow_free_classic_level_1() {
        let initial = state_from(&["A.B.D", "..C.E", ".....", ".B.D.", ".ACE."]);
        let report = Coordinator::new(initial).solve().unwrap();
        assert_solved(&report.board);
    }

    #[test]
    fn zero_colors_is_trivially_solved() {
        let initial = state_from(&["."]);
        let report = Coordinator::new(initial).solve().unwrap();
        assert_eq!(report.expanded.len(), 0);
    }

    #[test]
    fn adjacent_endpoints_cannot_fill_the_board() {
        // The search starts at its goal, so the branch that would have
        // covered the second row is never opened; the board cannot fill.
        let initial = state_from(&["RR", ".."]);
        assert_eq!(Coordinator::new(initial).solve().unwrap_err(), SolveError::Unsolvable);
    }

    #[test]
    fn crossing_pairs_are_unsolvable() {
        let initial = state_from(&["R.G", "...", "G.R"]);
        assert_eq!(Coordinator::new(initial).solve().unwrap_err(), SolveError::Unsolvable);
    }

    #[test]
    fn blocked_start_is_unsolvable() {
        let initial = state_from(&["AB..", "B...", "....", "...A"]);
        assert_eq!(Coordinator::new(initial).solve().unwrap_err(), SolveError::Unsolvable);
    }

    #[test]
    fn interrupted_solve_reports_it() {
        let initial = state_from(&["A.B.D", "..C.E", ".....", ".B.D.", ".ACE."]);
        let coordinator = Coordinator::new(initial);
        coordinator.shutdown_handle().shutdown();
        // Workers observe the shutdown at the top of their loop and exit; a
        // racing solution may still win, which is also a valid outcome.
        match coordinator.solve() {
            Ok(report) => assert_solved(&report.board),
            Err(error) => assert_eq!(error, SolveError::Interrupted),
        }
    }
}
