//! Admissibility checks that reject successor states before they reach an
//! open heap. All four are conservative: a `true` return means the state can
//! no longer lead to a full-board solution.

use std::collections::HashSet;

use itertools::Itertools;
use strum::VariantArray;
use tracing::trace;

use crate::cell::ColorId;
use crate::direction::Direction;
use crate::location::Location;
use crate::regions::{Label, RegionsMap};
use crate::state::State;

/// Run the four predicates in cheap-to-expensive order. `player` is the color
/// of the agent expanding `state`.
pub(crate) fn should_prune(state: &State, player: ColorId) -> bool {
    if blocked_agent(state, player) {
        trace!(player, "pruned: blocked endpoint");
        return true;
    }
    if dead_end(state) {
        trace!(player, "pruned: dead end");
        return true;
    }
    if stranded_color_or_region(state) {
        trace!(player, "pruned: stranded color or region");
        return true;
    }
    if bottleneck(state, player) {
        trace!(player, "pruned: bottleneck");
        return true;
    }
    false
}

/// Some other unfinished color has an endpoint with no free neighbour left:
/// its flow can never leave (or reach) that square.
pub(crate) fn blocked_agent(state: &State, player: ColorId) -> bool {
    (0..state.num_colors())
        .filter(|color| !state.finished[*color] && *color != player)
        .any(|color| {
            state.num_free_neighbours(state.sources[color]) == 0
                || state.num_free_neighbours(state.targets[color]) == 0
        })
}

/// A free square with at most one free neighbour is unreachable unless the
/// active head or an unfinished color's endpoint borders it.
pub(crate) fn dead_end(state: &State) -> bool {
    for (row, col) in (0..state.size).cartesian_product(0..state.size) {
        let at = Location(row, col);
        if !state.cell(at).is_free() {
            continue;
        }
        if state.num_free_neighbours(at) <= 1
            && !state.is_head_a_neighbour(at)
            && !state.edgepoints_neighbour_didnt_finish(at)
        {
            return true;
        }
    }
    false
}

/// Count the unfinished colors whose origin-adjacent free regions are
/// disjoint from their target-adjacent free regions. With `exclude_player`
/// set (the bottleneck probe) the active player is left out of the tally.
/// Also returns the regions touched by a non-stranded color's endpoints and
/// the full canonical label set.
fn stranded_colors(
    state: &State,
    exclude_player: bool,
) -> (usize, HashSet<Label>, HashSet<Label>) {
    let (regions, labels_set) = RegionsMap::compute(state);
    let mut stranded = 0;
    let mut touched = HashSet::new();

    for color in 0..state.num_colors() {
        if state.finished[color] {
            continue;
        }
        let is_player = state.player() == Some(color);
        if exclude_player && is_player {
            continue;
        }

        // The active player's flow grows from its head; everyone else still
        // starts from their source.
        let origin = match state.head {
            Some(head) if head.color == color => head.at,
            _ => state.sources[color],
        };
        let origin_regions = regions.find_regions(origin);
        let target_regions = regions.find_regions(state.targets[color]);

        if !regions.contains_mutual_area(&origin_regions, &target_regions, color) {
            stranded += 1;
        } else {
            touched.extend(origin_regions);
            touched.extend(target_regions);
        }
    }

    (stranded, touched, labels_set)
}

/// Any stranded color, or any free region no unfinished color's endpoint
/// touches, makes the board unwinnable.
pub(crate) fn stranded_color_or_region(state: &State) -> bool {
    let (stranded, touched, labels_set) = stranded_colors(state, false);
    if stranded > 0 {
        return true;
    }

    labels_set.difference(&touched).next().is_some()
}

/// Probe each cardinal corridor from the head: extend the flow straight along
/// free squares, then count how many other colors the extension strands. A
/// corridor of `L` squares can absorb at most `L - 1` crossing colors.
pub(crate) fn bottleneck(state: &State, color: ColorId) -> bool {
    let Some(head) = state.head else {
        return false;
    };

    for direction in Direction::VARIANTS {
        let mut probe = state.clone();
        let mut free = 1usize;
        while let Some(next) = direction.attempt_ray(head.at, free, state.size) {
            if !probe.cell(next).is_free() || probe.perform_move(next, color).is_none() {
                break;
            }
            free += 1;
        }

        let (stranded, _, _) = stranded_colors(&probe, true);
        if stranded > free - 1 {
            return true;
        }
    }

    false
}
