use std::collections::{HashMap, HashSet};

use ndarray::Array2;

use crate::cell::ColorId;
use crate::location::Location;
use crate::state::State;

/// Region labels are negative so they can never collide with color ids; free
/// cells get labels counting down from `FIRST_LABEL`.
pub(crate) type Label = i32;

pub(crate) const OCCUPIED: Label = -2;
const FIRST_LABEL: Label = -3;

/// Two-pass connected-component labeling over the free squares of a board.
///
/// Pass 1 sweeps row-major, labeling each free cell from its up and left
/// neighbours and recording label equivalences in `dependencies`, a map from
/// representative label to its equivalence class. Pass 2 rewrites every cell
/// to its representative and collects the canonical label set.
pub(crate) struct RegionsMap<'a> {
    state: &'a State,
    size: usize,
    labels: Array2<Label>,
    dependencies: HashMap<Label, HashSet<Label>>,
}

impl<'a> RegionsMap<'a> {
    pub(crate) fn new(state: &'a State) -> Self {
        let size = state.size;
        Self {
            state,
            size,
            labels: Array2::from_elem((size, size), OCCUPIED),
            dependencies: HashMap::new(),
        }
    }

    /// Convenience: run both passes and return the canonical label set.
    pub(crate) fn compute(state: &'a State) -> (Self, HashSet<Label>) {
        let mut map = Self::new(state);
        map.produce_pass1();
        let labels_set = map.produce_pass2();
        (map, labels_set)
    }

    fn is_free(&self, row: usize, col: usize) -> bool {
        self.state.cell(Location(row, col)).is_free()
    }

    /// First labeling pass. Fills the label matrix and the dependency map.
    pub(crate) fn produce_pass1(&mut self) {
        let mut current_label = FIRST_LABEL;
        // Set when the first row hits an occupied gap, so the next free run
        // takes a fresh label.
        let mut decrease_label = false;

        if self.is_free(0, 0) {
            self.labels[(0, 0)] = current_label;
        }
        for col in 1..self.size {
            if self.is_free(0, col) {
                if decrease_label {
                    current_label -= 1;
                    decrease_label = false;
                }
                self.labels[(0, col)] = current_label;
            } else if !decrease_label {
                decrease_label = true;
            }
        }

        for row in 1..self.size {
            for col in 0..self.size {
                if !self.is_free(row, col) {
                    continue;
                }

                let up = self.labels[(row - 1, col)];
                if col == 0 {
                    if up != OCCUPIED {
                        self.labels[(row, col)] = up;
                    } else {
                        current_label -= 1;
                        self.labels[(row, col)] = current_label;
                    }
                    continue;
                }

                let left = self.labels[(row, col - 1)];
                match (up != OCCUPIED, left != OCCUPIED) {
                    (false, false) => {
                        current_label -= 1;
                        self.labels[(row, col)] = current_label;
                    }
                    (true, false) => self.labels[(row, col)] = up,
                    (false, true) => self.labels[(row, col)] = left,
                    (true, true) => self.record_dependency(row, col, up, left),
                }
            }
        }
    }

    /// Both neighbours are free: the cell takes the larger label and the two
    /// equivalence classes are united in the dependency map.
    fn record_dependency(&mut self, row: usize, col: usize, up: Label, left: Label) {
        if up == left {
            self.labels[(row, col)] = up;
            return;
        }

        let minimum = up.min(left);
        let maximum = up.max(left);
        self.labels[(row, col)] = maximum;

        let head_of_max = match self.find_representative(maximum) {
            Some(head) => head,
            None => {
                self.dependencies.insert(maximum, HashSet::from([maximum]));
                maximum
            }
        };

        match self.find_representative(minimum) {
            None => {
                self.dependencies.get_mut(&head_of_max).unwrap().insert(minimum);
            }
            Some(head_of_min) if head_of_min != head_of_max => {
                let absorbed = self.dependencies.remove(&head_of_min).unwrap();
                self.dependencies.get_mut(&head_of_max).unwrap().extend(absorbed);
            }
            Some(_) => {}
        }
    }

    /// The representative of `item`: itself when it keys a class, otherwise
    /// the key of the class containing it, `None` when unrecorded.
    fn find_representative(&self, item: Label) -> Option<Label> {
        if self.dependencies.contains_key(&item) {
            return Some(item);
        }

        self.dependencies
            .iter()
            .find(|(_, class)| class.contains(&item))
            .map(|(key, _)| *key)
    }

    /// Second pass: rewrite every free cell to its representative label and
    /// collect the set of canonical labels.
    pub(crate) fn produce_pass2(&mut self) -> HashSet<Label> {
        let mut labels_set = HashSet::new();

        for row in 0..self.size {
            for col in 0..self.size {
                let label = self.labels[(row, col)];
                if label == OCCUPIED {
                    continue;
                }

                if !self.dependencies.contains_key(&label) {
                    if let Some(representative) = self.find_representative(label) {
                        self.labels[(row, col)] = representative;
                    }
                }
                labels_set.insert(self.labels[(row, col)]);
            }
        }

        labels_set
    }

    /// The distinct labels of the free squares orthogonally adjacent to `at`.
    pub(crate) fn find_regions(&self, at: Location) -> HashSet<Label> {
        self.state
            .neighbours(at)
            .map(|n| self.labels[n.as_index()])
            .filter(|label| *label != OCCUPIED)
            .collect()
    }

    /// Whether two endpoint-adjacent region sets can meet. A color that just
    /// hit its agent goal trivially connects regardless of the sets.
    pub(crate) fn contains_mutual_area(
        &self,
        regions_a: &HashSet<Label>,
        regions_b: &HashSet<Label>,
        color: ColorId,
    ) -> bool {
        self.state.is_agent_goal_state(color) || !regions_a.is_disjoint(regions_b)
    }
}
