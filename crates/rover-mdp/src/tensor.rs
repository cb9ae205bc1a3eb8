use crate::Action;

/// Dense `|S| x |A| x |S|` array of transition probabilities.
///
/// `get(s, a, s_next)` is the probability of landing in `s_next` after
/// requesting action `a` in state `s`.
#[derive(Debug, Clone, PartialEq)]
pub struct TransitionTensor {
    states: usize,
    data: Vec<f64>,
}

impl TransitionTensor {
    pub(crate) fn zeros(states: usize) -> Self {
        Self {
            states,
            data: vec![0.0; states * Action::COUNT * states],
        }
    }

    fn offset(&self, state: usize, action: Action) -> usize {
        (state * Action::COUNT + action.index()) * self.states
    }

    pub(crate) fn add(&mut self, state: usize, action: Action, next: usize, probability: f64) {
        let idx = self.offset(state, action) + next;
        self.data[idx] += probability;
    }

    /// Number of states along the first and last axis.
    pub fn state_count(&self) -> usize {
        self.states
    }

    /// Probability of `state --action--> next`, `None` when out of bounds.
    pub fn get(&self, state: usize, action: usize, next: usize) -> Option<f64> {
        self.row(state, action)?.get(next).copied()
    }

    /// Distribution over next states for one `(state, action)` pair.
    pub fn row(&self, state: usize, action: usize) -> Option<&[f64]> {
        let action = Action::try_from(action).ok()?;
        if state >= self.states {
            return None;
        }
        let start = self.offset(state, action);
        Some(&self.data[start..start + self.states])
    }

    /// Nested `[s][a][s_next]` copy of the tensor.
    pub fn to_nested(&self) -> Vec<Vec<Vec<f64>>> {
        (0..self.states)
            .map(|s| {
                Action::ALL
                    .iter()
                    .map(|a| self.data[self.offset(s, *a)..self.offset(s, *a) + self.states].to_vec())
                    .collect()
            })
            .collect()
    }
}
