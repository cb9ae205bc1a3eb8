use std::collections::BTreeMap;

/// Auxiliary key/value data returned next to observations.
pub type Info = BTreeMap<String, String>;

/// Outcome of one `Environment::step` call.
#[derive(Debug, Clone, PartialEq)]
pub struct Step<O> {
    pub observation: O,
    pub reward: f64,
    /// The episode reached an absorbing state.
    pub terminated: bool,
    /// The episode hit its step limit.
    pub truncated: bool,
    pub info: Info,
}

impl<O> Step<O> {
    /// Whether the caller should reset before stepping again.
    pub fn is_done(&self) -> bool {
        self.terminated || self.truncated
    }
}

/// Reset/step contract shared by every environment a learner can drive.
///
/// Episodes are delimited by the caller: `reset` may be called at any time and
/// starts a new one, `step` advances the current one by a single action.
pub trait Environment {
    type Observation: Clone;
    type Error;

    /// Start a new episode and return the initial observation.
    fn reset(&mut self, seed: Option<u64>, options: Option<&Info>) -> (Self::Observation, Info);

    /// Apply a raw action and return the resulting transition.
    fn step(&mut self, action: usize) -> Result<Step<Self::Observation>, Self::Error>;

    /// Number of discrete actions accepted by `step`.
    fn action_count(&self) -> usize;
}
