/// Index of an action as chosen by a policy.
///
/// Policies hand these back to [`rollout`](crate::rollout), which checks them
/// against the environment's action count before stepping.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct ActionId(usize);

impl ActionId {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl From<usize> for ActionId {
    fn from(index: usize) -> Self {
        ActionId(index)
    }
}
