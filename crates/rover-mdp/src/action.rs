use crate::MdpError;

/// The two moves available to the rover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Left = 0,
    Right = 1,
}

impl Action {
    /// Both actions in index order.
    pub const ALL: [Action; 2] = [Action::Left, Action::Right];

    /// Number of actions.
    pub const COUNT: usize = 2;

    pub fn index(self) -> usize {
        self as usize
    }

    /// Position delta applied by this move.
    pub fn delta(self) -> isize {
        match self {
            Action::Left => -1,
            Action::Right => 1,
        }
    }

    /// The opposite move, substituted when the rover slips.
    pub fn flipped(self) -> Self {
        match self {
            Action::Left => Action::Right,
            Action::Right => Action::Left,
        }
    }
}

impl TryFrom<usize> for Action {
    type Error = MdpError;

    fn try_from(action: usize) -> Result<Self, Self::Error> {
        match action {
            0 => Ok(Action::Left),
            1 => Ok(Action::Right),
            _ => Err(MdpError::InvalidAction {
                action: action as i128,
            }),
        }
    }
}

impl TryFrom<i64> for Action {
    type Error = MdpError;

    /// Signed entry point for callers that may hand over negative actions.
    fn try_from(action: i64) -> Result<Self, Self::Error> {
        usize::try_from(action)
            .map_err(|_| MdpError::InvalidAction {
                action: action.into(),
            })
            .and_then(Action::try_from)
    }
}
