mod episode;

pub use episode::env::{Environment, Info, Step};
pub use episode::error::PolicyError;
pub use episode::ids::ActionId;
pub use episode::policy::{
    EpsilonGreedyPolicy, choose_action, epsilon_greedy_distribution, greedy_action,
};
pub use episode::rollout::{EpisodeStats, ReturnType, RolloutParams, greedy_rollout, rollout};
