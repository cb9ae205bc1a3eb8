pub mod env;
pub mod error;
pub mod ids;
pub mod policy;
pub mod rollout;
