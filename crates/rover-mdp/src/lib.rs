mod action;
mod config;
mod error;
mod io;
mod model;
mod rover;
mod tensor;

pub use action::Action;
pub use config::RoverConfig;
pub use error::MdpError;
pub use io::{load_yaml, rover_from_yaml, save_yaml};
pub use model::{TensorMode, TransitionModel};
pub use rover::MarsRover;
pub use tensor::TransitionTensor;
