#![allow(unsafe_op_in_unsafe_fn)]

use std::cell::RefCell;

use ::rover_core::{
    EpsilonGreedyPolicy, Info, PolicyError, choose_action, epsilon_greedy_distribution,
};
use ::rover_mdp::{Action, MarsRover, MdpError, RoverConfig, TensorMode, rover_from_yaml};
use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;
use pyo3::types::{IntoPyDict, PyDict};

fn mdp_err_to_py(err: MdpError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

fn policy_err_to_py(err: PolicyError) -> PyErr {
    PyValueError::new_err(err.to_string())
}

/// Stringify a Python options dict into an `Info` map.
fn info_from_dict(dict: &Bound<'_, PyDict>) -> PyResult<Info> {
    let mut info = Info::new();
    for (key, value) in dict.iter() {
        info.insert(key.str()?.to_string(), value.str()?.to_string());
    }
    Ok(info)
}

#[pyclass(name = "MarsRover", module = "rover.env")]
/// MarsRover(transition_probabilities=None, rewards=None, horizon=10, seed=None, start=2)
/// --
///
/// Rover on a 1-D track with slippery moves.
///
/// Actions are `0` (left) and `1` (right). Each requested move is executed
/// with probability `transition_probabilities[pos][action]`, otherwise the
/// opposite move is taken. Rewards are paid for the arrival position and
/// episodes are truncated after `horizon` steps.
pub struct PyMarsRover {
    inner: RefCell<MarsRover>,
}

#[pymethods]
impl PyMarsRover {
    #[new]
    #[pyo3(signature = (transition_probabilities=None, rewards=None, horizon=10, seed=None, start=2))]
    fn new(
        transition_probabilities: Option<Vec<[f64; 2]>>,
        rewards: Option<Vec<f64>>,
        horizon: usize,
        seed: Option<u64>,
        start: usize,
    ) -> PyResult<Self> {
        let defaults = RoverConfig::default();
        let config = RoverConfig {
            transition_probabilities: transition_probabilities
                .unwrap_or(defaults.transition_probabilities),
            rewards: rewards.unwrap_or(defaults.rewards),
            horizon,
            start,
            seed,
            tensor_mode: defaults.tensor_mode,
        };
        let rover = config.build().map_err(mdp_err_to_py)?;
        Ok(Self {
            inner: RefCell::new(rover),
        })
    }

    /// from_yaml(path, /)
    /// --
    ///
    /// Build a rover from a YAML config file.
    ///
    /// Raises:
    ///     ValueError: If the file cannot be read or the config is invalid.
    #[staticmethod]
    #[pyo3(text_signature = "(path, /)")]
    fn from_yaml(path: &str) -> PyResult<Self> {
        let rover = rover_from_yaml(path).map_err(mdp_err_to_py)?;
        Ok(Self {
            inner: RefCell::new(rover),
        })
    }

    /// reset($self, *, seed=None, options=None)
    /// --
    ///
    /// Start a new episode. `seed` and `options` are ignored.
    ///
    /// Returns:
    ///     tuple[int, dict]: `(observation, info)`.
    #[pyo3(signature = (*, seed=None, options=None))]
    fn reset<'py>(
        &self,
        py: Python<'py>,
        seed: Option<u64>,
        options: Option<&Bound<'py, PyDict>>,
    ) -> PyResult<(usize, Bound<'py, PyDict>)> {
        let options = options.map(info_from_dict).transpose()?;
        let (observation, info) = self.inner.borrow_mut().reset(seed, options.as_ref());
        Ok((observation, info.into_py_dict_bound(py)))
    }

    /// step($self, action, /)
    /// --
    ///
    /// Execute one action.
    ///
    /// Returns:
    ///     tuple[int, float, bool, bool, dict]:
    ///     `(observation, reward, terminated, truncated, info)`.
    ///
    /// Raises:
    ///     ValueError: If `action` is not 0 or 1, negative values included.
    #[pyo3(text_signature = "($self, action, /)")]
    fn step<'py>(
        &self,
        py: Python<'py>,
        action: i64,
    ) -> PyResult<(usize, f64, bool, bool, Bound<'py, PyDict>)> {
        let action = Action::try_from(action).map_err(mdp_err_to_py)?;
        let step = self
            .inner
            .borrow_mut()
            .step(action.index())
            .map_err(mdp_err_to_py)?;
        Ok((
            step.observation,
            step.reward,
            step.terminated,
            step.truncated,
            step.info.into_py_dict_bound(py),
        ))
    }

    /// transition_matrix($self, complete=True)
    /// --
    ///
    /// Return `T[s][a][s_next]` as nested lists.
    ///
    /// With `complete=False` only the requested-move branch is filled in.
    #[pyo3(signature = (complete=true))]
    fn transition_matrix(&self, complete: bool) -> Vec<Vec<Vec<f64>>> {
        let mode = if complete {
            TensorMode::Complete
        } else {
            TensorMode::IntendedOnly
        };
        self.inner.borrow().transition_matrix_with(mode).to_nested()
    }

    /// reward_per_action($self, /)
    /// --
    ///
    /// Return the `|S| x |A|` reward of each deterministic move.
    #[pyo3(text_signature = "($self, /)")]
    fn reward_per_action(&self) -> Vec<Vec<f64>> {
        self.inner
            .borrow()
            .reward_per_action()
            .iter()
            .map(|row| row.to_vec())
            .collect()
    }

    #[getter]
    fn position(&self) -> usize {
        self.inner.borrow().position()
    }

    #[getter]
    fn current_steps(&self) -> usize {
        self.inner.borrow().current_steps()
    }

    #[getter]
    fn horizon(&self) -> usize {
        self.inner.borrow().horizon()
    }

    #[getter]
    fn n_states(&self) -> usize {
        self.inner.borrow().state_count()
    }

    #[getter]
    fn n_actions(&self) -> usize {
        self.inner.borrow().action_count()
    }

    #[getter]
    fn rewards(&self) -> Vec<f64> {
        self.inner.borrow().rewards().to_vec()
    }
}

#[pyclass(name = "EpsilonGreedyPolicy", module = "rover.policy")]
/// EpsilonGreedyPolicy(epsilon, seed=None)
/// --
///
/// Epsilon-greedy action selection over a row of Q-values.
pub struct PyEpsilonGreedyPolicy {
    inner: RefCell<EpsilonGreedyPolicy>,
}

#[pymethods]
impl PyEpsilonGreedyPolicy {
    #[new]
    #[pyo3(signature = (epsilon, seed=None))]
    fn new(epsilon: f64, seed: Option<u64>) -> PyResult<Self> {
        let policy = EpsilonGreedyPolicy::new(epsilon, seed).map_err(policy_err_to_py)?;
        Ok(Self {
            inner: RefCell::new(policy),
        })
    }

    #[getter]
    fn epsilon(&self) -> f64 {
        self.inner.borrow().epsilon()
    }

    /// select($self, q_values, evaluate=False)
    /// --
    ///
    /// Pick an action. With `evaluate=True` exploration is turned off.
    #[pyo3(signature = (q_values, evaluate=false))]
    fn select(&self, q_values: Vec<f64>, evaluate: bool) -> PyResult<usize> {
        self.inner
            .borrow_mut()
            .select(&q_values, evaluate)
            .map(|action| action.index())
            .map_err(policy_err_to_py)
    }

    /// probabilities($self, q_values, /)
    /// --
    ///
    /// Return the action distribution for one row of Q-values.
    #[pyo3(text_signature = "($self, q_values, /)")]
    fn probabilities(&self, q_values: Vec<f64>) -> PyResult<Vec<f64>> {
        self.inner
            .borrow()
            .probabilities(&q_values)
            .map_err(policy_err_to_py)
    }
}

#[pyfunction(name = "epsilon_greedy_distribution")]
#[pyo3(text_signature = "(q_values, epsilon, /)")]
/// epsilon_greedy_distribution(q_values, epsilon, /)
/// --
///
/// Return the epsilon-greedy action distribution for `q_values`.
fn py_epsilon_greedy_distribution(q_values: Vec<f64>, epsilon: f64) -> PyResult<Vec<f64>> {
    epsilon_greedy_distribution(&q_values, epsilon).map_err(policy_err_to_py)
}

#[pyfunction(name = "choose_action")]
#[pyo3(text_signature = "(probabilities, sample, /)")]
/// choose_action(probabilities, sample, /)
/// --
///
/// Pick an action index from `probabilities` with a uniform sample in `[0, 1)`.
fn py_choose_action(probabilities: Vec<f64>, sample: f64) -> PyResult<usize> {
    choose_action(&probabilities, sample)
        .map(|action| action.index())
        .map_err(policy_err_to_py)
}

#[pymodule]
fn rover(py: Python<'_>, module: &Bound<'_, PyModule>) -> PyResult<()> {
    let env_mod = PyModule::new_bound(py, "env")?;
    env_mod.add_class::<PyMarsRover>()?;

    let policy_mod = PyModule::new_bound(py, "policy")?;
    policy_mod.add_class::<PyEpsilonGreedyPolicy>()?;
    policy_mod.add_function(wrap_pyfunction!(py_epsilon_greedy_distribution, &policy_mod)?)?;
    policy_mod.add_function(wrap_pyfunction!(py_choose_action, &policy_mod)?)?;

    module.add_class::<PyMarsRover>()?;
    module.add_submodule(&env_mod)?;
    module.add_submodule(&policy_mod)?;

    let sys_modules = py.import_bound("sys")?.getattr("modules")?;
    sys_modules.set_item("rover.env", &env_mod)?;
    sys_modules.set_item("rover.policy", &policy_mod)?;

    Ok(())
}
