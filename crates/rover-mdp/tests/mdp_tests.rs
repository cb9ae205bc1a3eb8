use rover_core::{
    ActionId, Environment, Info, PolicyError, ReturnType, RolloutParams, greedy_rollout, rollout,
};
use rover_mdp::{
    Action, MarsRover, MdpError, RoverConfig, TensorMode, TransitionModel, load_yaml,
    rover_from_yaml, save_yaml,
};

fn default_rover(seed: u64) -> MarsRover {
    RoverConfig::default()
        .with_seed(seed)
        .build()
        .expect("default config is valid")
}

fn uniform_rover(follow: f64, start: usize, horizon: usize, seed: u64) -> MarsRover {
    RoverConfig {
        transition_probabilities: vec![[follow, follow]; 5],
        horizon,
        start,
        ..RoverConfig::default()
    }
    .with_seed(seed)
    .build()
    .expect("config is valid")
}

#[test]
fn default_episode_matches_reference_trace() {
    let mut rover = default_rover(0);

    let (obs, info) = rover.reset(None, None);
    assert_eq!(obs, 2);
    assert!(info.is_empty());

    let first = rover.step(1).expect("valid action");
    assert_eq!(first.observation, 3);
    assert_eq!(first.reward, 0.0);
    assert!(!first.terminated);
    assert!(!first.truncated);
    assert!(first.info.is_empty());

    let second = rover.step(1).expect("valid action");
    assert_eq!(second.observation, 4);
    assert_eq!(second.reward, 10.0);
    assert!(!second.terminated);
    assert!(!second.truncated);

    for _ in 3..10 {
        let step = rover.step(1).expect("valid action");
        assert!(!step.truncated);
        assert_eq!(step.observation, 4);
    }

    let last = rover.step(1).expect("valid action");
    assert!(last.truncated);
    assert!(!last.terminated);
    assert_eq!(rover.current_steps(), 10);
}

#[test]
fn reset_restores_start_position_and_counter() {
    let mut rover = uniform_rover(0.5, 1, 4, 9);
    rover.reset(None, None);
    for _ in 0..6 {
        rover.step(0).expect("valid action");
    }
    assert_eq!(rover.current_steps(), 6);

    let mut options = Info::new();
    options.insert("ignored".to_string(), "yes".to_string());
    let (obs, info) = rover.reset(Some(123), Some(&options));

    assert_eq!(obs, 1);
    assert!(info.is_empty());
    assert_eq!(rover.position(), 1);
    assert_eq!(rover.current_steps(), 0);
}

#[test]
fn reset_does_not_reseed_the_generator() {
    let mut a = uniform_rover(0.5, 2, 100, 5);
    let mut b = uniform_rover(0.5, 2, 100, 5);

    let mut trace_a = Vec::new();
    let mut trace_b = Vec::new();
    for _ in 0..20 {
        trace_a.push(a.step(1).expect("valid action").observation);
    }
    a.reset(Some(5), None);
    b.reset(None, None);
    for _ in 0..20 {
        b.step(1).expect("valid action");
    }
    b.reset(None, None);
    for _ in 0..20 {
        trace_a.push(a.step(1).expect("valid action").observation);
        trace_b.push(b.step(1).expect("valid action").observation);
    }

    assert_eq!(trace_a[20..], trace_b[..]);
}

#[test]
fn movement_is_clamped_at_both_ends() {
    let model = TransitionModel::new(vec![[1.0, 1.0]; 5], vec![0.0; 5]).expect("valid model");

    assert_eq!(model.next_state(0, Action::Left), 0);
    assert_eq!(model.next_state(4, Action::Right), 4);
    assert_eq!(model.next_state(0, Action::Right), 1);
    assert_eq!(model.next_state(4, Action::Left), 3);

    let mut left_edge = uniform_rover(1.0, 0, 10, 0);
    assert_eq!(left_edge.step(0).expect("valid action").observation, 0);
    let mut right_edge = uniform_rover(1.0, 4, 10, 0);
    assert_eq!(right_edge.step(1).expect("valid action").observation, 4);
}

#[test]
fn deterministic_mode_always_moves_one_cell() {
    for start in 0..5 {
        let mut rover = uniform_rover(1.0, start, 10, start as u64);
        for _ in 0..25 {
            rover.reset(None, None);
            assert_eq!(
                rover.step(0).expect("valid action").observation,
                start.saturating_sub(1)
            );
            rover.reset(None, None);
            assert_eq!(rover.step(1).expect("valid action").observation, (start + 1).min(4));
        }
    }
}

#[test]
fn zero_follow_probability_always_slips() {
    let mut rover = uniform_rover(0.0, 2, 10, 1);
    for _ in 0..25 {
        rover.reset(None, None);
        assert_eq!(rover.step(1).expect("valid action").observation, 1);
        rover.reset(None, None);
        assert_eq!(rover.step(0).expect("valid action").observation, 3);
    }
}

#[test]
fn slip_frequency_tracks_follow_probability() {
    let mut rover = uniform_rover(0.7, 2, 10, 2024);
    let trials = 5_000;
    let mut followed = 0;
    for _ in 0..trials {
        rover.reset(None, None);
        if rover.step(1).expect("valid action").observation == 3 {
            followed += 1;
        }
    }

    let rate = followed as f64 / trials as f64;
    assert!((rate - 0.7).abs() < 0.03, "follow rate {rate}");
}

#[test]
fn truncation_happens_exactly_at_horizon() {
    let mut rover = uniform_rover(0.5, 2, 3, 77);
    rover.reset(None, None);

    let flags: Vec<_> = (0..5)
        .map(|_| {
            let step = rover.step(0).expect("valid action");
            assert!(!step.terminated);
            step.truncated
        })
        .collect();

    assert_eq!(flags, vec![false, false, true, true, true]);
    assert_eq!(rover.current_steps(), 5);
}

#[test]
fn reward_is_read_from_arrival_state() {
    let mut rover = RoverConfig {
        transition_probabilities: vec![[0.6, 0.3]; 5],
        rewards: vec![-1.0, 0.5, 2.0, 3.5, 7.0],
        horizon: 50,
        ..RoverConfig::default()
    }
    .with_seed(3)
    .build()
    .expect("config is valid");

    rover.reset(None, None);
    for i in 0..50 {
        let step = rover.step(i % 2).expect("valid action");
        assert_eq!(step.reward, rover.rewards()[step.observation]);
        assert_eq!(step.observation, rover.position());
    }
}

#[test]
fn fixed_seed_reproduces_traces() {
    let mut a = uniform_rover(0.55, 2, 1_000, 42);
    let mut b = uniform_rover(0.55, 2, 1_000, 42);
    let actions = [0, 1, 1, 0, 1, 1, 1, 0, 0, 1];

    let mut trace_a = Vec::new();
    let mut trace_b = Vec::new();
    for round in 0..20 {
        for action in actions {
            let step_a = a.step(action).expect("valid action");
            let step_b = b.step(action).expect("valid action");
            trace_a.push((step_a.observation, step_a.reward, step_a.truncated));
            trace_b.push((step_b.observation, step_b.reward, step_b.truncated));
        }
        if round % 5 == 4 {
            a.reset(None, None);
            b.reset(None, None);
        }
    }

    assert_eq!(trace_a, trace_b);
}

#[test]
fn invalid_action_is_rejected_without_side_effects() {
    let mut rover = uniform_rover(0.5, 2, 10, 8);
    let mut twin = uniform_rover(0.5, 2, 10, 8);
    rover.step(1).expect("valid action");
    twin.step(1).expect("valid action");

    let position = rover.position();
    let err = rover.step(2).expect_err("action 2 is invalid");

    assert!(matches!(err, MdpError::InvalidAction { action: 2 }));
    assert_eq!(err.to_string(), "2 is not a valid action (needs to be 0 or 1)");
    assert_eq!(rover.position(), position);
    assert_eq!(rover.current_steps(), 1);

    // The random stream is untouched as well.
    for action in [0, 1, 1, 0, 1] {
        assert_eq!(rover.step(action).ok(), twin.step(action).ok());
    }
}

#[test]
fn signed_actions_outside_the_action_space_are_invalid() {
    assert_eq!(Action::try_from(0i64).ok(), Some(Action::Left));
    assert_eq!(Action::try_from(1i64).ok(), Some(Action::Right));

    let negative = Action::try_from(-1i64).expect_err("negative action");
    assert!(matches!(negative, MdpError::InvalidAction { action: -1 }));
    assert_eq!(
        negative.to_string(),
        "-1 is not a valid action (needs to be 0 or 1)"
    );

    let huge = Action::try_from(i64::MAX).expect_err("out of range action");
    assert!(matches!(huge, MdpError::InvalidAction { action } if action == i64::MAX as i128));
}

#[test]
fn rover_exposes_its_validated_model() {
    let rover = RoverConfig {
        transition_probabilities: vec![[0.9, 0.4], [0.3, 0.6]],
        rewards: vec![5.0, -5.0],
        start: 0,
        ..RoverConfig::default()
    }
    .with_seed(1)
    .build()
    .expect("config is valid");

    assert_eq!(rover.transition_probabilities(), &[[0.9, 0.4], [0.3, 0.6]]);
    assert_eq!(rover.model().rewards(), &[5.0, -5.0]);
    assert_eq!(rover.model().follow_probability(1, Action::Right), 0.6);
    assert_eq!(rover.model().follow_probability(0, Action::Left), 0.9);
    assert_eq!(rover.transition_matrix().state_count(), 2);
    assert_eq!(rover.action_count(), Action::COUNT);
}

#[test]
fn configured_tensor_mode_selects_precomputed_matrix() {
    let yaml = r#"
transition_probabilities:
  - [0.5, 0.5]
  - [0.5, 0.5]
  - [0.5, 0.5]
rewards: [0.0, 0.0, 1.0]
start: 1
tensor_mode: intended_only
"#;
    let rover = RoverConfig::from_yaml_str(yaml)
        .expect("valid yaml")
        .build()
        .expect("valid config");

    assert_eq!(rover.tensor_mode(), TensorMode::IntendedOnly);
    assert_eq!(rover.transition_matrix().row(1, 1), Some(&[0.0, 0.0, 0.5][..]));
    assert_eq!(
        rover.transition_matrix_with(TensorMode::Complete).row(1, 1),
        Some(&[0.5, 0.0, 0.5][..])
    );
    assert_eq!(default_rover(0).tensor_mode(), TensorMode::Complete);
}

#[test]
fn reward_per_action_uses_deterministic_moves() {
    let rover = default_rover(0);
    assert_eq!(
        rover.reward_per_action(),
        vec![
            [1.0, 0.0],
            [1.0, 0.0],
            [0.0, 0.0],
            [0.0, 10.0],
            [0.0, 10.0],
        ]
    );
}

#[test]
fn intended_only_tensor_matches_reference_layout() {
    let rover = default_rover(0);
    let tensor = rover.transition_matrix_with(TensorMode::IntendedOnly);
    let expected_next = [[0, 1], [0, 2], [1, 3], [2, 4], [3, 4]];

    for (state, targets) in expected_next.iter().enumerate() {
        for (action, next) in targets.iter().enumerate() {
            let row = tensor.row(state, action).expect("in bounds");
            for (candidate, p) in row.iter().enumerate() {
                let want = if candidate == *next { 1.0 } else { 0.0 };
                assert_eq!(*p, want, "T[{state}, {action}, {candidate}]");
            }
        }
    }
}

fn assert_row(row: Option<&[f64]>, expected: &[f64]) {
    let row = row.expect("in bounds");
    assert_eq!(row.len(), expected.len());
    for (actual, want) in row.iter().zip(expected) {
        assert!((actual - want).abs() < 1e-12, "{row:?} != {expected:?}");
    }
}

#[test]
fn complete_tensor_includes_slip_branch() {
    let rover = uniform_rover(0.8, 2, 10, 0);
    let complete = rover.transition_matrix();
    let partial = rover.transition_matrix_with(TensorMode::IntendedOnly);

    assert_row(complete.row(1, 1), &[0.2, 0.0, 0.8, 0.0, 0.0]);
    assert_row(partial.row(1, 1), &[0.0, 0.0, 0.8, 0.0, 0.0]);
    assert_row(complete.row(0, 0), &[0.8, 0.2, 0.0, 0.0, 0.0]);
    assert_row(complete.row(4, 1), &[0.0, 0.0, 0.0, 0.2, 0.8]);

    for state in 0..5 {
        for action in 0..2 {
            let sum: f64 = complete.row(state, action).expect("in bounds").iter().sum();
            assert!((sum - 1.0).abs() < 1e-12);
        }
    }

    assert_eq!(complete.get(5, 0, 0), None);
    assert_eq!(complete.get(0, 2, 0), None);
    assert_eq!(complete.get(0, 0, 5), None);
}

#[test]
fn single_cell_track_accumulates_both_branches() {
    let model = TransitionModel::new(vec![[0.25, 0.5]], vec![3.0]).expect("valid model");
    let tensor = model.transition_tensor(TensorMode::Complete);

    assert_eq!(tensor.get(0, 0, 0), Some(1.0));
    assert_eq!(tensor.get(0, 1, 0), Some(1.0));
    assert_eq!(tensor.to_nested(), vec![vec![vec![1.0], vec![1.0]]]);
}

#[test]
fn invalid_configurations_fail_fast() {
    let mismatch = RoverConfig {
        rewards: vec![0.0; 4],
        ..RoverConfig::default()
    };
    assert!(matches!(
        mismatch.build(),
        Err(MdpError::ShapeMismatch {
            states: 5,
            rewards: 4
        })
    ));

    let mut bad_probability = RoverConfig::default();
    bad_probability.transition_probabilities[3] = [1.0, 1.5];
    assert!(matches!(
        bad_probability.build(),
        Err(MdpError::InvalidProbability {
            state: 3,
            action: 1,
            ..
        })
    ));

    let mut nan_probability = RoverConfig::default();
    nan_probability.transition_probabilities[0] = [f64::NAN, 1.0];
    assert!(matches!(
        nan_probability.validate(),
        Err(MdpError::InvalidProbability { state: 0, action: 0, .. })
    ));

    let mut bad_reward = RoverConfig::default();
    bad_reward.rewards[2] = f64::INFINITY;
    assert!(matches!(
        bad_reward.build(),
        Err(MdpError::InvalidReward { state: 2, .. })
    ));

    let zero_horizon = RoverConfig {
        horizon: 0,
        ..RoverConfig::default()
    };
    assert!(matches!(zero_horizon.build(), Err(MdpError::ZeroHorizon)));

    let bad_start = RoverConfig {
        start: 5,
        ..RoverConfig::default()
    };
    assert!(matches!(
        bad_start.validate(),
        Err(MdpError::StartOutOfRange { start: 5, states: 5 })
    ));

    let empty = RoverConfig {
        transition_probabilities: Vec::new(),
        rewards: Vec::new(),
        ..RoverConfig::default()
    };
    assert!(matches!(empty.build(), Err(MdpError::EmptyStateSpace)));
}

#[test]
fn default_yaml_matches_default_config() {
    let parsed = RoverConfig::from_default_yaml().expect("bundled yaml is valid");
    assert_eq!(parsed, RoverConfig::default());
}

#[test]
fn partial_yaml_falls_back_to_defaults() {
    let yaml = r#"
horizon: 4
seed: 17
"#;
    let config = RoverConfig::from_yaml_str(yaml).expect("valid yaml");
    assert_eq!(config.horizon, 4);
    assert_eq!(config.seed, Some(17));
    assert_eq!(config.rewards, vec![1.0, 0.0, 0.0, 0.0, 10.0]);

    let rover = config.build().expect("valid config");
    assert_eq!(rover.seed(), Some(17));
    assert_eq!(rover.horizon(), 4);
    assert_eq!(rover.start(), 2);
}

#[test]
fn yaml_shape_errors_are_reported() {
    let yaml = r#"
transition_probabilities:
  - [1.0, 1.0]
  - [1.0, 1.0]
rewards: [0.0, 1.0, 2.0]
start: 0
"#;
    let err = RoverConfig::from_yaml_str(yaml).expect_err("rewards do not match states");
    assert!(matches!(err, MdpError::ShapeMismatch { states: 2, rewards: 3 }));

    let malformed = "transition_probabilities: [[1.0, 1.0, 1.0]]";
    let err = RoverConfig::from_yaml_str(malformed).expect_err("rows must have two entries");
    assert!(matches!(err, MdpError::Yaml(_)));
}

#[test]
fn yaml_files_round_trip() {
    let dir = tempfile::tempdir().expect("temp dir");
    let path = dir.path().join("rover.yaml");

    let config = RoverConfig {
        transition_probabilities: vec![[0.9, 0.8], [0.7, 0.6], [0.5, 0.4]],
        rewards: vec![2.0, -1.0, 4.0],
        horizon: 6,
        start: 1,
        seed: Some(99),
        tensor_mode: TensorMode::IntendedOnly,
    };
    save_yaml(&path, &config).expect("write should succeed");

    assert_eq!(load_yaml(&path).expect("read should succeed"), config);

    let mut rover = rover_from_yaml(&path).expect("build should succeed");
    assert_eq!(rover.state_count(), 3);
    assert_eq!(rover.tensor_mode(), TensorMode::IntendedOnly);
    assert_eq!(rover.reset(None, None).0, 1);

    let missing = load_yaml(dir.path().join("missing.yaml")).expect_err("no such file");
    assert!(matches!(missing, MdpError::Io(_)));
}

#[derive(Debug)]
enum EvalError {
    Policy(PolicyError),
    Env(MdpError),
}

impl From<PolicyError> for EvalError {
    fn from(err: PolicyError) -> Self {
        EvalError::Policy(err)
    }
}

impl From<MdpError> for EvalError {
    fn from(err: MdpError) -> Self {
        EvalError::Env(err)
    }
}

#[test]
fn greedy_evaluation_runs_until_truncation() {
    let mut rover = default_rover(0);
    let params = RolloutParams {
        return_type: ReturnType::EpisodicUndiscounted,
        gamma: 1.0,
        max_steps: 100,
        fixed_horizon_steps: 100,
    };

    let stats = greedy_rollout::<_, _, EvalError>(&mut rover, |_state: &usize| vec![0.0, 1.0], params)
        .expect("evaluation should succeed");

    assert_eq!(stats.length, 10);
    assert!(stats.truncated);
    assert!(!stats.terminated);
    assert_eq!(stats.final_observation, 4);
    assert!((stats.total_return - 90.0).abs() < f64::EPSILON);
}

fn observe_after(rover: &mut MarsRover, action: usize) -> Result<usize, EvalError> {
    Ok(Environment::step(rover, action)?.observation)
}

#[test]
fn rover_is_driven_through_the_environment_contract() {
    let mut rover = default_rover(0);
    let stats = rollout(
        &mut rover,
        |_state: &usize, _n| Ok::<ActionId, EvalError>(ActionId::from(1)),
        RolloutParams::default(),
    )
    .expect("rollout should succeed");
    assert_eq!(stats.length, 10);
    assert!(stats.truncated);

    let err = rollout(
        &mut rover,
        |_state: &usize, _n| Ok::<ActionId, EvalError>(ActionId::from(3)),
        RolloutParams::default(),
    )
    .expect_err("action 3 is outside the action space");
    assert!(matches!(
        err,
        EvalError::Policy(PolicyError::InvalidPolicyAction { num_actions: 2, .. })
    ));

    assert_eq!(Environment::action_count(&rover), 2);
    assert_eq!(observe_after(&mut rover, 1).ok(), Some(3));
    assert!(matches!(
        observe_after(&mut rover, 7),
        Err(EvalError::Env(MdpError::InvalidAction { action: 7 }))
    ));
}
