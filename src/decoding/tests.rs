use super::multistart::best_rows_per_instance;
use super::{
    ActionSelector, DecodeRecord, DecodeType, DecodingStrategy, DecodingStrategyKind,
    StrategyOptions, get_decoding_strategy,
};
use crate::assert_err;
use crate::env::{EnvKind, Environment, TspEnv};
use crate::errors::DecoderError;
use crate::rollout::RolloutState;
use crate::tensor::Tensor;
use ndarray::{Array2, array};

fn seeded(seed: u64) -> StrategyOptions {
    StrategyOptions {
        seed: Some(seed),
        ..Default::default()
    }
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓DecodeType / 注册表↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[test]
fn test_decode_type_from_str() {
    for decode_type in DecodeType::ALL {
        assert_eq!(decode_type.as_str().parse::<DecodeType>().unwrap(), decode_type);
    }
    assert_err!(
        "top_p_sampling".parse::<DecodeType>(),
        DecoderError::UnknownDecodeType("top_p_sampling")
    );
    assert_eq!(DecodeType::default(), DecodeType::MultistartSampling);
}

#[test]
fn test_decode_type_serde() {
    assert_eq!(
        serde_json::to_string(&DecodeType::BeamSearch).unwrap(),
        "\"beam_search\""
    );
    let options: StrategyOptions =
        serde_json::from_str(r#"{"temperature": 0.5, "num_starts": 3}"#).unwrap();
    assert_eq!(options.temperature, 0.5);
    assert_eq!(options.num_starts, Some(3));
    assert!(options.select_best);
}

#[test]
fn test_get_decoding_strategy() {
    let options = StrategyOptions::default();
    for decode_type in DecodeType::ALL {
        let strategy = get_decoding_strategy(decode_type, &options).unwrap();
        assert_eq!(strategy.decode_type(), decode_type);
    }
    assert!(matches!(
        get_decoding_strategy(DecodeType::Greedy, &options).unwrap(),
        DecodingStrategyKind::Greedy(_)
    ));

    let bad_temperature = StrategyOptions {
        temperature: 0.0,
        ..Default::default()
    };
    assert_err!(
        get_decoding_strategy(DecodeType::Sampling, &bad_temperature),
        DecoderError::InvalidConfig(_)
    );
    let bad_top_k = StrategyOptions {
        top_k: Some(0),
        ..Default::default()
    };
    assert_err!(
        get_decoding_strategy(DecodeType::Sampling, &bad_top_k),
        DecoderError::InvalidConfig(_)
    );
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑DecodeType / 注册表↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓单步选择↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
#[test]
fn test_greedy_select_skips_masked() {
    let log_p = array![[-0.1, -2.0, -3.0], [-0.5, -1.0, -2.0]];
    // 第0行最优节点0被屏蔽
    let mask = array![[true, false, false], [false, false, false]];
    let (actions, logprobs) = ActionSelector::greedy()
        .select(&log_p, &mask, &[false, false])
        .unwrap();
    assert_eq!(actions, vec![1, 0]);
    assert_eq!(logprobs, vec![-2.0, -0.5]);
}

#[test]
fn test_select_done_rows_and_no_feasible_action() {
    let log_p = array![[f32::NAN, f32::NAN], [-0.1, -3.0]];
    let mask = array![[true, true], [false, false]];
    let (actions, logprobs) = ActionSelector::greedy()
        .select(&log_p, &mask, &[true, false])
        .unwrap();
    assert_eq!(actions, vec![0, 0]);
    assert_eq!(logprobs, vec![0.0, -0.1]);

    assert_err!(
        ActionSelector::greedy().select(&log_p, &mask, &[false, false]),
        DecoderError::NoFeasibleAction { rollout: 0 }
    );
}

#[test]
fn test_sampling_is_seeded_and_respects_mask() {
    let log_p = Array2::from_elem((4, 5), (0.2f32).ln());
    let mut mask = Array2::from_elem((4, 5), false);
    mask[[0, 0]] = true;
    mask[[1, 4]] = true;
    let mut s1 = ActionSelector::sampling(&seeded(11));
    let mut s2 = ActionSelector::sampling(&seeded(11));
    for _ in 0..50 {
        let (a1, _) = s1.select(&log_p, &mask, &[false; 4]).unwrap();
        let (a2, _) = s2.select(&log_p, &mask, &[false; 4]).unwrap();
        assert_eq!(a1, a2);
        assert_ne!(a1[0], 0);
        assert_ne!(a1[1], 4);
    }
}

#[test]
fn test_sampling_top_k_one_is_greedy() {
    let log_p = array![[-2.0, -0.3, -1.5], [-0.2, -4.0, -1.9]];
    let mask = Array2::from_elem((2, 3), false);
    let options = StrategyOptions {
        top_k: Some(1),
        ..seeded(5)
    };
    let mut sampler = ActionSelector::sampling(&options);
    for _ in 0..10 {
        let (actions, _) = sampler.select(&log_p, &mask, &[false, false]).unwrap();
        assert_eq!(actions, vec![1, 0]);
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑单步选择↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/

#[test]
fn test_decode_record_stack_and_reorder() {
    let mut record = DecodeRecord::new();
    record.push(vec![0, 1], vec![-0.1, -0.2]);
    record.push(vec![2, 3], vec![-0.3, -0.4]);
    record.reorder(&[1, 1]);
    let (logprobs, actions) = record.stack(2);
    assert_eq!(actions, array![[1, 3], [1, 3]]);
    assert_eq!(logprobs, array![[-0.2, -0.4], [-0.2, -0.4]]);
    assert_eq!(DecodeRecord::new().stack(3).1.shape(), &[3, 0]);
}

#[test]
fn test_best_rows_per_instance() {
    let rewards = Tensor::new(&[-3., -1., -2., -5., -5., -4.], &[6]);
    assert_eq!(best_rows_per_instance(&rewards, 3), vec![1, 5]);
    assert_eq!(best_rows_per_instance(&rewards, 1), vec![0, 1, 2, 3, 4, 5]);
}

/*↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓多起点 / 束搜索↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓↓*/
/// 手动驱动一次完整解码（不经过热力图，直接给定每步的对数概率）
fn drive(
    strategy: &mut DecodingStrategyKind,
    env: &EnvKind,
    state: RolloutState,
    log_p_of: impl Fn(&RolloutState) -> Array2<f32>,
) -> (Array2<f32>, Array2<usize>, RolloutState) {
    let (mut state, _) = strategy.pre_decoder_hook(state, env).unwrap();
    while !state.all_done() {
        let mask = state.action_mask().mapv(|m| !m);
        let log_p = log_p_of(&state);
        state = strategy.step(&log_p, &mask, state).unwrap();
        state = env.step(state).unwrap();
    }
    strategy.post_decoder_hook(state, env).unwrap()
}

/// 每行均匀分布（屏蔽位置为-inf）
fn uniform_log_p(state: &RolloutState) -> Array2<f32> {
    state
        .action_mask()
        .mapv(|m| if m { 0.0 } else { f32::NEG_INFINITY })
}

#[test]
fn test_multistart_forces_distinct_starts() {
    let env: EnvKind = TspEnv.into();
    let state = env.reset(&env.generate(2, 4, 1)).unwrap();
    let options = StrategyOptions {
        select_best: false,
        ..Default::default()
    };
    let mut strategy = get_decoding_strategy(DecodeType::MultistartGreedy, &options).unwrap();
    let (logprobs, actions, state) = drive(&mut strategy, &env, state, uniform_log_p);
    assert_eq!(state.batch_size(), 8);
    assert_eq!(actions.shape(), &[8, 4]);
    let starts = actions.column(0).to_vec();
    assert_eq!(starts, vec![0, 1, 2, 3, 0, 1, 2, 3]);
    // 强制的首步对数概率记为0
    assert!(logprobs.column(0).iter().all(|&lp| lp == 0.0));
}

#[test]
fn test_multistart_select_best_keeps_one_per_instance() {
    let env: EnvKind = TspEnv.into();
    let instance = env.generate(3, 5, 2);
    let state = env.reset(&instance).unwrap();
    let mut strategy =
        get_decoding_strategy(DecodeType::MultistartSampling, &seeded(3)).unwrap();
    let (_, actions, state) = drive(&mut strategy, &env, state, uniform_log_p);
    assert_eq!(actions.shape(), &[3, 5]);
    assert_eq!(state.batch_size(), 3);
    assert!(env.get_reward(&state, &actions).is_ok());
}

#[test]
fn test_beam_search_finds_best_cumulative_path() {
    // 3个节点，不论当前位置，偏好顺序固定为 2 > 0 > 1
    let env: EnvKind = TspEnv.into();
    let state = env.reset(&env.generate(1, 3, 4)).unwrap();
    let options = StrategyOptions {
        beam_width: Some(2),
        select_best: false,
        ..Default::default()
    };
    let mut strategy = get_decoding_strategy(DecodeType::BeamSearch, &options).unwrap();
    let preference = [-1.0f32, -2.0, -0.5];
    let (logprobs, actions, state) = drive(&mut strategy, &env, state, |s| {
        Array2::from_shape_fn((s.batch_size(), 3), |(r, v)| {
            if s.action_mask()[[r, v]] { preference[v] } else { f32::NEG_INFINITY }
        })
    });
    assert_eq!(state.batch_size(), 2);
    // 最优束：2 -> 0 -> 1
    assert_eq!(actions.row(0).to_vec(), vec![2, 0, 1]);
    assert_eq!(logprobs.row(0).to_vec(), vec![-0.5, -1.0, -2.0]);
    // 第二步两束并列（均为-1.5），另一束为 0 -> 2 -> 1
    assert_eq!(actions.row(1).to_vec(), vec![0, 2, 1]);
    if let DecodingStrategyKind::BeamSearch(beam) = &strategy {
        assert_eq!(beam.cumulative_logprobs(), &[-3.5, -3.5]);
    } else {
        panic!("应为束搜索");
    }
}

#[test]
fn test_beam_search_select_best_returns_permutations() {
    let env: EnvKind = TspEnv.into();
    let state = env.reset(&env.generate(2, 4, 9)).unwrap();
    let mut strategy =
        get_decoding_strategy(DecodeType::BeamSearch, &StrategyOptions::default()).unwrap();
    let (_, actions, _) = drive(&mut strategy, &env, state, uniform_log_p);
    assert_eq!(actions.shape(), &[2, 4]);
    for row in actions.rows() {
        let mut nodes = row.to_vec();
        nodes.sort();
        assert_eq!(nodes, vec![0, 1, 2, 3]);
    }
}
/*↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑多起点 / 束搜索↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑↑*/
