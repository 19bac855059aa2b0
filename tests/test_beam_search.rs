/*
 * @Description  : 束搜索端到端测试
 */
use nar_decoder::decoding::{DecodeType, StrategyOptions};
use nar_decoder::env::{EnvKind, Environment, TspEnv};
use nar_decoder::errors::DecoderError;
use nar_decoder::graph::{GraphBatch, GraphData};
use nar_decoder::nn::{DecoderConfig, EnvSource, NonAutoregressiveDecoder};
use nar_decoder::tensor::Tensor;
use test_log::test;

const EMBEDDING_DIM: usize = 12;

fn setup(batch_size: usize, num_nodes: usize) -> Result<(NonAutoregressiveDecoder, GraphBatch), DecoderError> {
    let decoder = NonAutoregressiveDecoder::new(DecoderConfig {
        embedding_dim: EMBEDDING_DIM,
        num_layers: 2,
        ..Default::default()
    })?;
    let num_edges = num_nodes * (num_nodes - 1);
    let graphs = (0..batch_size as u64)
        .map(|i| {
            GraphData::fully_connected(
                Tensor::zeros(&[num_nodes, 2]),
                Tensor::new_normal_seeded(0., 1., &[num_edges, EMBEDDING_DIM], 300 + i),
            )
        })
        .collect::<Result<Vec<_>, _>>()?;
    Ok((decoder, GraphBatch::from_data_list(&graphs)?))
}

#[test]
fn test_beam_search_keeps_best_beam() -> Result<(), DecoderError> {
    let env: EnvKind = TspEnv.into();
    let (decoder, graph) = setup(3, 8)?;
    let state = env.reset(&env.generate(3, 8, 21))?;

    let all = decoder.forward(
        state.clone(),
        &graph,
        EnvSource::Default,
        DecodeType::BeamSearch,
        true,
        StrategyOptions {
            beam_width: Some(4),
            select_best: false,
            ..Default::default()
        },
    )?;
    assert_eq!(all.actions.shape(), &[12, 8]);
    // 各束的对数概率都是有限值
    assert!(all.outputs.iter().all(|lp| lp.is_finite()));

    let best = decoder.forward(
        state,
        &graph,
        EnvSource::Default,
        DecodeType::BeamSearch,
        true,
        StrategyOptions {
            beam_width: Some(4),
            ..Default::default()
        },
    )?;
    assert_eq!(best.actions.shape(), &[3, 8]);

    let all_rewards = all.state.reward().expect("应已计算奖励").to_vec();
    let best_rewards = best.state.reward().expect("应已计算奖励").to_vec();
    for (i, beams) in all_rewards.chunks(4).enumerate() {
        let max = beams.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        assert_eq!(best_rewards[i], max);
    }
    Ok(())
}

#[test]
fn test_beam_width_one_matches_greedy() -> Result<(), DecoderError> {
    let env: EnvKind = TspEnv.into();
    let (decoder, graph) = setup(2, 7)?;
    let state = env.reset(&env.generate(2, 7, 22))?;

    let greedy = decoder.forward(
        state.clone(),
        &graph,
        EnvSource::Default,
        DecodeType::Greedy,
        true,
        StrategyOptions::default(),
    )?;
    let beam = decoder.forward(
        state,
        &graph,
        EnvSource::Default,
        DecodeType::BeamSearch,
        true,
        StrategyOptions {
            beam_width: Some(1),
            ..Default::default()
        },
    )?;
    assert_eq!(greedy.actions, beam.actions);
    assert_eq!(greedy.outputs, beam.outputs);
    Ok(())
}
