mod activation;
mod config;

use crate::env::{EnvKind, Environment};
use crate::graph::{GraphBatch, GraphData};
use crate::rollout::RolloutState;
use crate::tensor::Tensor;

/// 构造`batch_size`个全连接实例：环境状态 + 边特征随机的图批次
fn random_instances(
    env: &EnvKind,
    batch_size: usize,
    num_nodes: usize,
    edge_dim: usize,
    seed: u64,
) -> (RolloutState, GraphBatch) {
    let instance = env.generate(batch_size, num_nodes, seed);
    let state = env.reset(&instance).unwrap();
    let num_edges = num_nodes * (num_nodes - 1);
    let graphs = (0..batch_size)
        .map(|i| {
            let x = Tensor::new_random_seeded(0., 1., &[num_nodes, 2], seed + i as u64);
            let edge_attr =
                Tensor::new_random_seeded(-1., 1., &[num_edges, edge_dim], seed + 100 + i as u64);
            GraphData::fully_connected(x, edge_attr).unwrap()
        })
        .collect::<Vec<_>>();
    (state, GraphBatch::from_data_list(&graphs).unwrap())
}
