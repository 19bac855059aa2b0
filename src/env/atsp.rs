/*
 * @Description  : 非对称旅行商问题（ATSP）：代价由（不一定对称的）代价矩阵给出
 */

use ndarray::Array2;

use super::{Environment, check_tour_validity, closed_tour_reward, initial_tour_state, visit_step};
use crate::errors::DecoderError;
use crate::rollout::{RolloutState, keys};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AtspEnv;

impl Environment for AtspEnv {
    fn name(&self) -> &'static str {
        "atsp"
    }

    /// * `instance` - 代价矩阵 [batch_size, num_nodes, num_nodes]，`[b, u, v]`为u到v的代价
    fn reset(&self, instance: &Tensor) -> Result<RolloutState, DecoderError> {
        let shape = instance.shape();
        if shape.len() != 3 || shape[1] != shape[2] {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), shape.get(1).copied().unwrap_or(0), shape.get(1).copied().unwrap_or(0)],
                got: shape.to_vec(),
                message: "ATSP代价矩阵须为[batch_size, num_nodes, num_nodes]".to_string(),
            });
        }
        let mut state = initial_tour_state(shape[0], shape[1])?;
        state.set(keys::COST_MATRIX, instance.clone())?;
        Ok(state)
    }

    fn step(&self, state: RolloutState) -> Result<RolloutState, DecoderError> {
        visit_step(state)
    }

    fn get_reward(
        &self,
        state: &RolloutState,
        actions: &Array2<usize>,
    ) -> Result<Tensor, DecoderError> {
        let cost_matrix = state.get(keys::COST_MATRIX)?;
        if actions.nrows() != cost_matrix.shape()[0] {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![cost_matrix.shape()[0]],
                got: vec![actions.nrows()],
                message: "动作序列条数须等于代价矩阵批次大小".to_string(),
            });
        }
        check_tour_validity(actions, cost_matrix.shape()[1])?;
        Ok(closed_tour_reward(actions, |r, u, v| cost_matrix[[r, u, v]]))
    }

    /// 代价在[0, 1]内均匀采样、对角线为0，
    /// 再以最短路闭包（Floyd-Warshall）使其满足三角不等式
    fn generate(&self, batch_size: usize, num_nodes: usize, seed: u64) -> Tensor {
        let mut costs = Tensor::new_random_seeded(0., 1., &[batch_size, num_nodes, num_nodes], seed);
        for b in 0..batch_size {
            for i in 0..num_nodes {
                costs[[b, i, i]] = 0.;
            }
            for k in 0..num_nodes {
                for i in 0..num_nodes {
                    for j in 0..num_nodes {
                        let via_k = costs[[b, i, k]] + costs[[b, k, j]];
                        if via_k < costs[[b, i, j]] {
                            costs[[b, i, j]] = via_k;
                        }
                    }
                }
            }
        }
        costs
    }
}
