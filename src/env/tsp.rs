/*
 * @Description  : 对称旅行商问题（TSP）：坐标为二维欧氏平面上的点，
 *                 奖励为闭合回路欧氏长度的相反数
 */

use ndarray::Array2;

use super::{Environment, check_tour_validity, closed_tour_reward, initial_tour_state, visit_step};
use crate::errors::DecoderError;
use crate::rollout::{RolloutState, keys};
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TspEnv;

impl Environment for TspEnv {
    fn name(&self) -> &'static str {
        "tsp"
    }

    /// * `instance` - 城市坐标 [batch_size, num_nodes, 2]
    fn reset(&self, instance: &Tensor) -> Result<RolloutState, DecoderError> {
        let shape = instance.shape();
        if shape.len() != 3 || shape[2] != 2 {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![shape.first().copied().unwrap_or(0), shape.get(1).copied().unwrap_or(0), 2],
                got: shape.to_vec(),
                message: "TSP坐标须为[batch_size, num_nodes, 2]".to_string(),
            });
        }
        let mut state = initial_tour_state(shape[0], shape[1])?;
        state.set(keys::LOCS, instance.clone())?;
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
        let locs = state.get(keys::LOCS)?;
        if actions.nrows() != locs.shape()[0] {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![locs.shape()[0]],
                got: vec![actions.nrows()],
                message: "动作序列条数须等于坐标批次大小".to_string(),
            });
        }
        check_tour_validity(actions, locs.shape()[1])?;
        Ok(closed_tour_reward(actions, |r, u, v| {
            let dx = locs[[r, u, 0]] - locs[[r, v, 0]];
            let dy = locs[[r, u, 1]] - locs[[r, v, 1]];
            (dx * dx + dy * dy).sqrt()
        }))
    }

    /// 坐标在单位正方形内均匀分布
    fn generate(&self, batch_size: usize, num_nodes: usize, seed: u64) -> Tensor {
        Tensor::new_random_seeded(0., 1., &[batch_size, num_nodes, 2], seed)
    }
}
