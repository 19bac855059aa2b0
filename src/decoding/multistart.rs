/*
 * @Description  : 多起点解码：每个实例展开成`num_starts`条序列，第一步强制从不同节点出发，
 *                 之后按贪心或采样继续；结束时可只保留每个实例奖励最高的一条
 */

use log::debug;
use ndarray::{Array2, Axis};

use super::{ActionSelector, DecodeRecord, DecodeType, DecodingStrategy, StrategyOptions};
use crate::env::{EnvKind, Environment};
use crate::errors::DecoderError;
use crate::rollout::RolloutState;
use crate::tensor::Tensor;

#[derive(Debug, Clone)]
pub struct Multistart {
    selector: ActionSelector,
    decode_type: DecodeType,
    requested_starts: Option<usize>,
    select_best: bool,
    num_starts: usize,
    start_nodes: Vec<usize>,
    record: DecodeRecord,
}

impl Multistart {
    pub fn new(selector: ActionSelector, decode_type: DecodeType, options: &StrategyOptions) -> Self {
        Self {
            selector,
            decode_type,
            requested_starts: options.num_starts,
            select_best: options.select_best,
            num_starts: 1,
            start_nodes: Vec::new(),
            record: DecodeRecord::new(),
        }
    }

    pub fn num_starts(&self) -> usize {
        self.num_starts
    }
}

impl DecodingStrategy for Multistart {
    fn decode_type(&self) -> DecodeType {
        self.decode_type
    }

    fn pre_decoder_hook(
        &mut self,
        state: RolloutState,
        env: &EnvKind,
    ) -> Result<(RolloutState, usize), DecoderError> {
        let num_starts = self.requested_starts.unwrap_or(state.num_nodes());
        if num_starts == 0 {
            return Err(DecoderError::InvalidConfig("多起点数须大于0".to_string()));
        }
        let state = state.batchify(num_starts)?;
        self.start_nodes = env.select_start_nodes(&state, num_starts);
        self.num_starts = num_starts;
        debug!(
            "多起点解码：{}个实例各展开{}条序列",
            state.batch_size() / num_starts,
            num_starts
        );
        Ok((state, num_starts))
    }

    fn step(
        &mut self,
        log_p: &Array2<f32>,
        mask: &Array2<bool>,
        mut state: RolloutState,
    ) -> Result<RolloutState, DecoderError> {
        let (actions, logprobs) = if self.record.is_empty() {
            if let Some(r) = (0..self.start_nodes.len()).find(|&r| mask[[r, self.start_nodes[r]]]) {
                return Err(DecoderError::NoFeasibleAction { rollout: r });
            }
            (self.start_nodes.clone(), vec![0.0; self.start_nodes.len()])
        } else {
            self.selector.select(log_p, mask, state.done())?
        };
        state.set_action(actions.clone())?;
        self.record.push(actions, logprobs);
        Ok(state)
    }

    fn post_decoder_hook(
        &mut self,
        state: RolloutState,
        env: &EnvKind,
    ) -> Result<(Array2<f32>, Array2<usize>, RolloutState), DecoderError> {
        let (logprobs, actions) = self.record.stack(state.batch_size());
        if !self.select_best || self.num_starts <= 1 {
            return Ok((logprobs, actions, state));
        }
        let rewards = env.get_reward(&state, &actions)?;
        let rows = best_rows_per_instance(&rewards, self.num_starts);
        Ok((
            logprobs.select(Axis(0), &rows),
            actions.select(Axis(0), &rows),
            state.select(&rows)?,
        ))
    }
}

/// 每组相邻的`group_size`条序列中奖励最高者的行号（相等时取靠前者）
pub(crate) fn best_rows_per_instance(rewards: &Tensor, group_size: usize) -> Vec<usize> {
    let rewards = rewards.to_vec();
    rewards
        .chunks(group_size.max(1))
        .enumerate()
        .map(|(i, group)| {
            let best = group
                .iter()
                .enumerate()
                .fold(0, |best, (k, &r)| if r > group[best] { k } else { best });
            i * group_size.max(1) + best
        })
        .collect()
}
