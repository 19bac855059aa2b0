/*
 * @Description  : 束搜索：每个实例保留`beam_width`条累计对数概率最高的部分解。
 *                 每步在同一实例的所有(束, 节点)扩展中取前`beam_width`个，并按父束重排状态与历史。
 */

use ndarray::{Array2, Axis};

use super::multistart::best_rows_per_instance;
use super::select::feasible_candidates;
use super::{DecodeRecord, DecodeType, DecodingStrategy, StrategyOptions};
use crate::env::{EnvKind, Environment};
use crate::errors::DecoderError;
use crate::rollout::RolloutState;

#[derive(Debug, Clone)]
pub struct BeamSearch {
    requested_width: Option<usize>,
    select_best: bool,
    beam_width: usize,
    cum_logprobs: Vec<f32>,
    record: DecodeRecord,
}

/// 一个候选扩展
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f32,
    parent: usize,
    node: usize,
    logprob: f32,
}

impl BeamSearch {
    pub fn new(options: &StrategyOptions) -> Self {
        Self {
            requested_width: options.beam_width,
            select_best: options.select_best,
            beam_width: 1,
            cum_logprobs: Vec::new(),
            record: DecodeRecord::new(),
        }
    }

    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    /// 各束当前的累计对数概率
    pub fn cumulative_logprobs(&self) -> &[f32] {
        &self.cum_logprobs
    }
}

impl DecodingStrategy for BeamSearch {
    fn decode_type(&self) -> DecodeType {
        DecodeType::BeamSearch
    }

    fn pre_decoder_hook(
        &mut self,
        state: RolloutState,
        _env: &EnvKind,
    ) -> Result<(RolloutState, usize), DecoderError> {
        let beam_width = self.requested_width.unwrap_or(state.num_nodes());
        if beam_width == 0 {
            return Err(DecoderError::InvalidConfig("束宽须大于0".to_string()));
        }
        let state = state.batchify(beam_width)?;
        self.beam_width = beam_width;
        self.cum_logprobs = vec![0.0; state.batch_size()];
        Ok((state, beam_width))
    }

    fn step(
        &mut self,
        log_p: &Array2<f32>,
        mask: &Array2<bool>,
        state: RolloutState,
    ) -> Result<RolloutState, DecoderError> {
        let width = self.beam_width;
        let rollouts = log_p.nrows();
        let first_step = self.record.is_empty();
        let done = state.done();

        let mut parents = Vec::with_capacity(rollouts);
        let mut actions = Vec::with_capacity(rollouts);
        let mut logprobs = Vec::with_capacity(rollouts);
        let mut cum_logprobs = Vec::with_capacity(rollouts);

        for instance in 0..rollouts / width {
            // 首步各束完全相同，只扩展第0束以免重复
            let beams = if first_step { 1 } else { width };
            let mut candidates = Vec::new();
            for k in 0..beams {
                let row = instance * width + k;
                if done[row] {
                    candidates.push(Candidate {
                        score: self.cum_logprobs[row],
                        parent: row,
                        node: 0,
                        logprob: 0.0,
                    });
                    continue;
                }
                candidates.extend(
                    feasible_candidates(log_p.row(row), mask.row(row))
                        .into_iter()
                        .map(|(node, lp)| Candidate {
                            score: self.cum_logprobs[row] + lp,
                            parent: row,
                            node,
                            logprob: lp,
                        }),
                );
            }
            if candidates.is_empty() {
                return Err(DecoderError::NoFeasibleAction {
                    rollout: instance * width,
                });
            }
            candidates.sort_by(|a, b| {
                b.score
                    .total_cmp(&a.score)
                    .then(a.parent.cmp(&b.parent))
                    .then(a.node.cmp(&b.node))
            });
            // 候选不足束宽时循环复用
            for j in 0..width {
                let c = candidates[j % candidates.len()];
                parents.push(c.parent);
                actions.push(c.node);
                logprobs.push(c.logprob);
                cum_logprobs.push(c.score);
            }
        }

        let mut state = state.select(&parents)?;
        self.record.reorder(&parents);
        self.cum_logprobs = cum_logprobs;
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
        if !self.select_best || self.beam_width <= 1 {
            return Ok((logprobs, actions, state));
        }
        let rewards = env.get_reward(&state, &actions)?;
        let rows = best_rows_per_instance(&rewards, self.beam_width);
        Ok((
            logprobs.select(Axis(0), &rows),
            actions.select(Axis(0), &rows),
            state.select(&rows)?,
        ))
    }
}
