/*
 * @Description  : 单步动作选择：贪心取最大、按分布采样
 */

use ndarray::{Array2, ArrayView1};
use rand::SeedableRng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;

use super::StrategyOptions;
use crate::errors::DecoderError;

#[derive(Debug, Clone)]
pub enum ActionSelector {
    Greedy,
    Sampling {
        temperature: f32,
        top_k: Option<usize>,
        rng: StdRng,
    },
}

impl ActionSelector {
    pub fn greedy() -> Self {
        Self::Greedy
    }

    pub fn sampling(options: &StrategyOptions) -> Self {
        let rng = match options.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::Sampling {
            temperature: options.temperature,
            top_k: options.top_k,
            rng,
        }
    }

    /// 为每条序列选出一个动作，返回`(actions, logprobs)`。
    /// 已结束的序列填充动作0、对数概率0；未结束但无可行动作时报错。
    pub fn select(
        &mut self,
        log_p: &Array2<f32>,
        mask: &Array2<bool>,
        done: &[bool],
    ) -> Result<(Vec<usize>, Vec<f32>), DecoderError> {
        let rollouts = log_p.nrows();
        let mut actions = Vec::with_capacity(rollouts);
        let mut logprobs = Vec::with_capacity(rollouts);
        for r in 0..rollouts {
            if done.get(r).copied().unwrap_or(false) {
                actions.push(0);
                logprobs.push(0.0);
                continue;
            }
            let feasible = feasible_candidates(log_p.row(r), mask.row(r));
            if feasible.is_empty() {
                return Err(DecoderError::NoFeasibleAction { rollout: r });
            }
            let action = match self {
                Self::Greedy => argmax(&feasible),
                Self::Sampling {
                    temperature,
                    top_k,
                    rng,
                } => sample(feasible, *temperature, *top_k, rng, r)?,
            };
            actions.push(action);
            logprobs.push(log_p[[r, action]]);
        }
        Ok((actions, logprobs))
    }
}

/// 可选且对数概率有限的`(节点, log_p)`
pub(crate) fn feasible_candidates(log_p: ArrayView1<f32>, mask: ArrayView1<bool>) -> Vec<(usize, f32)> {
    log_p
        .iter()
        .zip(mask.iter())
        .enumerate()
        .filter(|(_, (lp, masked))| !**masked && lp.is_finite())
        .map(|(v, (&lp, _))| (v, lp))
        .collect()
}

/// 取对数概率最大的节点，相等时取编号最小者
fn argmax(candidates: &[(usize, f32)]) -> usize {
    let mut best = candidates[0];
    for &(v, lp) in &candidates[1..] {
        if lp > best.1 {
            best = (v, lp);
        }
    }
    best.0
}

fn sample(
    mut candidates: Vec<(usize, f32)>,
    temperature: f32,
    top_k: Option<usize>,
    rng: &mut StdRng,
    rollout: usize,
) -> Result<usize, DecoderError> {
    if let Some(k) = top_k {
        candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
        candidates.truncate(k.max(1));
    }
    let max = candidates
        .iter()
        .map(|&(_, lp)| lp)
        .fold(f32::NEG_INFINITY, f32::max);
    let weights = candidates
        .iter()
        .map(|&(_, lp)| ((lp - max) / temperature).exp())
        .collect::<Vec<_>>();
    let dist =
        WeightedIndex::new(&weights).map_err(|_| DecoderError::NoFeasibleAction { rollout })?;
    Ok(candidates[dist.sample(rng)].0)
}
