use ndarray::Array2;

use super::{ActionSelector, DecodeRecord, DecodeType, DecodingStrategy};
use crate::env::EnvKind;
use crate::errors::DecoderError;
use crate::rollout::RolloutState;

/// 贪心：每步取对数概率最大的可行节点
#[derive(Debug, Clone, Default)]
pub struct Greedy {
    record: DecodeRecord,
}

impl Greedy {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DecodingStrategy for Greedy {
    fn decode_type(&self) -> DecodeType {
        DecodeType::Greedy
    }

    fn pre_decoder_hook(
        &mut self,
        state: RolloutState,
        _env: &EnvKind,
    ) -> Result<(RolloutState, usize), DecoderError> {
        Ok((state, 1))
    }

    fn step(
        &mut self,
        log_p: &Array2<f32>,
        mask: &Array2<bool>,
        mut state: RolloutState,
    ) -> Result<RolloutState, DecoderError> {
        let (actions, logprobs) = ActionSelector::Greedy.select(log_p, mask, state.done())?;
        state.set_action(actions.clone())?;
        self.record.push(actions, logprobs);
        Ok(state)
    }

    fn post_decoder_hook(
        &mut self,
        state: RolloutState,
        _env: &EnvKind,
    ) -> Result<(Array2<f32>, Array2<usize>, RolloutState), DecoderError> {
        let (logprobs, actions) = self.record.stack(state.batch_size());
        Ok((logprobs, actions, state))
    }
}
