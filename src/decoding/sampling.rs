use ndarray::Array2;

use super::{ActionSelector, DecodeRecord, DecodeType, DecodingStrategy, StrategyOptions};
use crate::env::EnvKind;
use crate::errors::DecoderError;
use crate::rollout::RolloutState;

/// 按（温度调节后的）条件分布采样
#[derive(Debug, Clone)]
pub struct Sampling {
    selector: ActionSelector,
    record: DecodeRecord,
}

impl Sampling {
    pub fn new(options: &StrategyOptions) -> Self {
        Self {
            selector: ActionSelector::sampling(options),
            record: DecodeRecord::new(),
        }
    }
}

impl DecodingStrategy for Sampling {
    fn decode_type(&self) -> DecodeType {
        DecodeType::Sampling
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
        let (actions, logprobs) = self.selector.select(log_p, mask, state.done())?;
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
