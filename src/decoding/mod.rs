/*
 * @Description  : 解码策略：把每一步的条件对数概率变成具体动作。
 *                 闭合的策略集合（`DecodingStrategyKind`）经`enum_dispatch`分派到`DecodingStrategy`接口，
 *                 由`DecodeType`与`StrategyOptions`静态构造，每次解码调用新建一个实例。
 */

mod beam_search;
mod greedy;
mod multistart;
mod record;
mod sampling;
mod select;

pub use beam_search::BeamSearch;
pub use greedy::Greedy;
pub use multistart::Multistart;
pub use record::DecodeRecord;
pub use sampling::Sampling;
pub use select::ActionSelector;

use std::fmt::{self, Display};
use std::str::FromStr;

use enum_dispatch::enum_dispatch;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::env::EnvKind;
use crate::errors::DecoderError;
use crate::rollout::RolloutState;

#[cfg(test)]
mod tests;

/// 解码策略接口
#[enum_dispatch]
pub trait DecodingStrategy {
    fn decode_type(&self) -> DecodeType;

    /// 解码前处理状态（如多起点展开），返回新状态与每个实例的起点数
    fn pre_decoder_hook(
        &mut self,
        state: RolloutState,
        env: &EnvKind,
    ) -> Result<(RolloutState, usize), DecoderError>;

    /// 由`log_p`（[rollouts, num_nodes]）与`mask`（true为不可选）为每条序列选出动作，
    /// 写入`state.action`并记录
    fn step(
        &mut self,
        log_p: &Array2<f32>,
        mask: &Array2<bool>,
        state: RolloutState,
    ) -> Result<RolloutState, DecoderError>;

    /// 解码结束后整理结果，返回`(outputs, actions, state)`：
    /// `outputs`为每步所选动作的对数概率 [rollouts, steps]，`actions`为动作序列 [rollouts, steps]
    fn post_decoder_hook(
        &mut self,
        state: RolloutState,
        env: &EnvKind,
    ) -> Result<(Array2<f32>, Array2<usize>, RolloutState), DecoderError>;
}

#[enum_dispatch(DecodingStrategy)]
#[derive(Debug, Clone)]
pub enum DecodingStrategyKind {
    Greedy(Greedy),
    Sampling(Sampling),
    Multistart(Multistart),
    BeamSearch(BeamSearch),
}

/// 解码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DecodeType {
    Greedy,
    Sampling,
    MultistartGreedy,
    #[default]
    MultistartSampling,
    BeamSearch,
}

impl DecodeType {
    pub const ALL: [DecodeType; 5] = [
        DecodeType::Greedy,
        DecodeType::Sampling,
        DecodeType::MultistartGreedy,
        DecodeType::MultistartSampling,
        DecodeType::BeamSearch,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Greedy => "greedy",
            Self::Sampling => "sampling",
            Self::MultistartGreedy => "multistart_greedy",
            Self::MultistartSampling => "multistart_sampling",
            Self::BeamSearch => "beam_search",
        }
    }
}

impl Display for DecodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for DecodeType {
    type Err = DecoderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| DecoderError::UnknownDecodeType(s.to_string()))
    }
}

/// 解码策略的可选参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StrategyOptions {
    /// 采样温度，须大于0
    pub temperature: f32,
    /// 采样时仅在对数概率最高的k个节点中抽取
    pub top_k: Option<usize>,
    /// 多起点数；缺省为节点数
    pub num_starts: Option<usize>,
    /// 束宽；缺省为节点数
    pub beam_width: Option<usize>,
    /// 多起点/束搜索结束后是否只保留每个实例奖励最高的一条
    pub select_best: bool,
    /// 采样用随机种子；缺省取系统熵
    pub seed: Option<u64>,
}

impl Default for StrategyOptions {
    fn default() -> Self {
        Self {
            temperature: 1.0,
            top_k: None,
            num_starts: None,
            beam_width: None,
            select_best: true,
            seed: None,
        }
    }
}

/// 按解码方式构造策略
pub fn get_decoding_strategy(
    decode_type: DecodeType,
    options: &StrategyOptions,
) -> Result<DecodingStrategyKind, DecoderError> {
    if !(options.temperature > 0.0) {
        return Err(DecoderError::InvalidConfig(format!(
            "采样温度须大于0，实际为{}",
            options.temperature
        )));
    }
    if options.top_k == Some(0) {
        return Err(DecoderError::InvalidConfig("top_k须大于0".to_string()));
    }
    let strategy = match decode_type {
        DecodeType::Greedy => Greedy::new().into(),
        DecodeType::Sampling => Sampling::new(options).into(),
        DecodeType::MultistartGreedy => {
            Multistart::new(ActionSelector::greedy(), DecodeType::MultistartGreedy, options).into()
        }
        DecodeType::MultistartSampling => Multistart::new(
            ActionSelector::sampling(options),
            DecodeType::MultistartSampling,
            options,
        )
        .into(),
        DecodeType::BeamSearch => BeamSearch::new(options).into(),
    };
    Ok(strategy)
}
