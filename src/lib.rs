//! # nar_decoder
//!
//! 基于热力图的非自回归（non-autoregressive）组合优化解码器。
//! 给定一批图（边特征来自上游嵌入网络），先用小型MLP一次性预测每条边的“好坏”分数，
//! 组成每个实例的热力图；再由可插拔的解码策略（贪心、采样、多起点、束搜索）
//! 逐步读取热力图构造解（如TSP回路），期间遵守环境给出的可行性掩码，最后由环境计算奖励。
//!
//! ```ignore
//! use nar_decoder::decoding::{DecodeType, StrategyOptions};
//! use nar_decoder::nn::{DecoderConfig, EnvSource, NonAutoregressiveDecoder};
//!
//! let decoder = NonAutoregressiveDecoder::new(DecoderConfig::default())?;
//! let output = decoder.forward(state, &graph, EnvSource::Default,
//!                              DecodeType::Greedy, true, StrategyOptions::default())?;
//! ```

pub mod decoding;
pub mod env;
pub mod errors;
pub mod graph;
pub mod nn;
pub mod rollout;
pub mod tensor;
pub mod utils;
