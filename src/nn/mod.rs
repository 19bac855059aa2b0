/*
 * @Description  : 负责神经网络（neural network）部分：全连接层、边热力图生成器，
 *                 以及基于热力图的非自回归解码器
 */

mod activation;
mod config;
mod decoder;
mod heatmap;
mod init;
pub mod layer;
mod module;

pub use activation::{Activation, DEFAULT_LEAKY_RELU_SLOPE};
pub use config::DecoderConfig;
pub use decoder::{DecodeOutput, EnvSource, NonAutoregressiveDecoder};
pub use heatmap::{EdgeHeatmapGenerator, HEATMAP_SCALE, HeatmapDescriptor};
pub use init::Init;
pub use layer::Linear;
pub use module::Module;

#[cfg(test)]
mod tests;
