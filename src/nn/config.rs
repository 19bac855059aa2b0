use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Activation;
use crate::errors::DecoderError;

/// 非自回归解码器的配置，可从 JSON 加载，缺省字段取默认值
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// 未显式指定环境时使用的环境名
    pub env_name: String,
    /// 边嵌入维度
    pub embedding_dim: usize,
    /// 热力图 MLP 的层数（含输出层）
    pub num_layers: usize,
    pub act_fn: Activation,
    pub linear_bias: bool,
    /// 是否把热力图对称化
    pub undirected_graph: bool,
    /// 参数初始化种子
    pub seed: u64,
    /// 解码循环的步数上限；缺省为`4 * num_nodes + 16`
    pub max_decode_steps: Option<usize>,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            env_name: "tsp".to_string(),
            embedding_dim: 64,
            num_layers: 5,
            act_fn: Activation::Silu,
            linear_bias: true,
            undirected_graph: true,
            seed: 42,
            max_decode_steps: None,
        }
    }
}

impl DecoderConfig {
    pub fn from_json_str(json: &str) -> Result<Self, DecoderError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, DecoderError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    pub fn to_json_string(&self) -> Result<String, DecoderError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), DecoderError> {
        if self.num_layers == 0 {
            return Err(DecoderError::InvalidConfig(
                "num_layers须至少为1（输出层）".to_string(),
            ));
        }
        if self.embedding_dim == 0 {
            return Err(DecoderError::InvalidConfig("embedding_dim须大于0".to_string()));
        }
        if self.max_decode_steps == Some(0) {
            return Err(DecoderError::InvalidConfig("max_decode_steps须大于0".to_string()));
        }
        Ok(())
    }
}
