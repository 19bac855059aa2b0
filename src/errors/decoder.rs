/*
 * @Description  : 解码流程（热力图生成、环境、解码策略）的错误类型
 */

use super::TensorError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecoderError {
    // 注册表查找
    #[error("未知的环境：{0}")]
    UnknownEnvironment(String),
    #[error("未知的解码方式：{0}")]
    UnknownDecodeType(String),
    #[error("未知的激活函数：{0}")]
    UnknownActivation(String),

    #[error("配置无效：{0}")]
    InvalidConfig(String),
    #[error("形状不匹配（{message}）：期望{expected:?}，实际{got:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        got: Vec<usize>,
        message: String,
    },

    // 图批次
    #[error("批次中第{graph}个图的节点数为{got}，与首个图的节点数{expected}不一致")]
    NonUniformNodeCount {
        expected: usize,
        got: usize,
        graph: usize,
    },
    #[error("第{graph}个图的边索引{index}超出了节点数{num_nodes}的范围")]
    EdgeIndexOutOfRange {
        graph: usize,
        index: usize,
        num_nodes: usize,
    },

    // 推演状态
    #[error("推演状态中缺少键：{0}")]
    MissingStateKey(String),
    #[error("第{rollout}条推演序列已没有可行动作")]
    NoFeasibleAction { rollout: usize },
    #[error("第{rollout}条推演序列不是合法的回路")]
    InvalidSolution { rollout: usize },
    #[error("解码循环超过了{0}步上限仍未结束")]
    MaxDecodeStepsExceeded(usize),

    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("（反）序列化失败：{0}")]
    Serialization(String),
    #[error(transparent)]
    Tensor(#[from] TensorError),
}

impl From<serde_json::Error> for DecoderError {
    fn from(err: serde_json::Error) -> Self {
        DecoderError::Serialization(err.to_string())
    }
}

impl From<bincode::Error> for DecoderError {
    fn from(err: bincode::Error) -> Self {
        DecoderError::Serialization(err.to_string())
    }
}
