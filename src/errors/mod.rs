/*
 * @Description  : 错误类型：张量层的`TensorError`与解码流程的`DecoderError`
 */

use thiserror::Error;
mod decoder;
mod ops;
pub use self::decoder::DecoderError;
pub use self::ops::*;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TensorError {
    // 数字比较用
    #[error("{value_name}须{operator}{threshold}")]
    ValueMustSatisfyComparison {
        value_name: String,
        operator: ComparisonOperator,
        threshold: usize,
    },
    // 张量二元运算
    #[error(
        "形状不一致，故无法{operator}：第一个张量的形状为{tensor1_shape:?}，第二个张量的形状为{tensor2_shape:?}"
    )]
    OperatorError {
        operator: Operator,
        tensor1_shape: Vec<usize>,
        tensor2_shape: Vec<usize>,
    },

    #[error("张量列表为空")]
    EmptyList,
    #[error("张量形状不一致")]
    InconsitentShape,
    #[error("张量形状不兼容")]
    IncompatibleShape,
    #[error("数据长度{data_len}与形状{shape:?}不匹配")]
    DataShapeMismatch { data_len: usize, shape: Vec<usize> },
    #[error("轴{axis}超出了{dimension}维张量的范围")]
    AxisOutOfRange { axis: usize, dimension: usize },
    #[error("张量（反）序列化失败：{0}")]
    Serialization(String),
}
