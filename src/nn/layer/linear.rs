/*
 * @Description  : Linear (全连接) 层
 */

use crate::errors::DecoderError;
use crate::nn::{Init, Module};
use crate::tensor::Tensor;

/// Linear (全连接) 层：`output = x @ W + b`
///
/// # 输入/输出形状
/// - 输入：[batch_size, in_features]
/// - 输出：[batch_size, out_features]
///
/// # 使用示例
/// ```ignore
/// let fc = Linear::new_seeded(64, 64, true, 42);
/// let h = Activation::Silu.apply(&fc.forward(&x)?);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Linear {
    /// 权重参数 [in_features, out_features]
    weights: Tensor,
    /// 偏置参数 [1, out_features]（可选）
    bias: Option<Tensor>,
    in_features: usize,
    out_features: usize,
}

impl Linear {
    /// 创建新的 Linear 层（带种子，确保可重复性）
    ///
    /// 权重使用 Kaiming 初始化，偏置零初始化
    pub fn new_seeded(in_features: usize, out_features: usize, use_bias: bool, seed: u64) -> Self {
        let weights = Init::Kaiming.generate_seeded(&[in_features, out_features], seed);
        let bias = use_bias.then(|| Init::Zeros.generate_seeded(&[1, out_features], seed));
        Self {
            weights,
            bias,
            in_features,
            out_features,
        }
    }

    /// 由现成的参数构造，形状须为`[in, out]`与`[1, out]`
    pub fn from_tensors(weights: Tensor, bias: Option<Tensor>) -> Result<Self, DecoderError> {
        if weights.dimension() != 2 {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![0, 0],
                got: weights.shape().to_vec(),
                message: "Linear权重须为二维".to_string(),
            });
        }
        let (in_features, out_features) = (weights.shape()[0], weights.shape()[1]);
        if let Some(b) = &bias {
            if b.shape() != [1, out_features] {
                return Err(DecoderError::ShapeMismatch {
                    expected: vec![1, out_features],
                    got: b.shape().to_vec(),
                    message: "Linear偏置形状".to_string(),
                });
            }
        }
        Ok(Self {
            weights,
            bias,
            in_features,
            out_features,
        })
    }

    /// 前向传播，计算 `x @ W + b`
    ///
    /// # 参数
    /// - `x`: 形状 [batch_size, in_features]
    pub fn forward(&self, x: &Tensor) -> Result<Tensor, DecoderError> {
        if x.dimension() != 2 || x.shape()[1] != self.in_features {
            return Err(DecoderError::ShapeMismatch {
                expected: vec![x.shape().first().copied().unwrap_or(0), self.in_features],
                got: x.shape().to_vec(),
                message: "Linear输入特征维度".to_string(),
            });
        }
        let xw = x.mat_mul(&self.weights)?;
        // [batch, out] + [1, out] 广播
        Ok(match &self.bias {
            Some(bias) => &xw + bias,
            None => xw,
        })
    }

    pub fn in_features(&self) -> usize {
        self.in_features
    }

    pub fn out_features(&self) -> usize {
        self.out_features
    }

    pub fn weights(&self) -> &Tensor {
        &self.weights
    }

    pub fn bias(&self) -> Option<&Tensor> {
        self.bias.as_ref()
    }

    /// 与`parameters()`顺序一致的可变引用，供加载参数使用
    pub(crate) fn parameters_mut(&mut self) -> Vec<&mut Tensor> {
        let mut params = vec![&mut self.weights];
        if let Some(ref mut bias) = self.bias {
            params.push(bias);
        }
        params
    }
}

impl Module for Linear {
    fn parameters(&self) -> Vec<&Tensor> {
        let mut params = vec![&self.weights];
        if let Some(ref bias) = self.bias {
            params.push(bias);
        }
        params
    }
}
