use crate::tensor::Tensor;

/// 参数初始化策略
#[derive(Debug, Clone, PartialEq)]
pub enum Init {
    /// 常数初始化
    Constant(f32),
    /// 全零
    Zeros,
    /// 正态分布
    Normal { mean: f32, std: f32 },
    /// Kaiming/He 初始化（适用于 `ReLU`、`SiLU`）
    Kaiming,
    /// Xavier/Glorot 初始化（适用于 Sigmoid/Tanh）
    Xavier,
}

impl Init {
    /// 按固定种子生成初始化后的 Tensor，`shape`的前两维视为`[fan_in, fan_out]`
    pub fn generate_seeded(&self, shape: &[usize], seed: u64) -> Tensor {
        match self {
            Self::Constant(v) => Tensor::zeros(shape) + *v,
            Self::Zeros => Tensor::zeros(shape),
            Self::Normal { mean, std } => Tensor::new_normal_seeded(*mean, *std, shape, seed),
            Self::Kaiming => {
                let fan_in = shape.first().copied().unwrap_or(1).max(1);
                let std = (2.0 / fan_in as f32).sqrt();
                Tensor::new_normal_seeded(0.0, std, shape, seed)
            }
            Self::Xavier => {
                let (fan_in, fan_out) = (
                    shape.first().copied().unwrap_or(1),
                    shape.get(1).copied().unwrap_or(1),
                );
                let std = (2.0 / (fan_in + fan_out).max(1) as f32).sqrt();
                Tensor::new_normal_seeded(0.0, std, shape, seed)
            }
        }
    }
}
