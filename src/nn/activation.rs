/*
 * @Description  : 热力图网络隐藏层使用的激活函数
 */

use std::fmt::{self, Display};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::DecoderError;
use crate::tensor::Tensor;

/// `leaky_relu`按名称解析时的默认负半轴斜率
pub const DEFAULT_LEAKY_RELU_SLOPE: f32 = 0.01;

/// 逐元素激活函数
///
/// 序列化为字符串，格式同`Display`，如`"silu"`、`"leaky_relu(0.2)"`
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Activation {
    #[default]
    Silu,
    Relu,
    Tanh,
    Sigmoid,
    /// 负半轴斜率
    LeakyRelu(f32),
    /// 精确（erf）形式：`x * Φ(x)`
    Gelu,
    Identity,
}

impl Activation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Silu => "silu",
            Self::Relu => "relu",
            Self::Tanh => "tanh",
            Self::Sigmoid => "sigmoid",
            Self::LeakyRelu(_) => "leaky_relu",
            Self::Gelu => "gelu",
            Self::Identity => "identity",
        }
    }

    pub fn apply_scalar(&self, x: f32) -> f32 {
        match *self {
            Self::Silu => x / (1.0 + (-x).exp()),
            Self::Relu => x.max(0.0),
            Self::Tanh => x.tanh(),
            Self::Sigmoid => 1.0 / (1.0 + (-x).exp()),
            Self::LeakyRelu(slope) => {
                if x >= 0.0 {
                    x
                } else {
                    slope * x
                }
            }
            Self::Gelu => 0.5 * x * (1.0 + erf(x / std::f32::consts::SQRT_2)),
            Self::Identity => x,
        }
    }

    pub fn apply(&self, x: &Tensor) -> Tensor {
        if *self == Self::Identity {
            return x.clone();
        }
        x.map(|v| self.apply_scalar(v))
    }
}

impl Display for Activation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LeakyRelu(slope) => write!(f, "leaky_relu({slope})"),
            other => write!(f, "{}", other.as_str()),
        }
    }
}

impl FromStr for Activation {
    type Err = DecoderError;

    /// 名称不区分大小写；`leaky_relu`使用默认斜率，`leaky_relu(0.2)`指定斜率
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        if let Some(slope) = name
            .strip_prefix("leaky_relu(")
            .or_else(|| name.strip_prefix("leakyrelu("))
            .and_then(|rest| rest.strip_suffix(')'))
        {
            return slope
                .trim()
                .parse::<f32>()
                .ok()
                .filter(|slope| slope.is_finite())
                .map(Self::LeakyRelu)
                .ok_or_else(|| DecoderError::UnknownActivation(s.to_string()));
        }
        let activation = match name.as_str() {
            "silu" | "swish" => Self::Silu,
            "relu" => Self::Relu,
            "tanh" => Self::Tanh,
            "sigmoid" => Self::Sigmoid,
            "leaky_relu" | "leakyrelu" => Self::LeakyRelu(DEFAULT_LEAKY_RELU_SLOPE),
            "gelu" => Self::Gelu,
            "identity" | "none" => Self::Identity,
            _ => return Err(DecoderError::UnknownActivation(s.to_string())),
        };
        Ok(activation)
    }
}

impl TryFrom<String> for Activation {
    type Error = DecoderError;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        name.parse()
    }
}

impl From<Activation> for String {
    fn from(activation: Activation) -> Self {
        activation.to_string()
    }
}

/// 误差函数，Abramowitz-Stegun 7.1.26 多项式近似（绝对误差约1.5e-7）
fn erf(x: f32) -> f32 {
    const A: [f64; 5] = [0.254_829_592, -0.284_496_736, 1.421_413_741, -1.453_152_027, 1.061_405_429];
    const P: f64 = 0.327_591_1;

    let x = f64::from(x);
    let sign = if x < 0.0 { -1.0 } else { 1.0 };
    let x = x.abs();
    let t = 1.0 / (1.0 + P * x);
    let poly = A.iter().rev().fold(0.0, |acc, &a| acc * t + a) * t;
    (sign * (1.0 - poly * (-x * x).exp())) as f32
}
