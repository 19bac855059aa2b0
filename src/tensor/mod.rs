/*
 * @Description  : 张量。热力图、边特征、网络参数和奖励都以`Tensor`承载，
 *                 底层为`ndarray`的动态维度数组。
 */

use ndarray::{Array, ArrayD, IxDyn};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

use crate::errors::{ComparisonOperator, TensorError};

pub(crate) mod ops {
    pub mod add;
    pub mod mul;
    pub mod others;
}

mod index;
mod print;
mod property;
mod save_load;
mod shape;

#[cfg(test)]
mod tests;

/// 定义张量的结构体。其可以是标量、向量、矩阵或更高维度的数组。
/// 注：只要通Tensor初始化的都是张量（即使标量也是张量）；
/// 而通常意义上的数字（类型为usize、i32、f64等）就只是纯数（number），在这里不被认为是张量。
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tensor {
    data: Array<f32, IxDyn>,
}

impl Tensor {
    /// 创建一个张量，若为标量，`shape`可以是[]、[1]、[1,1]、[1,1,1]...
    /// 若为向量，`shape`可以是[n]、[1,n]、[n,1]；
    /// 若为矩阵，`shape`可以是[n,m]；
    /// 若为更高维度的数组，`shape`可以是[c,n,m,...]；
    /// 注：`data`的长度必须和`shape`中所有元素的乘积相等，否则panic。
    pub fn new(data: &[f32], shape: &[usize]) -> Tensor {
        Self::try_new(data, shape).unwrap_or_else(|e| panic!("{}", e))
    }

    /// `new`的非panic版本
    pub fn try_new(data: &[f32], shape: &[usize]) -> Result<Tensor, TensorError> {
        let data = Array::from_shape_vec(IxDyn(shape), data.to_vec()).map_err(|_| {
            TensorError::DataShapeMismatch {
                data_len: data.len(),
                shape: shape.to_vec(),
            }
        })?;
        Ok(Tensor { data })
    }

    /// 创建一个全零张量
    pub fn zeros(shape: &[usize]) -> Tensor {
        Tensor {
            data: ArrayD::zeros(IxDyn(shape)),
        }
    }

    /// 直接由`ndarray`数组构造（不拷贝）
    pub fn from_array(data: ArrayD<f32>) -> Tensor {
        Tensor { data }
    }

    /// 创建一个随机张量，其值在[min, max]的闭区间（固定种子，保证可重复性）
    pub fn new_random_seeded(min: f32, max: f32, shape: &[usize], seed: u64) -> Tensor {
        let mut rng = StdRng::seed_from_u64(seed);
        Self::random_with_rng(min, max, shape, &mut rng)
    }

    /// 创建一个服从正态分布的随机张量（固定种子）。
    /// `std_dev`须大于0，否则panic。
    pub fn new_normal_seeded(mean: f32, std_dev: f32, shape: &[usize], seed: u64) -> Tensor {
        assert!(
            std_dev > 0.0,
            "{}",
            TensorError::ValueMustSatisfyComparison {
                value_name: "std_dev".to_string(),
                operator: ComparisonOperator::GreaterThan,
                threshold: 0,
            }
        );
        let mut rng = StdRng::seed_from_u64(seed);
        let data_len = shape.iter().product::<usize>();
        let mut data = Vec::with_capacity(data_len);

        // Box-Muller
        while data.len() < data_len {
            let u1: f32 = rng.r#gen();
            let u2: f32 = rng.r#gen();
            let r = (-2.0 * u1.ln()).sqrt();
            let theta = 2.0 * std::f32::consts::PI * u2;
            let z0 = mean + std_dev * r * theta.cos();
            let z1 = mean + std_dev * r * theta.sin();

            if z0.is_finite() {
                data.push(z0);
            }
            if data.len() < data_len && z1.is_finite() {
                data.push(z1);
            }
        }

        Tensor::new(&data, shape)
    }
}

// 私有方法
impl Tensor {
    fn random_with_rng<R: Rng>(min: f32, max: f32, shape: &[usize], rng: &mut R) -> Tensor {
        let uniform = Uniform::from(min..=max);
        let data = (0..shape.iter().product::<usize>())
            .map(|_| uniform.sample(rng))
            .collect::<Vec<_>>();
        Tensor::new(&data, shape)
    }
}
