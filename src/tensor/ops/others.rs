use crate::errors::{Operator, TensorError};
use crate::tensor::Tensor;
use ndarray::{Axis, Ix2, Zip};
use std::cmp::PartialEq;

impl From<f32> for Tensor {
    /// 实现 From<f32> trait 用于将`f32`类型转换为形状为`[1]`的张量
    fn from(scalar: f32) -> Self {
        Tensor::new(&[scalar], &[1])
    }
}

impl PartialEq for Tensor {
    fn eq(&self, other: &Self) -> bool {
        self.data == other.data
    }
}

impl Tensor {
    /// 判断两个张量能否按 NumPy 规则广播：从右向左对齐，每个维度相等或其中之一为1
    pub fn can_broadcast_with(&self, other: &Self) -> bool {
        self.shape()
            .iter()
            .rev()
            .zip(other.shape().iter().rev())
            .all(|(&a, &b)| a == b || a == 1 || b == 1)
    }

    /// 对张量中的所有元素求和并返回一个形状为[1]的标量。
    pub fn sum(&self) -> Tensor {
        let mut value = 0.0;
        Zip::from(&self.data).for_each(|a| value += a);
        Tensor::from(value)
    }

    /// 沿`axis`求均值（该维度被消去）
    pub fn mean_axis(&self, axis: usize) -> Result<Tensor, TensorError> {
        let dimension = self.dimension();
        if axis >= dimension || self.shape()[axis] == 0 {
            return Err(TensorError::AxisOutOfRange { axis, dimension });
        }
        let data = self
            .data
            .mean_axis(Axis(axis))
            .ok_or(TensorError::AxisOutOfRange { axis, dimension })?;
        Ok(Tensor { data })
    }

    /// 沿`axis`求和（该维度被消去）
    pub fn sum_axis(&self, axis: usize) -> Result<Tensor, TensorError> {
        let dimension = self.dimension();
        if axis >= dimension {
            return Err(TensorError::AxisOutOfRange { axis, dimension });
        }
        Ok(Tensor {
            data: self.data.sum_axis(Axis(axis)),
        })
    }

    /// 二维矩阵乘法：`[m, k] @ [k, n] = [m, n]`
    pub fn mat_mul(&self, other: &Tensor) -> Result<Tensor, TensorError> {
        let shape_error = || TensorError::OperatorError {
            operator: Operator::MatMul,
            tensor1_shape: self.shape().to_vec(),
            tensor2_shape: other.shape().to_vec(),
        };
        let a = self
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| shape_error())?;
        let b = other
            .data
            .view()
            .into_dimensionality::<Ix2>()
            .map_err(|_| shape_error())?;
        if a.ncols() != b.nrows() {
            return Err(shape_error());
        }
        Ok(Tensor {
            data: a.dot(&b).into_dyn(),
        })
    }

    /// 逐元素映射，返回新张量
    pub fn map<F: Fn(f32) -> f32>(&self, f: F) -> Tensor {
        Tensor {
            data: self.data.mapv(f),
        }
    }

    /// 逐元素sigmoid：`1 / (1 + e^(-x))`
    pub fn sigmoid(&self) -> Tensor {
        self.map(|x| 1.0 / (1.0 + (-x).exp()))
    }

    /// 沿最后一维的log-softmax，使用 log-sum-exp 技巧保证数值稳定。
    /// 值为`-inf`的位置输出仍为`-inf`；若整行均为`-inf`，该行输出为NaN。
    pub fn log_softmax_last(&self) -> Result<Tensor, TensorError> {
        let dimension = self.dimension();
        if dimension == 0 {
            return Err(TensorError::AxisOutOfRange { axis: 0, dimension });
        }
        let mut data = self.data.clone();
        for mut lane in data.lanes_mut(Axis(dimension - 1)) {
            let max = lane.iter().copied().fold(f32::NEG_INFINITY, f32::max);
            let log_sum_exp = lane.iter().map(|&x| (x - max).exp()).sum::<f32>().ln() + max;
            lane.mapv_inplace(|x| x - log_sum_exp);
        }
        Ok(Tensor { data })
    }
}
