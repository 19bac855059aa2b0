use super::Tensor;
use crate::errors::TensorError;
use ndarray::{Axis, IxDyn, Slice};
use std::ops::Range;

impl Tensor {
    pub fn reshape(&self, shape: &[usize]) -> Result<Self, TensorError> {
        let new_total_elements: usize = shape.iter().product();
        if self.size() != new_total_elements {
            return Err(TensorError::IncompatibleShape);
        }
        let data = self
            .data
            .as_standard_layout()
            .into_owned()
            .into_shape(IxDyn(shape))
            .map_err(|_| TensorError::IncompatibleShape)?;
        Ok(Self { data })
    }

    /// 交换最后两个维度（如`[b, n, m]` -> `[b, m, n]`），至少需要2维
    pub fn transpose_last2(&self) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        if dimension < 2 {
            return Err(TensorError::AxisOutOfRange {
                axis: 1,
                dimension,
            });
        }
        let mut view = self.data.view();
        view.swap_axes(dimension - 2, dimension - 1);
        Ok(Self {
            data: view.as_standard_layout().into_owned(),
        })
    }

    /// 将多个形状相同的张量沿新增的首个维度堆叠起来，返回一个新的张量。
    /// 如3个形状为`[n, n]`的张量堆叠后形状为`[3, n, n]`。
    pub fn stack(tensors: &[&Self]) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        if tensors.iter().any(|t| !t.is_same_shape(first)) {
            return Err(TensorError::InconsitentShape);
        }
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data =
            ndarray::stack(Axis(0), &views).map_err(|_| TensorError::InconsitentShape)?;
        Ok(Self { data })
    }

    /// 取出首个维度上第`index`个切片（降一维）
    pub fn select_first(&self, index: usize) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        if dimension == 0 || index >= self.shape()[0] {
            return Err(TensorError::AxisOutOfRange {
                axis: 0,
                dimension,
            });
        }
        Ok(Self {
            data: self.data.index_axis(Axis(0), index).to_owned(),
        })
    }

    /// 按给定的行号沿首个维度收集（可重复），返回形状为`[indices.len(), ...]`的新张量
    pub fn gather_first(&self, indices: &[usize]) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        if dimension == 0 || indices.iter().any(|&i| i >= self.shape()[0]) {
            return Err(TensorError::AxisOutOfRange {
                axis: 0,
                dimension,
            });
        }
        Ok(Self {
            data: self.data.select(Axis(0), indices),
        })
    }

    /// 沿首个维度拼接（各张量除首维外形状须一致），如`[2, d]`与`[3, d]`拼接为`[5, d]`
    pub fn concat(tensors: &[&Self]) -> Result<Self, TensorError> {
        let first = tensors.first().ok_or(TensorError::EmptyList)?;
        let compatible = |t: &Self| {
            t.dimension() == first.dimension() && t.shape().iter().skip(1).eq(first.shape().iter().skip(1))
        };
        if first.dimension() == 0 || !tensors.iter().all(|t| compatible(t)) {
            return Err(TensorError::InconsitentShape);
        }
        let views = tensors.iter().map(|t| t.data.view()).collect::<Vec<_>>();
        let data = ndarray::concatenate(Axis(0), &views)
            .map_err(|_| TensorError::InconsitentShape)?;
        Ok(Self { data })
    }

    /// 取首个维度上`range`范围内的切片（拷贝）
    pub fn slice_first(&self, range: Range<usize>) -> Result<Self, TensorError> {
        let dimension = self.dimension();
        if dimension == 0 || range.start > range.end || range.end > self.shape()[0] {
            return Err(TensorError::AxisOutOfRange {
                axis: 0,
                dimension,
            });
        }
        let data = self
            .data
            .slice_axis(Axis(0), Slice::from(range))
            .to_owned();
        Ok(Self { data })
    }
}
