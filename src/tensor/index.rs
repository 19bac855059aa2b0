use super::Tensor;
use ndarray::IxDyn;
use std::ops::{Index, IndexMut};

// 引用式索引，如`tensor[[b, i, j]]`
impl<const N: usize> Index<[usize; N]> for Tensor {
    type Output = f32;

    fn index(&self, index: [usize; N]) -> &f32 {
        &self.data[IxDyn(&index)]
    }
}

impl<const N: usize> IndexMut<[usize; N]> for Tensor {
    fn index_mut(&mut self, index: [usize; N]) -> &mut f32 {
        &mut self.data[IxDyn(&index)]
    }
}

impl Index<&[usize]> for Tensor {
    type Output = f32;

    fn index(&self, index: &[usize]) -> &f32 {
        &self.data[IxDyn(index)]
    }
}
