use crate::tensor::Tensor;
use std::fmt;

/// 打印时每个维度最多展示的元素个数，超出部分以`..`省略
const MAX_ITEMS_PER_DIM: usize = 6;

impl fmt::Display for Tensor {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        fn display_recursive(
            f: &mut fmt::Formatter,
            tensor: &Tensor,
            indices: &mut Vec<usize>,
            depth: usize,
        ) -> fmt::Result {
            let shape = tensor.shape();
            if depth == shape.len() {
                return write!(f, "{:8.4}", tensor[&indices[..]]);
            }
            write!(f, "[")?;
            let len = shape[depth];
            for i in 0..len {
                if len > MAX_ITEMS_PER_DIM && i == MAX_ITEMS_PER_DIM / 2 {
                    write!(f, "      .., ")?;
                }
                if len > MAX_ITEMS_PER_DIM
                    && i >= MAX_ITEMS_PER_DIM / 2
                    && i < len - MAX_ITEMS_PER_DIM / 2
                {
                    continue;
                }
                indices[depth] = i;
                display_recursive(f, tensor, indices, depth + 1)?;
                if i != len - 1 {
                    write!(f, ", ")?;
                    if depth + 1 < shape.len() {
                        write!(f, "\n{}", " ".repeat(depth + 1))?;
                    }
                }
            }
            write!(f, "]")
        }

        let mut indices = vec![0; self.dimension()];
        display_recursive(f, self, &mut indices, 0)?;
        write!(f, "\n<形状: {:?}>", self.shape())
    }
}
